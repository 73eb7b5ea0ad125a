//! Repairs, type-normalizes and deduplicates raw measurement rows.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime};
use serde::Serialize;
use std::collections::HashSet;
use tracing::info;

use crate::error::{PipelineError, Result};
use crate::extract::RawTable;

/// Placeholder text a test device writes instead of a real reading.
pub const SENTINEL: &str = "Dev test";

pub const TIMESTAMP: &str = "timestamp";
pub const DATE: &str = "date";
pub const GRID_PURCHASE: &str = "grid_purchase";
pub const GRID_FEEDIN: &str = "grid_feedin";

static DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
    "%d.%m.%Y %H:%M:%S",
    "%d.%m.%Y %H:%M",
];

static DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%d.%m.%Y"];

/// One cleaned row. `None` marks a missing value.
#[derive(Debug, Clone, PartialEq)]
pub struct Measurement {
    /// Wall-clock time as written; grouping uses this.
    pub timestamp: Option<NaiveDateTime>,
    /// UTC offset, when the cell carried one.
    pub timestamp_offset: Option<FixedOffset>,
    pub date: Option<NaiveDateTime>,
    pub date_offset: Option<FixedOffset>,
    pub grid_purchase: Option<f64>,
    pub grid_feedin: Option<f64>,
    /// Cells of every other column, in header order.
    pub extra: Vec<String>,
}

impl Measurement {
    fn key(&self) -> RowKey {
        RowKey {
            timestamp: self.timestamp,
            timestamp_offset: self.timestamp_offset.map(|o| o.local_minus_utc()),
            date: self.date,
            date_offset: self.date_offset.map(|o| o.local_minus_utc()),
            grid_purchase: float_key(self.grid_purchase),
            grid_feedin: float_key(self.grid_feedin),
            extra: self.extra.clone(),
        }
    }
}

/// Whole-row identity used for deduplication; missing equals missing.
#[derive(PartialEq, Eq, Hash)]
struct RowKey {
    timestamp: Option<NaiveDateTime>,
    timestamp_offset: Option<i32>,
    date: Option<NaiveDateTime>,
    date_offset: Option<i32>,
    grid_purchase: Option<u64>,
    grid_feedin: Option<u64>,
    extra: Vec<String>,
}

fn float_key(value: Option<f64>) -> Option<u64> {
    // 0.0 and -0.0 compare equal
    value.map(|v| if v == 0.0 { 0 } else { v.to_bits() })
}

#[derive(Debug, Clone, Default)]
pub struct MeasurementTable {
    /// Names of the pass-through columns, matching [`Measurement::extra`].
    pub extra_headers: Vec<String>,
    pub rows: Vec<Measurement>,
}

/// Counters describing what cleaning changed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CleanReport {
    pub rows_read: usize,
    pub sentinels_replaced: usize,
    pub missing_timestamps: usize,
    pub duplicates_removed: usize,
}

struct Columns {
    timestamp: usize,
    date: usize,
    grid_purchase: usize,
    grid_feedin: usize,
    extra: Vec<usize>,
}

impl Columns {
    fn locate(raw: &RawTable) -> Result<Self> {
        let find = |name: &str| {
            raw.column_index(name)
                .ok_or_else(|| PipelineError::MissingColumn {
                    column: name.to_string(),
                })
        };

        let timestamp = find(TIMESTAMP)?;
        let date = find(DATE)?;
        let grid_purchase = find(GRID_PURCHASE)?;
        let grid_feedin = find(GRID_FEEDIN)?;

        let known = [timestamp, date, grid_purchase, grid_feedin];
        let extra = (0..raw.headers.len())
            .filter(|i| !known.contains(i))
            .collect();

        Ok(Self {
            timestamp,
            date,
            grid_purchase,
            grid_feedin,
            extra,
        })
    }
}

/// Cleans the raw table: sentinel repair, numeric coercion, timestamp
/// parsing, then removal of exact duplicate rows (first occurrence wins).
///
/// An empty timestamp cell becomes missing; any other unparseable timestamp
/// or non-numeric measure fails with [`PipelineError::TypeConversion`].
#[tracing::instrument(skip_all, fields(rows = raw.len()))]
pub fn clean(raw: &RawTable) -> Result<(MeasurementTable, CleanReport)> {
    let columns = Columns::locate(raw)?;
    let mut report = CleanReport {
        rows_read: raw.len(),
        ..Default::default()
    };

    let grid_purchase = coerce_measures(raw, columns.grid_purchase, GRID_PURCHASE, &mut report)?;
    let grid_feedin = coerce_measures(raw, columns.grid_feedin, GRID_FEEDIN, &mut report)?;
    let timestamps = coerce_timestamps(raw, columns.timestamp, TIMESTAMP)?;
    let dates = coerce_timestamps(raw, columns.date, DATE)?;

    report.missing_timestamps = timestamps.iter().filter(|t| t.is_none()).count();

    let mut seen = HashSet::new();
    let mut rows = Vec::with_capacity(raw.len());

    for (i, record) in raw.rows.iter().enumerate() {
        let row = Measurement {
            timestamp: timestamps[i].map(|(t, _)| t),
            timestamp_offset: timestamps[i].and_then(|(_, o)| o),
            date: dates[i].map(|(t, _)| t),
            date_offset: dates[i].and_then(|(_, o)| o),
            grid_purchase: grid_purchase[i],
            grid_feedin: grid_feedin[i],
            extra: columns
                .extra
                .iter()
                .map(|&c| record.get(c).unwrap_or_default().to_string())
                .collect(),
        };

        if seen.insert(row.key()) {
            rows.push(row);
        } else {
            report.duplicates_removed += 1;
        }
    }

    info!(
        rows_read = report.rows_read,
        sentinels_replaced = report.sentinels_replaced,
        missing_timestamps = report.missing_timestamps,
        duplicates_removed = report.duplicates_removed,
        "Cleaning complete"
    );

    let table = MeasurementTable {
        extra_headers: columns
            .extra
            .iter()
            .map(|&c| raw.headers.get(c).unwrap_or_default().to_string())
            .collect(),
        rows,
    };

    Ok((table, report))
}

fn coerce_measures(
    raw: &RawTable,
    index: usize,
    column: &str,
    report: &mut CleanReport,
) -> Result<Vec<Option<f64>>> {
    raw.rows
        .iter()
        .enumerate()
        .map(|(i, record)| {
            let value = record.get(index).unwrap_or_default();
            if value == SENTINEL {
                report.sentinels_replaced += 1;
                return Ok(None);
            }
            parse_measure(value).map_err(|reason| PipelineError::TypeConversion {
                column: column.to_string(),
                row: i + 1,
                value: value.to_string(),
                reason,
            })
        })
        .collect()
}

fn coerce_timestamps(
    raw: &RawTable,
    index: usize,
    column: &str,
) -> Result<Vec<Option<(NaiveDateTime, Option<FixedOffset>)>>> {
    raw.rows
        .iter()
        .enumerate()
        .map(|(i, record)| {
            let value = record.get(index).unwrap_or_default();
            if value.trim().is_empty() {
                return Ok(None);
            }
            parse_timestamp_with_offset(value)
                .map(Some)
                .ok_or_else(|| PipelineError::TypeConversion {
                    column: column.to_string(),
                    row: i + 1,
                    value: value.to_string(),
                    reason: "unrecognized date/time format".to_string(),
                })
        })
        .collect()
}

/// Parses a numeric cell. Empty and `NaN` cells are missing.
pub fn parse_measure(value: &str) -> std::result::Result<Option<f64>, String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    match trimmed.parse::<f64>() {
        Ok(v) if v.is_nan() => Ok(None),
        Ok(v) if v.is_infinite() => Err("value is not finite".to_string()),
        Ok(v) => Ok(Some(v)),
        Err(err) => Err(err.to_string()),
    }
}

/// Parses a point-in-time cell into local wall-clock time.
///
/// Offsets are honoured only to the extent of keeping the wall-clock time
/// they were written in; date-only values map to midnight.
pub fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    parse_timestamp_with_offset(value).map(|(t, _)| t)
}

/// Like [`parse_timestamp`], also returning the UTC offset when one was written.
pub fn parse_timestamp_with_offset(value: &str) -> Option<(NaiveDateTime, Option<FixedOffset>)> {
    let trimmed = value.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some((dt.naive_local(), Some(*dt.offset())));
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, fmt) {
            return Some((dt, None));
        }
    }
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(trimmed, fmt).ok())
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|t| (t, None))
}
