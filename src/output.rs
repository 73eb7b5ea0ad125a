//! Console rendering and persistence for the hourly aggregate table.
//!
//! Supports a banner-framed text table, JSON logging, and a CSV writer that
//! never overwrites an earlier result.

use chrono::{Local, NaiveDateTime};
use csv::WriterBuilder;
use std::fs::{self, File, OpenOptions};
use std::io::{self, ErrorKind, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::analyzers::types::{HEADERS, HourlyTable};
use crate::clean::CleanReport;
use crate::error::{PipelineError, Result};

pub const RESULT_FILE: &str = "result.csv";
const BANNER_WIDTH: usize = 80;

/// Logs the table framed by `=` banners so operators can eyeball the result.
pub fn print_table(table: &HourlyTable) {
    info!("\n{}", render_table(table));
}

/// Logs the table as pretty-printed JSON.
pub fn print_json(table: &HourlyTable) -> serde_json::Result<()> {
    debug!("{}", serde_json::to_string_pretty(&table.rows)?);
    Ok(())
}

/// Logs the cleaning counters as JSON.
pub fn print_report(report: &CleanReport) -> serde_json::Result<()> {
    debug!(report = %serde_json::to_string(report)?, "Clean report");
    Ok(())
}

/// Renders the table as right-aligned text columns between two banners.
pub fn render_table(table: &HourlyTable) -> String {
    let cells: Vec<[String; 5]> = table
        .rows
        .iter()
        .map(|r| {
            [
                r.hour.to_string(),
                format_float(r.sum_grid_purchase),
                format_float(r.sum_grid_feedin),
                r.grid_feedin_rank.to_string(),
                r.is_max.to_string(),
            ]
        })
        .collect();

    let mut widths = HEADERS.map(str::len);
    for row in &cells {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.len());
        }
    }

    let line = |fields: &[&str]| -> String {
        fields
            .iter()
            .zip(widths)
            .map(|(field, width)| format!("{field:>width$}"))
            .collect::<Vec<_>>()
            .join("  ")
    };

    let banner = "=".repeat(BANNER_WIDTH);
    let mut out = format!("{banner}\ntransformed table is:\n\n{}\n", line(&HEADERS));
    if cells.is_empty() {
        out.push_str("(no rows)\n");
    }
    for row in &cells {
        let fields: Vec<&str> = row.iter().map(String::as_str).collect();
        out.push_str(&line(&fields));
        out.push('\n');
    }
    out.push_str(&banner);
    out
}

/// Shortest round-trip form, keeping a `.0` on integral values.
pub fn format_float(value: f64) -> String {
    format!("{value:?}")
}

/// Writes the table as CSV: a header row then one row per hour, no index column.
pub fn write_csv<W: Write>(table: &HourlyTable, writer: W) -> csv::Result<()> {
    let mut wtr = WriterBuilder::new().has_headers(false).from_writer(writer);

    wtr.write_record(HEADERS)?;
    for row in &table.rows {
        wtr.serialize(row)?;
    }
    wtr.flush()?;

    Ok(())
}

/// Saves the table under `dir`, returning the path actually written.
///
/// See [`save_result_at`].
pub fn save_result(table: &HourlyTable, dir: &Path) -> Result<PathBuf> {
    save_result_at(table, dir, Local::now().naive_local())
}

/// Saves the table to `dir/result.csv`, or to `dir/result-YYYYMMDD-HHMMSS.csv`
/// (stamped with `now`) when the canonical file already exists.
///
/// Both files are created exclusively; an existing file is never overwritten.
#[tracing::instrument(skip_all, fields(dir = %dir.display(), rows = table.len()))]
pub fn save_result_at(table: &HourlyTable, dir: &Path, now: NaiveDateTime) -> Result<PathBuf> {
    let canonical = dir.join(RESULT_FILE);

    let (path, file) = match create_exclusive(&canonical) {
        Ok(file) => (canonical, file),
        Err(e) if e.kind() == ErrorKind::AlreadyExists => {
            let fallback = dir.join(fallback_file_name(now));
            warn!(
                existing = %canonical.display(),
                fallback = %fallback.display(),
                "Result file already exists, writing timestamped copy"
            );
            let file = create_exclusive(&fallback).map_err(|source| PipelineError::Io {
                path: fallback.clone(),
                source,
            })?;
            (fallback, file)
        }
        Err(source) => {
            return Err(PipelineError::Io {
                path: canonical,
                source,
            });
        }
    };

    discard_on_error(&path, write_csv(table, file))?;

    info!("Transformed data is now saved at {}", path.display());
    Ok(path)
}

/// `result-YYYYMMDD-HHMMSS.csv` for the given wall-clock time.
pub fn fallback_file_name(now: NaiveDateTime) -> String {
    format!("result-{}.csv", now.format("%Y%m%d-%H%M%S"))
}

/// Removes a half-written file so later runs can still claim its name.
fn discard_on_error(path: &Path, written: csv::Result<()>) -> Result<()> {
    let Err(err) = written else {
        return Ok(());
    };
    if let Err(e) = fs::remove_file(path) {
        warn!(path = %path.display(), error = %e, "Could not remove partial result file");
    }
    Err(PipelineError::Io {
        path: path.to_path_buf(),
        source: err.into(),
    })
}

fn create_exclusive(path: &Path) -> io::Result<File> {
    OpenOptions::new().write(true).create_new(true).open(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzers::types::HourlyAggregate;
    use chrono::NaiveDate;
    use tempfile::tempdir;

    fn sample() -> HourlyTable {
        HourlyTable {
            rows: vec![
                HourlyAggregate {
                    hour: 5,
                    sum_grid_purchase: 15.0,
                    sum_grid_feedin: 2.0,
                    grid_feedin_rank: 2,
                    is_max: false,
                },
                HourlyAggregate {
                    hour: 9,
                    sum_grid_purchase: 1.0,
                    sum_grid_feedin: 100.5,
                    grid_feedin_rank: 1,
                    is_max: true,
                },
            ],
        }
    }

    fn noon() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 7)
            .unwrap()
            .and_hms_opt(12, 4, 9)
            .unwrap()
    }

    #[test]
    fn test_write_csv_layout() {
        let mut buf = Vec::new();
        write_csv(&sample(), &mut buf).unwrap();

        let text = String::from_utf8(buf).unwrap();
        assert_eq!(
            text,
            "hour,sum_grid_purchase,sum_grid_feedin,grid_feedin_rank,is_max\n\
             5,15.0,2.0,2,false\n\
             9,1.0,100.5,1,true\n"
        );
    }

    #[test]
    fn test_write_csv_empty_table_keeps_header() {
        let mut buf = Vec::new();
        write_csv(&HourlyTable::default(), &mut buf).unwrap();
        assert_eq!(
            String::from_utf8(buf).unwrap(),
            "hour,sum_grid_purchase,sum_grid_feedin,grid_feedin_rank,is_max\n"
        );
    }

    #[test]
    fn test_save_result_canonical_path() {
        let dir = tempdir().unwrap();
        let path = save_result_at(&sample(), dir.path(), noon()).unwrap();

        assert_eq!(path, dir.path().join(RESULT_FILE));
        assert!(fs::read_to_string(&path).unwrap().starts_with("hour,"));
    }

    #[test]
    fn test_save_result_falls_back_without_overwriting() {
        let dir = tempdir().unwrap();
        let canonical = dir.path().join(RESULT_FILE);
        fs::write(&canonical, "previous run\n").unwrap();

        let path = save_result_at(&sample(), dir.path(), noon()).unwrap();

        assert_eq!(path, dir.path().join("result-20240307-120409.csv"));
        assert_eq!(fs::read_to_string(&canonical).unwrap(), "previous run\n");
        assert!(fs::read_to_string(&path).unwrap().contains("9,1.0,100.5,1,true"));
    }

    #[test]
    fn test_save_result_missing_directory_is_io_error() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("does").join("not").join("exist");

        let err = save_result_at(&sample(), &missing, noon()).unwrap_err();
        assert!(matches!(err, PipelineError::Io { .. }));
    }

    #[test]
    fn test_failed_write_removes_partial_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(RESULT_FILE);
        fs::write(&path, "hour,sum_gr").unwrap();

        let failed = Err(csv::Error::from(io::Error::other("disk full")));
        let err = discard_on_error(&path, failed).unwrap_err();

        assert!(matches!(err, PipelineError::Io { path: ref p, .. } if p.ends_with(RESULT_FILE)));
        assert!(!path.exists());

        // the canonical name is free again for the next run
        let saved = save_result_at(&sample(), dir.path(), noon()).unwrap();
        assert_eq!(saved, path);
    }

    #[test]
    fn test_successful_write_keeps_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(RESULT_FILE);
        fs::write(&path, "hour\n").unwrap();

        discard_on_error(&path, Ok(())).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_print_report_does_not_panic() {
        print_report(&CleanReport::default()).unwrap();
    }

    #[test]
    fn test_fallback_file_name_format() {
        assert_eq!(fallback_file_name(noon()), "result-20240307-120409.csv");
    }

    #[test]
    fn test_render_table_has_banners_and_rows() {
        let text = render_table(&sample());
        let lines: Vec<_> = text.lines().collect();

        assert_eq!(lines.first().unwrap(), &"=".repeat(80));
        assert_eq!(lines.last().unwrap(), &"=".repeat(80));
        assert!(text.contains("sum_grid_feedin"));
        assert!(lines.iter().any(|l| l.trim_start().starts_with("9") && l.ends_with("true")));
    }

    #[test]
    fn test_render_table_aligns_columns() {
        let text = render_table(&sample());
        let body: Vec<_> = text
            .lines()
            .filter(|l| l.contains("sum_grid") || l.ends_with("true") || l.ends_with("false"))
            .collect();
        let width = body[0].len();
        assert!(body.iter().all(|l| l.len() == width));
    }

    #[test]
    fn test_format_float() {
        assert_eq!(format_float(15.0), "15.0");
        assert_eq!(format_float(0.25), "0.25");
    }

    #[test]
    fn test_print_json_does_not_panic() {
        print_json(&sample()).unwrap();
    }
}
