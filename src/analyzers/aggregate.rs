use chrono::Timelike;
use std::collections::BTreeMap;
use tracing::{debug, info};

use crate::analyzers::rank::competition_rank_desc;
use crate::analyzers::types::{HourlyAggregate, HourlyTable};
use crate::analyzers::utility::{count_present, sum_present};
use crate::clean::MeasurementTable;
use crate::output::print_table;

/// Purchase and feed-in readings collected for one hour bucket.
#[derive(Default)]
struct HourSeries {
    grid_purchase: Vec<Option<f64>>,
    grid_feedin: Vec<Option<f64>>,
}

/// Aggregates cleaned measurements into one [`HourlyAggregate`] per hour of day.
///
/// Rows without a timestamp belong to no hour and are left out. Missing
/// readings are skipped in the sums, so an hour with no readings at all sums
/// to 0.0. Rows come out ascending by hour, ranked by `sum_grid_feedin`.
#[tracing::instrument(skip_all, fields(rows = table.rows.len()))]
pub fn aggregate_hourly(table: &MeasurementTable) -> HourlyTable {
    let mut series: BTreeMap<u32, HourSeries> = BTreeMap::new();
    let mut unbucketed = 0usize;

    for row in &table.rows {
        let Some(timestamp) = row.timestamp else {
            unbucketed += 1;
            continue;
        };

        let bucket = series.entry(timestamp.hour()).or_default();
        bucket.grid_purchase.push(row.grid_purchase);
        bucket.grid_feedin.push(row.grid_feedin);
    }

    if unbucketed > 0 {
        info!(unbucketed, "Rows without timestamp left out of hourly groups");
    }

    let mut rows: Vec<HourlyAggregate> = series
        .into_iter()
        .map(|(hour, s)| {
            debug!(
                hour,
                rows = s.grid_feedin.len(),
                purchase_readings = count_present(&s.grid_purchase),
                feedin_readings = count_present(&s.grid_feedin),
                "Hour bucket"
            );
            HourlyAggregate {
                hour,
                sum_grid_purchase: sum_present(&s.grid_purchase),
                sum_grid_feedin: sum_present(&s.grid_feedin),
                grid_feedin_rank: 0,
                is_max: false,
            }
        })
        .collect();

    let feedin: Vec<f64> = rows.iter().map(|r| r.sum_grid_feedin).collect();
    for (row, rank) in rows.iter_mut().zip(competition_rank_desc(&feedin)) {
        row.grid_feedin_rank = rank;
        row.is_max = rank == 1;
    }

    let hourly = HourlyTable { rows };
    print_table(&hourly);
    hourly
}
