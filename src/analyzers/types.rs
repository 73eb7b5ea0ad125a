//! Data types produced by the aggregation stage.

use serde::Serialize;

/// Output column order of the result file.
pub const HEADERS: [&str; 5] = [
    "hour",
    "sum_grid_purchase",
    "sum_grid_feedin",
    "grid_feedin_rank",
    "is_max",
];

/// Energy totals for one hour of the day.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HourlyAggregate {
    pub hour: u32,
    pub sum_grid_purchase: f64,
    pub sum_grid_feedin: f64,
    /// Competition rank of `sum_grid_feedin`, 1 = largest.
    pub grid_feedin_rank: u32,
    pub is_max: bool,
}

/// All hourly rows, ascending by hour.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HourlyTable {
    pub rows: Vec<HourlyAggregate>,
}

impl HourlyTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rows flagged as the feed-in maximum.
    pub fn peaks(&self) -> impl Iterator<Item = &HourlyAggregate> {
        self.rows.iter().filter(|r| r.is_max)
    }

    pub fn get(&self, hour: u32) -> Option<&HourlyAggregate> {
        self.rows.iter().find(|r| r.hour == hour)
    }
}
