//! Hourly aggregation and ranking.
//!
//! This module buckets cleaned measurements by hour of day, sums purchase
//! and feed-in energy per bucket, and ranks the buckets by feed-in so the
//! peak hour can be flagged.

pub mod aggregate;
pub mod rank;
pub mod types;
pub mod utility;
