/// Sums the present values, skipping missing ones. Returns 0.0 when nothing is present.
pub fn sum_present(values: &[Option<f64>]) -> f64 {
    values.iter().flatten().fold(0.0, |acc, v| acc + v)
}

/// Counts the present values.
pub fn count_present(values: &[Option<f64>]) -> usize {
    values.iter().filter(|v| v.is_some()).count()
}
