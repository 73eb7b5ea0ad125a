/// Ranks `values` in descending order using competition ranking.
///
/// The largest value gets rank 1. Tied values share the best rank of the
/// tie, and the next distinct value skips ahead by the size of the tie:
///
/// | value | rank |
/// |-------|------|
/// | 9.0   | 1    |
/// | 7.0   | 2    |
/// | 7.0   | 2    |
/// | 3.0   | 4    |
///
/// The returned ranks line up with the input positions.
pub fn competition_rank_desc(values: &[f64]) -> Vec<u32> {
    let mut order: Vec<usize> = (0..values.len()).collect();
    order.sort_by(|&a, &b| values[b].total_cmp(&values[a]));

    let mut ranks = vec![0; values.len()];
    let mut current = 0;

    for (position, &index) in order.iter().enumerate() {
        let tied = position > 0 && values[order[position - 1]] == values[index];
        if !tied {
            current = position as u32 + 1;
        }
        ranks[index] = current;
    }

    ranks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distinct_values() {
        assert_eq!(competition_rank_desc(&[2.0, 100.0, 50.0]), vec![3, 1, 2]);
    }

    #[test]
    fn test_ties_share_lowest_rank() {
        assert_eq!(
            competition_rank_desc(&[7.0, 9.0, 3.0, 7.0]),
            vec![2, 1, 4, 2]
        );
    }

    #[test]
    fn test_tie_at_top() {
        assert_eq!(competition_rank_desc(&[5.0, 5.0, 1.0]), vec![1, 1, 3]);
    }

    #[test]
    fn test_zero_and_negative_zero_tie() {
        assert_eq!(competition_rank_desc(&[0.0, -0.0]), vec![1, 1]);
    }

    #[test]
    fn test_empty() {
        assert!(competition_rank_desc(&[]).is_empty());
    }
}
