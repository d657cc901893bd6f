/// Arithmetic mean of review scores; `None` when a title has no reviews.
///
/// Mirrors `AVG(score)` in the title queries, so both stores agree on the
/// rating they serve.
pub fn average(scores: &[i32]) -> Option<f64> {
    if scores.is_empty() {
        return None;
    }
    let total: i64 = scores.iter().map(|&s| i64::from(s)).sum();
    Some(total as f64 / scores.len() as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn averages_scores() {
        assert_eq!(average(&[8, 10, 6]), Some(8.0));
        assert_eq!(average(&[7, 8]), Some(7.5));
        assert_eq!(average(&[1]), Some(1.0));
    }

    #[test]
    fn no_reviews_no_rating() {
        assert_eq!(average(&[]), None);
    }
}
