#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

/// Final score: the judge's score minus the style deductions.
///
/// Nothing is clamped. A sentinel judge score stays far out of range so the
/// row is easy to spot and filter.
pub fn aggregate(model_score: f64, deduction_total: f64) -> f64 {
    model_score - deduction_total
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::SENTINEL_SCORE;

    #[test]
    fn subtracts_deductions() {
        assert_eq!(aggregate(90.0, 7.0), 83.0);
        assert_eq!(aggregate(90.0, 0.0), 90.0);
    }

    #[test]
    fn sentinel_stays_out_of_range() {
        assert!(aggregate(SENTINEL_SCORE, 7.0) <= -93.0);
        assert_eq!(aggregate(SENTINEL_SCORE, 0.0), SENTINEL_SCORE);
    }

    #[test]
    fn no_floor_is_applied() {
        assert_eq!(aggregate(3.0, 5.0), -2.0);
    }
}
