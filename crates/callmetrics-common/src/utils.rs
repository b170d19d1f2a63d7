//! Utility functions used across the call metrics workspace

use crate::{CallMetricsError, Result};
use chrono::NaiveDate;

/// Format a calendar day as an ISO-8601 date (`YYYY-MM-DD`)
pub fn format_iso_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Round to the nearest integer with halves rounded towards positive
/// infinity, so `2.5 -> 3` and `-2.5 -> -2`.
///
/// `f64::round` rounds halves away from zero, which disagrees for negative
/// percentage changes.
#[allow(clippy::cast_possible_truncation)]
pub fn round_half_up(value: f64) -> i64 {
    (value + 0.5).floor() as i64
}

/// Integer mean rounded half-up, 0 for an empty population.
#[allow(clippy::cast_precision_loss, clippy::cast_sign_loss)]
pub fn rounded_mean(total: u64, count: u64) -> u64 {
    if count == 0 {
        return 0;
    }
    round_half_up(total as f64 / count as f64).max(0) as u64
}

/// Validate that a string is not empty after trimming
pub fn validate_non_empty(value: &str, field_name: &str) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(CallMetricsError::validation_field(
            format!("{field_name} cannot be empty"),
            field_name,
        ))
    } else {
        Ok(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_round_half_up() {
        assert_eq!(round_half_up(2.5), 3);
        assert_eq!(round_half_up(2.4999), 2);
        assert_eq!(round_half_up(-2.5), -2);
        assert_eq!(round_half_up(-2.51), -3);
        assert_eq!(round_half_up(33.333), 33);
        assert_eq!(round_half_up(0.0), 0);
    }

    #[test]
    fn test_rounded_mean() {
        assert_eq!(rounded_mean(360, 3), 120);
        assert_eq!(rounded_mean(5, 2), 3);
        assert_eq!(rounded_mean(100, 0), 0);
    }

    #[test]
    fn test_format_iso_date() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 7).unwrap();
        assert_eq!(format_iso_date(date), "2024-03-07");
    }

    #[test]
    fn test_validate_non_empty() {
        assert_eq!(validate_non_empty("  owner-1 ", "owner").unwrap(), "owner-1");
        assert!(validate_non_empty("", "owner").is_err());
        assert!(validate_non_empty("   ", "owner").is_err());
    }

    proptest! {
        #[test]
        fn prop_round_half_up_is_nearest(value in -1.0e9f64..1.0e9) {
            let rounded = round_half_up(value);
            #[allow(clippy::cast_precision_loss)]
            let distance = value - rounded as f64;
            prop_assert!(distance > -0.5 - 1e-6 && distance <= 0.5 + 1e-6);
        }

        #[test]
        fn prop_rounded_mean_brackets_exact_mean(total in 0u64..1_000_000_000, count in 1u64..10_000) {
            let mean = rounded_mean(total, count);
            prop_assert!(mean >= total / count);
            prop_assert!(mean <= total.div_ceil(count));
        }
    }
}
