//! Runtime validation of loaded configuration.

use crate::schema::Config;
use callmetrics_common::{CallMetricsError, Result};

/// Configuration validator.
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validates a configuration, returning the first problem found.
    pub fn validate(config: &Config) -> Result<()> {
        match Self::issues(config).into_iter().next() {
            Some(issue) => Err(issue),
            None => Ok(()),
        }
    }

    /// Collects every validation problem in the configuration.
    pub fn issues(config: &Config) -> Vec<CallMetricsError> {
        let mut issues = Vec::new();
        let analytics = &config.analytics;

        if let Err(e) = analytics.tz() {
            issues.push(e);
        }

        if !analytics.default_sentiment.is_normalized() {
            issues.push(CallMetricsError::validation_field(
                format!(
                    "default sentiment must sum to 100, got {}",
                    analytics.default_sentiment.total()
                ),
                "analytics.default_sentiment",
            ));
        }

        if analytics.daily_max_span_days >= analytics.weekly_max_span_days {
            issues.push(CallMetricsError::validation_field(
                format!(
                    "daily_max_span_days ({}) must be below weekly_max_span_days ({})",
                    analytics.daily_max_span_days, analytics.weekly_max_span_days
                ),
                "analytics.daily_max_span_days",
            ));
        }

        if config.logging.level.trim().is_empty() {
            issues.push(CallMetricsError::validation_field(
                "log level cannot be empty",
                "logging.level",
            ));
        }

        issues
    }
}
