//! Default values for every configuration section.

use crate::schema::*;
use callmetrics_common::DEFAULT_SENTIMENT;

/// Default number of days looked back when no start date is supplied.
pub const DEFAULT_LOOKBACK_DAYS: u32 = 7;

/// Default largest span bucketed per day.
pub const DEFAULT_DAILY_MAX_SPAN_DAYS: u32 = 30;

/// Default largest span bucketed per week.
pub const DEFAULT_WEEKLY_MAX_SPAN_DAYS: u32 = 90;

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            timezone: "UTC".to_string(),
            default_lookback_days: DEFAULT_LOOKBACK_DAYS,
            daily_max_span_days: DEFAULT_DAILY_MAX_SPAN_DAYS,
            weekly_max_span_days: DEFAULT_WEEKLY_MAX_SPAN_DAYS,
            default_sentiment: DEFAULT_SENTIMENT,
            month_comparison: MonthComparison::default(),
            average_duration_unit: DurationUnit::default(),
        }
    }
}

impl Default for MonthComparison {
    fn default() -> Self {
        Self::YearAware
    }
}

impl Default for DurationUnit {
    fn default() -> Self {
        Self::Seconds
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json_format: false,
            file_path: None,
        }
    }
}
