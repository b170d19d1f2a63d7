//! Configuration schema definitions using serde.

use callmetrics_common::{CallMetricsError, LoggingConfig, Result, SentimentTriple};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;

/// Main configuration structure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Aggregation engine configuration.
    pub analytics: AnalyticsConfig,
    /// Logging configuration.
    pub logging: LoggingSettings,
    /// Record source configuration.
    pub storage: StorageConfig,
}

/// Aggregation engine configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyticsConfig {
    /// IANA time zone whose calendar days define ranges and buckets.
    pub timezone: String,
    /// Days before today used when a range has no start date.
    pub default_lookback_days: u32,
    /// Largest range span (end day minus start day) bucketed daily.
    pub daily_max_span_days: u32,
    /// Largest range span bucketed weekly; anything longer is monthly.
    pub weekly_max_span_days: u32,
    /// Breakdown reported when no sentiment data is available.
    pub default_sentiment: SentimentTriple,
    /// How the month-over-month comparison matches months.
    pub month_comparison: MonthComparison,
    /// Unit of the top-level average call duration on the wire.
    pub average_duration_unit: DurationUnit,
}

/// Month matching used by the month-over-month comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MonthComparison {
    /// Compare full year-month pairs.
    YearAware,
    /// Compare the month index only, ignoring the year.
    MonthIndex,
}

impl FromStr for MonthComparison {
    type Err = CallMetricsError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "year_aware" | "year-aware" => Ok(Self::YearAware),
            "month_index" | "month-index" => Ok(Self::MonthIndex),
            other => Err(CallMetricsError::validation_field(
                format!("unknown month comparison mode '{other}'"),
                "analytics.month_comparison",
            )),
        }
    }
}

/// Unit used to express an average duration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DurationUnit {
    /// Whole seconds.
    Seconds,
    /// Whole minutes, rounded half-up.
    Minutes,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Level filter directive.
    pub level: String,
    /// Emit JSON lines instead of human readable text.
    pub json_format: bool,
    /// Optional log file, appended to.
    pub file_path: Option<String>,
}

/// Record source configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// JSON file holding an array of call records.
    pub records_path: Option<PathBuf>,
}

impl AnalyticsConfig {
    /// Parses the configured time zone.
    pub fn tz(&self) -> Result<Tz> {
        self.timezone.parse::<Tz>().map_err(|_| {
            CallMetricsError::validation_field(
                format!("unknown time zone '{}'", self.timezone),
                "analytics.timezone",
            )
        })
    }
}

impl LoggingSettings {
    /// Converts into the subscriber configuration understood by
    /// `callmetrics_common::init_logging`.
    pub fn to_logging_config(&self) -> LoggingConfig {
        LoggingConfig {
            level: self.level.clone(),
            json_format: self.json_format,
            file_path: self.file_path.clone(),
            ..LoggingConfig::default()
        }
    }
}

impl Config {
    /// Validates the configuration, returning the first problem found.
    pub fn validate(&self) -> Result<()> {
        crate::validator::ConfigValidator::validate(self)
    }
}
