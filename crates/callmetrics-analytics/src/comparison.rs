//! Month-over-month call volume comparison.

use crate::range::local_day;
use crate::record::CallRecord;
use callmetrics_common::{round_half_up, Result, Timestamp};
use callmetrics_config::{AnalyticsConfig, MonthComparison};
use chrono::Datelike;
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

/// Direction of change between the two months.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GrowthDirection {
    /// More calls than the previous month
    Positive,
    /// Fewer calls than the previous month
    Negative,
    /// Same number of calls
    Neutral,
}

/// Call counts of the current and previous calendar month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodComparison {
    /// Calls in the month containing "now"
    pub current_month_calls: u64,
    /// Calls in the month before
    pub previous_month_calls: u64,
    /// Percentage change rounded half-up; 100 when the previous month is empty
    pub change_percentage: i64,
}

impl PeriodComparison {
    /// Builds the comparison from the two counts.
    #[allow(clippy::cast_precision_loss)]
    pub fn from_counts(current_month_calls: u64, previous_month_calls: u64) -> Self {
        let change_percentage = if previous_month_calls > 0 {
            let delta = current_month_calls as f64 - previous_month_calls as f64;
            round_half_up(delta / previous_month_calls as f64 * 100.0)
        } else {
            100
        };

        Self {
            current_month_calls,
            previous_month_calls,
            change_percentage,
        }
    }

    /// Direction of the change in call counts.
    pub const fn direction(&self) -> GrowthDirection {
        if self.current_month_calls > self.previous_month_calls {
            GrowthDirection::Positive
        } else if self.current_month_calls < self.previous_month_calls {
            GrowthDirection::Negative
        } else {
            GrowthDirection::Neutral
        }
    }
}

/// Counts calls per calendar month in the reporting time zone.
#[derive(Debug, Clone, Copy)]
pub struct PeriodComparator {
    tz: Tz,
    mode: MonthComparison,
}

impl PeriodComparator {
    /// Creates a comparator.
    pub const fn new(tz: Tz, mode: MonthComparison) -> Self {
        Self { tz, mode }
    }

    /// Creates a comparator from the analytics configuration.
    pub fn from_config(config: &AnalyticsConfig) -> Result<Self> {
        Ok(Self::new(config.tz()?, config.month_comparison))
    }

    /// Compares the month containing `now` with the month before it, over the
    /// owner's full record set.
    #[instrument(skip(self, records), fields(mode = ?self.mode))]
    pub fn compare<'a, I>(&self, records: I, now: Timestamp) -> PeriodComparison
    where
        I: IntoIterator<Item = &'a CallRecord>,
    {
        let today = local_day(now, self.tz);
        let current = (today.year(), today.month());
        let previous = if current.1 == 1 {
            (current.0 - 1, 12)
        } else {
            (current.0, current.1 - 1)
        };

        let mut current_month_calls = 0u64;
        let mut previous_month_calls = 0u64;

        for record in records {
            let day = local_day(record.created_at, self.tz);
            let month = (day.year(), day.month());
            if self.matches(month, current) {
                current_month_calls += 1;
            } else if self.matches(month, previous) {
                previous_month_calls += 1;
            }
        }

        let comparison = PeriodComparison::from_counts(current_month_calls, previous_month_calls);
        debug!(
            current_month_calls,
            previous_month_calls,
            change = comparison.change_percentage,
            "Compared monthly call volume"
        );
        comparison
    }

    fn matches(&self, month: (i32, u32), target: (i32, u32)) -> bool {
        match self.mode {
            MonthComparison::YearAware => month == target,
            MonthComparison::MonthIndex => month.1 == target.1,
        }
    }
}
