//! Gap-filled trend buckets over a resolved range.
//!
//! Granularity follows the range span: daily up to
//! [`DEFAULT_DAILY_MAX_SPAN_DAYS`], weekly up to
//! [`DEFAULT_WEEKLY_MAX_SPAN_DAYS`], monthly beyond that. Every bucket in the
//! range is emitted, including ones without calls.

use crate::range::{end_of_day, start_of_day, DateRange};
use crate::record::{CallRecord, SentimentSum};
use crate::sentiment::normalize;
use callmetrics_common::{format_iso_date, rounded_mean, Result, SentimentTriple, DEFAULT_SENTIMENT};
use callmetrics_config::{AnalyticsConfig, DEFAULT_DAILY_MAX_SPAN_DAYS, DEFAULT_WEEKLY_MAX_SPAN_DAYS};
use chrono::{Datelike, Days, Months, NaiveDate};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, instrument};

/// Bucket width.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Granularity {
    /// One bucket per calendar day
    Daily,
    /// Seven-day buckets anchored at the range start
    Weekly,
    /// Calendar-month buckets
    Monthly,
}

impl Granularity {
    /// Picks the granularity for a span of `span_days` (end day minus start day).
    pub fn for_span(span_days: i64, daily_max: u32, weekly_max: u32) -> Self {
        if span_days <= i64::from(daily_max) {
            Self::Daily
        } else if span_days <= i64::from(weekly_max) {
            Self::Weekly
        } else {
            Self::Monthly
        }
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
        };
        f.write_str(name)
    }
}

/// Where a bucket's sentiment came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SentimentSource {
    /// Normalized from the bucket's own calls
    Measured,
    /// Copied from the previous bucket
    CarriedForward,
    /// The configured default, used when no earlier bucket exists
    Default,
}

/// One time bucket of the trend series.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrendBucket {
    /// `YYYY-MM-DD`, `"{start} to {end}"` or `YYYY-MM`
    pub label: String,
    /// First calendar day
    pub start_day: NaiveDate,
    /// Last calendar day
    pub end_day: NaiveDate,
    /// Normalized sentiment
    pub sentiment: SentimentTriple,
    /// Provenance of `sentiment`
    pub sentiment_source: SentimentSource,
    /// Calls created inside the bucket
    pub call_count: u64,
    /// Sum of their durations
    pub total_duration_seconds: u64,
}

impl TrendBucket {
    /// Average call duration in whole minutes rounded half-up, 0 when empty.
    pub fn average_duration_minutes(&self) -> u64 {
        rounded_mean(
            self.total_duration_seconds,
            self.call_count.saturating_mul(60),
        )
    }
}

/// Splits a range into buckets and fills them from a sorted record slice.
#[derive(Debug, Clone, Copy)]
pub struct TrendBucketer {
    tz: Tz,
    daily_max_span_days: u32,
    weekly_max_span_days: u32,
    default_sentiment: SentimentTriple,
}

impl TrendBucketer {
    /// Creates a bucketer with the default thresholds and default sentiment.
    pub const fn new(tz: Tz) -> Self {
        Self {
            tz,
            daily_max_span_days: DEFAULT_DAILY_MAX_SPAN_DAYS,
            weekly_max_span_days: DEFAULT_WEEKLY_MAX_SPAN_DAYS,
            default_sentiment: DEFAULT_SENTIMENT,
        }
    }

    /// Creates a bucketer from the analytics configuration.
    pub fn from_config(config: &AnalyticsConfig) -> Result<Self> {
        Ok(Self::new(config.tz()?)
            .with_thresholds(config.daily_max_span_days, config.weekly_max_span_days)
            .with_default_sentiment(config.default_sentiment))
    }

    /// Overrides the daily and weekly span thresholds.
    #[must_use]
    pub const fn with_thresholds(mut self, daily_max: u32, weekly_max: u32) -> Self {
        self.daily_max_span_days = daily_max;
        self.weekly_max_span_days = weekly_max;
        self
    }

    /// Overrides the sentiment used for a leading bucket without data.
    #[must_use]
    pub const fn with_default_sentiment(mut self, sentiment: SentimentTriple) -> Self {
        self.default_sentiment = sentiment;
        self
    }

    /// Granularity used for `range`.
    pub fn granularity(&self, range: &DateRange) -> Granularity {
        Granularity::for_span(
            range.span_days(),
            self.daily_max_span_days,
            self.weekly_max_span_days,
        )
    }

    /// Buckets `records`, which must be sorted by `created_at`.
    #[instrument(skip(self, records), fields(records = records.len()))]
    pub fn bucket(&self, range: &DateRange, records: &[&CallRecord]) -> Vec<TrendBucket> {
        debug_assert!(records.windows(2).all(|w| w[0].created_at <= w[1].created_at));

        let granularity = self.granularity(range);
        let mut buckets = Vec::new();
        let mut previous: Option<SentimentTriple> = None;

        for (start_day, end_day) in bucket_days(range, granularity) {
            let lower = start_of_day(start_day, self.tz);
            let upper = end_of_day(end_day, self.tz);
            let first = records.partition_point(|r| r.created_at < lower);
            let last = records.partition_point(|r| r.created_at <= upper);
            let members = &records[first..last.max(first)];

            let mut total_duration_seconds = 0u64;
            let mut raw = SentimentSum::new();
            for record in members {
                total_duration_seconds = total_duration_seconds.saturating_add(record.duration_seconds);
                raw.push(record.sentiment_or_zero());
            }

            let (sentiment, sentiment_source) = match (normalize(raw.total()), previous) {
                (Some(measured), _) => (measured, SentimentSource::Measured),
                (None, Some(carried)) => (carried, SentimentSource::CarriedForward),
                (None, None) => (self.default_sentiment, SentimentSource::Default),
            };
            previous = Some(sentiment);

            buckets.push(TrendBucket {
                label: label(granularity, start_day, end_day),
                start_day,
                end_day,
                sentiment,
                sentiment_source,
                call_count: members.len() as u64,
                total_duration_seconds,
            });
        }

        debug!(%granularity, buckets = buckets.len(), "Built trend buckets");
        buckets
    }
}

/// Sorts borrowed records chronologically, the order [`TrendBucketer::bucket`]
/// expects.
pub fn sort_by_created_at(records: &mut [&CallRecord]) {
    records.sort_by_key(|r| r.created_at);
}

fn bucket_days(range: &DateRange, granularity: Granularity) -> Vec<(NaiveDate, NaiveDate)> {
    let mut days = Vec::new();
    let mut cursor = range.start_day;

    while cursor <= range.end_day {
        let natural_end = match granularity {
            Granularity::Daily => Some(cursor),
            Granularity::Weekly => cursor.checked_add_days(Days::new(6)),
            Granularity::Monthly => cursor
                .with_day(1)
                .and_then(|first| first.checked_add_months(Months::new(1)))
                .and_then(|next| next.pred_opt()),
        };
        let end = natural_end.map_or(range.end_day, |end| end.min(range.end_day));
        days.push((cursor, end));

        match end.succ_opt() {
            Some(next) => cursor = next,
            None => break,
        }
    }

    days
}

fn label(granularity: Granularity, start_day: NaiveDate, end_day: NaiveDate) -> String {
    match granularity {
        Granularity::Daily => format_iso_date(start_day),
        Granularity::Weekly => format!(
            "{} to {}",
            format_iso_date(start_day),
            format_iso_date(end_day)
        ),
        Granularity::Monthly => start_day.format("%Y-%m").to_string(),
    }
}
