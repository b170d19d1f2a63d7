//! Whole-range totals, averages, overall sentiment breakdown and NPS.

use crate::record::{CallRecord, SentimentSum};
use crate::sentiment::{normalize_or, nps_score};
use callmetrics_common::{rounded_mean, SentimentTriple, DEFAULT_SENTIMENT};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

/// Scalar metrics over the records of one owner inside one range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScalarMetrics {
    /// Number of calls
    pub total_calls: u64,
    /// Sum of call durations
    pub total_duration_seconds: u64,
    /// Mean call duration rounded half-up, 0 without calls
    pub average_call_duration_seconds: u64,
    /// Sum of hold durations
    pub total_hold_duration_seconds: u64,
    /// Normalized overall sentiment
    pub sentiment: SentimentTriple,
    /// Net promoter score derived from `sentiment`
    pub nps_score: u8,
}

/// Computes [`ScalarMetrics`].
#[derive(Debug, Clone, Copy)]
pub struct ScalarAggregator {
    default_sentiment: SentimentTriple,
}

impl ScalarAggregator {
    /// Creates an aggregator substituting `default_sentiment` when no call
    /// carries sentiment.
    pub const fn new(default_sentiment: SentimentTriple) -> Self {
        Self { default_sentiment }
    }

    /// Aggregates records already filtered to one owner and range.
    #[instrument(skip_all)]
    pub fn aggregate<'a, I>(&self, records: I) -> ScalarMetrics
    where
        I: IntoIterator<Item = &'a CallRecord>,
    {
        let mut total_calls = 0u64;
        let mut total_duration_seconds = 0u64;
        let mut total_hold_duration_seconds = 0u64;
        let mut raw = SentimentSum::new();

        for record in records {
            total_calls += 1;
            total_duration_seconds = total_duration_seconds.saturating_add(record.duration_seconds);
            total_hold_duration_seconds =
                total_hold_duration_seconds.saturating_add(record.hold_duration_seconds);
            raw.push(record.sentiment_or_zero());
        }

        let sentiment = normalize_or(raw.total(), self.default_sentiment);
        let metrics = ScalarMetrics {
            total_calls,
            total_duration_seconds,
            average_call_duration_seconds: rounded_mean(total_duration_seconds, total_calls),
            total_hold_duration_seconds,
            sentiment,
            nps_score: nps_score(&sentiment),
        };

        debug!(
            total_calls,
            total_duration_seconds,
            nps = metrics.nps_score,
            "Computed scalar metrics"
        );
        metrics
    }
}

impl Default for ScalarAggregator {
    fn default() -> Self {
        Self::new(DEFAULT_SENTIMENT)
    }
}
