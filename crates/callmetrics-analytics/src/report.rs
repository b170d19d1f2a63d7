//! Report assembly: range resolution, owner scoping, and the three
//! aggregation stages combined into one result and its wire shape.

use crate::bucketer::{sort_by_created_at, Granularity, TrendBucket, TrendBucketer};
use crate::comparison::{PeriodComparator, PeriodComparison};
use crate::range::{DateRange, RangeRequest, RangeResolver};
use crate::record::CallRecord;
use crate::scalar::{ScalarAggregator, ScalarMetrics};
use callmetrics_common::{rounded_mean, OwnerId, Result, SentimentTriple, Timestamp};
use callmetrics_config::{AnalyticsConfig, DurationUnit};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

/// Full aggregation result for one owner and range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalyticsReport {
    /// Owner the report was computed for
    pub owner_id: OwnerId,
    /// Resolved range
    pub range: DateRange,
    /// Bucket width chosen for the range
    pub granularity: Granularity,
    /// Range totals, sentiment and NPS
    pub metrics: ScalarMetrics,
    /// Chronological trend buckets
    pub trends: Vec<TrendBucket>,
    /// Month-over-month comparison
    pub comparison: PeriodComparison,
}

/// Wire shape of a report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportResponse {
    /// Number of calls in range
    pub total_calls: u64,
    /// Sum of durations in seconds
    pub total_duration: u64,
    /// Mean duration, seconds unless configured as minutes
    pub average_call_duration: u64,
    /// Month-over-month change in call count
    pub change_percentage: i64,
    /// Overall sentiment
    pub sentiment_data: SentimentTriple,
    /// Net promoter score
    pub nps_score: u8,
    /// Call volume per bucket
    pub call_trends: Vec<CallTrendPoint>,
    /// Sentiment per bucket
    pub sentiment_trends: Vec<SentimentTrendPoint>,
}

/// Call volume of one bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallTrendPoint {
    /// Bucket label
    pub date: String,
    /// Calls in the bucket
    pub count: u64,
    /// Average duration in minutes
    pub avg_duration: u64,
}

/// Sentiment of one bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentimentTrendPoint {
    /// Bucket label
    pub date: String,
    /// Positive percentage
    pub positive: u8,
    /// Neutral percentage
    pub neutral: u8,
    /// Negative percentage
    pub negative: u8,
}

impl AnalyticsReport {
    /// Converts into the wire shape, expressing the top-level average in `unit`.
    pub fn to_response(&self, unit: DurationUnit) -> ReportResponse {
        let average_call_duration = match unit {
            DurationUnit::Seconds => self.metrics.average_call_duration_seconds,
            DurationUnit::Minutes => rounded_mean(
                self.metrics.total_duration_seconds,
                self.metrics.total_calls.saturating_mul(60),
            ),
        };

        ReportResponse {
            total_calls: self.metrics.total_calls,
            total_duration: self.metrics.total_duration_seconds,
            average_call_duration,
            change_percentage: self.comparison.change_percentage,
            sentiment_data: self.metrics.sentiment,
            nps_score: self.metrics.nps_score,
            call_trends: self
                .trends
                .iter()
                .map(|bucket| CallTrendPoint {
                    date: bucket.label.clone(),
                    count: bucket.call_count,
                    avg_duration: bucket.average_duration_minutes(),
                })
                .collect(),
            sentiment_trends: self
                .trends
                .iter()
                .map(|bucket| SentimentTrendPoint {
                    date: bucket.label.clone(),
                    positive: bucket.sentiment.positive,
                    neutral: bucket.sentiment.neutral,
                    negative: bucket.sentiment.negative,
                })
                .collect(),
        }
    }
}

/// Computes reports from a configuration snapshot. Holds no mutable state.
#[derive(Debug, Clone, Copy)]
pub struct ReportEngine {
    resolver: RangeResolver,
    scalar: ScalarAggregator,
    bucketer: TrendBucketer,
    comparator: PeriodComparator,
    duration_unit: DurationUnit,
}

impl ReportEngine {
    /// Builds an engine from the analytics configuration.
    pub fn new(config: &AnalyticsConfig) -> Result<Self> {
        Ok(Self {
            resolver: RangeResolver::from_config(config)?,
            scalar: ScalarAggregator::new(config.default_sentiment),
            bucketer: TrendBucketer::from_config(config)?,
            comparator: PeriodComparator::from_config(config)?,
            duration_unit: config.average_duration_unit,
        })
    }

    /// Unit of the top-level average duration in responses.
    pub const fn duration_unit(&self) -> DurationUnit {
        self.duration_unit
    }

    /// Computes the report for `owner_id` over the range described by
    /// `request`. Records of other owners are ignored.
    #[instrument(skip(self, records, owner_id, request), fields(owner = %owner_id, records = records.len()))]
    pub fn compute(
        &self,
        records: &[CallRecord],
        owner_id: &OwnerId,
        request: &RangeRequest,
        now: Timestamp,
    ) -> Result<AnalyticsReport> {
        let range = self.resolver.resolve(request, now)?;

        let mut owned: Vec<&CallRecord> = records
            .iter()
            .filter(|record| &record.owner_id == owner_id)
            .collect();
        sort_by_created_at(&mut owned);

        let first = owned.partition_point(|r| r.created_at < range.start);
        let last = owned.partition_point(|r| r.created_at <= range.end);
        let in_range = &owned[first..last.max(first)];
        debug!(
            owned = owned.len(),
            in_range = in_range.len(),
            "Scoped records to owner and range"
        );

        let metrics = self.scalar.aggregate(in_range.iter().copied());
        let trends = self.bucketer.bucket(&range, in_range);
        let comparison = self.comparator.compare(owned.iter().copied(), now);

        let report = AnalyticsReport {
            owner_id: owner_id.clone(),
            range,
            granularity: self.bucketer.granularity(&range),
            metrics,
            trends,
            comparison,
        };

        info!(
            total_calls = report.metrics.total_calls,
            buckets = report.trends.len(),
            granularity = %report.granularity,
            "Computed analytics report"
        );
        Ok(report)
    }

    /// Computes the report and converts it into the wire shape.
    pub fn compute_report(
        &self,
        records: &[CallRecord],
        owner_id: &OwnerId,
        request: &RangeRequest,
        now: Timestamp,
    ) -> Result<ReportResponse> {
        self.compute(records, owner_id, request, now)
            .map(|report| report.to_response(self.duration_unit))
    }
}

/// Computes a wire report with the default analytics configuration.
pub fn compute_report(
    records: &[CallRecord],
    owner_id: &OwnerId,
    request: &RangeRequest,
    now: Timestamp,
) -> Result<ReportResponse> {
    ReportEngine::new(&AnalyticsConfig::default())?.compute_report(records, owner_id, request, now)
}

#[cfg(test)]
mod tests {
    use super::*;
    use callmetrics_common::test_utils::mock_timestamp;

    #[test]
    fn test_wire_field_names() {
        let now = mock_timestamp(2024, 3, 15, 12, 0, 0);
        let response =
            compute_report(&[], &OwnerId::from("u1"), &RangeRequest::trailing(), now).unwrap();
        let value = serde_json::to_value(&response).unwrap();

        for key in [
            "totalCalls",
            "totalDuration",
            "averageCallDuration",
            "changePercentage",
            "sentimentData",
            "npsScore",
            "callTrends",
            "sentimentTrends",
        ] {
            assert!(value.get(key).is_some(), "missing {key}");
        }
        assert!(value["callTrends"][0].get("avgDuration").is_some());
        assert_eq!(value["sentimentTrends"][0]["positive"], 60);
        assert_eq!(value["sentimentData"]["negative"], 15);
    }

    #[test]
    fn test_minutes_average() {
        let records = vec![
            CallRecord::new("a", "u1", 150, mock_timestamp(2024, 3, 14, 9, 0, 0)),
            CallRecord::new("b", "u1", 120, mock_timestamp(2024, 3, 14, 9, 30, 0)),
        ];
        let config = AnalyticsConfig {
            average_duration_unit: DurationUnit::Minutes,
            ..AnalyticsConfig::default()
        };
        let engine = ReportEngine::new(&config).unwrap();
        let now = mock_timestamp(2024, 3, 15, 12, 0, 0);

        let response = engine
            .compute_report(&records, &OwnerId::from("u1"), &RangeRequest::trailing(), now)
            .unwrap();
        // 135 seconds on average is 2.25 minutes.
        assert_eq!(response.average_call_duration, 2);
        assert_eq!(response.total_duration, 270);
    }

    #[test]
    fn test_invalid_timezone_is_rejected() {
        let config = AnalyticsConfig {
            timezone: "Mars/Olympus".to_string(),
            ..AnalyticsConfig::default()
        };
        assert!(ReportEngine::new(&config).is_err());
    }
}
