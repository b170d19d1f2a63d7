//! Call records as supplied by the storage collaborator.

use callmetrics_common::{CallId, OwnerId, Timestamp};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Raw, unnormalized sentiment scores attached to a call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawSentiment {
    /// Positive score
    pub positive: f64,
    /// Neutral score
    pub neutral: f64,
    /// Negative score
    pub negative: f64,
}

impl RawSentiment {
    /// All-zero scores.
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0);

    /// Creates raw scores.
    pub const fn new(positive: f64, neutral: f64, negative: f64) -> Self {
        Self {
            positive,
            neutral,
            negative,
        }
    }

    /// Sum of the three channels.
    pub fn total(&self) -> f64 {
        self.positive + self.neutral + self.negative
    }

    /// Largest of the three channels.
    pub fn max_channel(&self) -> f64 {
        self.positive.max(self.neutral).max(self.negative)
    }

    /// Multiplies every channel by `factor`. Proportions are preserved
    /// exactly when `factor` is a power of two.
    #[must_use]
    pub fn scaled_by(self, factor: f64) -> Self {
        Self::new(
            self.positive * factor,
            self.neutral * factor,
            self.negative * factor,
        )
    }

    fn add(self, other: Self) -> Self {
        Self::new(
            self.positive + other.positive,
            self.neutral + other.neutral,
            self.negative + other.negative,
        )
    }

    fn is_finite(&self) -> bool {
        self.positive.is_finite() && self.neutral.is_finite() && self.negative.is_finite()
    }

    /// Clamps negative or non-finite channels to zero.
    #[must_use]
    pub fn sanitized(self) -> Self {
        let clamp = |v: f64| if v.is_finite() && v > 0.0 { v } else { 0.0 };
        let clean = Self::new(clamp(self.positive), clamp(self.neutral), clamp(self.negative));
        if clean != self {
            warn!(?self, "Clamped invalid sentiment scores to zero");
        }
        clean
    }
}

/// Channel-wise running sum of sanitized sentiment scores.
///
/// Holds the true sums multiplied by a power-of-two scale, halving the scale
/// whenever a channel would overflow. Only the proportions of the result are
/// meaningful, which is all normalization needs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SentimentSum {
    scaled: RawSentiment,
    scale: f64,
}

impl SentimentSum {
    /// An empty sum.
    pub const fn new() -> Self {
        Self {
            scaled: RawSentiment::ZERO,
            scale: 1.0,
        }
    }

    /// Adds one record's scores. `raw` must already be sanitized.
    pub fn push(&mut self, raw: RawSentiment) {
        let next = self.scaled.add(raw.scaled_by(self.scale));
        if next.is_finite() {
            self.scaled = next;
            return;
        }

        // Both halves are at most MAX / 2, so this sum cannot overflow.
        self.scale *= 0.5;
        self.scaled = self.scaled.scaled_by(0.5).add(raw.scaled_by(self.scale));
    }

    /// The accumulated scores, proportional to the true sums.
    pub const fn total(&self) -> RawSentiment {
        self.scaled
    }
}

impl Default for SentimentSum {
    fn default() -> Self {
        Self::new()
    }
}

/// One recorded call. Read-only to the aggregation engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallRecord {
    /// Unique identifier
    pub id: CallId,
    /// Owner the call belongs to
    pub owner_id: OwnerId,
    /// Total call length
    pub duration_seconds: u64,
    /// Time spent on hold
    #[serde(default)]
    pub hold_duration_seconds: u64,
    /// Caller-supplied sentiment; absent means all-zero
    #[serde(default)]
    pub sentiment: Option<RawSentiment>,
    /// Creation time, used for range filtering and bucketing
    pub created_at: Timestamp,
    /// Location of the stored recording
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio_url: Option<String>,
    /// Text transcription of the call
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transcription: Option<String>,
}

impl CallRecord {
    /// Creates a record without sentiment, hold time or media references.
    pub fn new(
        id: impl Into<String>,
        owner_id: impl Into<String>,
        duration_seconds: u64,
        created_at: Timestamp,
    ) -> Self {
        Self {
            id: CallId::new(id),
            owner_id: OwnerId::new(owner_id),
            duration_seconds,
            hold_duration_seconds: 0,
            sentiment: None,
            created_at,
            audio_url: None,
            transcription: None,
        }
    }

    /// Attaches raw sentiment scores.
    #[must_use]
    pub fn with_sentiment(mut self, positive: f64, neutral: f64, negative: f64) -> Self {
        self.sentiment = Some(RawSentiment::new(positive, neutral, negative));
        self
    }

    /// Sets the hold duration.
    #[must_use]
    pub fn with_hold_duration(mut self, seconds: u64) -> Self {
        self.hold_duration_seconds = seconds;
        self
    }

    /// Sentiment scores with absent sentiment treated as zero and invalid
    /// channels clamped.
    pub fn sentiment_or_zero(&self) -> RawSentiment {
        self.sentiment.map_or(RawSentiment::ZERO, RawSentiment::sanitized)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use callmetrics_common::test_utils::mock_timestamp;

    #[test]
    fn test_deserialize_minimal_record() {
        let json = r#"{
            "id": "c1",
            "ownerId": "u1",
            "durationSeconds": 90,
            "createdAt": "2024-03-01T10:15:00Z"
        }"#;

        let record: CallRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.id.as_str(), "c1");
        assert_eq!(record.owner_id.as_str(), "u1");
        assert_eq!(record.duration_seconds, 90);
        assert_eq!(record.hold_duration_seconds, 0);
        assert!(record.sentiment.is_none());
        assert_eq!(record.created_at, mock_timestamp(2024, 3, 1, 10, 15, 0));
    }

    #[test]
    fn test_partial_sentiment_defaults_missing_channels() {
        let json = r#"{
            "id": "c2",
            "ownerId": "u1",
            "durationSeconds": 30,
            "sentiment": { "positive": 4 },
            "createdAt": "2024-03-01T10:15:00Z"
        }"#;

        let record: CallRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.sentiment, Some(RawSentiment::new(4.0, 0.0, 0.0)));
    }

    #[test]
    fn test_missing_sentiment_is_zero() {
        let record = CallRecord::new("c", "u", 10, mock_timestamp(2024, 1, 1, 0, 0, 0));
        assert_eq!(record.sentiment_or_zero(), RawSentiment::ZERO);
    }

    #[test]
    fn test_invalid_channels_are_clamped() {
        let record = CallRecord::new("c", "u", 10, mock_timestamp(2024, 1, 1, 0, 0, 0))
            .with_sentiment(-3.0, f64::NAN, 2.0);

        assert_eq!(record.sentiment_or_zero(), RawSentiment::new(0.0, 0.0, 2.0));
    }

    #[test]
    fn test_sum_stays_finite_and_proportional() {
        let mut sum = SentimentSum::new();
        sum.push(RawSentiment::new(1e308, 1.0, 0.0));
        sum.push(RawSentiment::new(1e308, 1.0, 0.0));

        let total = sum.total();
        assert!(total.positive.is_finite());
        assert_eq!(total, RawSentiment::new(1e308, 1.0, 0.0));
    }

    #[test]
    fn test_sum_of_small_scores_is_exact() {
        let mut sum = SentimentSum::default();
        sum.push(RawSentiment::new(1.0, 2.0, 0.0));
        sum.push(RawSentiment::new(0.5, 0.0, 4.0));

        assert_eq!(sum.total(), RawSentiment::new(1.5, 2.0, 4.0));
    }

    #[test]
    fn test_serialization_skips_absent_media_fields() {
        let record = CallRecord::new("c", "u", 10, mock_timestamp(2024, 1, 1, 0, 0, 0));
        let value = serde_json::to_value(&record).unwrap();

        assert!(value.get("audioUrl").is_none());
        assert!(value.get("transcription").is_none());
        assert_eq!(value["durationSeconds"], 10);
    }
}
