//! Seeded generator of plausible call records for demos and tests.

use crate::record::{CallRecord, RawSentiment};
use callmetrics_common::{CallId, OwnerId, Timestamp};
use chrono::Duration;

/// Produces reproducible call records for one owner.
///
/// The same seed, owner, window and `now` always yield the same records.
#[derive(Debug)]
pub struct SyntheticCallGenerator {
    rng: fastrand::Rng,
    owner_id: OwnerId,
    window_days: u32,
    missing_sentiment_ratio: f64,
}

impl SyntheticCallGenerator {
    /// Creates a generator spreading calls over the `window_days` before now.
    pub fn new(owner_id: OwnerId, window_days: u32, seed: u64) -> Self {
        Self {
            rng: fastrand::Rng::with_seed(seed),
            owner_id,
            window_days: window_days.max(1),
            missing_sentiment_ratio: 0.1,
        }
    }

    /// Share of calls generated without any sentiment, clamped to `[0, 1]`.
    #[must_use]
    pub fn with_missing_sentiment_ratio(mut self, ratio: f64) -> Self {
        self.missing_sentiment_ratio = ratio.clamp(0.0, 1.0);
        self
    }

    /// Generates `count` records ending at `now`, oldest first.
    pub fn generate(&mut self, count: usize, now: Timestamp) -> Vec<CallRecord> {
        let window_seconds = i64::from(self.window_days) * 86_400;
        let mut records: Vec<CallRecord> = (0..count)
            .map(|_| {
                let age = self.rng.i64(0..window_seconds);
                self.record_at(now - Duration::seconds(age))
            })
            .collect();
        records.sort_by_key(|r| r.created_at);
        records
    }

    fn record_at(&mut self, created_at: Timestamp) -> CallRecord {
        let id = CallId::from_random_bytes(self.rng.u128(..).to_le_bytes());
        let sentiment = if self.rng.f64() < self.missing_sentiment_ratio {
            None
        } else {
            // Skewed towards positive.
            Some(RawSentiment::new(
                self.rng.f64() * 10.0 + 2.0,
                self.rng.f64() * 6.0,
                self.rng.f64() * 4.0,
            ))
        };

        CallRecord {
            id,
            owner_id: self.owner_id.clone(),
            duration_seconds: self.rng.u64(30..=1_800),
            hold_duration_seconds: self.rng.u64(0..=180),
            sentiment,
            created_at,
            audio_url: None,
            transcription: None,
        }
    }
}
