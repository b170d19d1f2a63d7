//! Percentage normalization of raw sentiment scores and the derived NPS.
//!
//! Normalized triples always sum to exactly 100. Rounding error is absorbed
//! entirely by the neutral channel.

use crate::record::RawSentiment;
use callmetrics_common::{round_half_up, SentimentTriple};

/// Channels above this are brought down by [`RESCALE_FACTOR`] so that the
/// channel sum and the `* 100` below stay finite.
const RESCALE_ABOVE: f64 = 1.0e300;

/// 2^-64. A power of two, so every percentage is bit-for-bit unchanged.
const RESCALE_FACTOR: f64 = 5.421_010_862_427_522e-20;

/// Converts raw scores into whole percentages summing to 100.
///
/// Returns `None` when the scores total zero; callers substitute their own
/// default in that case.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn normalize(raw: RawSentiment) -> Option<SentimentTriple> {
    let mut raw = raw.sanitized();
    if raw.max_channel() > RESCALE_ABOVE {
        raw = raw.scaled_by(RESCALE_FACTOR);
    }
    let total = raw.total();
    if total <= 0.0 {
        return None;
    }

    let pct = |value: f64| round_half_up(value * 100.0 / total);
    let mut positive = pct(raw.positive);
    let mut neutral = pct(raw.neutral);
    let mut negative = pct(raw.negative);

    neutral += 100 - (positive + neutral + negative);

    // Only reachable when neutral rounds to 0 and both other channels round up.
    if neutral < 0 {
        let deficit = -neutral;
        neutral = 0;
        if positive >= negative {
            positive -= deficit;
        } else {
            negative -= deficit;
        }
    }

    Some(SentimentTriple::new(
        positive as u8,
        neutral as u8,
        negative as u8,
    ))
}

/// Normalizes, falling back to `default` when there is no sentiment data.
pub fn normalize_or(raw: RawSentiment, default: SentimentTriple) -> SentimentTriple {
    normalize(raw).unwrap_or(default)
}

/// Net promoter score derived from a normalized triple: the positive minus
/// negative percentage gap, clamped to `[0, 100]`.
pub fn nps_score(sentiment: &SentimentTriple) -> u8 {
    sentiment.positive.saturating_sub(sentiment.negative).min(100)
}
