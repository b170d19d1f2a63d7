//! Common type definitions and newtype wrappers for domain modeling.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Timestamp type used throughout the workspace
pub type Timestamp = DateTime<Utc>;

/// Identifier of the user that owns a call recording.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OwnerId(pub String);

impl OwnerId {
    /// Creates an owner id from anything string-like.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the raw identifier.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OwnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for OwnerId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Opaque unique identifier of a call record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CallId(pub String);

impl CallId {
    /// Creates a call id from anything string-like.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Builds a version 4 UUID call id from caller-supplied random bytes.
    pub fn from_random_bytes(bytes: [u8; 16]) -> Self {
        Self(uuid::Builder::from_random_bytes(bytes).into_uuid().to_string())
    }

    /// Borrow the raw identifier.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CallId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Percentage breakdown of sentiment. Once normalized the three channels
/// always sum to exactly 100.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SentimentTriple {
    /// Share of positive sentiment, in percent
    pub positive: u8,
    /// Share of neutral sentiment, in percent
    pub neutral: u8,
    /// Share of negative sentiment, in percent
    pub negative: u8,
}

/// Placeholder breakdown reported whenever no sentiment data is available.
pub const DEFAULT_SENTIMENT: SentimentTriple = SentimentTriple::new(60, 25, 15);

impl SentimentTriple {
    /// Creates a triple without checking the sum.
    pub const fn new(positive: u8, neutral: u8, negative: u8) -> Self {
        Self {
            positive,
            neutral,
            negative,
        }
    }

    /// Sum of the three channels.
    pub const fn total(&self) -> u32 {
        self.positive as u32 + self.neutral as u32 + self.negative as u32
    }

    /// Whether the channels add up to exactly 100.
    pub const fn is_normalized(&self) -> bool {
        self.total() == 100
    }
}

impl Default for SentimentTriple {
    fn default() -> Self {
        DEFAULT_SENTIMENT
    }
}

impl fmt::Display for SentimentTriple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}% positive / {}% neutral / {}% negative",
            self.positive, self.neutral, self.negative
        )
    }
}
