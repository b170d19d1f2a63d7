//! # Call Metrics Analytics
//!
//! Aggregation engine turning one owner's call records into a report: call
//! volume and duration totals, a normalized sentiment breakdown with its NPS,
//! gap-filled daily, weekly or monthly trend buckets, and a month-over-month
//! change in call volume.
//!
//! The engine itself is synchronous and pure. [`AnalyticsService`] wraps it
//! with an async [`CallRecordStore`], a [`Clock`] and the shared
//! configuration cache.
//!
//! ```no_run
//! use callmetrics_analytics::{compute_report, CallRecord, RangeRequest};
//! use callmetrics_common::OwnerId;
//! use chrono::Utc;
//!
//! let records = vec![CallRecord::new("c1", "alice", 95, Utc::now())
//!     .with_sentiment(4.0, 1.0, 0.0)];
//! let report = compute_report(&records, &OwnerId::from("alice"), &RangeRequest::trailing(), Utc::now())?;
//! println!("{} calls, NPS {}", report.total_calls, report.nps_score);
//! # Ok::<(), callmetrics_common::CallMetricsError>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod bucketer;
pub mod clock;
pub mod comparison;
pub mod range;
pub mod record;
pub mod report;
pub mod scalar;
pub mod sentiment;
pub mod service;
pub mod store;
pub mod synthetic;

pub use bucketer::{Granularity, SentimentSource, TrendBucket, TrendBucketer};
pub use clock::{Clock, FixedClock, SystemClock};
pub use comparison::{GrowthDirection, PeriodComparator, PeriodComparison};
pub use range::{DateRange, RangeRequest, RangeResolver};
pub use record::{CallRecord, RawSentiment, SentimentSum};
pub use report::{
    compute_report, AnalyticsReport, CallTrendPoint, ReportEngine, ReportResponse,
    SentimentTrendPoint,
};
pub use scalar::{ScalarAggregator, ScalarMetrics};
pub use sentiment::{normalize, normalize_or, nps_score};
pub use service::AnalyticsService;
pub use store::{CallRecordStore, InMemoryCallStore, JsonFileCallStore};
pub use synthetic::SyntheticCallGenerator;
