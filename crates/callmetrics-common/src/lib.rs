//! # Call Metrics Common
//!
//! Shared types, utilities, and common functionality for the call metrics
//! workspace.
//!
//! This crate provides the foundational error type, logging setup and domain
//! newtypes used across all other crates in the workspace.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod logging;
pub mod types;
pub mod utils;

#[cfg(any(test, feature = "testing"))]
pub mod test_utils;

pub use error::{CallMetricsError, Result};
pub use logging::{init_logging, LoggingConfig};
pub use types::*;
pub use utils::*;
