//! # Call Metrics Config
//!
//! Type-safe configuration management for the call metrics workspace.
//!
//! This crate provides configuration loading (YAML or TOML with environment
//! overrides), validation, and a lock-free snapshot cache.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod cache;
pub mod defaults;
pub mod loader;
pub mod schema;
pub mod validator;

pub use cache::*;
pub use defaults::*;
pub use loader::*;
pub use schema::*;
pub use validator::*;
