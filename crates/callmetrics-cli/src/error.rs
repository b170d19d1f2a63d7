//! Application-wide error types using thiserror.

use callmetrics_common::CallMetricsError;

/// Errors surfaced by the command line front end.
#[derive(thiserror::Error, Debug)]
pub enum CliError {
    /// Failure inside the analytics or configuration layers.
    #[error(transparent)]
    Core(#[from] CallMetricsError),

    /// A command line value that cannot be used.
    #[error("Invalid argument '{name}': {message}")]
    InvalidArgument {
        /// Argument name
        name: &'static str,
        /// What is wrong with it
        message: String,
    },

    /// Failure encoding output.
    #[error("Failed to encode output: {0}")]
    Output(#[from] serde_json::Error),
}

impl CliError {
    /// Creates an invalid argument error.
    pub fn invalid_argument(name: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            name,
            message: message.into(),
        }
    }
}

/// Result type for the command line front end.
pub type CliResult<T> = Result<T, CliError>;
