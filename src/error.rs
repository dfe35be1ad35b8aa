//! Error handling module for the nutrient doser
//!
//! Provides centralized error handling with proper error types using thiserror.
//! Input validation failures are ordinary values here; the binary decides
//! how they map to an exit status.

use thiserror::Error;

/// Main error type for the nutrient doser
#[derive(Error, Debug)]
pub enum DoserError {
    /// Host URL uses a scheme other than http/https
    #[error("invalid URL scheme ({0}). Only HTTP URLs are allowed")]
    InvalidHostScheme(String),

    /// Host URL could not be parsed at all
    #[error("invalid host URL {url}: {reason}")]
    InvalidHost { url: String, reason: String },

    /// Chart name is not present in the loaded chart store
    #[error("Invalid chart: {chart}. Available charts are {available:?}")]
    InvalidChart {
        chart: String,
        available: Vec<String>,
    },

    /// Stage name is not present in the selected chart
    #[error("Invalid growth stage: {stage}. Available stages are {available:?}")]
    InvalidStage {
        stage: String,
        available: Vec<String>,
    },

    /// Amount string does not start with `<number><unit>`
    #[error("Invalid amount entered: {0}")]
    InvalidAmount(String),

    /// Chart resource missing, unreadable or malformed
    #[error("Chart load error: {0}")]
    ChartLoad(String),

    /// Transport failures talking to the doser
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO errors (chart file, dry-run output)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for doser operations
pub type Result<T> = std::result::Result<T, DoserError>;

impl DoserError {
    /// Create a chart load error
    pub fn chart_load(msg: impl Into<String>) -> Self {
        Self::ChartLoad(msg.into())
    }

    /// Create an invalid amount error
    pub fn invalid_amount(input: impl Into<String>) -> Self {
        Self::InvalidAmount(input.into())
    }

    /// Create an invalid host scheme error
    pub fn invalid_host_scheme(scheme: impl Into<String>) -> Self {
        Self::InvalidHostScheme(scheme.into())
    }

    /// True for errors caused by what the user typed, as opposed to the
    /// environment (chart file, network).
    pub fn is_user_input(&self) -> bool {
        matches!(
            self,
            Self::InvalidHostScheme(_)
                | Self::InvalidHost { .. }
                | Self::InvalidChart { .. }
                | Self::InvalidStage { .. }
                | Self::InvalidAmount(_)
        )
    }
}
