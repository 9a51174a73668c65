//! Error types for the hourly model pipeline

use thiserror::Error;

/// Result type alias for model operations
pub type Result<T> = std::result::Result<T, ModelError>;

/// Errors raised by alignment, feature construction and the model itself.
///
/// Gap-filling leftovers are not errors: they surface as rows flagged
/// `interpolated` and as `None` predictions.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("Model must be fit before predictions can be made")]
    NotFitted,

    #[error("Model is already fit; use refit to replace its state")]
    AlreadyFitted,

    #[error("Invalid settings: {0}")]
    InvalidSettings(String),

    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Invalid table: {0}")]
    InvalidTable(String),
}

impl From<serde_json::Error> for ModelError {
    fn from(e: serde_json::Error) -> Self {
        ModelError::Serialization(e.to_string())
    }
}

impl From<validator::ValidationErrors> for ModelError {
    fn from(e: validator::ValidationErrors) -> Self {
        ModelError::InvalidSettings(e.to_string())
    }
}
