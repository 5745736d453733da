//! Error types for the point forecast services.

use thiserror::Error;

/// Result type alias using ForecastError.
pub type ForecastResult<T> = Result<T, ForecastError>;

/// Primary error type surfaced at the service boundary.
#[derive(Debug, Error)]
pub enum ForecastError {
    // === Request Errors ===
    #[error("Missing required parameter: {0}")]
    MissingParameter(String),

    #[error("Invalid parameter value for '{param}': {message}")]
    InvalidParameter { param: String, message: String },

    // === Data Errors ===
    #[error("Failed to read forecast data: {0}")]
    DataReadError(String),

    // === Infrastructure Errors ===
    #[error("Internal server error: {0}")]
    InternalError(String),
}

impl ForecastError {
    /// Build an InvalidParameter error.
    pub fn invalid(param: impl Into<String>, message: impl Into<String>) -> Self {
        ForecastError::InvalidParameter {
            param: param.into(),
            message: message.into(),
        }
    }

    /// Whether the caller is at fault.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            ForecastError::MissingParameter(_) | ForecastError::InvalidParameter { .. }
        )
    }

    /// Get the HTTP status code for this error.
    pub fn http_status_code(&self) -> u16 {
        match self {
            ForecastError::MissingParameter(_) | ForecastError::InvalidParameter { .. } => 400,
            _ => 500,
        }
    }
}
