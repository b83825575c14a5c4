//! Error types for the climate data services.

use thiserror::Error;

/// Result type alias using ClimateError.
pub type ClimateResult<T> = Result<T, ClimateError>;

/// Primary error type shared by the storage and service layers.
#[derive(Debug, Error)]
pub enum ClimateError {
    // === Request Errors ===
    #[error("Missing required parameter: {0}")]
    MissingParameter(String),

    #[error("Invalid parameter value for '{param}': {message}")]
    InvalidParameter { param: String, message: String },

    #[error("Invalid BBOX: {0}")]
    InvalidBbox(String),

    #[error("Invalid time specification: {0}")]
    InvalidTime(String),

    #[error("Invalid search query: {0}")]
    InvalidQuery(String),

    // === Catalog Errors ===
    #[error("Catalog search failed: {0}")]
    CatalogError(String),

    // === Data Errors ===
    #[error("Failed to read data: {0}")]
    DataReadError(String),

    #[error("Invalid NetCDF data: {0}")]
    NetCdfError(String),

    // === Storage Errors ===
    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    // === Infrastructure Errors ===
    #[error("Internal server error: {0}")]
    InternalError(String),
}

impl ClimateError {
    /// Get the HTTP status code for this error.
    pub fn http_status_code(&self) -> u16 {
        match self {
            ClimateError::MissingParameter(_)
            | ClimateError::InvalidParameter { .. }
            | ClimateError::InvalidBbox(_)
            | ClimateError::InvalidTime(_)
            | ClimateError::InvalidQuery(_) => 400,

            _ => 500,
        }
    }
}

// Conversion from common error types
impl From<std::io::Error> for ClimateError {
    fn from(err: std::io::Error) -> Self {
        ClimateError::InternalError(err.to_string())
    }
}

impl From<serde_json::Error> for ClimateError {
    fn from(err: serde_json::Error) -> Self {
        ClimateError::InternalError(format!("JSON error: {}", err))
    }
}
