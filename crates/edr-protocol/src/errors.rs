//! Cube and catalog API error types.

use thiserror::Error;

use crate::queries::CoordinateParseError;
use crate::responses::ExceptionResponse;

/// Errors surfaced by the service handlers.
#[derive(Debug, Error)]
pub enum EdrError {
    /// Collection not found.
    #[error("Collection not found: {0}")]
    CollectionNotFound(String),

    /// Item not found.
    #[error("Item not found: {0}")]
    ItemNotFound(String),

    /// Invalid query parameter.
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Coordinate parsing error.
    #[error("Coordinate error: {0}")]
    CoordinateError(#[from] CoordinateParseError),

    /// Requested area exceeds the configured limit.
    #[error("Response too large: {0}")]
    ResponseTooLarge(String),

    /// Unsupported output format.
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// Catalog search failed.
    #[error("Catalog error: {0}")]
    CatalogError(String),

    /// Reading or decoding an asset failed.
    #[error("Data access error: {0}")]
    DataAccessError(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    InternalError(String),
}

impl EdrError {
    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            EdrError::CollectionNotFound(_) | EdrError::ItemNotFound(_) => 404,
            EdrError::InvalidParameter(_)
            | EdrError::CoordinateError(_)
            | EdrError::UnsupportedFormat(_) => 400,
            EdrError::ResponseTooLarge(_) => 413,
            EdrError::CatalogError(_)
            | EdrError::DataAccessError(_)
            | EdrError::InternalError(_) => 500,
        }
    }

    /// Convert to an ExceptionResponse.
    pub fn to_exception(&self) -> ExceptionResponse {
        match self {
            EdrError::CollectionNotFound(_) | EdrError::ItemNotFound(_) => {
                ExceptionResponse::not_found(self.to_string())
            }
            EdrError::InvalidParameter(msg) | EdrError::UnsupportedFormat(msg) => {
                ExceptionResponse::bad_request(msg)
            }
            EdrError::CoordinateError(e) => ExceptionResponse::bad_request(e.to_string()),
            EdrError::ResponseTooLarge(msg) => ExceptionResponse::payload_too_large(msg),
            EdrError::CatalogError(_) | EdrError::DataAccessError(_) | EdrError::InternalError(_) => {
                ExceptionResponse::internal_error(self.to_string())
            }
        }
    }
}
