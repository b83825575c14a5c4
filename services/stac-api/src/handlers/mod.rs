pub mod api;
pub mod climate_data;
pub mod collections;
pub mod conformance;
pub mod cube;
pub mod health;
pub mod items;
pub mod landing;
pub mod search;

use axum::{
    http::{header, StatusCode},
    response::Response,
};
use climate_common::ClimateError;
use edr_protocol::{responses::ExceptionResponse, EdrError};
use serde::Serialize;

/// 200 response with a JSON body.
fn json_response<T: Serialize>(value: &T, content_type: &str, cache_control: &str) -> Response {
    match serde_json::to_string_pretty(value) {
        Ok(json) => Response::builder()
            .status(StatusCode::OK)
            .header(header::CONTENT_TYPE, content_type)
            .header(header::CACHE_CONTROL, cache_control)
            .body(json.into())
            .unwrap_or_default(),
        Err(e) => error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            ExceptionResponse::internal_error(format!("Failed to serialize response: {}", e)),
        ),
    }
}

fn error_response(status: StatusCode, exc: ExceptionResponse) -> Response {
    let json = serde_json::to_string(&exc).unwrap_or_default();
    Response::builder()
        .status(status)
        .header(header::CONTENT_TYPE, "application/json")
        .body(json.into())
        .unwrap_or_default()
}

fn edr_error_response(err: &EdrError) -> Response {
    let status =
        StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    error_response(status, err.to_exception())
}

/// Exception body for a store or catalog failure.
fn climate_error_response(err: &ClimateError) -> Response {
    let (status, exc) = match err.http_status_code() {
        400 => (
            StatusCode::BAD_REQUEST,
            ExceptionResponse::bad_request(err.to_string()),
        ),
        _ => (
            StatusCode::INTERNAL_SERVER_ERROR,
            ExceptionResponse::internal_error(err.to_string()),
        ),
    };
    error_response(status, exc)
}
