//! Conformance endpoint handler.

use axum::{http::HeaderMap, response::Response};
use edr_protocol::media_types;
use metrics::counter;

use super::json_response;
use super::landing::service_conformance;
use crate::content_negotiation::check_metadata_accept;

/// GET /conformance - Conformance classes
pub async fn conformance_handler(headers: HeaderMap) -> Response {
    counter!("stac_requests_total", "endpoint" => "conformance").increment(1);

    if let Err(response) = check_metadata_accept(&headers) {
        return response;
    }

    json_response(&service_conformance(), media_types::JSON, "max-age=3600")
}
