//! Content negotiation for the `f` parameter and the Accept header.
//!
//! Unsupported Accept headers get 406 Not Acceptable; an unknown `f` value
//! gets 400.

use axum::http::{header, HeaderMap, StatusCode};
use axum::response::Response;
use edr_protocol::responses::ExceptionResponse;
use edr_protocol::{media_types, EdrError};

const INVALID_PARAMETER: &str =
    "http://www.opengis.net/def/exceptions/ogcapi-edr-1/1.0/invalid-parameter-value";

/// Media types the cube endpoint can answer with.
pub const CUBE_MEDIA_TYPES: &[&str] = &[
    media_types::COVERAGE_JSON,
    "application/prs.coverage+json",
    media_types::JSON,
];

/// Media types for catalog documents (landing page, collections, items).
pub const METADATA_MEDIA_TYPES: &[&str] = &[media_types::JSON, media_types::GEO_JSON];

/// Output format of a cube response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    CoverageJson,
    Json,
}

impl OutputFormat {
    /// Content-Type header value for this format.
    pub fn content_type(&self) -> &'static str {
        match self {
            OutputFormat::CoverageJson => media_types::COVERAGE_JSON,
            OutputFormat::Json => media_types::JSON,
        }
    }

    /// Parse the `f` query parameter.
    pub fn from_query_param(f: &str) -> Option<Self> {
        match f.to_lowercase().as_str() {
            "covjson" | "coveragejson" | "application/vnd.cov+json" => {
                Some(OutputFormat::CoverageJson)
            }
            "json" | "application/json" => Some(OutputFormat::Json),
            _ => None,
        }
    }

    fn from_media_type(media_type: &str) -> Option<Self> {
        match media_type {
            "application/vnd.cov+json" | "application/prs.coverage+json" => {
                Some(OutputFormat::CoverageJson)
            }
            "application/json" => Some(OutputFormat::Json),
            _ => None,
        }
    }
}

/// Pick the cube output format.
///
/// A non-empty `f` wins; otherwise the Accept header is matched by quality,
/// defaulting to CoverageJSON.
pub fn negotiate_format(
    headers: &HeaderMap,
    f_param: Option<&str>,
) -> Result<OutputFormat, Response> {
    // Empty f= means "use default"
    if let Some(f) = f_param.filter(|f| !f.is_empty()) {
        return OutputFormat::from_query_param(f).ok_or_else(|| invalid_format_response(f));
    }

    let mut accepted = accepted_types(headers);
    accepted.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

    if accepted.is_empty() {
        return Ok(OutputFormat::CoverageJson);
    }

    for (media_type, _) in &accepted {
        if media_type == "*/*" || media_type == "application/*" {
            return Ok(OutputFormat::CoverageJson);
        }
        if let Some(format) = OutputFormat::from_media_type(media_type) {
            return Ok(format);
        }
    }

    let requested: Vec<&str> = accepted.iter().map(|(t, _)| t.as_str()).collect();
    Err(not_acceptable_response(&requested, CUBE_MEDIA_TYPES))
}

/// Media types from the Accept header with their quality values.
fn accepted_types(headers: &HeaderMap) -> Vec<(String, f32)> {
    let accept = headers
        .get(header::ACCEPT)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("*/*");

    accept
        .split(',')
        .filter_map(|s| {
            let mut parts = s.split(';');
            let media_type = parts.next()?.trim();
            if media_type.is_empty() {
                return None;
            }
            let quality = parts
                .find_map(|p| p.trim().strip_prefix("q=").and_then(|q| q.parse::<f32>().ok()))
                .unwrap_or(1.0);
            Some((media_type.to_string(), quality))
        })
        .collect()
}

/// Check the Accept header against the supported media types.
pub fn check_accept_header(headers: &HeaderMap, supported_types: &[&str]) -> Result<(), Response> {
    let accepted = accepted_types(headers);

    for (accepted_type, _) in &accepted {
        if accepted_type == "*/*" {
            return Ok(());
        }

        // type/* wildcards, e.g. "application/*"
        if let Some(prefix) = accepted_type.strip_suffix('*') {
            if supported_types.iter().any(|s| s.starts_with(prefix)) {
                return Ok(());
            }
            continue;
        }

        if supported_types.iter().any(|s| s == accepted_type) {
            return Ok(());
        }
    }

    if accepted.is_empty() {
        return Ok(());
    }

    let requested: Vec<&str> = accepted.iter().map(|(t, _)| t.as_str()).collect();
    Err(not_acceptable_response(&requested, supported_types))
}

/// Accept check for catalog documents.
pub fn check_metadata_accept(headers: &HeaderMap) -> Result<(), Response> {
    check_accept_header(headers, METADATA_MEDIA_TYPES)
}

fn not_acceptable_response(requested: &[&str], supported: &[&str]) -> Response {
    let exc = ExceptionResponse::new(
        INVALID_PARAMETER,
        406,
        format!(
            "Content negotiation failed. Requested format(s) '{}' not supported. Supported formats: {}",
            requested.join(", "),
            supported.join(", ")
        ),
    )
    .with_title("Not Acceptable");

    exception_body(StatusCode::NOT_ACCEPTABLE, &exc)
}

fn invalid_format_response(format: &str) -> Response {
    let err = EdrError::UnsupportedFormat(format!(
        "Invalid output format '{}'. Supported formats: json, covjson, coveragejson",
        format
    ));
    let status = StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::BAD_REQUEST);

    exception_body(status, &err.to_exception())
}

fn exception_body(status: StatusCode, exc: &ExceptionResponse) -> Response {
    let json = serde_json::to_string(exc).unwrap_or_default();

    Response::builder()
        .status(status)
        .header(header::CONTENT_TYPE, media_types::JSON)
        .body(json.into())
        .unwrap_or_default()
}
