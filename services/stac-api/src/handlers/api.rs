//! OpenAPI definition handlers.

use axum::{
    http::{header, StatusCode},
    response::Response,
};
use edr_protocol::media_types;

/// OpenAPI 3.0 description of this service
const OPENAPI_SPEC: &str = include_str!("../../openapi.json");

/// GET /api - OpenAPI definition
pub async fn api_handler() -> Response {
    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, media_types::OPENAPI_JSON)
        .header(header::CACHE_CONTROL, "max-age=3600")
        .body(OPENAPI_SPEC.into())
        .unwrap_or_default()
}

/// GET /api.html - ReDoc page for the OpenAPI definition
pub async fn api_html_handler() -> Response {
    let html = r#"<!DOCTYPE html>
<html>
<head>
    <title>Climate STAC API Documentation</title>
    <meta charset="utf-8"/>
    <meta name="viewport" content="width=device-width, initial-scale=1">
    <style>
        body { margin: 0; padding: 0; }
    </style>
</head>
<body>
    <redoc spec-url='api'></redoc>
    <script src="https://cdn.redoc.ly/redoc/latest/bundles/redoc.standalone.js"></script>
</body>
</html>"#;

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "text/html; charset=utf-8")
        .header(header::CACHE_CONTROL, "max-age=3600")
        .body(html.into())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_document_parses() {
        let doc: serde_json::Value = serde_json::from_str(OPENAPI_SPEC).unwrap();
        assert!(doc["openapi"].as_str().unwrap().starts_with("3.0"));
        for path in ["/", "/search", "/collections/{collectionId}/cube", "/climate_data"] {
            assert!(doc["paths"].get(path).is_some(), "missing path {}", path);
        }
    }
}
