//! Conformance and exception responses.

use serde::{Deserialize, Serialize};

use crate::conformance;

/// Conformance declaration response.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConformanceClasses {
    /// List of conformance class URIs.
    #[serde(rename = "conformsTo")]
    pub conforms_to: Vec<String>,
}

impl ConformanceClasses {
    /// EDR classes implemented by the cube endpoint.
    pub fn current() -> Self {
        Self {
            conforms_to: vec![
                conformance::CORE.to_string(),
                conformance::COLLECTIONS.to_string(),
                conformance::CUBE.to_string(),
                conformance::COVJSON.to_string(),
            ],
        }
    }

    /// Add a conformance class.
    pub fn with_class(mut self, class: &str) -> Self {
        if !self.contains(class) {
            self.conforms_to.push(class.to_string());
        }
        self
    }

    /// Add several conformance classes, skipping ones already declared.
    pub fn with_classes<'a>(self, classes: impl IntoIterator<Item = &'a str>) -> Self {
        classes.into_iter().fold(self, |acc, c| acc.with_class(c))
    }

    /// Check if a conformance class is declared.
    pub fn contains(&self, class: &str) -> bool {
        self.conforms_to.iter().any(|c| c == class)
    }
}

/// Exception response for errors.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExceptionResponse {
    /// Exception type identifier.
    #[serde(rename = "type")]
    pub type_: String,

    /// Human-readable title.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// HTTP status code.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,

    /// Detailed error message.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,

    /// URI of the request that caused the error.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instance: Option<String>,
}

impl ExceptionResponse {
    /// Create a new exception response.
    pub fn new(type_: impl Into<String>, status: u16, detail: impl Into<String>) -> Self {
        Self {
            type_: type_.into(),
            title: None,
            status: Some(status),
            detail: Some(detail.into()),
            instance: None,
        }
    }

    /// Set the title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Create a 404 Not Found exception.
    pub fn not_found(detail: impl Into<String>) -> Self {
        Self::new(
            "http://www.opengis.net/def/exceptions/ogcapi-edr-1/1.0/not-found",
            404,
            detail,
        )
        .with_title("Not Found")
    }

    /// Create a 400 Bad Request exception.
    pub fn bad_request(detail: impl Into<String>) -> Self {
        Self::new(
            "http://www.opengis.net/def/exceptions/ogcapi-edr-1/1.0/invalid-parameter-value",
            400,
            detail,
        )
        .with_title("Bad Request")
    }

    /// Create a 413 Payload Too Large exception.
    pub fn payload_too_large(detail: impl Into<String>) -> Self {
        Self::new(
            "http://www.opengis.net/def/exceptions/ogcapi-edr-1/1.0/response-too-large",
            413,
            detail,
        )
        .with_title("Payload Too Large")
    }

    /// Create a 500 Internal Server Error exception.
    pub fn internal_error(detail: impl Into<String>) -> Self {
        Self::new(
            "http://www.opengis.net/def/exceptions/ogcapi-edr-1/1.0/server-error",
            500,
            detail,
        )
        .with_title("Internal Server Error")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conformance_current() {
        let conf = ConformanceClasses::current();

        assert!(conf.contains(conformance::CORE));
        assert!(conf.contains(conformance::COLLECTIONS));
        assert!(conf.contains(conformance::CUBE));
        assert!(conf.contains(conformance::COVJSON));
    }

    #[test]
    fn test_conformance_with_classes_dedups() {
        let conf = ConformanceClasses::current()
            .with_classes(["https://api.stacspec.org/v1.0.0/core", conformance::CORE]);

        assert!(conf.contains("https://api.stacspec.org/v1.0.0/core"));
        assert_eq!(
            conf.conforms_to.iter().filter(|c| *c == conformance::CORE).count(),
            1
        );
    }

    #[test]
    fn test_conformance_serialization() {
        let json = serde_json::to_string(&ConformanceClasses::current()).unwrap();

        assert!(json.contains("\"conformsTo\""));
        assert!(json.contains("conf/cube"));
    }

    #[test]
    fn test_exception_not_found() {
        let exc = ExceptionResponse::not_found("Collection not found: forecasts");

        assert_eq!(exc.status, Some(404));
        assert_eq!(exc.title, Some("Not Found".to_string()));
        assert!(exc.detail.unwrap().contains("forecasts"));
    }

    #[test]
    fn test_exception_serialization() {
        let exc = ExceptionResponse::bad_request("Invalid bbox");

        let json = serde_json::to_value(&exc).unwrap();
        assert_eq!(json["status"], 400);
        assert_eq!(json["title"], "Bad Request");
        assert!(json.get("instance").is_none());
    }
}
