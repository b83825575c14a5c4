//! Link type shared by the OGC API and STAC documents.

use serde::{Deserialize, Serialize};

/// A hyperlink to a related resource.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Link {
    /// The URI of the linked resource.
    pub href: String,

    /// The relationship type (e.g., "self", "data", "conformance").
    pub rel: String,

    /// The media type of the linked resource.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub type_: Option<String>,

    /// A human-readable title for the link.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// HTTP method for links that are not plain GETs (STAC search).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
}

impl Link {
    /// Create a new link with required fields.
    pub fn new(href: impl Into<String>, rel: impl Into<String>) -> Self {
        Self {
            href: href.into(),
            rel: rel.into(),
            type_: None,
            title: None,
            method: None,
        }
    }

    /// Set the media type.
    pub fn with_type(mut self, type_: impl Into<String>) -> Self {
        self.type_ = Some(type_.into());
        self
    }

    /// Set the title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Set the HTTP method.
    pub fn with_method(mut self, method: impl Into<String>) -> Self {
        self.method = Some(method.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_link_builder() {
        let link = Link::new("http://localhost:8083/search", "search")
            .with_type("application/geo+json")
            .with_method("POST");

        assert_eq!(link.rel, "search");
        assert_eq!(link.method.as_deref(), Some("POST"));
        assert!(link.title.is_none());
    }

    #[test]
    fn test_link_skips_empty_fields() {
        let json = serde_json::to_string(&Link::new("http://x", "self")).unwrap();
        assert_eq!(json, r#"{"href":"http://x","rel":"self"}"#);
    }

    #[test]
    fn test_link_deserializes_without_optional_fields() {
        let link: Link = serde_json::from_str(r#"{"href":"http://x","rel":"root"}"#).unwrap();
        assert_eq!(link, Link::new("http://x", "root"));
    }
}
