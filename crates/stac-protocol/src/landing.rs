//! STAC API landing page.

use serde::{Deserialize, Serialize};

use crate::collection::Collection;
use crate::Link;

/// Root catalog document served at `/`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LandingPage {
    #[serde(rename = "type")]
    pub type_: String,

    pub id: String,

    pub title: String,

    pub description: String,

    pub stac_version: String,

    #[serde(rename = "conformsTo")]
    pub conforms_to: Vec<String>,

    pub links: Vec<Link>,
}

impl LandingPage {
    /// Create a landing page with the standard navigation links.
    ///
    /// `base_url` must not end with a slash.
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        description: impl Into<String>,
        base_url: &str,
        conforms_to: Vec<String>,
    ) -> Self {
        let links = vec![
            Link::new(format!("{}/", base_url), "self")
                .with_type("application/json")
                .with_title("This document"),
            Link::new(format!("{}/", base_url), "root")
                .with_type("application/json"),
            Link::new(format!("{}/conformance", base_url), "conformance")
                .with_type("application/json")
                .with_title("Conformance classes"),
            Link::new(format!("{}/collections", base_url), "data")
                .with_type("application/json")
                .with_title("Collections"),
            Link::new(format!("{}/search", base_url), "search")
                .with_type("application/geo+json")
                .with_title("STAC search")
                .with_method("GET"),
            Link::new(format!("{}/search", base_url), "search")
                .with_type("application/geo+json")
                .with_title("STAC search")
                .with_method("POST"),
            Link::new(format!("{}/api", base_url), "service-desc")
                .with_type("application/vnd.oai.openapi+json;version=3.0")
                .with_title("OpenAPI service description"),
            Link::new(format!("{}/api.html", base_url), "service-doc")
                .with_type("text/html")
                .with_title("OpenAPI service documentation"),
        ];

        Self {
            type_: "Catalog".to_string(),
            id: id.into(),
            title: title.into(),
            description: description.into(),
            stac_version: crate::STAC_VERSION.to_string(),
            conforms_to,
            links,
        }
    }

    /// Add a `child` link for each collection.
    pub fn with_children<'a>(
        mut self,
        base_url: &str,
        collections: impl IntoIterator<Item = &'a Collection>,
    ) -> Self {
        for collection in collections {
            self.links.push(
                Link::new(format!("{}/collections/{}", base_url, collection.id), "child")
                    .with_type("application/json")
                    .with_title(collection.display_title()),
            );
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_landing_page_links() {
        let landing = LandingPage::new(
            "climate-stac",
            "Climate STAC API",
            "Forecast data catalog",
            "http://localhost:8083",
            vec![crate::conformance::CORE.to_string()],
        );

        assert_eq!(landing.type_, "Catalog");
        assert!(landing.links.iter().any(|l| l.rel == "self"));
        assert!(landing.links.iter().any(|l| l.rel == "conformance"));
        assert!(landing.links.iter().any(|l| l.rel == "service-desc"));
        assert!(landing.links.iter().any(|l| l.rel == "service-doc"));
        assert_eq!(landing.links.iter().filter(|l| l.rel == "search").count(), 2);
    }

    #[test]
    fn test_child_links() {
        let collections = vec![
            Collection::new("forecasts", "d").with_title("Forecasts"),
            Collection::new("reanalysis", "d"),
        ];
        let landing = LandingPage::new("id", "t", "d", "http://h", vec![])
            .with_children("http://h", &collections);

        let children: Vec<_> = landing.links.iter().filter(|l| l.rel == "child").collect();
        assert_eq!(children.len(), 2);
        assert_eq!(children[0].href, "http://h/collections/forecasts");
        assert_eq!(children[0].title.as_deref(), Some("Forecasts"));
        assert_eq!(children[1].title.as_deref(), Some("reanalysis"));
    }

    #[test]
    fn test_serialized_field_names() {
        let landing = LandingPage::new("id", "t", "d", "http://h", vec!["c".to_string()]);
        let json = serde_json::to_value(&landing).unwrap();
        assert_eq!(json["conformsTo"][0], "c");
        assert_eq!(json["stac_version"], "1.0.0");
    }
}
