//! STAC collections.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::Link;

fn collection_type() -> String {
    "Collection".to_string()
}

fn stac_version() -> String {
    crate::STAC_VERSION.to_string()
}

/// A STAC collection document.
///
/// Only the fields the service reads are typed; extent, providers,
/// summaries and the rest travel in `additional_fields`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Collection {
    #[serde(rename = "type", default = "collection_type")]
    pub type_: String,

    #[serde(default = "stac_version")]
    pub stac_version: String,

    pub id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(default)]
    pub description: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub license: Option<String>,

    #[serde(default)]
    pub links: Vec<Link>,

    #[serde(flatten)]
    pub additional_fields: Map<String, Value>,
}

impl Collection {
    pub fn new(id: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            type_: collection_type(),
            stac_version: stac_version(),
            id: id.into(),
            title: None,
            description: description.into(),
            license: None,
            links: Vec::new(),
            additional_fields: Map::new(),
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Title for links and listings, falling back to the id.
    pub fn display_title(&self) -> &str {
        self.title.as_deref().unwrap_or(&self.id)
    }
}

/// Response body of `GET /collections`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Collections {
    pub collections: Vec<Collection>,

    #[serde(default)]
    pub links: Vec<Link>,
}
