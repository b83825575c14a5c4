//! STAC items, assets and item collections.

use std::collections::BTreeMap;

use climate_common::BoundingBox;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::geometry::Geometry;
use crate::Link;

fn feature_type() -> String {
    "Feature".to_string()
}

fn feature_collection_type() -> String {
    "FeatureCollection".to_string()
}

fn stac_version() -> String {
    crate::STAC_VERSION.to_string()
}

/// A STAC item.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Item {
    #[serde(rename = "type", default = "feature_type")]
    pub type_: String,

    #[serde(default = "stac_version")]
    pub stac_version: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub stac_extensions: Vec<String>,

    pub id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collection: Option<String>,

    /// `null` geometries are allowed by the GeoJSON spec.
    #[serde(default)]
    pub geometry: Option<Geometry>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bbox: Option<Vec<f64>>,

    #[serde(default)]
    pub properties: Map<String, Value>,

    #[serde(default)]
    pub assets: BTreeMap<String, Asset>,

    #[serde(default)]
    pub links: Vec<Link>,

    #[serde(flatten)]
    pub additional_fields: Map<String, Value>,
}

impl Item {
    /// Create an item with empty properties and assets.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            type_: feature_type(),
            stac_version: stac_version(),
            stac_extensions: Vec::new(),
            id: id.into(),
            collection: None,
            geometry: None,
            bbox: None,
            properties: Map::new(),
            assets: BTreeMap::new(),
            links: Vec::new(),
            additional_fields: Map::new(),
        }
    }

    pub fn with_collection(mut self, collection: impl Into<String>) -> Self {
        self.collection = Some(collection.into());
        self
    }

    /// Set bbox and a matching polygon geometry.
    pub fn with_bbox(mut self, bbox: BoundingBox) -> Self {
        self.geometry = Some(Geometry::polygon(bbox.to_polygon_ring()));
        self.bbox = Some(bbox.to_vec());
        self
    }

    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    pub fn with_asset(mut self, key: impl Into<String>, asset: Asset) -> Self {
        self.assets.insert(key.into(), asset);
        self
    }

    pub fn property(&self, key: &str) -> Option<&Value> {
        self.properties.get(key)
    }

    /// A categorical property rendered as a tag.
    ///
    /// Strings are used verbatim and numbers through their JSON rendering;
    /// other kinds (and absence) yield `None`.
    pub fn property_tag(&self, key: &str) -> Option<String> {
        match self.properties.get(key)? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    pub fn asset(&self, key: &str) -> Option<&Asset> {
        self.assets.get(key)
    }

    /// The item bbox, falling back to the geometry envelope.
    pub fn bounding_box(&self) -> Option<BoundingBox> {
        self.bbox
            .as_deref()
            .and_then(BoundingBox::from_slice)
            .or_else(|| self.geometry.as_ref().and_then(Geometry::bounding_box))
    }
}

/// A STAC asset.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Asset {
    pub href: String,

    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub type_: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub roles: Vec<String>,

    #[serde(flatten)]
    pub additional_fields: Map<String, Value>,
}

impl Asset {
    pub fn new(href: impl Into<String>) -> Self {
        Self {
            href: href.into(),
            type_: None,
            title: None,
            roles: Vec::new(),
            additional_fields: Map::new(),
        }
    }

    pub fn with_type(mut self, type_: impl Into<String>) -> Self {
        self.type_ = Some(type_.into());
        self
    }

    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.roles.push(role.into());
        self
    }
}

/// A GeoJSON FeatureCollection of items.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ItemCollection {
    #[serde(rename = "type", default = "feature_collection_type")]
    pub type_: String,

    pub features: Vec<Item>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub links: Vec<Link>,

    #[serde(
        rename = "numberReturned",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub number_returned: Option<usize>,
}

impl ItemCollection {
    pub fn new(features: Vec<Item>) -> Self {
        Self {
            type_: feature_collection_type(),
            number_returned: Some(features.len()),
            features,
            links: Vec::new(),
        }
    }

    pub fn with_link(mut self, link: Link) -> Self {
        self.links.push(link);
        self
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}

impl From<Vec<Item>> for ItemCollection {
    fn from(features: Vec<Item>) -> Self {
        Self::new(features)
    }
}
