//! Service configuration loading and types.

use anyhow::{Context, Result};
use netcdf_parser::CoordinateNames;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// Service configuration loaded from a YAML file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Landing page metadata.
    #[serde(default)]
    pub service: ServiceMetadata,

    /// Cube settings for collections without their own entry.
    #[serde(default)]
    pub cube: CubeSettings,

    /// Per-collection cube settings, keyed by collection id.
    #[serde(default)]
    pub collections: HashMap<String, CubeSettings>,
}

impl ServiceConfig {
    /// Load configuration from a YAML file.
    ///
    /// A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::warn!(
                "Service config {} does not exist, using defaults",
                path.display()
            );
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read: {:?}", path))?;
        let config: ServiceConfig = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse: {:?}", path))?;

        tracing::info!(
            collections = config.collections.len(),
            "Loaded service config from {:?}",
            path
        );

        Ok(config)
    }

    /// Cube settings for a collection, falling back to the defaults.
    pub fn cube_settings(&self, collection_id: &str) -> &CubeSettings {
        self.collections.get(collection_id).unwrap_or(&self.cube)
    }
}

/// Identity of the catalog as shown on the landing page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceMetadata {
    #[serde(default = "default_service_id")]
    pub id: String,

    #[serde(default = "default_service_title")]
    pub title: String,

    #[serde(default = "default_service_description")]
    pub description: String,
}

impl Default for ServiceMetadata {
    fn default() -> Self {
        Self {
            id: default_service_id(),
            title: default_service_title(),
            description: default_service_description(),
        }
    }
}

fn default_service_id() -> String {
    "climate-stac".to_string()
}

fn default_service_title() -> String {
    "Climate STAC API".to_string()
}

fn default_service_description() -> String {
    "Climate forecast catalog with OGC API - EDR cube queries".to_string()
}

/// How the cube endpoint reads one collection's assets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CubeSettings {
    /// Item asset holding the data file.
    #[serde(default = "default_asset_key")]
    pub asset_key: String,

    /// Variables returned when `parameter-name` is absent.
    #[serde(default = "default_variables")]
    pub variables: Vec<String>,

    /// Item property naming the model that produced the data.
    #[serde(default = "default_model_property")]
    pub model_property: String,

    /// Coordinate variable names inside the data files.
    #[serde(default)]
    pub coordinates: CoordinateSettings,

    /// Largest bbox area accepted, in square degrees.
    #[serde(default = "default_max_area")]
    pub max_area_sq_degrees: Option<f64>,

    /// Catalog search limit for one cube request.
    #[serde(default = "default_max_items")]
    pub max_items: usize,
}

impl Default for CubeSettings {
    fn default() -> Self {
        Self {
            asset_key: default_asset_key(),
            variables: default_variables(),
            model_property: default_model_property(),
            coordinates: CoordinateSettings::default(),
            max_area_sq_degrees: default_max_area(),
            max_items: default_max_items(),
        }
    }
}

fn default_asset_key() -> String {
    "data".to_string()
}

fn default_variables() -> Vec<String> {
    vec!["COUT".to_string()]
}

fn default_model_property() -> String {
    "model".to_string()
}

fn default_max_area() -> Option<f64> {
    Some(100.0)
}

fn default_max_items() -> usize {
    100
}

/// Coordinate variable names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoordinateSettings {
    #[serde(default = "default_x")]
    pub x: String,

    #[serde(default = "default_y")]
    pub y: String,

    #[serde(default = "default_z")]
    pub z: String,

    #[serde(default = "default_t")]
    pub t: String,
}

impl Default for CoordinateSettings {
    fn default() -> Self {
        Self {
            x: default_x(),
            y: default_y(),
            z: default_z(),
            t: default_t(),
        }
    }
}

impl CoordinateSettings {
    pub fn to_names(&self) -> CoordinateNames {
        CoordinateNames {
            x: self.x.clone(),
            y: self.y.clone(),
            z: self.z.clone(),
            t: self.t.clone(),
        }
    }
}

fn default_x() -> String {
    "geo_x".to_string()
}

fn default_y() -> String {
    "geo_y".to_string()
}

fn default_z() -> String {
    "geo_z".to_string()
}

fn default_t() -> String {
    "time".to_string()
}
