//! GeoJSON geometry as carried by items and `intersects` searches.

use climate_common::BoundingBox;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A GeoJSON geometry object.
///
/// Coordinates stay as raw JSON so every geometry type (Point through
/// MultiPolygon) round-trips without a dedicated variant.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Geometry {
    #[serde(rename = "type")]
    pub type_: String,

    pub coordinates: Value,
}

impl Geometry {
    /// Closed polygon from a ring of positions.
    pub fn polygon(ring: Vec<[f64; 2]>) -> Self {
        Self {
            type_: "Polygon".to_string(),
            coordinates: serde_json::json!([ring]),
        }
    }

    /// Point geometry.
    pub fn point(x: f64, y: f64) -> Self {
        Self {
            type_: "Point".to_string(),
            coordinates: serde_json::json!([x, y]),
        }
    }

    /// All `[x, y]` positions in the geometry, in document order.
    pub fn positions(&self) -> Vec<[f64; 2]> {
        let mut out = Vec::new();
        collect_positions(&self.coordinates, &mut out);
        out
    }

    /// Envelope of the geometry, `None` when it holds no positions.
    pub fn bounding_box(&self) -> Option<BoundingBox> {
        BoundingBox::enclosing(&self.positions())
    }
}

fn collect_positions(value: &Value, out: &mut Vec<[f64; 2]>) {
    let Some(array) = value.as_array() else {
        return;
    };

    // A position is an array whose first two members are numbers.
    if let (Some(x), Some(y)) = (
        array.first().and_then(Value::as_f64),
        array.get(1).and_then(Value::as_f64),
    ) {
        out.push([x, y]);
        return;
    }

    for child in array {
        collect_positions(child, out);
    }
}
