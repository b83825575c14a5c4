//! Bounding box types and operations.

use serde::{Deserialize, Serialize};

/// A geographic bounding box in degrees (EPSG:4326 / CRS:84 axis order).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl BoundingBox {
    /// Create a new bounding box from corner coordinates.
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    /// Parse a query string bbox: "minx,miny,maxx,maxy"
    pub fn from_query_string(s: &str) -> Result<Self, BboxParseError> {
        let values = s
            .split(',')
            .map(|part| {
                part.trim()
                    .parse::<f64>()
                    .map_err(|_| BboxParseError::InvalidNumber(part.to_string()))
            })
            .collect::<Result<Vec<f64>, _>>()?;

        Self::from_slice(&values).ok_or_else(|| BboxParseError::InvalidFormat(s.to_string()))
    }

    /// Build from a STAC bbox array.
    ///
    /// 2D boxes are `[minx, miny, maxx, maxy]`; 3D boxes are
    /// `[minx, miny, minz, maxx, maxy, maxz]` and lose their vertical bounds.
    pub fn from_slice(values: &[f64]) -> Option<Self> {
        match values {
            [min_x, min_y, max_x, max_y] => Some(Self::new(*min_x, *min_y, *max_x, *max_y)),
            [min_x, min_y, _, max_x, max_y, _] => Some(Self::new(*min_x, *min_y, *max_x, *max_y)),
            _ => None,
        }
    }

    /// Width of the bounding box in degrees.
    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    /// Height of the bounding box in degrees.
    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    /// Area in square degrees.
    pub fn area_sq_degrees(&self) -> f64 {
        self.width().abs() * self.height().abs()
    }

    /// Closed polygon ring through the four corners.
    ///
    /// The order is fixed: (minx,miny) → (maxx,miny) → (maxx,maxy) →
    /// (minx,maxy) → (minx,miny).
    pub fn to_polygon_ring(&self) -> Vec<[f64; 2]> {
        vec![
            [self.min_x, self.min_y],
            [self.max_x, self.min_y],
            [self.max_x, self.max_y],
            [self.min_x, self.max_y],
            [self.min_x, self.min_y],
        ]
    }

    /// Smallest box enclosing every position in a ring or line.
    pub fn enclosing(points: &[[f64; 2]]) -> Option<Self> {
        let first = points.first()?;
        let mut bbox = Self::new(first[0], first[1], first[0], first[1]);
        for p in &points[1..] {
            bbox.min_x = bbox.min_x.min(p[0]);
            bbox.min_y = bbox.min_y.min(p[1]);
            bbox.max_x = bbox.max_x.max(p[0]);
            bbox.max_y = bbox.max_y.max(p[1]);
        }
        Some(bbox)
    }

    /// Check if this bbox intersects another (touching edges count).
    pub fn intersects(&self, other: &BoundingBox) -> bool {
        self.min_x <= other.max_x
            && self.max_x >= other.min_x
            && self.min_y <= other.max_y
            && self.max_y >= other.min_y
    }

    /// Check if `other` lies entirely inside this bbox.
    pub fn contains(&self, other: &BoundingBox) -> bool {
        other.min_x >= self.min_x
            && other.max_x <= self.max_x
            && other.min_y >= self.min_y
            && other.max_y <= self.max_y
    }

    /// Check if a point is contained within this bbox.
    pub fn contains_point(&self, x: f64, y: f64) -> bool {
        x >= self.min_x && x <= self.max_x && y >= self.min_y && y <= self.max_y
    }

    /// As a STAC bbox array.
    pub fn to_vec(&self) -> Vec<f64> {
        vec![self.min_x, self.min_y, self.max_x, self.max_y]
    }
}

#[derive(Debug, thiserror::Error)]
pub enum BboxParseError {
    #[error("Invalid BBOX format: {0}. Expected 'minx,miny,maxx,maxy'")]
    InvalidFormat(String),

    #[error("Invalid number in BBOX: {0}")]
    InvalidNumber(String),
}
