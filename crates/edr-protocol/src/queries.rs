//! Query parameter parsing for the cube endpoint.
//!
//! Cube requests carry `bbox`, `z`, `datetime`, `parameter-name` and `f`
//! as raw strings; this module validates them into typed queries.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur when parsing query coordinates.
#[derive(Debug, Error, PartialEq)]
pub enum CoordinateParseError {
    /// Malformed parameter layout.
    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    /// Invalid coordinate value.
    #[error("Invalid coordinate value: {0}")]
    InvalidCoordinate(String),

    /// Missing required coordinate.
    #[error("Missing required coordinate: {0}")]
    MissingCoordinate(String),

    /// Coordinate out of valid range.
    #[error("Coordinate out of range: {0}")]
    OutOfRange(String),
}

fn parse_number(s: &str) -> Result<f64, CoordinateParseError> {
    s.trim()
        .parse::<f64>()
        .map_err(|_| CoordinateParseError::InvalidCoordinate(s.to_string()))
}

/// Validate longitude and latitude ranges.
pub fn validate_coordinates(lon: f64, lat: f64) -> Result<(), CoordinateParseError> {
    if !(-180.0..=180.0).contains(&lon) {
        return Err(CoordinateParseError::OutOfRange(format!(
            "Longitude {} must be between -180 and 180",
            lon
        )));
    }
    if !(-90.0..=90.0).contains(&lat) {
        return Err(CoordinateParseError::OutOfRange(format!(
            "Latitude {} must be between -90 and 90",
            lat
        )));
    }
    Ok(())
}

/// Bounding box query parameters.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct BboxQuery {
    /// Western longitude.
    pub west: f64,

    /// Southern latitude.
    pub south: f64,

    /// Eastern longitude.
    pub east: f64,

    /// Northern latitude.
    pub north: f64,
}

impl BboxQuery {
    /// Parse a bbox parameter.
    ///
    /// Format: `west,south,east,north`
    pub fn parse(bbox: &str) -> Result<Self, CoordinateParseError> {
        let parts: Vec<&str> = bbox.split(',').collect();
        if parts.len() != 4 {
            return Err(CoordinateParseError::InvalidFormat(format!(
                "Expected 4 values for bbox, got {}",
                parts.len()
            )));
        }

        let west = parse_number(parts[0])?;
        let south = parse_number(parts[1])?;
        let east = parse_number(parts[2])?;
        let north = parse_number(parts[3])?;

        validate_coordinates(west, south)?;
        validate_coordinates(east, north)?;

        if south > north {
            return Err(CoordinateParseError::OutOfRange(
                "South must be less than or equal to north".to_string(),
            ));
        }

        Ok(BboxQuery {
            west,
            south,
            east,
            north,
        })
    }

    /// Calculate the area of the bbox in square degrees.
    pub fn area_sq_degrees(&self) -> f64 {
        let width = if self.east >= self.west {
            self.east - self.west
        } else {
            // Antimeridian crossing
            (180.0 - self.west) + (self.east + 180.0)
        };
        width * (self.north - self.south)
    }

    /// As a `[west, south, east, north]` array for catalog searches.
    pub fn to_vec(&self) -> Vec<f64> {
        vec![self.west, self.south, self.east, self.north]
    }
}

/// Vertical selection for the `z` parameter.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum VerticalQuery {
    /// Explicit levels: `850` or `850,700,500`.
    Levels(Vec<f64>),

    /// Inclusive range: `0/1000`. Bounds may be given in either order.
    Range { from: f64, to: f64 },
}

impl VerticalQuery {
    /// Parse a vertical level parameter.
    pub fn parse(z_param: &str) -> Result<Self, CoordinateParseError> {
        let z_param = z_param.trim();

        if let Some((from, to)) = z_param.split_once('/') {
            if to.contains('/') {
                return Err(CoordinateParseError::InvalidFormat(
                    "Invalid z range format, expected from/to".to_string(),
                ));
            }
            return Ok(VerticalQuery::Range {
                from: parse_number(from)?,
                to: parse_number(to)?,
            });
        }

        let levels = z_param
            .split(',')
            .map(parse_number)
            .collect::<Result<Vec<f64>, _>>()?;

        Ok(VerticalQuery::Levels(levels))
    }

    /// Whether a level on the z axis is selected.
    pub fn matches(&self, z: f64) -> bool {
        match self {
            VerticalQuery::Levels(levels) => levels.iter().any(|l| (l - z).abs() < 1e-6),
            VerticalQuery::Range { from, to } => {
                let (lo, hi) = if from <= to { (*from, *to) } else { (*to, *from) };
                z >= lo && z <= hi
            }
        }
    }
}

/// Datetime query specification.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum DateTimeQuery {
    /// A specific instant.
    Instant(String),

    /// An interval; `None` marks an open (`..`) end.
    Interval {
        start: Option<String>,
        end: Option<String>,
    },
}

impl DateTimeQuery {
    fn validate_datetime(dt: &str) -> Result<(), CoordinateParseError> {
        if chrono::DateTime::parse_from_rfc3339(dt).is_ok()
            || chrono::NaiveDateTime::parse_from_str(dt, "%Y-%m-%dT%H:%M:%S").is_ok()
            || chrono::NaiveDate::parse_from_str(dt, "%Y-%m-%d").is_ok()
        {
            return Ok(());
        }

        Err(CoordinateParseError::InvalidFormat(format!(
            "Invalid datetime format '{}'. Expected ISO 8601 format (e.g., 2024-02-01T00:00:00Z)",
            dt
        )))
    }

    fn parse_bound(bound: &str) -> Result<Option<String>, CoordinateParseError> {
        let bound = bound.trim();
        if bound == ".." || bound.is_empty() {
            return Ok(None);
        }
        Self::validate_datetime(bound)?;
        Ok(Some(bound.to_string()))
    }

    /// Parse a datetime parameter.
    ///
    /// Accepts an instant (`2024-02-01T00:00:00Z`), an interval
    /// (`2024-02-01T00:00:00Z/2024-02-29T00:00:00Z`) or an interval with
    /// one open end (`../2024-02-29T00:00:00Z`).
    pub fn parse(datetime: &str) -> Result<Self, CoordinateParseError> {
        let datetime = datetime.trim();

        match datetime.split_once('/') {
            Some((start, end)) => {
                if end.contains('/') {
                    return Err(CoordinateParseError::InvalidFormat(
                        "Invalid datetime interval format".to_string(),
                    ));
                }
                let start = Self::parse_bound(start)?;
                let end = Self::parse_bound(end)?;
                if start.is_none() && end.is_none() {
                    return Err(CoordinateParseError::InvalidFormat(
                        "Interval needs at least one bound".to_string(),
                    ));
                }
                Ok(DateTimeQuery::Interval { start, end })
            }
            None => {
                Self::validate_datetime(datetime)?;
                Ok(DateTimeQuery::Instant(datetime.to_string()))
            }
        }
    }
}

/// Parse the `parameter-name` query parameter.
pub fn parse_parameter_names(param: &str) -> Vec<String> {
    param
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// A validated cube query.
#[derive(Debug, Clone, PartialEq)]
pub struct CubeQuery {
    pub bbox: BboxQuery,
    pub z: Option<VerticalQuery>,
    /// The datetime as sent; forwarded to the catalog verbatim.
    pub datetime: Option<String>,
    pub parameter_names: Vec<String>,
}

impl CubeQuery {
    /// Validate raw cube parameters.
    ///
    /// `default_parameters` applies when `parameter-name` is absent or empty.
    pub fn parse(
        bbox: Option<&str>,
        z: Option<&str>,
        datetime: Option<&str>,
        parameter_name: Option<&str>,
        default_parameters: &[String],
    ) -> Result<Self, CoordinateParseError> {
        let bbox = bbox
            .ok_or_else(|| CoordinateParseError::MissingCoordinate("bbox".to_string()))
            .and_then(BboxQuery::parse)?;

        let z = z
            .filter(|s| !s.trim().is_empty())
            .map(VerticalQuery::parse)
            .transpose()?;

        let datetime = match datetime.filter(|s| !s.trim().is_empty()) {
            Some(dt) => {
                DateTimeQuery::parse(dt)?;
                Some(dt.trim().to_string())
            }
            None => None,
        };

        let mut parameter_names = parameter_name
            .map(parse_parameter_names)
            .unwrap_or_default();
        if parameter_names.is_empty() {
            parameter_names = default_parameters.to_vec();
        }

        Ok(Self {
            bbox,
            z,
            datetime,
            parameter_names,
        })
    }
}
