//! CoverageJSON types for cube query responses.
//!
//! A coverage carries a domain (axis value arrays) and one entry per data
//! variable. Parameters hold the variable description, a unit placeholder and
//! the flattened values; `ranges` repeats the values as NdArrays with shape
//! and axis names so CoverageJSON readers can walk them.
//!
//! See: <https://covjson.org/>

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// EPSG:4326 identifier used for the horizontal axes.
pub const EPSG_4326: &str = "http://www.opengis.net/def/crs/EPSG/0/4326";

/// Unit placeholder for parameters whose unit is not known.
pub const UNKNOWN_UNIT: &str = "Unknown";

/// A single coverage document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CoverageDocument {
    /// Document type (always "Coverage").
    #[serde(rename = "type")]
    pub type_: CoverageType,

    /// The domain defining the coverage's spatial/temporal extent.
    pub domain: Domain,

    /// Parameters keyed by variable name.
    pub parameters: BTreeMap<String, CoverageParameter>,

    /// Data ranges keyed by variable name.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub ranges: BTreeMap<String, NdArray>,
}

impl CoverageDocument {
    /// Create an empty coverage over the given domain.
    pub fn new(domain: Domain) -> Self {
        Self {
            type_: CoverageType::Coverage,
            domain,
            parameters: BTreeMap::new(),
            ranges: BTreeMap::new(),
        }
    }

    /// Add a parameter and its range.
    pub fn with_parameter(
        mut self,
        name: &str,
        values: Vec<Option<f64>>,
        shape: Vec<usize>,
        axis_names: Vec<String>,
    ) -> Self {
        self.ranges.insert(
            name.to_string(),
            NdArray::new(values.clone(), shape, axis_names),
        );
        self.parameters
            .insert(name.to_string(), CoverageParameter::new(name, values));
        self
    }

    /// Values of a domain axis, if present.
    pub fn axis_values(&self, axis: &str) -> Option<&[AxisValue]> {
        self.domain.axes.get(axis).map(|a| a.values.as_slice())
    }
}

/// Coverage type.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum CoverageType {
    /// Single coverage.
    Coverage,
    /// Collection of coverages.
    CoverageCollection,
}

/// A collection of coverages sharing one domain type.
///
/// Returned by the cube endpoint when a query matched no catalog items, so
/// callers always receive a schema-shaped document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CoverageCollection {
    #[serde(rename = "type")]
    pub type_: CoverageType,

    #[serde(rename = "domainType")]
    pub domain_type: DomainType,

    pub coverages: Vec<CoverageDocument>,

    pub parameters: BTreeMap<String, CoverageParameter>,

    pub referencing: Vec<ReferenceSystemConnection>,
}

impl CoverageCollection {
    /// An empty grid collection.
    pub fn empty() -> Self {
        Self {
            type_: CoverageType::CoverageCollection,
            domain_type: DomainType::Grid,
            coverages: Vec::new(),
            parameters: BTreeMap::new(),
            referencing: default_referencing(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.coverages.is_empty()
    }
}

/// The domain of a coverage.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Domain {
    /// Domain type (always "Domain").
    #[serde(rename = "type")]
    pub type_: String,

    /// The domain type (Grid, etc.).
    #[serde(rename = "domainType")]
    pub domain_type: DomainType,

    /// Axis definitions.
    pub axes: BTreeMap<String, Axis>,

    /// Reference systems for axes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub referencing: Option<Vec<ReferenceSystemConnection>>,
}

impl Domain {
    /// Create a grid domain from explicit x/y/z/t axis values.
    pub fn grid(
        x_values: Vec<f64>,
        y_values: Vec<f64>,
        z_values: Vec<f64>,
        t_values: Vec<String>,
    ) -> Self {
        let mut axes = BTreeMap::new();
        axes.insert("x".to_string(), Axis::floats(x_values));
        axes.insert("y".to_string(), Axis::floats(y_values));
        axes.insert("z".to_string(), Axis::floats(z_values));
        axes.insert(
            "t".to_string(),
            Axis {
                values: t_values.into_iter().map(AxisValue::String).collect(),
            },
        );

        Self {
            type_: "Domain".to_string(),
            domain_type: DomainType::Grid,
            axes,
            referencing: Some(default_referencing()),
        }
    }
}

/// Referencing for x/y (EPSG:4326), z (vertical) and t (Gregorian).
pub fn default_referencing() -> Vec<ReferenceSystemConnection> {
    vec![
        ReferenceSystemConnection {
            coordinates: vec!["x".to_string(), "y".to_string()],
            system: ReferenceSystem::Geographic {
                id: EPSG_4326.to_string(),
            },
        },
        ReferenceSystemConnection {
            coordinates: vec!["z".to_string()],
            system: ReferenceSystem::Vertical {
                id: "altitude".to_string(),
            },
        },
        ReferenceSystemConnection {
            coordinates: vec!["t".to_string()],
            system: ReferenceSystem::Temporal {
                calendar: "Gregorian".to_string(),
            },
        },
    ]
}

/// Domain types supported by CoverageJSON.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum DomainType {
    /// Point (0D).
    Point,
    /// Grid (2D or higher).
    Grid,
}

/// An axis in the domain.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Axis {
    /// Explicit list of values in storage order.
    pub values: Vec<AxisValue>,
}

impl Axis {
    /// Axis of floating-point coordinates.
    pub fn floats(values: Vec<f64>) -> Self {
        Self {
            values: values.into_iter().map(AxisValue::Float).collect(),
        }
    }

    /// Get the number of values in this axis.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check if axis is empty.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// A value on an axis.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum AxisValue {
    /// Floating-point value (coordinates, levels).
    Float(f64),
    /// String value (timestamps).
    String(String),
}

impl AxisValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            AxisValue::String(s) => Some(s),
            AxisValue::Float(_) => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            AxisValue::Float(v) => Some(*v),
            AxisValue::String(_) => None,
        }
    }
}

/// Connection between axes and their reference system.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReferenceSystemConnection {
    /// Axes that use this reference system.
    pub coordinates: Vec<String>,

    /// The reference system.
    pub system: ReferenceSystem,
}

/// Reference system definitions.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum ReferenceSystem {
    /// Geographic coordinate reference system.
    #[serde(rename = "GeographicCRS")]
    Geographic {
        /// CRS identifier URI.
        id: String,
    },

    /// Temporal reference system.
    #[serde(rename = "TemporalRS")]
    Temporal {
        /// Calendar system (e.g., "Gregorian").
        calendar: String,
    },

    /// Vertical reference system.
    #[serde(rename = "VerticalCRS")]
    Vertical {
        /// CRS identifier.
        id: String,
    },
}

/// A data variable in a coverage.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CoverageParameter {
    /// Type (always "Parameter").
    #[serde(rename = "type")]
    pub type_: String,

    /// Description; the variable name.
    pub description: String,

    /// Unit of measurement, [`UNKNOWN_UNIT`] unless supplied elsewhere.
    pub unit: String,

    /// Flattened values in the dataset's native iteration order.
    pub values: Vec<Option<f64>>,
}

impl CoverageParameter {
    /// Create a parameter described by its own name.
    pub fn new(name: impl Into<String>, values: Vec<Option<f64>>) -> Self {
        Self {
            type_: "Parameter".to_string(),
            description: name.into(),
            unit: UNKNOWN_UNIT.to_string(),
            values,
        }
    }

    /// Set the unit.
    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = unit.into();
        self
    }
}

/// N-dimensional array containing data values.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NdArray {
    /// Type (always "NdArray").
    #[serde(rename = "type")]
    pub type_: String,

    /// Data type of values.
    #[serde(rename = "dataType")]
    pub data_type: String,

    /// Names of axes in order.
    #[serde(rename = "axisNames")]
    pub axis_names: Vec<String>,

    /// Shape of the array.
    pub shape: Vec<usize>,

    /// The data values (null for missing data).
    pub values: Vec<Option<f64>>,
}

impl NdArray {
    /// Create an N-dimensional float array.
    pub fn new(values: Vec<Option<f64>>, shape: Vec<usize>, axis_names: Vec<String>) -> Self {
        Self {
            type_: "NdArray".to_string(),
            data_type: "float".to_string(),
            axis_names,
            shape,
            values,
        }
    }
}
