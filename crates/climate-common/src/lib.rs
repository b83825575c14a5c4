//! Common types and utilities shared across the climate data services.

pub mod bbox;
pub mod error;
pub mod time;

pub use bbox::BoundingBox;
pub use error::{ClimateError, ClimateResult};
pub use time::{month_buckets, parse_datetime_range, TimeRange};
