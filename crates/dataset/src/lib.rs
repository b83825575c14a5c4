//! Labelled forecast datasets.
//!
//! A [`Dataset`] holds longitude/latitude/altitude/time axes and named
//! variables flattened row-major over a subset of those axes. Datasets read
//! from several catalog items are combined with [`merge_datasets`] and
//! rendered with [`encode_coverage`].
//!
//! ```text
//! item A ─► Dataset ─┐
//!                    ├─► merge_datasets (rename VAR → VAR_<model>, outer join)
//! item B ─► Dataset ─┘         │
//!                              ▼
//!                      encode_coverage ─► CoverageJSON
//! ```

pub mod encode;
pub mod error;
pub mod merge;
pub mod types;

pub use encode::encode_coverage;
pub use error::{DatasetError, Result};
pub use merge::{merge_datasets, tagged_name, MergeOutcome, TaggedDataset};
pub use types::{AxisIndex, Dataset, Dim, Variable};
