//! Error types for dataset assembly.

use thiserror::Error;

/// Errors that can occur while building, merging or reshaping datasets.
#[derive(Error, Debug, PartialEq)]
pub enum DatasetError {
    /// Value count does not match the product of the dimension lengths.
    #[error("variable '{variable}' has {actual} values, its dimensions need {expected}")]
    ShapeMismatch {
        variable: String,
        expected: usize,
        actual: usize,
    },

    /// A dimension appears twice in one variable.
    #[error("variable '{0}' repeats a dimension")]
    DuplicateDimension(String),

    /// A named variable is absent.
    #[error("variable not found: {0}")]
    VariableNotFound(String),

    /// A rename target already names another variable.
    #[error("variable '{0}' already exists")]
    NameConflict(String),

    /// The source item carries no usable model tag.
    #[error("item '{0}' has no model property")]
    MissingModel(String),

    /// Two inputs disagree on a value or a variable layout.
    #[error("merge conflict on '{variable}': {detail}")]
    MergeConflict { variable: String, detail: String },
}

/// Result type for dataset operations.
pub type Result<T> = std::result::Result<T, DatasetError>;
