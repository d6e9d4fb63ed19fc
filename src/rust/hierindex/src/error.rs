//! Error types for index construction

use std::fmt;
use thiserror::Error;

/// Result type for index construction
pub type Result<T> = std::result::Result<T, IndexError>;

/// The record field a validation error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Id,
    Parent,
}

impl Field {
    /// The accepted types, phrased for error messages.
    pub fn expectation(self) -> &'static str {
        match self {
            Field::Id => "a number or a string",
            Field::Parent => "a number, a string or null",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Field::Id => f.write_str("id"),
            Field::Parent => f.write_str("parent"),
        }
    }
}

/// Errors that can occur while building an index
#[derive(Debug, Error)]
pub enum IndexError {
    /// A record's `id` or `parent` has a type the index cannot key on
    #[error("Item {field} must be {}, got {found} (record {position})", .field.expectation())]
    InvalidFieldType {
        position: usize,
        field: Field,
        found: String,
    },

    /// Input text was not a JSON array
    #[error("invalid JSON input: {0}")]
    Json(#[from] serde_json::Error),
}

impl IndexError {
    pub(crate) fn invalid(position: usize, field: Field, found: impl Into<String>) -> Self {
        IndexError::InvalidFieldType {
            position,
            field,
            found: found.into(),
        }
    }

    /// The offending field, for type-validation failures.
    pub fn field(&self) -> Option<Field> {
        match self {
            IndexError::InvalidFieldType { field, .. } => Some(*field),
            IndexError::Json(_) => None,
        }
    }
}
