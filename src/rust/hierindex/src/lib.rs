//! Read-only parent/child index over flat, parent-referencing records.
//!
//! A [`HierarchicalIndex`] is built once from a list of records, each with an
//! `id` and an optional `parent`, and then answers lookups by id, direct
//! children, pre-order descendants and the ancestor chain.

mod cache;
pub mod config;
pub mod display;
pub mod error;
pub mod index;
pub mod key;
#[cfg(feature = "python")]
pub mod python;
pub mod record;

pub use config::IndexConfig;
pub use display::records_table;
pub use error::{Field, IndexError, Result};
pub use index::HierarchicalIndex;
pub use key::Key;
pub use record::{Attributes, IntoRecord, Record};

#[cfg(feature = "python")]
use pyo3::prelude::*;

/// Python bindings for the index.
#[cfg(feature = "python")]
#[pymodule]
fn _hierindex(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<python::PyHierarchicalIndex>()?;
    Ok(())
}
