use pyo3::exceptions::{PyTypeError, PyValueError};
use pyo3::prelude::*;
use pyo3::types::{PyBool, PyDict, PyFloat, PyInt, PyString};

use crate::config::IndexConfig;
use crate::error::{Field, IndexError};
use crate::index::HierarchicalIndex;
use crate::key::Key;
use crate::record::Record;

impl From<IndexError> for PyErr {
    fn from(err: IndexError) -> PyErr {
        match err {
            IndexError::InvalidFieldType { .. } => PyTypeError::new_err(err.to_string()),
            IndexError::Json(_) => PyValueError::new_err(err.to_string()),
        }
    }
}

/// Convert a Python value to a key. `bool` is rejected even though it
/// subclasses `int`.
fn key_from_py(value: &Bound<'_, PyAny>) -> Option<Key> {
    if value.is_instance_of::<PyBool>() {
        return None;
    }
    if value.is_instance_of::<PyInt>() {
        return match value.extract::<i64>() {
            Ok(v) => Some(Key::Int(v)),
            Err(_) => value.extract::<f64>().ok().map(Key::Float),
        };
    }
    if value.is_instance_of::<PyFloat>() {
        return value.extract::<f64>().ok().map(Key::Float);
    }
    if value.is_instance_of::<PyString>() {
        return value.extract::<String>().ok().map(Key::from);
    }
    None
}

fn type_name(value: &Bound<'_, PyAny>) -> String {
    value
        .get_type()
        .name()
        .map(|name| name.to_string())
        .unwrap_or_else(|_| "object".to_string())
}

fn record_from_py(
    position: usize,
    item: &Bound<'_, PyAny>,
    deepcopy: &Bound<'_, PyAny>,
) -> PyResult<Record<Py<PyAny>>> {
    let dict = item.downcast::<PyDict>().ok();
    let field = |name: &str| match dict {
        Some(dict) => dict.get_item(name),
        None => Ok(None),
    };

    let id = match field("id")? {
        Some(value) => key_from_py(&value)
            .ok_or_else(|| IndexError::invalid(position, Field::Id, type_name(&value)))?,
        None => return Err(IndexError::invalid(position, Field::Id, "missing").into()),
    };

    let parent = match field("parent")? {
        Some(value) if value.is_none() => None,
        Some(value) => Some(
            key_from_py(&value)
                .ok_or_else(|| IndexError::invalid(position, Field::Parent, type_name(&value)))?,
        ),
        None => return Err(IndexError::invalid(position, Field::Parent, "missing").into()),
    };

    // The index keeps its own copy so later edits to the caller's dict do
    // not leak into query results.
    let payload = deepcopy.call1((item,))?.unbind();
    Ok(Record::with_payload(id, parent, payload))
}

/// Python view of a `HierarchicalIndex` over dict records.
#[pyclass(name = "HierarchicalIndex", module = "hierindex", frozen)]
pub struct PyHierarchicalIndex {
    inner: HierarchicalIndex<Py<PyAny>>,
}

impl PyHierarchicalIndex {
    fn payloads(py: Python<'_>, records: Vec<&Record<Py<PyAny>>>) -> Vec<Py<PyAny>> {
        records
            .into_iter()
            .map(|record| record.payload.clone_ref(py))
            .collect()
    }
}

#[pymethods]
impl PyHierarchicalIndex {
    #[new]
    #[pyo3(signature = (items, cache = true))]
    pub fn new(py: Python<'_>, items: Vec<Bound<'_, PyAny>>, cache: bool) -> PyResult<Self> {
        let deepcopy = PyModule::import(py, "copy")?.getattr("deepcopy")?;

        let mut records = Vec::with_capacity(items.len());
        for (position, item) in items.iter().enumerate() {
            records.push(record_from_py(position, item, &deepcopy)?);
        }

        let config = IndexConfig::new()
            .memoize(cache)
            .with_capacity(records.len());
        Ok(Self {
            inner: HierarchicalIndex::from_records_with(config, records),
        })
    }

    pub fn get_all(&self, py: Python<'_>) -> Vec<Py<PyAny>> {
        Self::payloads(py, self.inner.get_all())
    }

    /// Return the record with this id, or None.
    pub fn get_item(&self, py: Python<'_>, id: &Bound<'_, PyAny>) -> Option<Py<PyAny>> {
        let key = key_from_py(id)?;
        self.inner
            .get_item(&key)
            .map(|record| record.payload.clone_ref(py))
    }

    pub fn get_children(&self, py: Python<'_>, id: &Bound<'_, PyAny>) -> Vec<Py<PyAny>> {
        match key_from_py(id) {
            Some(key) => Self::payloads(py, self.inner.get_children(&key)),
            None => Vec::new(),
        }
    }

    pub fn get_all_descendants(&self, py: Python<'_>, id: &Bound<'_, PyAny>) -> Vec<Py<PyAny>> {
        match key_from_py(id) {
            Some(key) => Self::payloads(py, self.inner.get_all_descendants(&key)),
            None => Vec::new(),
        }
    }

    pub fn get_all_ancestors(&self, py: Python<'_>, id: &Bound<'_, PyAny>) -> Vec<Py<PyAny>> {
        match key_from_py(id) {
            Some(key) => Self::payloads(py, self.inner.get_all_ancestors(&key)),
            None => Vec::new(),
        }
    }

    pub fn roots(&self, py: Python<'_>) -> Vec<Py<PyAny>> {
        Self::payloads(py, self.inner.roots())
    }

    fn __len__(&self) -> usize {
        self.inner.len()
    }

    fn __contains__(&self, id: &Bound<'_, PyAny>) -> bool {
        key_from_py(id).is_some_and(|key| self.inner.contains(&key))
    }

    fn __repr__(&self) -> String {
        format!("HierarchicalIndex(len={})", self.inner.len())
    }
}
