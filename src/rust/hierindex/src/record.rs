use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::{Field, IndexError, Result};
use crate::key::Key;

/// Opaque attributes carried alongside `id` and `parent`.
pub type Attributes = Map<String, Value>;

/// One node of the hierarchy. Only `id` and `parent` are interpreted by the
/// index; `payload` is carried through untouched.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Record<P = Attributes> {
    pub id: Key,
    pub parent: Option<Key>,
    #[serde(flatten)]
    pub payload: P,
}

impl<P> Record<P> {
    pub fn with_payload(id: impl Into<Key>, parent: Option<Key>, payload: P) -> Self {
        Record {
            id: id.into(),
            parent,
            payload,
        }
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }
}

impl Record<Attributes> {
    pub fn new(id: impl Into<Key>, parent: Option<Key>) -> Self {
        Record::with_payload(id, parent, Attributes::new())
    }

    pub fn with_attribute(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.payload.insert(name.to_string(), value.into());
        self
    }

    pub fn attribute(&self, name: &str) -> Option<&Value> {
        self.payload.get(name)
    }

    /// Validate a JSON object and split it into key fields and attributes.
    ///
    /// `id` must be a number or string and `parent` a number, string or
    /// null. A value that is not an object has no `id` and fails on that field.
    pub fn from_json(position: usize, value: Value) -> Result<Self> {
        let mut payload = match value {
            Value::Object(map) => map,
            _ => return Err(IndexError::invalid(position, Field::Id, "missing")),
        };

        let id = match payload.shift_remove("id") {
            Some(value) => json_key(&value)
                .ok_or_else(|| IndexError::invalid(position, Field::Id, json_kind(&value)))?,
            None => return Err(IndexError::invalid(position, Field::Id, "missing")),
        };

        let parent = match payload.shift_remove("parent") {
            Some(Value::Null) => None,
            Some(value) => Some(
                json_key(&value)
                    .ok_or_else(|| IndexError::invalid(position, Field::Parent, json_kind(&value)))?,
            ),
            None => return Err(IndexError::invalid(position, Field::Parent, "missing")),
        };

        Ok(Record { id, parent, payload })
    }
}

/// Conversion of caller input into an indexable record.
///
/// Already-typed records convert infallibly; dynamic inputs validate the
/// types of `id` and `parent` and report the record's position on failure.
pub trait IntoRecord<P> {
    fn into_record(self, position: usize) -> Result<Record<P>>;
}

impl<P> IntoRecord<P> for Record<P> {
    fn into_record(self, _position: usize) -> Result<Record<P>> {
        Ok(self)
    }
}

impl IntoRecord<Attributes> for Value {
    fn into_record(self, position: usize) -> Result<Record<Attributes>> {
        Record::from_json(position, self)
    }
}

fn json_key(value: &Value) -> Option<Key> {
    match value {
        Value::Number(n) => Some(match n.as_i64() {
            Some(v) => Key::Int(v),
            None => match n.as_u64() {
                Some(v) => Key::from(v),
                None => Key::Float(n.as_f64()?),
            },
        }),
        Value::String(s) => Some(Key::from(s.as_str())),
        _ => None,
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_record_creation() {
        let record = Record::new(1, None).with_attribute("type", "test");

        assert_eq!(record.id, Key::Int(1));
        assert!(record.is_root());
        assert_eq!(record.attribute("type"), Some(&json!("test")));
        assert_eq!(record.attribute("missing"), None);
    }

    #[test]
    fn test_from_json_splits_payload() {
        let record =
            Record::from_json(0, json!({"id": 2, "parent": "root", "type": null})).unwrap();

        assert_eq!(record.id, Key::Int(2));
        assert_eq!(record.parent, Some(Key::from("root")));
        assert_eq!(record.payload.len(), 1);
        assert_eq!(record.attribute("type"), Some(&Value::Null));
    }

    #[test]
    fn test_from_json_accepts_float_and_string_ids() {
        let record = Record::from_json(0, json!({"id": 1.5, "parent": null})).unwrap();
        assert_eq!(record.id, Key::Float(1.5));

        let record = Record::from_json(0, json!({"id": "a", "parent": 1})).unwrap();
        assert_eq!(record.id, Key::from("a"));
        assert_eq!(record.parent, Some(Key::Int(1)));
    }

    #[test]
    fn test_from_json_rejects_bad_id() {
        let err = Record::from_json(3, json!({"id": true, "parent": null})).unwrap_err();
        assert_eq!(err.field(), Some(Field::Id));
        assert!(err.to_string().contains("got boolean"));
        assert!(err.to_string().contains("record 3"));

        let err = Record::from_json(0, json!({"id": {"nested": 1}, "parent": null})).unwrap_err();
        assert!(err.to_string().contains("got object"));

        let err = Record::from_json(0, json!({"parent": null})).unwrap_err();
        assert_eq!(err.field(), Some(Field::Id));
        assert!(err.to_string().contains("got missing"));

        let err = Record::from_json(0, json!(42)).unwrap_err();
        assert_eq!(err.field(), Some(Field::Id));
    }

    #[test]
    fn test_from_json_rejects_bad_parent() {
        let err = Record::from_json(0, json!({"id": 1, "parent": [1, 2]})).unwrap_err();
        assert_eq!(err.field(), Some(Field::Parent));
        assert!(err.to_string().contains("got array"));

        let err = Record::from_json(0, json!({"id": 1})).unwrap_err();
        assert_eq!(err.field(), Some(Field::Parent));
    }

    #[test]
    fn test_from_json_keeps_attribute_order() {
        let record = Record::from_json(
            0,
            json!({"id": 1, "a": 1, "parent": null, "b": 2, "c": 3}),
        )
        .unwrap();

        let names: Vec<&str> = record.payload.keys().map(String::as_str).collect();
        assert_eq!(names, vec!["a", "b", "c"]);
        assert_eq!(
            serde_json::to_string(&record).unwrap(),
            r#"{"id":1,"parent":null,"a":1,"b":2,"c":3}"#
        );
    }

    #[test]
    fn test_serialize_flattens_payload() {
        let record = Record::new("a", Some(Key::Int(1))).with_attribute("type", "test");
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value, json!({"id": "a", "parent": 1, "type": "test"}));
    }
}
