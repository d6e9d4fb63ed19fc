use serde::{Serialize, Serializer};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// Identifier of a record: either a number or a string.
///
/// Numbers compare by value, so `Key::Int(1)` and `Key::Float(1.0)` are the
/// same key and `-0.0` equals `0`. NaN is equal to itself so it can still be
/// used as a lookup key. Numbers and strings never compare equal.
#[derive(Debug, Clone)]
pub enum Key {
    Int(i64),
    Float(f64),
    String(Arc<str>),
}

/// Normalised view used by both `Eq` and `Hash` so the two always agree.
#[derive(PartialEq, Eq, Hash)]
enum Canonical<'a> {
    Int(i64),
    FloatBits(u64),
    Str(&'a str),
}

// 2^63, the first float past the i64 range.
const I64_BOUND: f64 = 9_223_372_036_854_775_808.0;

impl Key {
    fn canonical(&self) -> Canonical<'_> {
        match self {
            Key::Int(v) => Canonical::Int(*v),
            Key::Float(v) => {
                if v.is_nan() {
                    Canonical::FloatBits(f64::NAN.to_bits())
                } else if v.fract() == 0.0 && *v >= -I64_BOUND && *v < I64_BOUND {
                    Canonical::Int(*v as i64)
                } else {
                    Canonical::FloatBits(v.to_bits())
                }
            }
            Key::String(s) => Canonical::Str(s),
        }
    }

    pub fn is_number(&self) -> bool {
        !matches!(self, Key::String(_))
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Key::String(s) => Some(s),
            _ => None,
        }
    }
}

impl PartialEq for Key {
    fn eq(&self, other: &Self) -> bool {
        self.canonical() == other.canonical()
    }
}

impl Eq for Key {}

impl Hash for Key {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.canonical().hash(state);
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Int(v) => write!(f, "{v}"),
            Key::Float(v) => write!(f, "{v}"),
            Key::String(s) => write!(f, "{s:?}"),
        }
    }
}

impl Serialize for Key {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Key::Int(v) => serializer.serialize_i64(*v),
            Key::Float(v) => serializer.serialize_f64(*v),
            Key::String(s) => serializer.serialize_str(s),
        }
    }
}

impl From<i32> for Key {
    fn from(v: i32) -> Self {
        Key::Int(v.into())
    }
}

impl From<u32> for Key {
    fn from(v: u32) -> Self {
        Key::Int(v.into())
    }
}

impl From<i64> for Key {
    fn from(v: i64) -> Self {
        Key::Int(v)
    }
}

impl From<u64> for Key {
    fn from(v: u64) -> Self {
        match i64::try_from(v) {
            Ok(v) => Key::Int(v),
            Err(_) => Key::Float(v as f64),
        }
    }
}

impl From<f64> for Key {
    fn from(v: f64) -> Self {
        Key::Float(v)
    }
}

impl From<&str> for Key {
    fn from(v: &str) -> Self {
        Key::String(Arc::from(v))
    }
}

impl From<String> for Key {
    fn from(v: String) -> Self {
        Key::String(Arc::from(v))
    }
}

impl From<Arc<str>> for Key {
    fn from(v: Arc<str>) -> Self {
        Key::String(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_key_equality() {
        assert_eq!(Key::Int(42), Key::Int(42));
        assert_ne!(Key::Int(42), Key::Int(43));
        assert_eq!(Key::from("hello"), Key::from("hello".to_string()));
        assert_ne!(Key::from("hello"), Key::from("world"));
    }

    #[test]
    fn test_numbers_compare_by_value() {
        assert_eq!(Key::Int(1), Key::Float(1.0));
        assert_eq!(Key::Int(0), Key::Float(-0.0));
        assert_eq!(Key::Float(f64::NAN), Key::Float(f64::NAN));
        assert_ne!(Key::Float(1.5), Key::Int(1));
        assert_eq!(Key::from(u64::MAX), Key::Float(u64::MAX as f64));
    }

    #[test]
    fn test_numbers_and_strings_not_equal() {
        assert_ne!(Key::Int(1), Key::from("1"));
        assert_ne!(Key::Float(1.5), Key::from("1.5"));
    }

    #[test]
    fn test_key_hash_agrees_with_eq() {
        let mut set = HashSet::new();
        set.insert(Key::Int(7));
        set.insert(Key::from("seven"));

        assert!(set.contains(&Key::Float(7.0)));
        assert!(set.contains(&Key::from("seven")));
        assert!(!set.contains(&Key::from("7")));
        assert!(!set.contains(&Key::Float(7.5)));
    }

    #[test]
    fn test_display_and_serialize() {
        assert_eq!(Key::Int(3).to_string(), "3");
        assert_eq!(Key::from("root").to_string(), "\"root\"");
        assert_eq!(serde_json::to_string(&Key::Int(3)).unwrap(), "3");
        assert_eq!(serde_json::to_string(&Key::from("a")).unwrap(), "\"a\"");
    }
}
