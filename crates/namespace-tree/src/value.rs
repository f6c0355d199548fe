//! Dynamic values stored in property binders.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A value that can be stored in a property binder.
///
/// Scripted-value and script binders keep their source text as a
/// [`PropValue::String`]; the evaluator turns it into a concrete value on
/// demand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropValue {
    /// A null/empty value.
    Null,
    /// A boolean value.
    Bool(bool),
    /// A 64-bit signed integer.
    Integer(i64),
    /// A 64-bit floating point number.
    Float(f64),
    /// A string value, or script source text.
    String(String),
    /// An ordered list of values.
    List(Vec<PropValue>),
    /// A string-keyed map of values.
    Map(BTreeMap<String, PropValue>),
}

impl PropValue {
    /// Returns true if this is the null value.
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Get as boolean.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Get as integer.
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Self::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Get as float. Integers are widened.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Self::Float(f) => Some(*f),
            Self::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    /// Get as string slice.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Get as list.
    pub fn as_list(&self) -> Option<&[PropValue]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    /// Get as map.
    pub fn as_map(&self) -> Option<&BTreeMap<String, PropValue>> {
        match self {
            Self::Map(map) => Some(map),
            _ => None,
        }
    }
}

impl Default for PropValue {
    fn default() -> Self {
        Self::Null
    }
}

/// The string form used by the built-in string conversion.
///
/// Strings render bare; nested strings inside lists and maps are quoted.
impl fmt::Display for PropValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => Ok(()),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Integer(i) => write!(f, "{i}"),
            Self::Float(x) => write!(f, "{x}"),
            Self::String(s) => f.write_str(s),
            Self::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write_nested(f, item)?;
                }
                f.write_str("]")
            }
            Self::Map(map) => {
                f.write_str("{")?;
                for (i, (key, item)) in map.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{key:?}: ")?;
                    write_nested(f, item)?;
                }
                f.write_str("}")
            }
        }
    }
}

fn write_nested(f: &mut fmt::Formatter<'_>, value: &PropValue) -> fmt::Result {
    match value {
        PropValue::String(s) => write!(f, "{s:?}"),
        PropValue::Null => f.write_str("null"),
        other => write!(f, "{other}"),
    }
}

impl From<bool> for PropValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i32> for PropValue {
    fn from(v: i32) -> Self {
        Self::Integer(v as i64)
    }
}

impl From<i64> for PropValue {
    fn from(v: i64) -> Self {
        Self::Integer(v)
    }
}

impl From<f64> for PropValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<String> for PropValue {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

impl From<&str> for PropValue {
    fn from(v: &str) -> Self {
        Self::String(v.to_string())
    }
}

impl<T: Into<PropValue>> From<Vec<T>> for PropValue {
    fn from(v: Vec<T>) -> Self {
        Self::List(v.into_iter().map(Into::into).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_scalars() {
        assert_eq!(PropValue::Null.to_string(), "");
        assert_eq!(PropValue::from(true).to_string(), "true");
        assert_eq!(PropValue::from(42).to_string(), "42");
        assert_eq!(PropValue::from(1.5).to_string(), "1.5");
        assert_eq!(PropValue::from("abc").to_string(), "abc");
    }

    #[test]
    fn test_display_nested() {
        let list = PropValue::from(vec![PropValue::from("a"), PropValue::from(2), PropValue::Null]);
        assert_eq!(list.to_string(), "[\"a\", 2, null]");

        let mut map = BTreeMap::new();
        map.insert("k".to_string(), PropValue::from("v"));
        assert_eq!(PropValue::Map(map).to_string(), "{\"k\": \"v\"}");
    }

    #[test]
    fn test_accessors() {
        assert_eq!(PropValue::from(3).as_integer(), Some(3));
        assert_eq!(PropValue::from(3).as_float(), Some(3.0));
        assert_eq!(PropValue::from("x").as_str(), Some("x"));
        assert!(PropValue::default().is_null());
        assert_eq!(PropValue::from(1.0).as_integer(), None);
    }

    #[test]
    fn test_serde_untagged() {
        let value = PropValue::from(vec![PropValue::from(1), PropValue::from("two")]);
        let json = serde_json::to_string(&value).unwrap();
        assert_eq!(json, "[1,\"two\"]");
        let back: PropValue = serde_json::from_str(&json).unwrap();
        assert_eq!(back, value);
    }
}
