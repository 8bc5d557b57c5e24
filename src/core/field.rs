//! Strongly typed key/value pairs attached to log records

use serde::{Deserialize, Serialize};
use std::fmt;

/// Key of the default console-display field, always present in the console
/// allow-list.
pub const CONSOLE_FIELD: &str = "console";

/// Value of a structured logging field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    String(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    /// Textual representation of an error value.
    Error(String),
    /// Arbitrary nested structure, encoded verbatim.
    Nested(serde_json::Value),
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::String(s) => write!(f, "{}", s),
            FieldValue::Int(i) => write!(f, "{}", i),
            FieldValue::Float(fl) => write!(f, "{}", fl),
            FieldValue::Bool(b) => write!(f, "{}", b),
            FieldValue::Error(e) => write!(f, "{}", e),
            FieldValue::Nested(v) => write!(f, "{}", v),
        }
    }
}

impl FieldValue {
    /// Convert to serde_json::Value for record encoding
    #[must_use]
    pub fn to_json_value(&self) -> serde_json::Value {
        match self {
            FieldValue::String(s) => serde_json::Value::String(s.clone()),
            FieldValue::Int(i) => serde_json::Value::Number((*i).into()),
            FieldValue::Float(f) => serde_json::Number::from_f64(*f)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            FieldValue::Bool(b) => serde_json::Value::Bool(*b),
            FieldValue::Error(e) => serde_json::Value::String(e.clone()),
            FieldValue::Nested(v) => v.clone(),
        }
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::String(s)
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::String(s.to_string())
    }
}

impl From<i64> for FieldValue {
    fn from(i: i64) -> Self {
        FieldValue::Int(i)
    }
}

impl From<i32> for FieldValue {
    fn from(i: i32) -> Self {
        FieldValue::Int(i64::from(i))
    }
}

impl From<u32> for FieldValue {
    fn from(i: u32) -> Self {
        FieldValue::Int(i64::from(i))
    }
}

impl From<f64> for FieldValue {
    fn from(f: f64) -> Self {
        FieldValue::Float(f)
    }
}

impl From<bool> for FieldValue {
    fn from(b: bool) -> Self {
        FieldValue::Bool(b)
    }
}

impl From<serde_json::Value> for FieldValue {
    fn from(v: serde_json::Value) -> Self {
        FieldValue::Nested(v)
    }
}

/// One key/value pair of a log record. Fields keep the order they were
/// supplied in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    pub key: String,
    pub value: FieldValue,
}

impl Field {
    pub fn new<K, V>(key: K, value: V) -> Self
    where
        K: Into<String>,
        V: Into<FieldValue>,
    {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    pub fn string(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(key, FieldValue::String(value.into()))
    }

    pub fn int(key: impl Into<String>, value: i64) -> Self {
        Self::new(key, FieldValue::Int(value))
    }

    pub fn float(key: impl Into<String>, value: f64) -> Self {
        Self::new(key, FieldValue::Float(value))
    }

    pub fn bool(key: impl Into<String>, value: bool) -> Self {
        Self::new(key, FieldValue::Bool(value))
    }

    pub fn nested(key: impl Into<String>, value: serde_json::Value) -> Self {
        Self::new(key, FieldValue::Nested(value))
    }

    /// A field carrying an error's textual message under the `error` key.
    pub fn error(err: impl fmt::Display) -> Self {
        Self::new("error", FieldValue::Error(err.to_string()))
    }

    /// A field under the default console-display key, shown by the pretty
    /// renderer without any allow-list configuration.
    pub fn console(value: impl Into<FieldValue>) -> Self {
        Self::new(CONSOLE_FIELD, value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constructors() {
        let f = Field::string("user_name", "Alice");
        assert_eq!(f.key, "user_name");
        assert_eq!(f.value, FieldValue::String("Alice".to_string()));

        let f = Field::int("user_age", 20);
        assert_eq!(f.value, FieldValue::Int(20));

        let f = Field::console("hello");
        assert_eq!(f.key, CONSOLE_FIELD);
    }

    #[test]
    fn test_error_field() {
        let err = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let f = Field::error(&err);
        assert_eq!(f.key, "error");
        assert_eq!(f.value, FieldValue::Error("missing".to_string()));
    }

    #[test]
    fn test_json_values() {
        assert_eq!(
            Field::bool("ok", true).value.to_json_value(),
            serde_json::Value::Bool(true)
        );
        assert_eq!(
            Field::error("boom").value.to_json_value(),
            serde_json::Value::String("boom".to_string())
        );
        let nested = serde_json::json!({"a": [1, 2]});
        assert_eq!(
            Field::nested("data", nested.clone()).value.to_json_value(),
            nested
        );
    }
}
