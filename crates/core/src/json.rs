//! Dynamic JSON values with a validation boundary.
//!
//! Memory metadata and structured/ephemeral values are caller-supplied JSON.
//! [`JsonValue`] is a newtype wrapper around `serde_json::Value` that keeps
//! the dynamic shape but forces every write through [`JsonValue::validate`]:
//! a serialized-size limit and a nesting-depth limit, so a caller cannot park
//! unbounded or pathologically nested documents in the stores.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Deref;
use std::str::FromStr;

use crate::error::{EngramError, EngramResult};

/// JSON value wrapper.
///
/// Newtype around `serde_json::Value` providing:
/// - Direct read access to the underlying value via `Deref`
/// - Easy construction from common types
/// - Size/depth validation before a value enters a store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JsonValue(serde_json::Value);

impl JsonValue {
    /// Create a null JSON value.
    pub fn null() -> Self {
        JsonValue(serde_json::Value::Null)
    }

    /// Create an empty JSON object.
    pub fn object() -> Self {
        JsonValue(serde_json::Value::Object(serde_json::Map::new()))
    }

    /// Create from a `serde_json::Value`.
    pub fn from_value(value: serde_json::Value) -> Self {
        JsonValue(value)
    }

    /// Get the underlying `serde_json::Value`.
    pub fn into_inner(self) -> serde_json::Value {
        self.0
    }

    /// Get a reference to the underlying `serde_json::Value`.
    pub fn as_inner(&self) -> &serde_json::Value {
        &self.0
    }

    /// Serialize to a compact JSON string.
    pub fn to_json_string(&self) -> String {
        self.0.to_string()
    }

    /// Approximate serialized size in bytes (used for limit checking).
    pub fn size_bytes(&self) -> usize {
        self.to_json_string().len()
    }

    /// Maximum nesting depth of this value. Scalars have depth 1.
    pub fn depth(&self) -> usize {
        fn depth_of(v: &serde_json::Value) -> usize {
            match v {
                serde_json::Value::Array(items) => {
                    1 + items.iter().map(depth_of).max().unwrap_or(0)
                }
                serde_json::Value::Object(map) => {
                    1 + map.values().map(depth_of).max().unwrap_or(0)
                }
                _ => 1,
            }
        }
        depth_of(&self.0)
    }

    /// Check this value against the engine's size and depth limits.
    pub fn validate(&self, max_bytes: usize, max_depth: usize) -> EngramResult<()> {
        let size = self.size_bytes();
        if size > max_bytes {
            return Err(EngramError::validation(format!(
                "JSON value is {} bytes, limit is {}",
                size, max_bytes
            )));
        }
        let depth = self.depth();
        if depth > max_depth {
            return Err(EngramError::validation(format!(
                "JSON value nests {} levels deep, limit is {}",
                depth, max_depth
            )));
        }
        Ok(())
    }

    /// Check that this value is a JSON object (required for memory metadata).
    pub fn require_object(&self, what: &str) -> EngramResult<()> {
        if self.0.is_object() {
            Ok(())
        } else {
            Err(EngramError::validation(format!(
                "{} must be a JSON object",
                what
            )))
        }
    }
}

impl FromStr for JsonValue {
    type Err = serde_json::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        serde_json::from_str(s).map(JsonValue)
    }
}

impl Deref for JsonValue {
    type Target = serde_json::Value;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl fmt::Display for JsonValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Default for JsonValue {
    fn default() -> Self {
        Self::null()
    }
}

impl From<serde_json::Value> for JsonValue {
    fn from(v: serde_json::Value) -> Self {
        JsonValue(v)
    }
}

impl From<JsonValue> for serde_json::Value {
    fn from(v: JsonValue) -> Self {
        v.0
    }
}

impl From<bool> for JsonValue {
    fn from(v: bool) -> Self {
        JsonValue(serde_json::Value::Bool(v))
    }
}

impl From<i64> for JsonValue {
    fn from(v: i64) -> Self {
        JsonValue(serde_json::Value::Number(v.into()))
    }
}

impl From<f64> for JsonValue {
    fn from(v: f64) -> Self {
        JsonValue(
            serde_json::Number::from_f64(v)
                .map_or(serde_json::Value::Null, serde_json::Value::Number),
        )
    }
}

impl From<&str> for JsonValue {
    fn from(v: &str) -> Self {
        JsonValue(serde_json::Value::String(v.to_string()))
    }
}

impl From<String> for JsonValue {
    fn from(v: String) -> Self {
        JsonValue(serde_json::Value::String(v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_and_object_constructors() {
        assert!(JsonValue::null().is_null());
        assert!(JsonValue::object().is_object());
        assert!(JsonValue::default().is_null());
    }

    #[test]
    fn from_common_types() {
        assert_eq!(JsonValue::from(true).as_bool(), Some(true));
        assert_eq!(JsonValue::from(42i64).as_i64(), Some(42));
        assert_eq!(JsonValue::from("hello").as_str(), Some("hello"));
        assert_eq!(JsonValue::from("x".to_string()).as_str(), Some("x"));
    }

    #[test]
    fn f64_nan_becomes_null() {
        // NaN/Infinity cannot be represented in JSON
        assert!(JsonValue::from(f64::NAN).is_null());
        assert!(JsonValue::from(f64::INFINITY).is_null());
    }

    #[test]
    fn parse_and_display_roundtrip() {
        let v: JsonValue = r#"{"name": "test", "value": 42}"#.parse().unwrap();
        assert!(v.is_object());
        assert_eq!(v["name"].as_str(), Some("test"));

        let s = format!("{}", JsonValue::from(42i64));
        assert_eq!(s, "42");
    }

    #[test]
    fn parse_invalid_errors() {
        let result: Result<JsonValue, _> = "not valid json {".parse();
        assert!(result.is_err());
    }

    #[test]
    fn depth_of_scalars_is_one() {
        assert_eq!(JsonValue::null().depth(), 1);
        assert_eq!(JsonValue::from(42i64).depth(), 1);
        assert_eq!(JsonValue::from("s").depth(), 1);
    }

    #[test]
    fn depth_counts_nesting() {
        let v: JsonValue = r#"{"a": {"b": [1, 2, {"c": true}]}}"#.parse().unwrap();
        // object -> object -> array -> object -> scalar
        assert_eq!(v.depth(), 5);
    }

    #[test]
    fn depth_of_empty_containers() {
        assert_eq!(JsonValue::object().depth(), 1);
        let v: JsonValue = "[]".parse().unwrap();
        assert_eq!(v.depth(), 1);
    }

    #[test]
    fn validate_accepts_small_values() {
        let v: JsonValue = r#"{"key": "value"}"#.parse().unwrap();
        assert!(v.validate(1024, 8).is_ok());
    }

    #[test]
    fn validate_rejects_oversized_value() {
        let big = JsonValue::from("x".repeat(100));
        let err = big.validate(16, 8).unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn validate_rejects_deep_nesting() {
        let mut s = String::new();
        for _ in 0..10 {
            s.push_str(r#"{"n":"#);
        }
        s.push('1');
        for _ in 0..10 {
            s.push('}');
        }
        let v: JsonValue = s.parse().unwrap();
        let err = v.validate(4096, 4).unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn require_object_rejects_non_objects() {
        assert!(JsonValue::object().require_object("metadata").is_ok());
        let err = JsonValue::from(3i64).require_object("metadata").unwrap_err();
        assert!(err.is_validation());
        assert!(err.to_string().contains("metadata"));
    }

    #[test]
    fn serde_transparent_roundtrip() {
        let v: JsonValue = r#"{"key": "value"}"#.parse().unwrap();
        let json = serde_json::to_string(&v).unwrap();
        let v2: JsonValue = serde_json::from_str(&json).unwrap();
        assert_eq!(v, v2);
    }
}
