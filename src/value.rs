//! The closed value union used for type-erased parameter access.
//!
//! Generic tooling (settings snapshots, dynamic-property rules, the get/set
//! API) needs to handle parameter values without knowing the concrete kind.
//! Rather than an open `Any`, values are a closed, exhaustively matchable
//! tagged union over the five scalar shapes a parameter can hold.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A type-erased parameter value.
///
/// Integers deserialize canonically: anything that fits `i64` becomes
/// `Int`, larger positive values become `Uint`. The distinction only matters
/// for typed extraction; rule comparisons treat all three numeric variants
/// as one numeric family.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Bool(bool),
    Int(i64),
    Uint(u64),
    Float(f64),
    String(String),
}

impl Value {
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Bool(_) => "boolean",
            Value::Int(_) => "integer",
            Value::Uint(_) => "unsigned integer",
            Value::Float(_) => "float",
            Value::String(_) => "string",
        }
    }

    /// Convert from an untyped JSON value. Returns `None` for shapes that
    /// cannot be a parameter value (null, arrays, objects).
    pub fn from_json(value: &serde_json::Value) -> Option<Value> {
        match value {
            serde_json::Value::Bool(b) => Some(Value::Bool(*b)),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Some(Value::Int(i))
                } else if let Some(u) = n.as_u64() {
                    Some(Value::Uint(u))
                } else {
                    n.as_f64().map(Value::Float)
                }
            }
            serde_json::Value::String(s) => Some(Value::String(s.clone())),
            _ => None,
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Int(i) => serde_json::Value::from(*i),
            Value::Uint(u) => serde_json::Value::from(*u),
            Value::Float(f) => serde_json::Value::from(*f),
            Value::String(s) => serde_json::Value::String(s.clone()),
        }
    }

    fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(i) => Some(*i as f64),
            Value::Uint(u) => Some(*u as f64),
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Equality across the value families: numeric variants compare by
    /// numeric value, strings and booleans by identity. Cross-family
    /// comparisons (e.g. a boolean against a string) return `None` so rule
    /// evaluation can degrade to its default instead of guessing.
    pub fn loose_eq(&self, other: &Value) -> Option<bool> {
        match (self, other) {
            (Value::Bool(a), Value::Bool(b)) => Some(a == b),
            (Value::String(a), Value::String(b)) => Some(a == b),
            _ => match (self.as_f64(), other.as_f64()) {
                (Some(a), Some(b)) => Some(a == b),
                _ => None,
            },
        }
    }

    /// Ordering for rule comparisons: numeric families compare as f64,
    /// strings lexicographically. Booleans and cross-family pairs have no
    /// ordering.
    pub fn ordering(&self, other: &Value) -> Option<Ordering> {
        match (self, other) {
            (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
            _ => match (self.as_f64(), other.as_f64()) {
                (Some(a), Some(b)) => a.partial_cmp(&b),
                _ => None,
            },
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(i) => write!(f, "{i}"),
            Value::Uint(u) => write!(f, "{u}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::String(s) => f.write_str(s),
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<u64> for Value {
    fn from(v: u64) -> Self {
        Value::Uint(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}
