//! Cell value types for FRAUDAGG tables
//!
//! The `Value` enum represents every cell that can appear in a transaction
//! table. `Null` is the explicit "no value" marker: it is produced for empty
//! mean windows and must never be confused with a numeric zero.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Table cell value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// Missing value
    Null,
    /// Boolean value (treated as 0/1 when aggregated)
    Bool(bool),
    /// Integer value (identifiers, labels)
    Integer(i64),
    /// Floating point value
    Number(f64),
    /// Point in time, UTC
    Timestamp(DateTime<Utc>),
    /// String value
    String(String),
}

impl Value {
    /// Whether this is the missing-value marker
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Numeric view of the value.
    ///
    /// Booleans map to 0/1. Returns `None` for nulls and for values without a
    /// numeric meaning (strings, timestamps).
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            Value::Integer(i) => Some(*i as f64),
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Timestamp view of the value
    pub fn as_timestamp(&self) -> Option<DateTime<Utc>> {
        match self {
            Value::Timestamp(ts) => Some(*ts),
            _ => None,
        }
    }

    /// Whether the value can take part in a numeric aggregation
    pub fn is_numeric(&self) -> bool {
        matches!(self, Value::Bool(_) | Value::Integer(_) | Value::Number(_))
    }

    /// Name of the value's type, used in error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Integer(_) => "integer",
            Value::Number(_) => "number",
            Value::Timestamp(_) => "timestamp",
            Value::String(_) => "string",
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Integer(i) => write!(f, "{}", i),
            Value::Number(n) => write!(f, "{}", n),
            Value::Timestamp(ts) => write!(f, "{}", ts.to_rfc3339()),
            Value::String(s) => write!(f, "{}", s),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Integer(i)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<Option<f64>> for Value {
    fn from(n: Option<f64>) -> Self {
        n.map(Value::Number).unwrap_or(Value::Null)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(ts: DateTime<Utc>) -> Self {
        Value::Timestamp(ts)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}
