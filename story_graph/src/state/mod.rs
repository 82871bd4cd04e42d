//! State values - the flags and variables read by conditions and written by updates.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Flat mapping from flag/variable name to its current value.
///
/// Flags and variables share one namespace. A `BTreeMap` keeps iteration
/// order stable for snapshots and logs.
pub type StateMap = BTreeMap<String, StateValue>;

/// Build a [`StateMap`] from name/value pairs.
pub fn state_map<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> StateMap
where
    K: Into<String>,
    V: Into<StateValue>,
{
    pairs
        .into_iter()
        .map(|(key, value)| (key.into(), value.into()))
        .collect()
}

/// Value types for flags and variables.
///
/// Serialized untagged, so authored data writes plain `true`, `5`, `2.5` or `"text"`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StateValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
}

impl StateValue {
    /// Numeric view of the value. `None` for booleans and strings.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            StateValue::Int(i) => Some(*i as f64),
            StateValue::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            StateValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            StateValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Check if the value is an integer or a float.
    pub fn is_numeric(&self) -> bool {
        matches!(self, StateValue::Int(_) | StateValue::Float(_))
    }

    /// Short name of the value's kind, for diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            StateValue::Bool(_) => "bool",
            StateValue::Int(_) => "int",
            StateValue::Float(_) => "float",
            StateValue::String(_) => "string",
        }
    }
}

/// Numbers compare by value across `Int` and `Float`; other kinds never equal each other.
impl PartialEq for StateValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (StateValue::Bool(a), StateValue::Bool(b)) => a == b,
            (StateValue::String(a), StateValue::String(b)) => a == b,
            (StateValue::Int(a), StateValue::Int(b)) => a == b,
            (a, b) => match (a.as_f64(), b.as_f64()) {
                (Some(x), Some(y)) => x == y,
                _ => false,
            },
        }
    }
}

impl std::fmt::Display for StateValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StateValue::Bool(b) => write!(f, "{}", b),
            StateValue::Int(i) => write!(f, "{}", i),
            // f64's Display already drops the fraction of integral values.
            StateValue::Float(x) => write!(f, "{}", x),
            StateValue::String(s) => f.write_str(s),
        }
    }
}

impl From<bool> for StateValue {
    fn from(value: bool) -> Self {
        StateValue::Bool(value)
    }
}

impl From<i64> for StateValue {
    fn from(value: i64) -> Self {
        StateValue::Int(value)
    }
}

impl From<i32> for StateValue {
    fn from(value: i32) -> Self {
        StateValue::Int(value.into())
    }
}

impl From<f64> for StateValue {
    fn from(value: f64) -> Self {
        StateValue::Float(value)
    }
}

impl From<&str> for StateValue {
    fn from(value: &str) -> Self {
        StateValue::String(value.to_string())
    }
}

impl From<String> for StateValue {
    fn from(value: String) -> Self {
        StateValue::String(value)
    }
}
