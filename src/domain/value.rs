//! Typed values: node operands and entity facts.

use std::cmp::Ordering;
use std::fmt;

use itertools::Itertools;
use serde::{Deserialize, Serialize};

/// A single int, bool or string value.
///
/// Comparisons are semantic: booleans take part in numeric comparisons as
/// `0`/`1`, so `true == 1` and `false < 1`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DataValue {
    Bool(bool),
    Int(i64),
    Str(String),
}

impl DataValue {
    fn as_number(&self) -> Option<i64> {
        match self {
            DataValue::Bool(b) => Some(i64::from(*b)),
            DataValue::Int(i) => Some(*i),
            DataValue::Str(_) => None,
        }
    }

    /// Equality across the int/bool domain; strings only equal strings.
    pub fn semantic_eq(&self, other: &DataValue) -> bool {
        match (self, other) {
            (DataValue::Str(a), DataValue::Str(b)) => a == b,
            _ => match (self.as_number(), other.as_number()) {
                (Some(a), Some(b)) => a == b,
                _ => false,
            },
        }
    }

    /// Ordering across the int/bool domain or between two strings.
    ///
    /// Returns `None` when a string is ordered against a number.
    pub fn semantic_cmp(&self, other: &DataValue) -> Option<Ordering> {
        match (self, other) {
            (DataValue::Str(a), DataValue::Str(b)) => Some(a.cmp(b)),
            _ => match (self.as_number(), other.as_number()) {
                (Some(a), Some(b)) => Some(a.cmp(&b)),
                _ => None,
            },
        }
    }
}

impl fmt::Display for DataValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataValue::Bool(b) => write!(f, "{b}"),
            DataValue::Int(i) => write!(f, "{i}"),
            DataValue::Str(s) => write!(f, "\"{s}\""),
        }
    }
}

impl From<i64> for DataValue {
    fn from(v: i64) -> Self {
        DataValue::Int(v)
    }
}

impl From<bool> for DataValue {
    fn from(v: bool) -> Self {
        DataValue::Bool(v)
    }
}

impl From<&str> for DataValue {
    fn from(v: &str) -> Self {
        DataValue::Str(v.to_string())
    }
}

/// The value of one fact about an entity: a scalar or a list of scalars.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FactValue {
    List(Vec<DataValue>),
    Scalar(DataValue),
}

impl fmt::Display for FactValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FactValue::Scalar(v) => write!(f, "{v}"),
            FactValue::List(values) => write!(f, "[{}]", values.iter().join(", ")),
        }
    }
}

impl From<DataValue> for FactValue {
    fn from(v: DataValue) -> Self {
        FactValue::Scalar(v)
    }
}

impl From<i64> for FactValue {
    fn from(v: i64) -> Self {
        FactValue::Scalar(DataValue::Int(v))
    }
}

impl From<bool> for FactValue {
    fn from(v: bool) -> Self {
        FactValue::Scalar(DataValue::Bool(v))
    }
}

impl From<&str> for FactValue {
    fn from(v: &str) -> Self {
        FactValue::Scalar(DataValue::from(v))
    }
}

impl<T: Into<DataValue>> FromIterator<T> for FactValue {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        FactValue::List(iter.into_iter().map(Into::into).collect())
    }
}
