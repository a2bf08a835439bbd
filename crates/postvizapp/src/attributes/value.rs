//! Runtime values held by property nodes.
//!
//! Every property declares a [`ValueKind`]; the value it stores is an
//! [`AttrValue`] of that kind or `Null` (unset, waiting for a lazy default).

use crate::error::{PostvizError, Result};
use serde_json::{json, Value};
use std::fmt;

/// The declared type of a property.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Bool,
    Int,
    Float,
    Str,
    /// A list of names, e.g. surfaces.
    StrList,
    /// A three-component vector, e.g. a plane normal.
    Vector,
}

impl ValueKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            ValueKind::Bool => "bool",
            ValueKind::Int => "int",
            ValueKind::Float => "float",
            ValueKind::Str => "str",
            ValueKind::StrList => "list",
            ValueKind::Vector => "vector",
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Runtime representation of a property value.
#[derive(Debug, Clone, PartialEq)]
pub enum AttrValue {
    /// Unset. Reads compute a default for it when one is declared.
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    List(Vec<String>),
    Vector([f64; 3]),
}

impl AttrValue {
    pub fn is_null(&self) -> bool {
        matches!(self, AttrValue::Null)
    }

    /// Name of the value's shape, used in type mismatch messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            AttrValue::Null => "null",
            AttrValue::Bool(_) => "bool",
            AttrValue::Int(_) => "int",
            AttrValue::Float(_) => "float",
            AttrValue::Str(_) => "str",
            AttrValue::List(_) => "list",
            AttrValue::Vector(_) => "vector",
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            AttrValue::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttrValue::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            AttrValue::List(v) => Some(v),
            _ => None,
        }
    }

    /// Numeric view of the value; ints widen to floats.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            AttrValue::Int(v) => Some(*v as f64),
            AttrValue::Float(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_vector(&self) -> Option<[f64; 3]> {
        match self {
            AttrValue::Vector(v) => Some(*v),
            _ => None,
        }
    }

    /// The string members checked against an allowed-values set.
    ///
    /// A scalar string is a single member; a list contributes every element.
    pub fn members(&self) -> Vec<String> {
        match self {
            AttrValue::Null => Vec::new(),
            AttrValue::Str(s) => vec![s.clone()],
            AttrValue::List(v) => v.clone(),
            other => vec![other.to_string()],
        }
    }

    /// Convert a JSON value into a value of the declared kind.
    ///
    /// Ints are accepted where floats are declared and a single string is
    /// accepted where a list is declared. `null` is accepted for every kind.
    pub fn from_json(value: &Value, kind: ValueKind, path: &str) -> Result<Self> {
        let mismatch = || PostvizError::TypeMismatch {
            path: path.to_string(),
            expected: kind.to_string(),
            found: json_kind(value).to_string(),
        };

        if value.is_null() {
            return Ok(AttrValue::Null);
        }

        match kind {
            ValueKind::Bool => value.as_bool().map(AttrValue::Bool).ok_or_else(mismatch),
            ValueKind::Int => value.as_i64().map(AttrValue::Int).ok_or_else(mismatch),
            ValueKind::Float => value.as_f64().map(AttrValue::Float).ok_or_else(mismatch),
            ValueKind::Str => value
                .as_str()
                .map(|s| AttrValue::Str(s.to_string()))
                .ok_or_else(mismatch),
            ValueKind::StrList => match value {
                Value::String(s) => Ok(AttrValue::List(vec![s.clone()])),
                Value::Array(items) => items
                    .iter()
                    .map(|item| item.as_str().map(str::to_string))
                    .collect::<Option<Vec<_>>>()
                    .map(AttrValue::List)
                    .ok_or_else(mismatch),
                _ => Err(mismatch()),
            },
            ValueKind::Vector => {
                let items = value.as_array().ok_or_else(mismatch)?;
                if items.len() != 3 {
                    return Err(mismatch());
                }
                let mut out = [0.0; 3];
                for (slot, item) in out.iter_mut().zip(items) {
                    *slot = item.as_f64().ok_or_else(mismatch)?;
                }
                Ok(AttrValue::Vector(out))
            }
        }
    }

    /// Coerce an already-built value to the declared kind.
    pub fn coerce(self, kind: ValueKind, path: &str) -> Result<Self> {
        match (kind, self) {
            (_, AttrValue::Null) => Ok(AttrValue::Null),
            (ValueKind::Bool, v @ AttrValue::Bool(_)) => Ok(v),
            (ValueKind::Int, v @ AttrValue::Int(_)) => Ok(v),
            (ValueKind::Float, AttrValue::Int(i)) => Ok(AttrValue::Float(i as f64)),
            (ValueKind::Float, v @ AttrValue::Float(_)) => Ok(v),
            (ValueKind::Str, v @ AttrValue::Str(_)) => Ok(v),
            (ValueKind::StrList, AttrValue::Str(s)) => Ok(AttrValue::List(vec![s])),
            (ValueKind::StrList, v @ AttrValue::List(_)) => Ok(v),
            (ValueKind::Vector, v @ AttrValue::Vector(_)) => Ok(v),
            (kind, other) => Err(PostvizError::TypeMismatch {
                path: path.to_string(),
                expected: kind.to_string(),
                found: other.kind_name().to_string(),
            }),
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            AttrValue::Null => Value::Null,
            AttrValue::Bool(v) => json!(v),
            AttrValue::Int(v) => json!(v),
            AttrValue::Float(v) => json!(v),
            AttrValue::Str(s) => json!(s),
            AttrValue::List(v) => json!(v),
            AttrValue::Vector(v) => json!(v),
        }
    }
}

impl fmt::Display for AttrValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttrValue::Null => f.write_str("None"),
            AttrValue::Bool(v) => write!(f, "{v}"),
            AttrValue::Int(v) => write!(f, "{v}"),
            AttrValue::Float(v) => write!(f, "{v}"),
            AttrValue::Str(s) => f.write_str(s),
            AttrValue::List(v) => write!(f, "[{}]", v.join(", ")),
            AttrValue::Vector([x, y, z]) => write!(f, "[{x}, {y}, {z}]"),
        }
    }
}

impl From<bool> for AttrValue {
    fn from(v: bool) -> Self {
        AttrValue::Bool(v)
    }
}

impl From<i64> for AttrValue {
    fn from(v: i64) -> Self {
        AttrValue::Int(v)
    }
}

impl From<f64> for AttrValue {
    fn from(v: f64) -> Self {
        AttrValue::Float(v)
    }
}

impl From<&str> for AttrValue {
    fn from(v: &str) -> Self {
        AttrValue::Str(v.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(v: String) -> Self {
        AttrValue::Str(v)
    }
}

impl From<Vec<String>> for AttrValue {
    fn from(v: Vec<String>) -> Self {
        AttrValue::List(v)
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(n) if n.is_f64() => "float",
        Value::Number(_) => "int",
        Value::String(_) => "str",
        Value::Array(_) => "list",
        Value::Object(_) => "object",
    }
}
