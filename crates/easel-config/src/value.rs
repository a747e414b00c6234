use std::fmt;

use serde_json::{Map, Value as JsonValue};

use crate::codec::{is_known_kind, TYPE_KEY};
use crate::CodecError;

/// A single typed property value.
///
/// `Opaque` carries properties written by a newer codec whose kind this
/// version does not understand.
#[derive(Debug, Clone)]
pub enum Value {
    String(String),
    Integer(i64),
    Number(f64),
    Bool(bool),
    Binary(Vec<u8>),
    Opaque(OpaqueValue),
}

/// An encoded property of an unknown kind.
///
/// Holds every key of the encoded object except `type`, which the codec
/// writes back from `kind`.
#[derive(Debug, Clone, PartialEq)]
pub struct OpaqueValue {
    kind: String,
    fields: Map<String, JsonValue>,
}

impl OpaqueValue {
    /// Fails with `ReservedField` when `kind` is one this codec decodes itself.
    pub fn new(kind: impl Into<String>, mut fields: Map<String, JsonValue>) -> Result<Self, CodecError> {
        let kind = kind.into();
        if is_known_kind(&kind) {
            return Err(CodecError::ReservedField(kind));
        }
        fields.shift_remove(TYPE_KEY);
        Ok(Self { kind, fields })
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn fields(&self) -> &Map<String, JsonValue> {
        &self.fields
    }
}

impl Value {
    pub fn kind(&self) -> &str {
        match self {
            Value::Opaque(opaque) => opaque.kind(),
            other => other.type_name(),
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::String(_) => "string",
            Value::Integer(_) => "integer",
            Value::Number(_) => "number",
            Value::Bool(_) => "bool",
            Value::Binary(_) => "binary",
            Value::Opaque(_) => "opaque",
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Integer(v) => Some(*v),
            _ => None,
        }
    }

    /// Integers are numbers too, so they widen here.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(v) => Some(*v),
            Value::Integer(v) => Some(*v as f64),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_binary(&self) -> Option<&[u8]> {
        match self {
            Value::Binary(v) => Some(v),
            _ => None,
        }
    }

    pub fn is_opaque(&self) -> bool {
        matches!(self, Value::Opaque(_))
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Integer(a), Value::Integer(b)) => a == b,
            // NaN payloads are not preserved by the text form.
            (Value::Number(a), Value::Number(b)) => {
                (a.is_nan() && b.is_nan()) || a.to_bits() == b.to_bits()
            }
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Binary(a), Value::Binary(b)) => a == b,
            (Value::Opaque(a), Value::Opaque(b)) => a == b,
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::String(v) => f.write_str(v),
            Value::Integer(v) => write!(f, "{v}"),
            Value::Number(v) => write!(f, "{v}"),
            Value::Bool(v) => write!(f, "{v}"),
            Value::Binary(v) => write!(f, "<{} bytes>", v.len()),
            Value::Opaque(opaque) => write!(f, "<{}>", opaque.kind()),
        }
    }
}

impl From<OpaqueValue> for Value {
    fn from(value: OpaqueValue) -> Self {
        Value::Opaque(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_owned())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Integer(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Integer(value.into())
    }
}

impl From<u32> for Value {
    fn from(value: u32) -> Self {
        Value::Integer(value.into())
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Number(value)
    }
}

impl From<f32> for Value {
    fn from(value: f32) -> Self {
        Value::Number(value.into())
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<Vec<u8>> for Value {
    fn from(value: Vec<u8>) -> Self {
        Value::Binary(value)
    }
}

impl From<&[u8]> for Value {
    fn from(value: &[u8]) -> Self {
        Value::Binary(value.to_vec())
    }
}
