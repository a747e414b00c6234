use indexmap::IndexMap;
use serde_json::{Map, Value as JsonValue};

use crate::codec::{self, FORMAT_VERSION, RESERVED_FIELDS};
use crate::{CodecError, Value};

/// Ordered property bag attached to presets and filter runs.
///
/// Property order is insertion order and is part of the serialized form.
/// Replacing a property keeps its position.
#[derive(Debug, Clone)]
pub struct Configuration {
    pub(crate) format: u32,
    pub(crate) properties: IndexMap<String, Value>,
    /// Extra keys found next to `type`/`value` in an encoded property.
    pub(crate) annotations: IndexMap<String, Map<String, JsonValue>>,
    /// Unknown top-level document fields.
    pub(crate) extensions: Map<String, JsonValue>,
}

impl Default for Configuration {
    fn default() -> Self {
        Self::new()
    }
}

impl Configuration {
    pub fn new() -> Self {
        Self {
            format: FORMAT_VERSION,
            properties: IndexMap::new(),
            annotations: IndexMap::new(),
            extensions: Map::new(),
        }
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(name, value);
        self
    }

    pub fn from_text(text: &str) -> Result<Self, CodecError> {
        codec::deserialize(text)
    }

    pub fn to_text(&self) -> String {
        codec::serialize(self)
    }

    /// Format version the document was read with, or the current one.
    pub fn format(&self) -> u32 {
        self.format
    }

    /// Annotations on `name` are dropped when the value changes kind.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        let name = name.into();
        let value = value.into();
        let previous = self.properties.insert(name.clone(), value);
        let same_kind = match (&previous, self.properties.get(&name)) {
            (Some(old), Some(new)) => old.kind() == new.kind(),
            _ => false,
        };
        if !same_kind {
            self.annotations.shift_remove(&name);
        }
        previous
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.properties.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.properties.contains_key(name)
    }

    pub fn remove(&mut self, name: &str) -> Option<Value> {
        self.annotations.shift_remove(name);
        self.properties.shift_remove(name)
    }

    pub fn len(&self) -> usize {
        self.properties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.properties
            .iter()
            .map(|(name, value)| (name.as_str(), value))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.properties.keys().map(String::as_str)
    }

    fn require(&self, name: &str) -> Result<&Value, CodecError> {
        self.properties
            .get(name)
            .ok_or_else(|| CodecError::MissingField(name.to_owned()))
    }

    pub fn get_str(&self, name: &str) -> Result<&str, CodecError> {
        let value = self.require(name)?;
        value
            .as_str()
            .ok_or_else(|| CodecError::mismatch(name, "string", value.type_name()))
    }

    pub fn get_i64(&self, name: &str) -> Result<i64, CodecError> {
        let value = self.require(name)?;
        value
            .as_i64()
            .ok_or_else(|| CodecError::mismatch(name, "integer", value.type_name()))
    }

    pub fn get_f64(&self, name: &str) -> Result<f64, CodecError> {
        let value = self.require(name)?;
        value
            .as_f64()
            .ok_or_else(|| CodecError::mismatch(name, "number", value.type_name()))
    }

    pub fn get_bool(&self, name: &str) -> Result<bool, CodecError> {
        let value = self.require(name)?;
        value
            .as_bool()
            .ok_or_else(|| CodecError::mismatch(name, "bool", value.type_name()))
    }

    pub fn get_binary(&self, name: &str) -> Result<&[u8], CodecError> {
        let value = self.require(name)?;
        value
            .as_binary()
            .ok_or_else(|| CodecError::mismatch(name, "binary", value.type_name()))
    }

    /// Extra keys stored alongside an encoded property by a newer writer.
    pub fn annotations(&self, name: &str) -> Option<&Map<String, JsonValue>> {
        self.annotations.get(name)
    }

    pub fn extension(&self, key: &str) -> Option<&JsonValue> {
        self.extensions.get(key)
    }

    pub fn extensions(&self) -> impl Iterator<Item = (&str, &JsonValue)> {
        self.extensions.iter().map(|(key, value)| (key.as_str(), value))
    }

    pub fn set_extension(
        &mut self,
        key: impl Into<String>,
        value: JsonValue,
    ) -> Result<Option<JsonValue>, CodecError> {
        let key = key.into();
        if RESERVED_FIELDS.contains(&key.as_str()) {
            return Err(CodecError::ReservedField(key));
        }
        Ok(self.extensions.insert(key, value))
    }
}

impl PartialEq for Configuration {
    fn eq(&self, other: &Self) -> bool {
        self.format == other.format
            && self.properties.iter().eq(other.properties.iter())
            && self.annotations.iter().eq(other.annotations.iter())
            && self.extensions.iter().eq(other.extensions.iter())
    }
}
