//! Text form of a [`Configuration`].
//!
//! Documents are pretty-printed JSON objects:
//!
//! ```text
//! {
//!   "format": 1,
//!   "properties": {
//!     "radius": { "type": "number", "value": 2.5 },
//!     "mask": { "type": "binary", "value": "00ff" }
//!   }
//! }
//! ```
//!
//! Keys are written in insertion order so the same configuration always
//! produces byte-identical text. Anything this version does not understand
//! (top-level fields, property kinds, extra keys on a property) is carried
//! through unchanged.

use serde_json::{Map, Value as JsonValue};

use crate::{CodecError, Configuration, OpaqueValue, Value};

/// Format version written by this codec.
pub const FORMAT_VERSION: u32 = 1;

const FORMAT_FIELD: &str = "format";
const PROPERTIES_FIELD: &str = "properties";
pub(crate) const TYPE_KEY: &str = "type";
const VALUE_KEY: &str = "value";

pub(crate) const RESERVED_FIELDS: &[&str] = &[FORMAT_FIELD, PROPERTIES_FIELD];

pub fn serialize(config: &Configuration) -> String {
    let mut root = Map::new();
    root.insert(FORMAT_FIELD.into(), JsonValue::from(config.format));
    let mut properties = Map::new();
    for (name, value) in &config.properties {
        properties.insert(
            name.clone(),
            encode_property(value, config.annotations.get(name)),
        );
    }
    root.insert(PROPERTIES_FIELD.into(), JsonValue::Object(properties));
    for (key, value) in &config.extensions {
        root.insert(key.clone(), value.clone());
    }
    format!("{:#}", JsonValue::Object(root))
}

pub fn deserialize(text: &str) -> Result<Configuration, CodecError> {
    let document: JsonValue =
        serde_json::from_str(text).map_err(|err| CodecError::Malformed(err.to_string()))?;
    let JsonValue::Object(root) = document else {
        return Err(CodecError::Malformed(format!(
            "expected an object at the top level, found {}",
            json_kind(&document)
        )));
    };

    let mut config = Configuration::new();
    let mut properties = None;
    for (key, value) in root {
        match key.as_str() {
            FORMAT_FIELD => config.format = decode_format(&value)?,
            PROPERTIES_FIELD => properties = Some(value),
            _ => {
                config.extensions.insert(key, value);
            }
        }
    }

    let properties = properties.ok_or_else(|| CodecError::MissingField(PROPERTIES_FIELD.into()))?;
    let JsonValue::Object(properties) = properties else {
        return Err(CodecError::mismatch(
            PROPERTIES_FIELD,
            "object",
            json_kind(&properties),
        ));
    };
    for (name, encoded) in properties {
        let (value, annotations) = decode_property(&name, encoded)?;
        if !annotations.is_empty() {
            config.annotations.insert(name.clone(), annotations);
        }
        config.properties.insert(name, value);
    }
    Ok(config)
}

fn decode_format(value: &JsonValue) -> Result<u32, CodecError> {
    value
        .as_u64()
        .and_then(|format| u32::try_from(format).ok())
        .ok_or_else(|| CodecError::mismatch(FORMAT_FIELD, "integer", json_kind(value)))
}

fn encode_property(value: &Value, annotations: Option<&Map<String, JsonValue>>) -> JsonValue {
    let (kind, encoded) = match value {
        Value::Opaque(opaque) => {
            let mut object = Map::new();
            object.insert(TYPE_KEY.into(), JsonValue::String(opaque.kind().into()));
            for (key, value) in opaque.fields() {
                object.insert(key.clone(), value.clone());
            }
            return JsonValue::Object(object);
        }
        Value::String(v) => ("string", JsonValue::String(v.clone())),
        Value::Integer(v) => ("integer", JsonValue::from(*v)),
        Value::Number(v) => ("number", encode_number(*v)),
        Value::Bool(v) => ("bool", JsonValue::Bool(*v)),
        Value::Binary(v) => ("binary", JsonValue::String(hex::encode(v))),
    };
    let mut object = Map::new();
    object.insert(TYPE_KEY.into(), JsonValue::String(kind.into()));
    object.insert(VALUE_KEY.into(), encoded);
    if let Some(annotations) = annotations {
        for (key, value) in annotations {
            object.insert(key.clone(), value.clone());
        }
    }
    JsonValue::Object(object)
}

fn encode_number(value: f64) -> JsonValue {
    match serde_json::Number::from_f64(value) {
        Some(number) => JsonValue::Number(number),
        None if value.is_nan() => JsonValue::String("NaN".into()),
        None if value.is_sign_positive() => JsonValue::String("inf".into()),
        None => JsonValue::String("-inf".into()),
    }
}

fn decode_property(
    name: &str,
    encoded: JsonValue,
) -> Result<(Value, Map<String, JsonValue>), CodecError> {
    let JsonValue::Object(mut object) = encoded else {
        return Err(CodecError::mismatch(name, "object", json_kind(&encoded)));
    };
    let kind = match object.get(TYPE_KEY) {
        Some(JsonValue::String(kind)) => kind.clone(),
        Some(other) => {
            return Err(CodecError::mismatch(
                format!("{name}.{TYPE_KEY}"),
                "string",
                json_kind(other),
            ))
        }
        None => return Err(CodecError::MissingField(format!("{name}.{TYPE_KEY}"))),
    };
    if !is_known_kind(&kind) {
        log::debug!("keeping property `{name}` of unknown kind `{kind}` verbatim");
        return Ok((Value::Opaque(OpaqueValue::new(kind, object)?), Map::new()));
    }

    object.shift_remove(TYPE_KEY);
    let raw = object
        .shift_remove(VALUE_KEY)
        .ok_or_else(|| CodecError::MissingField(format!("{name}.{VALUE_KEY}")))?;
    let value = decode_known(name, &kind, &raw)?;
    Ok((value, object))
}

pub(crate) fn is_known_kind(kind: &str) -> bool {
    matches!(kind, "string" | "integer" | "number" | "bool" | "binary")
}

fn decode_known(name: &str, kind: &str, raw: &JsonValue) -> Result<Value, CodecError> {
    match (kind, raw) {
        ("string", JsonValue::String(v)) => Ok(Value::String(v.clone())),
        ("integer", JsonValue::Number(v)) => v
            .as_i64()
            .map(Value::Integer)
            .ok_or_else(|| CodecError::mismatch(name, "integer", "number")),
        ("number", JsonValue::Number(v)) => v
            .as_f64()
            .map(Value::Number)
            .ok_or_else(|| CodecError::mismatch(name, "number", "number")),
        ("number", JsonValue::String(v)) => match v.as_str() {
            "NaN" => Ok(Value::Number(f64::NAN)),
            "inf" => Ok(Value::Number(f64::INFINITY)),
            "-inf" => Ok(Value::Number(f64::NEG_INFINITY)),
            _ => Err(CodecError::mismatch(name, "number", "string")),
        },
        ("bool", JsonValue::Bool(v)) => Ok(Value::Bool(*v)),
        ("binary", JsonValue::String(v)) => hex::decode(v)
            .map(Value::Binary)
            .map_err(|_| CodecError::mismatch(name, "binary", "string")),
        ("string", other) => Err(CodecError::mismatch(name, "string", json_kind(other))),
        ("integer", other) => Err(CodecError::mismatch(name, "integer", json_kind(other))),
        ("number", other) => Err(CodecError::mismatch(name, "number", json_kind(other))),
        ("bool", other) => Err(CodecError::mismatch(name, "bool", json_kind(other))),
        (_, other) => Err(CodecError::mismatch(name, "binary", json_kind(other))),
    }
}

fn json_kind(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "bool",
        JsonValue::Number(_) => "number",
        JsonValue::String(_) => "string",
        JsonValue::Array(_) => "array",
        JsonValue::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn blur() -> Configuration {
        Configuration::new()
            .with("halfWidth", 5)
            .with("halfHeight", 5)
            .with("rotate", 0.0)
            .with("strength", 0.25)
            .with("shape", "circle")
            .with("lockAspect", true)
            .with("mask", vec![0u8, 255, 16])
    }

    #[test]
    fn serialize_writes_properties_in_insertion_order() {
        let text = serialize(&Configuration::new().with("b", 1).with("a", "x"));
        assert_eq!(
            text,
            r#"{
  "format": 1,
  "properties": {
    "b": {
      "type": "integer",
      "value": 1
    },
    "a": {
      "type": "string",
      "value": "x"
    }
  }
}"#
        );
    }

    #[test]
    fn serialize_is_deterministic() {
        assert_eq!(serialize(&blur()), serialize(&blur()));
        assert_eq!(serialize(&blur()), serialize(&deserialize(&serialize(&blur())).unwrap()));
    }

    #[test]
    fn roundtrip_preserves_every_kind() {
        let config = blur()
            .with("nan", f64::NAN)
            .with("inf", f64::INFINITY)
            .with("neg", f64::NEG_INFINITY)
            .with("tiny", 1e-300)
            .with("third", 1.0 / 3.0);
        assert_eq!(deserialize(&serialize(&config)).unwrap(), config);
    }

    #[test]
    fn unknown_fields_survive_a_roundtrip() {
        let text = r#"{
            "format": 3,
            "properties": {
                "radius": { "type": "number", "value": 2.5, "unit": "px" },
                "tint": { "type": "color", "value": [1, 0, 0, 1] }
            },
            "author": "someone newer"
        }"#;
        let config = deserialize(text).unwrap();
        assert_eq!(config.format(), 3);
        assert_eq!(config.get_f64("radius").unwrap(), 2.5);
        assert_eq!(
            config.annotations("radius").unwrap().get("unit"),
            Some(&JsonValue::String("px".into()))
        );
        assert_eq!(config.get("tint").unwrap().kind(), "color");
        assert_eq!(
            config.extension("author"),
            Some(&JsonValue::String("someone newer".into()))
        );

        let again = deserialize(&serialize(&config)).unwrap();
        assert_eq!(again, config);
    }

    #[test]
    fn opaque_values_built_in_code_roundtrip() {
        let mut fields = Map::new();
        fields.insert(VALUE_KEY.into(), JsonValue::String("x".into()));
        let config = Configuration::new()
            .with("tint", OpaqueValue::new("color", fields).unwrap())
            .with("empty", OpaqueValue::new("marker", Map::new()).unwrap());
        let text = serialize(&config);
        let decoded = deserialize(&text).unwrap();
        assert_eq!(decoded, config);
        assert_eq!(serialize(&decoded), text);
    }

    #[test]
    fn malformed_text_is_reported() {
        let err = deserialize("{ \"format\": 1, ").unwrap_err();
        assert!(err.is_malformed());
        assert!(deserialize("[1, 2]").unwrap_err().is_malformed());
    }

    #[test]
    fn missing_fields_are_reported_by_name() {
        assert_eq!(
            deserialize(r#"{ "format": 1 }"#).unwrap_err(),
            CodecError::MissingField("properties".into())
        );
        assert_eq!(
            deserialize(r#"{ "properties": { "radius": { "type": "number" } } }"#).unwrap_err(),
            CodecError::MissingField("radius.value".into())
        );
        assert_eq!(
            deserialize(r#"{ "properties": { "radius": { "value": 1 } } }"#).unwrap_err(),
            CodecError::MissingField("radius.type".into())
        );
    }

    #[test]
    fn mismatched_values_are_not_defaulted() {
        assert_eq!(
            deserialize(r#"{ "properties": { "radius": { "type": "number", "value": "wide" } } }"#)
                .unwrap_err(),
            CodecError::TypeMismatch {
                name: "radius".into(),
                expected: "number",
                actual: "string",
            }
        );
        assert_eq!(
            deserialize(r#"{ "properties": { "count": { "type": "integer", "value": 1.5 } } }"#)
                .unwrap_err(),
            CodecError::TypeMismatch {
                name: "count".into(),
                expected: "integer",
                actual: "number",
            }
        );
    }

    #[test]
    fn missing_format_reads_as_current_version() {
        let config = deserialize(r#"{ "properties": {} }"#).unwrap();
        assert_eq!(config.format(), FORMAT_VERSION);
        assert!(config.is_empty());
    }
}
