//! Nullable string and nullable JSON payload wrappers
//!
//! Copyright (c) 2025 Shapeshift Team
//! Licensed under the Apache-2.0 license

use super::Wrapper;
use crate::reflect::Bytes;
use crate::value::Value;

const STRING_FIELD: &str = "string";
const VALID_FIELD: &str = "valid";
const RAW_MESSAGE_FIELD: &str = "raw_message";

crate::reflect_newtype! {
    /// Raw JSON text kept as bytes
    #[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
    pub struct RawJson(pub Bytes);
}

impl RawJson {
    pub fn new(raw: impl Into<Vec<u8>>) -> Self {
        RawJson(Bytes(raw.into()))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0 .0
    }
}

crate::reflect_struct! {
    /// A string that may be SQL `NULL`
    #[derive(Debug, Clone, Default, PartialEq, Eq)]
    pub struct NullString {
        pub string: String,
        pub valid: bool,
    }
}

impl NullString {
    pub fn new(string: impl Into<String>) -> Self {
        Self {
            string: string.into(),
            valid: true,
        }
    }

    pub fn null() -> Self {
        Self::default()
    }
}

crate::reflect_struct! {
    /// A JSON payload that may be SQL `NULL`
    #[derive(Debug, Clone, Default, PartialEq, Eq)]
    pub struct NullJson {
        pub raw_message: RawJson,
        pub valid: bool,
    }
}

impl NullJson {
    pub fn new(raw: impl Into<Vec<u8>>) -> Self {
        Self {
            raw_message: RawJson::new(raw),
            valid: true,
        }
    }
}

/// Unwraps to the inner string, or `""` when null
#[derive(Debug, Clone, Copy)]
pub struct NullStringWrapper;

impl Wrapper for NullStringWrapper {
    fn fallback(&self, source: &Value) -> Option<Value> {
        let valid = source.field(VALID_FIELD)?.as_bool()?;
        let string = source.field(STRING_FIELD)?.as_str()?;
        Some(Value::string(if valid { string } else { "" }))
    }
}

/// Unwraps to the raw payload bytes, or to their text as a last resort
#[derive(Debug, Clone, Copy)]
pub struct NullJsonWrapper;

impl Wrapper for NullJsonWrapper {
    fn payload(&self, source: &Value) -> Option<Value> {
        source.field(RAW_MESSAGE_FIELD).cloned()
    }

    fn fallback(&self, source: &Value) -> Option<Value> {
        let raw = source.field(RAW_MESSAGE_FIELD)?.as_bytes()?;
        Some(Value::string(String::from_utf8_lossy(raw)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reflect::Reflect;

    #[test]
    fn test_raw_json_is_named_bytes() {
        let ty = RawJson::reflect_type();
        assert_eq!(ty.name(), Some("RawJson"));
        assert_eq!(RawJson::new("[1]").to_value().as_bytes(), Some(&b"[1]"[..]));
    }

    #[test]
    fn test_null_string_fallback() {
        let valid = NullStringWrapper.fallback(&NullString::new("hi").to_value()).unwrap();
        assert_eq!(valid, Value::string("hi"));

        let stale = NullString {
            string: "stale".to_string(),
            valid: false,
        };
        let null = NullStringWrapper.fallback(&stale.to_value()).unwrap();
        assert_eq!(null, Value::string(""));
    }

    #[test]
    fn test_null_json_payload() {
        let source = NullJson::new(r#"{"a":1}"#).to_value();
        let payload = NullJsonWrapper.payload(&source).unwrap();
        assert_eq!(payload.ty(), &RawJson::reflect_type());
        assert_eq!(payload.as_bytes(), Some(&br#"{"a":1}"#[..]));

        let text = NullJsonWrapper.fallback(&source).unwrap();
        assert_eq!(text.as_str(), Some(r#"{"a":1}"#));
    }

    #[test]
    fn test_round_trip_through_value() {
        let original = NullJson::new("[]");
        assert_eq!(NullJson::from_value(&original.to_value()).unwrap(), original);
    }
}
