//! The coercion cascade
//!
//! Deciding how a source value lands in a target slot is a fixed sequence of
//! rules, tried in order until one applies:
//!
//! 1. an absent source is ignored
//! 2. in merge mode a zero source is ignored
//! 3. an unsettable target is an error
//! 4. identical types are assigned (non-opaque structs deep-merged in merge mode)
//! 5. a present pointer source is dereferenced
//! 6. a present dynamic source is unwrapped
//! 7. wrapper payloads are unwrapped and the cascade restarts
//! 8. directly convertible values are converted and assigned
//! 9. wrapper absorption, then same-kind structs, lists and maps
//! 10. a slice into an array
//! 11. text is parsed according to the target
//! 12. an untyped map into a struct or map
//! 13. bytes, or a value with a marshal hook, restart as text
//! 14. and 15. wrapper fallbacks restart with their replacement
//! 16. anything else is skipped
//!
//! Copyright (c) 2025 Shapeshift Team
//! Licensed under the Apache-2.0 license

use super::model::Field;
use super::{Mapper, Mode};
use crate::error::{Error, ParseBoolError, Result};
use crate::types::{Kind, Type, TypeRepr, UnmarshalHook};
use crate::value::{Data, Value};

/// Parse the boolean spellings `1 t T TRUE true True` and `0 f F FALSE false False`
pub fn parse_bool(text: &str) -> std::result::Result<bool, ParseBoolError> {
    match text {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Ok(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Ok(false),
        _ => Err(ParseBoolError {
            input: text.to_string(),
        }),
    }
}

/// Same-representation retagging, numeric casts, text to bytes and back, anything into `any`
///
/// Bytes to bytes is left to the JSON-aware rules.
pub(crate) fn convert(source: &Value, target: &Type) -> Option<Value> {
    if source.kind() == Kind::Bytes && target.kind() == Kind::Bytes {
        return None;
    }

    if target.kind() == Kind::Any {
        let boxed = Data::Any(Some(Box::new(source.clone())));
        return Some(Value::from_parts(target.clone(), boxed));
    }

    if source.ty().repr() == target.repr() {
        return Some(source.clone().retag(target.clone()));
    }

    let data = match (source.data(), target.repr()) {
        (Data::Int(v), TypeRepr::Uint) => Data::Uint(*v as u64),
        (Data::Int(v), TypeRepr::Float) => Data::Float(*v as f64),
        (Data::Uint(v), TypeRepr::Int) => Data::Int(*v as i64),
        (Data::Uint(v), TypeRepr::Float) => Data::Float(*v as f64),
        (Data::Float(v), TypeRepr::Int) => Data::Int(*v as i64),
        (Data::Float(v), TypeRepr::Uint) => Data::Uint(*v as u64),
        (Data::String(v), TypeRepr::Bytes) => Data::Bytes(v.clone().into_bytes()),
        (Data::Bytes(v), TypeRepr::String) => Data::String(String::from_utf8_lossy(v).into_owned()),
        _ => return None,
    };
    Some(Value::from_parts(target.clone(), data))
}

fn skips(source: &Value, mode: Mode) -> bool {
    source.is_absent() || (mode == Mode::Merge && source.is_zero())
}

impl Mapper {
    /// Write `source` into a struct field
    pub(crate) fn set_field(
        &self,
        field: &mut Field<'_>,
        source: &Value,
        mode: Mode,
    ) -> Result<()> {
        if skips(source, mode) {
            return Ok(());
        }

        match field.slot() {
            Some(slot) => self.cascade(slot, source, mode),
            None => Err(Error::Unsettable {
                field: field.name().to_string(),
            }),
        }
    }

    /// Write `source` into a slot that is known to be settable
    pub(crate) fn coerce(&self, target: &mut Value, source: &Value, mode: Mode) -> Result<()> {
        if skips(source, mode) {
            return Ok(());
        }
        self.cascade(target, source, mode)
    }

    fn cascade(&self, target: &mut Value, source: &Value, mode: Mode) -> Result<()> {
        if source.ty() == target.ty() {
            return self.assign(target, source.clone(), mode);
        }

        let source = match source.data() {
            Data::Pointer(Some(inner)) => inner.as_ref(),
            _ => source,
        };
        let source = match source.data() {
            Data::Any(Some(inner)) => inner.as_ref(),
            _ => source,
        };
        if matches!(source.data(), Data::Pointer(None) | Data::Any(None)) {
            log::trace!("nothing behind {} source", source.ty());
            return Ok(());
        }

        if let Some(payload) = self.wrappers.payload(source) {
            log::trace!("unwrapping {} payload", source.ty());
            return self.coerce(target, &payload, mode);
        }

        if let Some(converted) = convert(source, target.ty()) {
            return self.assign(target, converted, mode);
        }

        if let Some(absorbed) = self.wrappers.absorb(target, source) {
            return self.store(target, absorbed);
        }

        match (target.kind(), source.kind()) {
            (Kind::Struct, Kind::Struct) => return self.merge_fields(target, source, mode),
            (Kind::Slice, Kind::Slice)
            | (Kind::Array, Kind::Array)
            | (Kind::Array, Kind::Slice) => {
                return self.copy_list(target, source);
            }
            (Kind::Map, Kind::Map) => return self.copy_map(target, source),
            _ => {}
        }

        if let Some(text) = source.as_str() {
            return self.coerce_str(target, text, mode);
        }

        if source.ty().is_untyped_map() {
            match target.kind() {
                Kind::Struct => return self.apply_map(target, source),
                Kind::Map => return self.copy_map(target, source),
                _ => {}
            }
        }

        if let Some(bytes) = self.byte_form(source)? {
            let text = String::from_utf8_lossy(&bytes).into_owned();
            return self.coerce(target, &Value::string(text), mode);
        }

        if let Some(replacement) = self.wrappers.fallback(source) {
            log::trace!("falling back from {} to {}", source.ty(), replacement.ty());
            return self.coerce(target, &replacement, mode);
        }

        log::debug!("no coercion from {} to {}, skipped", source.ty(), target.ty());
        Ok(())
    }

    /// Store `value`, deep-merging non-opaque structs in merge mode
    fn assign(&self, target: &mut Value, value: Value, mode: Mode) -> Result<()> {
        if mode == Mode::Merge
            && target.kind() == Kind::Struct
            && !self.wrappers.is_opaque(target.ty())
        {
            return self.merge_fields(target, &value, Mode::Merge);
        }
        self.store(target, value)
    }

    /// Overwrite the slot, keep its declared type, then validate it
    pub(crate) fn store(&self, target: &mut Value, value: Value) -> Result<()> {
        let declared = target.ty().clone();
        *target = value.retag(declared);
        self.validate(target)
    }

    /// Run the `validate` hook of the value's type
    pub(crate) fn validate(&self, value: &Value) -> Result<()> {
        match value.ty().hooks().validate {
            Some(hook) => hook(value).map_err(|source| Error::InvalidData {
                type_name: value.ty().to_string(),
                source,
            }),
            None => Ok(()),
        }
    }

    fn coerce_str(&self, target: &mut Value, text: &str, mode: Mode) -> Result<()> {
        if let Some(hook) = target.ty().hooks().unmarshal_json {
            return self.unmarshal(target, hook, text.as_bytes());
        }

        let ty = target.ty().clone();
        let data = match ty.repr() {
            TypeRepr::String => return self.coerce(target, &Value::string(text), mode),
            TypeRepr::Int => {
                Data::Int(text.parse::<i64>().map_err(|e| Error::parse(&ty, text, e))?)
            }
            TypeRepr::Uint => {
                Data::Uint(text.parse::<u64>().map_err(|e| Error::parse(&ty, text, e))?)
            }
            TypeRepr::Float => {
                Data::Float(text.parse::<f64>().map_err(|e| Error::parse(&ty, text, e))?)
            }
            TypeRepr::Bool => {
                Data::Bool(parse_bool(text).map_err(|e| Error::parse(&ty, text, e))?)
            }
            _ => {
                if let Some(parsed) = self.wrappers.parse(&ty, text, &self.config) {
                    return self.assign(target, parsed?, mode);
                }
                return self.coerce_json(target, text);
            }
        };
        self.store(target, Value::from_parts(ty, data))
    }

    /// Decode `text` as JSON and merge it structurally
    fn coerce_json(&self, target: &mut Value, text: &str) -> Result<()> {
        if !matches!(target.kind(), Kind::Struct | Kind::Slice | Kind::Array | Kind::Map) {
            log::debug!("no text coercion into {}, skipped", target.ty());
            return Ok(());
        }
        if text.trim().is_empty() {
            return Ok(());
        }

        let json: serde_json::Value =
            serde_json::from_str(text).map_err(|e| Error::parse(target.ty(), text, e))?;
        let decoded = Value::from_json(&json);

        match (target.kind(), decoded.kind()) {
            (Kind::Struct, Kind::Map) => self.apply_map(target, &decoded),
            (Kind::Slice | Kind::Array, Kind::Slice) => self.copy_list(target, &decoded),
            (Kind::Map, Kind::Map) => self.copy_map(target, &decoded),
            _ => {
                log::debug!("JSON {} does not fit {}, skipped", decoded.ty(), target.ty());
                Ok(())
            }
        }
    }

    fn unmarshal(&self, target: &mut Value, hook: UnmarshalHook, bytes: &[u8]) -> Result<()> {
        if let Err(source) = hook(bytes, target) {
            return Err(Error::Hook {
                type_name: target.ty().to_string(),
                hook: "unmarshal_json",
                source,
            });
        }
        self.validate(target)
    }

    /// Bytes of a source for the text restart, through its marshal hook if any
    fn byte_form(&self, source: &Value) -> Result<Option<Vec<u8>>> {
        if let Some(hook) = source.ty().hooks().marshal_json {
            return hook(source).map(Some).map_err(|e| Error::Hook {
                type_name: source.ty().to_string(),
                hook: "marshal_json",
                source: e,
            });
        }
        Ok(source.as_bytes().map(<[u8]>::to_vec))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::FieldDesc;
    use chrono::{TimeZone, Utc};

    fn mapper() -> Mapper {
        Mapper::new()
    }

    #[test]
    fn test_parse_bool_spellings() {
        for text in ["1", "t", "T", "TRUE", "true", "True"] {
            assert_eq!(parse_bool(text), Ok(true), "{}", text);
        }
        for text in ["0", "f", "F", "FALSE", "false", "False"] {
            assert_eq!(parse_bool(text), Ok(false), "{}", text);
        }
        assert!(parse_bool("yes").is_err());
        assert!(parse_bool("tRuE").is_err());
    }

    #[test]
    fn test_absent_source_is_ignored() {
        let mut target = Value::string("keep");
        mapper().coerce(&mut target, &Value::absent(), Mode::Copy).unwrap();
        assert_eq!(target, Value::string("keep"));
    }

    #[test]
    fn test_zero_source_depends_on_mode() {
        let mut target = Value::int(5);
        mapper().coerce(&mut target, &Value::int(0), Mode::Merge).unwrap();
        assert_eq!(target, Value::int(5));

        mapper().coerce(&mut target, &Value::int(0), Mode::Copy).unwrap();
        assert_eq!(target, Value::int(0));
    }

    #[test]
    fn test_named_types_convert() {
        let kind = Type::named("Kind", TypeRepr::String);
        let mut target = Value::zero(&kind);
        mapper().coerce(&mut target, &Value::string("admin"), Mode::Merge).unwrap();
        assert_eq!(target.ty(), &kind);
        assert_eq!(target.as_str(), Some("admin"));
    }

    #[test]
    fn test_numeric_conversions() {
        let mut target = Value::float(0.0);
        mapper().coerce(&mut target, &Value::int(3), Mode::Merge).unwrap();
        assert_eq!(target, Value::float(3.0));

        let mut target = Value::int(0);
        mapper().coerce(&mut target, &Value::any(Value::uint(9)), Mode::Merge).unwrap();
        assert_eq!(target, Value::int(9));
    }

    #[test]
    fn test_text_parsing() {
        let mut number = Value::int(0);
        mapper().coerce(&mut number, &Value::string("-42"), Mode::Merge).unwrap();
        assert_eq!(number, Value::int(-42));

        let mut flag = Value::bool(false);
        mapper().coerce(&mut flag, &Value::string("T"), Mode::Merge).unwrap();
        assert_eq!(flag, Value::bool(true));

        let mut ratio = Value::float(0.0);
        mapper().coerce(&mut ratio, &Value::string("0.25"), Mode::Merge).unwrap();
        assert_eq!(ratio, Value::float(0.25));
    }

    #[test]
    fn test_bad_text_is_a_parse_error() {
        let mut number = Value::uint(1);
        let err = mapper().coerce(&mut number, &Value::string("-1"), Mode::Merge).unwrap_err();
        assert!(err.is_parse());
        assert_eq!(number, Value::uint(1));
    }

    #[test]
    fn test_text_into_timestamp() {
        let mut target = Value::zero(&Type::timestamp());
        mapper().coerce(&mut target, &Value::string("2023-12-12"), Mode::Merge).unwrap();
        let expected = Utc.with_ymd_and_hms(2023, 12, 12, 0, 0, 0).unwrap();
        assert_eq!(target.as_timestamp(), Some(Some(expected)));
    }

    #[test]
    fn test_json_text_into_struct_and_list() {
        let ty = Type::structure(
            "Point",
            vec![FieldDesc::new("X", Type::int()), FieldDesc::new("Y", Type::int())],
        );
        let mut point = Value::zero(&ty);
        mapper().coerce(&mut point, &Value::string(r#"{"x": 1, "y": "2"}"#), Mode::Copy).unwrap();
        assert_eq!(point.field("X"), Some(&Value::int(1)));
        assert_eq!(point.field("Y"), Some(&Value::int(2)));

        let mut tags = Value::zero(&Type::slice(Type::string()));
        mapper().coerce(&mut tags, &Value::string(r#"["a","b"]"#), Mode::Copy).unwrap();
        assert_eq!(tags.items().unwrap(), &[Value::string("a"), Value::string("b")]);
    }

    #[test]
    fn test_invalid_json_text_is_a_parse_error() {
        let ty = Type::structure("Point", vec![FieldDesc::new("X", Type::int())]);
        let mut point = Value::zero(&ty);
        let err = mapper().coerce(&mut point, &Value::string("{oops"), Mode::Copy).unwrap_err();
        assert!(err.is_parse());
    }

    #[test]
    fn test_null_and_blank_json_do_nothing() {
        let mut tags = Value::slice(Type::string(), vec![Value::string("keep")]);
        mapper().coerce(&mut tags, &Value::string("null"), Mode::Copy).unwrap();
        mapper().coerce(&mut tags, &Value::string("   "), Mode::Copy).unwrap();
        assert_eq!(tags.items().unwrap().len(), 1);
    }

    #[test]
    fn test_bytes_restart_as_text() {
        let mut number = Value::int(0);
        mapper().coerce(&mut number, &Value::bytes("17"), Mode::Copy).unwrap();
        assert_eq!(number, Value::int(17));
    }

    #[test]
    fn test_anything_into_any() {
        let mut slot = Value::zero(&Type::any());
        mapper().coerce(&mut slot, &Value::int(1), Mode::Copy).unwrap();
        assert_eq!(slot.indirect(), &Value::int(1));
    }

    #[test]
    fn test_unmatched_shapes_are_skipped() {
        let mut flag = Value::bool(true);
        let list = Value::slice(Type::int(), vec![Value::int(1)]);
        mapper().coerce(&mut flag, &list, Mode::Copy).unwrap();
        assert_eq!(flag, Value::bool(true));
    }

    #[test]
    fn test_nil_pointer_source_is_ignored() {
        let mut target = Value::string("keep");
        let nil = Value::zero(&Type::pointer(Type::int()));
        mapper().coerce(&mut target, &nil, Mode::Copy).unwrap();
        assert_eq!(target, Value::string("keep"));
    }

    #[test]
    fn test_pointer_source_is_dereferenced() {
        let mut target = Value::int(0);
        let pointer = Value::from_parts(
            Type::pointer(Type::uint()),
            Data::Pointer(Some(Box::new(Value::uint(4)))),
        );
        mapper().coerce(&mut target, &pointer, Mode::Merge).unwrap();
        assert_eq!(target, Value::int(4));
    }
}
