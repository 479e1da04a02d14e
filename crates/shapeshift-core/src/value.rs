//! Dynamic values
//!
//! A [`Value`] pairs a declared [`Type`] with its [`Data`]. The mapper only
//! ever works on values, so anything that wants to be merged or copied is
//! first turned into one (see [`Reflect`](crate::Reflect)).
//!
//! Copyright (c) 2025 Shapeshift Team
//! Licensed under the Apache-2.0 license

use crate::error::{Error, Result};
use crate::types::{Kind, Type, TypeRepr};
use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::json;
use uuid::Uuid;

/// Payload of a value; the variant always matches the value's type
#[derive(Debug, Clone, PartialEq)]
pub enum Data {
    Bool(bool),
    Int(i64),
    Uint(u64),
    Float(f64),
    String(String),
    Bytes(Vec<u8>),
    /// `None` is the zero timestamp
    Timestamp(Option<DateTime<Utc>>),
    Uuid(Uuid),
    /// Field values in declaration order
    Struct(Vec<Value>),
    /// Slice or array elements
    List(Vec<Value>),
    /// Entries in insertion order, keys unique
    Map(Vec<(Value, Value)>),
    Pointer(Option<Box<Value>>),
    Any(Option<Box<Value>>),
}

/// A value of a declared type
#[derive(Debug, Clone, PartialEq)]
pub struct Value {
    ty: Type,
    data: Data,
}

impl Value {
    /// Assemble a value; `data` must match the representation of `ty`
    pub fn from_parts(ty: Type, data: Data) -> Self {
        Self { ty, data }
    }

    /// The zero value of `ty`
    pub fn zero(ty: &Type) -> Self {
        let data = match ty.repr() {
            TypeRepr::Bool => Data::Bool(false),
            TypeRepr::Int => Data::Int(0),
            TypeRepr::Uint => Data::Uint(0),
            TypeRepr::Float => Data::Float(0.0),
            TypeRepr::String => Data::String(String::new()),
            TypeRepr::Bytes => Data::Bytes(Vec::new()),
            TypeRepr::Timestamp => Data::Timestamp(None),
            TypeRepr::Uuid => Data::Uuid(Uuid::nil()),
            TypeRepr::Struct(fields) => {
                Data::Struct(fields.iter().map(|field| Value::zero(field.ty())).collect())
            }
            TypeRepr::Slice(_) => Data::List(Vec::new()),
            TypeRepr::Array(elem, len) => {
                Data::List((0..*len).map(|_| Value::zero(elem)).collect())
            }
            TypeRepr::Map(_, _) => Data::Map(Vec::new()),
            TypeRepr::Pointer(_) => Data::Pointer(None),
            TypeRepr::Any => Data::Any(None),
        };

        Self { ty: ty.clone(), data }
    }

    pub fn bool(value: bool) -> Self {
        Self::from_parts(Type::bool(), Data::Bool(value))
    }

    pub fn int(value: i64) -> Self {
        Self::from_parts(Type::int(), Data::Int(value))
    }

    pub fn uint(value: u64) -> Self {
        Self::from_parts(Type::uint(), Data::Uint(value))
    }

    pub fn float(value: f64) -> Self {
        Self::from_parts(Type::float(), Data::Float(value))
    }

    pub fn string(value: impl Into<String>) -> Self {
        Self::from_parts(Type::string(), Data::String(value.into()))
    }

    pub fn bytes(value: impl Into<Vec<u8>>) -> Self {
        Self::from_parts(Type::bytes(), Data::Bytes(value.into()))
    }

    pub fn timestamp(value: DateTime<Utc>) -> Self {
        Self::from_parts(Type::timestamp(), Data::Timestamp(Some(value)))
    }

    pub fn uuid(value: Uuid) -> Self {
        Self::from_parts(Type::uuid(), Data::Uuid(value))
    }

    /// `value` stored behind a dynamic container
    pub fn any(value: Value) -> Self {
        if value.kind() == Kind::Any {
            return value;
        }
        Self::from_parts(Type::any(), Data::Any(Some(Box::new(value))))
    }

    /// The empty dynamic container (JSON `null`)
    pub fn absent() -> Self {
        Self::from_parts(Type::any(), Data::Any(None))
    }

    /// A `[]elem` slice
    pub fn slice(elem: Type, items: Vec<Value>) -> Self {
        Self::from_parts(Type::slice(elem), Data::List(items))
    }

    /// A `map[string]any` built from string keys and concrete values
    pub fn untyped_map<I, K>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        let mut map = Self::zero(&Type::untyped_map());
        for (key, value) in entries {
            map.map_insert(Value::string(key), Value::any(value));
        }
        map
    }

    /// A struct value checked against `ty`
    pub fn structure(ty: &Type, fields: Vec<Value>) -> Result<Self> {
        let declared = ty.fields();
        if ty.kind() != Kind::Struct || declared.len() != fields.len() {
            return Err(Error::TypeMismatch {
                expected: ty.to_string(),
                found: format!("{} field values", fields.len()),
            });
        }

        for (desc, value) in declared.iter().zip(&fields) {
            if desc.ty() != value.ty() {
                return Err(Error::TypeMismatch {
                    expected: format!("{} for field {}", desc.ty(), desc.name()),
                    found: value.ty().to_string(),
                });
            }
        }

        Ok(Self::from_parts(ty.clone(), Data::Struct(fields)))
    }

    pub fn ty(&self) -> &Type {
        &self.ty
    }

    pub fn data(&self) -> &Data {
        &self.data
    }

    pub(crate) fn data_mut(&mut self) -> &mut Data {
        &mut self.data
    }

    pub fn into_data(self) -> Data {
        self.data
    }

    pub fn kind(&self) -> Kind {
        self.ty.kind()
    }

    /// Same data under another type with an identical representation
    pub fn retag(self, ty: Type) -> Self {
        Self { ty, data: self.data }
    }

    /// Zero predicate, decided per kind
    ///
    /// Structs and arrays are zero when every element is, hidden fields
    /// included. Empty slices and maps count as zero.
    pub fn is_zero(&self) -> bool {
        match &self.data {
            Data::Bool(value) => !value,
            Data::Int(value) => *value == 0,
            Data::Uint(value) => *value == 0,
            Data::Float(value) => *value == 0.0,
            Data::String(value) => value.is_empty(),
            Data::Bytes(value) => value.is_empty(),
            Data::Timestamp(value) => value.is_none(),
            Data::Uuid(value) => value.is_nil(),
            Data::Struct(fields) => fields.iter().all(Value::is_zero),
            Data::List(items) if self.kind() == Kind::Array => items.iter().all(Value::is_zero),
            Data::List(items) => items.is_empty(),
            Data::Map(entries) => entries.is_empty(),
            Data::Pointer(inner) | Data::Any(inner) => inner.is_none(),
        }
    }

    /// An empty dynamic container, the "invalid" source of the cascade
    pub fn is_absent(&self) -> bool {
        matches!(self.data, Data::Any(None))
    }

    /// Follow present pointers and dynamic containers
    pub fn indirect(&self) -> &Value {
        match &self.data {
            Data::Pointer(Some(inner)) | Data::Any(Some(inner)) => inner.indirect(),
            _ => self,
        }
    }

    /// Mutable counterpart of [`Value::indirect`]
    pub fn indirect_mut(&mut self) -> &mut Value {
        match self.data {
            Data::Pointer(Some(ref mut inner)) | Data::Any(Some(ref mut inner)) => {
                inner.indirect_mut()
            }
            _ => self,
        }
    }

    /// Field by its declared name
    pub fn field(&self, name: &str) -> Option<&Value> {
        let value = self.indirect();
        let index = value.ty.fields().iter().position(|field| field.name() == name)?;
        match &value.data {
            Data::Struct(fields) => fields.get(index),
            _ => None,
        }
    }

    /// Mutable field by its declared name
    pub fn field_mut(&mut self, name: &str) -> Option<&mut Value> {
        let value = self.indirect_mut();
        let index = value.ty.fields().iter().position(|field| field.name() == name)?;
        match &mut value.data {
            Data::Struct(fields) => fields.get_mut(index),
            _ => None,
        }
    }

    /// Declared type and field values of the struct behind any indirection
    pub(crate) fn struct_parts(&self) -> Option<(&Type, &[Value])> {
        let value = self.indirect();
        match &value.data {
            Data::Struct(fields) => Some((&value.ty, fields)),
            _ => None,
        }
    }

    /// Mutable counterpart of [`Value::struct_parts`]
    pub(crate) fn struct_parts_mut(&mut self) -> Option<(&Type, &mut [Value])> {
        let value = self.indirect_mut();
        match &mut value.data {
            Data::Struct(fields) => Some((&value.ty, fields)),
            _ => None,
        }
    }

    /// Field by its declared name, or a type mismatch error
    pub fn require_field(&self, name: &str) -> Result<&Value> {
        self.field(name).ok_or_else(|| Error::TypeMismatch {
            expected: format!("struct with field {}", name),
            found: self.ty.to_string(),
        })
    }

    /// Slice or array elements
    pub fn items(&self) -> Option<&[Value]> {
        match &self.data {
            Data::List(items) => Some(items),
            _ => None,
        }
    }

    /// Map entries
    pub fn entries(&self) -> Option<&[(Value, Value)]> {
        match &self.data {
            Data::Map(entries) => Some(entries),
            _ => None,
        }
    }

    /// Map lookup by key equality
    pub fn get(&self, key: &Value) -> Option<&Value> {
        self.entries()?
            .iter()
            .find(|(candidate, _)| candidate == key)
            .map(|(_, value)| value)
    }

    /// Insert or replace a map entry; ignored for non-map values
    pub(crate) fn map_insert(&mut self, key: Value, value: Value) {
        if let Data::Map(entries) = &mut self.data {
            match entries.iter_mut().find(|(candidate, _)| *candidate == key) {
                Some(slot) => slot.1 = value,
                None => entries.push((key, value)),
            }
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self.data {
            Data::Bool(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self.data {
            Data::Int(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_u64(&self) -> Option<u64> {
        match self.data {
            Data::Uint(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self.data {
            Data::Float(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match &self.data {
            Data::String(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match &self.data {
            Data::Bytes(value) => Some(value),
            _ => None,
        }
    }

    /// `Some(None)` for the zero timestamp
    pub fn as_timestamp(&self) -> Option<Option<DateTime<Utc>>> {
        match self.data {
            Data::Timestamp(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_uuid(&self) -> Option<Uuid> {
        match self.data {
            Data::Uuid(value) => Some(value),
            _ => None,
        }
    }

    /// Decode JSON the way an untyped decoder would
    ///
    /// Objects become `map[string]any`, arrays `[]any`, `null` the absent
    /// value. Integral numbers stay integers.
    pub fn from_json(json: &serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::absent(),
            serde_json::Value::Bool(value) => Value::bool(*value),
            serde_json::Value::Number(number) => {
                if let Some(value) = number.as_i64() {
                    Value::int(value)
                } else if let Some(value) = number.as_u64() {
                    Value::uint(value)
                } else {
                    Value::float(number.as_f64().unwrap_or_default())
                }
            }
            serde_json::Value::String(value) => Value::string(value.clone()),
            serde_json::Value::Array(items) => Value::slice(
                Type::any(),
                items.iter().map(|item| Value::any(Value::from_json(item))).collect(),
            ),
            serde_json::Value::Object(object) => Value::untyped_map(
                object.iter().map(|(key, value)| (key.clone(), Value::from_json(value))),
            ),
        }
    }

    /// Encode as JSON
    ///
    /// Bytes holding valid JSON are embedded as-is, other bytes become a
    /// string. Hidden struct fields are left out.
    pub fn to_json(&self) -> serde_json::Value {
        match &self.data {
            Data::Bool(value) => json!(value),
            Data::Int(value) => json!(value),
            Data::Uint(value) => json!(value),
            Data::Float(value) => serde_json::Number::from_f64(*value)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Data::String(value) => json!(value),
            Data::Bytes(value) => serde_json::from_slice(value)
                .unwrap_or_else(|_| json!(String::from_utf8_lossy(value))),
            Data::Timestamp(Some(value)) => {
                json!(value.to_rfc3339_opts(SecondsFormat::AutoSi, true))
            }
            Data::Timestamp(None) => serde_json::Value::Null,
            Data::Uuid(value) => json!(value.to_string()),
            Data::Struct(fields) => {
                let object = self
                    .ty
                    .fields()
                    .iter()
                    .zip(fields)
                    .filter(|(desc, _)| desc.is_exported())
                    .map(|(desc, value)| (desc.name().to_string(), value.to_json()))
                    .collect();
                serde_json::Value::Object(object)
            }
            Data::List(items) => {
                serde_json::Value::Array(items.iter().map(Value::to_json).collect())
            }
            Data::Map(entries) => {
                let object = entries
                    .iter()
                    .map(|(key, value)| {
                        let key = match key.indirect().as_str() {
                            Some(text) => text.to_string(),
                            None => key.to_json().to_string(),
                        };
                        (key, value.to_json())
                    })
                    .collect();
                serde_json::Value::Object(object)
            }
            Data::Pointer(Some(inner)) | Data::Any(Some(inner)) => inner.to_json(),
            Data::Pointer(None) | Data::Any(None) => serde_json::Value::Null,
        }
    }
}
