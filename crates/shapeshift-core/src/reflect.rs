//! Bridge between Rust types and the dynamic value model
//!
//! [`Reflect`] turns a Rust value into a [`Value`] of its declared [`Type`]
//! and back. Implementations are provided for the standard scalar and
//! collection types, chrono timestamps, UUIDs and `serde_json::Value`; user
//! structs and newtypes get theirs from [`reflect_struct!`](crate::reflect_struct)
//! and [`reflect_newtype!`](crate::reflect_newtype).
//!
//! Copyright (c) 2025 Shapeshift Team
//! Licensed under the Apache-2.0 license

use crate::error::{Error, Result};
use crate::types::Type;
use crate::value::{Data, Value};
use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, HashMap};
use std::hash::Hash;
use uuid::Uuid;

/// A Rust type that can enter and leave the dynamic value model
pub trait Reflect: Sized {
    /// The declared type of every value produced by [`Reflect::to_value`]
    fn reflect_type() -> Type;

    fn to_value(&self) -> Value;

    fn from_value(value: &Value) -> Result<Self>;
}

pub(crate) fn mismatch(expected: &Type, found: &Value) -> Error {
    Error::TypeMismatch {
        expected: expected.to_string(),
        found: found.ty().to_string(),
    }
}

/// Raw, unnamed byte sequence
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Bytes(pub Vec<u8>);

impl Reflect for Bytes {
    fn reflect_type() -> Type {
        Type::bytes()
    }

    fn to_value(&self) -> Value {
        Value::bytes(self.0.clone())
    }

    fn from_value(value: &Value) -> Result<Self> {
        value
            .as_bytes()
            .map(|bytes| Bytes(bytes.to_vec()))
            .ok_or_else(|| mismatch(&Self::reflect_type(), value))
    }
}

macro_rules! reflect_signed {
    ($($t:ty),*) => {
        $(
            impl Reflect for $t {
                fn reflect_type() -> Type {
                    Type::int()
                }

                fn to_value(&self) -> Value {
                    Value::int(*self as i64)
                }

                fn from_value(value: &Value) -> Result<Self> {
                    let raw = value
                        .as_i64()
                        .ok_or_else(|| mismatch(&Self::reflect_type(), value))?;
                    <$t>::try_from(raw).map_err(|_| Error::TypeMismatch {
                        expected: stringify!($t).to_string(),
                        found: format!("out of range integer {}", raw),
                    })
                }
            }
        )*
    };
}

macro_rules! reflect_unsigned {
    ($($t:ty),*) => {
        $(
            impl Reflect for $t {
                fn reflect_type() -> Type {
                    Type::uint()
                }

                fn to_value(&self) -> Value {
                    Value::uint(*self as u64)
                }

                fn from_value(value: &Value) -> Result<Self> {
                    let raw = value
                        .as_u64()
                        .ok_or_else(|| mismatch(&Self::reflect_type(), value))?;
                    <$t>::try_from(raw).map_err(|_| Error::TypeMismatch {
                        expected: stringify!($t).to_string(),
                        found: format!("out of range unsigned integer {}", raw),
                    })
                }
            }
        )*
    };
}

reflect_signed!(i8, i16, i32, i64, isize);
reflect_unsigned!(u8, u16, u32, u64, usize);

impl Reflect for f64 {
    fn reflect_type() -> Type {
        Type::float()
    }

    fn to_value(&self) -> Value {
        Value::float(*self)
    }

    fn from_value(value: &Value) -> Result<Self> {
        value
            .as_f64()
            .ok_or_else(|| mismatch(&Self::reflect_type(), value))
    }
}

impl Reflect for f32 {
    fn reflect_type() -> Type {
        Type::float()
    }

    fn to_value(&self) -> Value {
        Value::float(f64::from(*self))
    }

    fn from_value(value: &Value) -> Result<Self> {
        value
            .as_f64()
            .map(|raw| raw as f32)
            .ok_or_else(|| mismatch(&Self::reflect_type(), value))
    }
}

impl Reflect for bool {
    fn reflect_type() -> Type {
        Type::bool()
    }

    fn to_value(&self) -> Value {
        Value::bool(*self)
    }

    fn from_value(value: &Value) -> Result<Self> {
        value
            .as_bool()
            .ok_or_else(|| mismatch(&Self::reflect_type(), value))
    }
}

impl Reflect for String {
    fn reflect_type() -> Type {
        Type::string()
    }

    fn to_value(&self) -> Value {
        Value::string(self.clone())
    }

    fn from_value(value: &Value) -> Result<Self> {
        value
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| mismatch(&Self::reflect_type(), value))
    }
}

impl Reflect for Uuid {
    fn reflect_type() -> Type {
        Type::uuid()
    }

    fn to_value(&self) -> Value {
        Value::uuid(*self)
    }

    fn from_value(value: &Value) -> Result<Self> {
        value
            .as_uuid()
            .ok_or_else(|| mismatch(&Self::reflect_type(), value))
    }
}

/// `DateTime::<Utc>::MIN_UTC` stands in for the zero timestamp
impl Reflect for DateTime<Utc> {
    fn reflect_type() -> Type {
        Type::timestamp()
    }

    fn to_value(&self) -> Value {
        let data = if *self == DateTime::<Utc>::MIN_UTC {
            None
        } else {
            Some(*self)
        };
        Value::from_parts(Self::reflect_type(), Data::Timestamp(data))
    }

    fn from_value(value: &Value) -> Result<Self> {
        value
            .as_timestamp()
            .map(|stamp| stamp.unwrap_or(DateTime::<Utc>::MIN_UTC))
            .ok_or_else(|| mismatch(&Self::reflect_type(), value))
    }
}

/// Dynamically typed field, decoded the way an untyped JSON decoder would
impl Reflect for serde_json::Value {
    fn reflect_type() -> Type {
        Type::any()
    }

    fn to_value(&self) -> Value {
        Value::any(Value::from_json(self))
    }

    fn from_value(value: &Value) -> Result<Self> {
        Ok(value.to_json())
    }
}

impl Reflect for Value {
    fn reflect_type() -> Type {
        Type::any()
    }

    fn to_value(&self) -> Value {
        Value::any(self.clone())
    }

    fn from_value(value: &Value) -> Result<Self> {
        Ok(value.indirect().clone())
    }
}

impl<T: Reflect> Reflect for Vec<T> {
    fn reflect_type() -> Type {
        Type::slice(T::reflect_type())
    }

    fn to_value(&self) -> Value {
        Value::from_parts(Self::reflect_type(), Data::List(self.iter().map(T::to_value).collect()))
    }

    fn from_value(value: &Value) -> Result<Self> {
        value
            .items()
            .ok_or_else(|| mismatch(&Self::reflect_type(), value))?
            .iter()
            .map(T::from_value)
            .collect()
    }
}

impl<T: Reflect, const N: usize> Reflect for [T; N] {
    fn reflect_type() -> Type {
        Type::array(T::reflect_type(), N)
    }

    fn to_value(&self) -> Value {
        Value::from_parts(Self::reflect_type(), Data::List(self.iter().map(T::to_value).collect()))
    }

    fn from_value(value: &Value) -> Result<Self> {
        let items = value
            .items()
            .ok_or_else(|| mismatch(&Self::reflect_type(), value))?
            .iter()
            .map(T::from_value)
            .collect::<Result<Vec<T>>>()?;
        let len = items.len();
        items.try_into().map_err(|_: Vec<T>| Error::TypeMismatch {
            expected: Self::reflect_type().to_string(),
            found: format!("{} elements", len),
        })
    }
}

impl<T: Reflect> Reflect for Option<T> {
    fn reflect_type() -> Type {
        Type::pointer(T::reflect_type())
    }

    fn to_value(&self) -> Value {
        let inner = self.as_ref().map(|value| Box::new(value.to_value()));
        Value::from_parts(Self::reflect_type(), Data::Pointer(inner))
    }

    fn from_value(value: &Value) -> Result<Self> {
        match value.data() {
            Data::Pointer(inner) => inner.as_deref().map(T::from_value).transpose(),
            _ => Err(mismatch(&Self::reflect_type(), value)),
        }
    }
}

fn map_entries<K: Reflect, V: Reflect>(expected: &Type, value: &Value) -> Result<Vec<(K, V)>> {
    value
        .entries()
        .ok_or_else(|| mismatch(expected, value))?
        .iter()
        .map(|(key, value)| Ok((K::from_value(key)?, V::from_value(value)?)))
        .collect()
}

impl<K, V> Reflect for HashMap<K, V>
where
    K: Reflect + Eq + Hash,
    V: Reflect,
{
    fn reflect_type() -> Type {
        Type::map(K::reflect_type(), V::reflect_type())
    }

    fn to_value(&self) -> Value {
        let entries = self
            .iter()
            .map(|(key, value)| (key.to_value(), value.to_value()))
            .collect();
        Value::from_parts(Self::reflect_type(), Data::Map(entries))
    }

    fn from_value(value: &Value) -> Result<Self> {
        Ok(map_entries(&Self::reflect_type(), value)?.into_iter().collect())
    }
}

impl<K, V> Reflect for BTreeMap<K, V>
where
    K: Reflect + Ord,
    V: Reflect,
{
    fn reflect_type() -> Type {
        Type::map(K::reflect_type(), V::reflect_type())
    }

    fn to_value(&self) -> Value {
        let entries = self
            .iter()
            .map(|(key, value)| (key.to_value(), value.to_value()))
            .collect();
        Value::from_parts(Self::reflect_type(), Data::Map(entries))
    }

    fn from_value(value: &Value) -> Result<Self> {
        Ok(map_entries(&Self::reflect_type(), value)?.into_iter().collect())
    }
}

#[doc(hidden)]
#[macro_export]
macro_rules! __reflect_hooks {
    () => {
        $crate::Hooks::NONE
    };
    ($hooks:expr) => {
        $hooks
    };
}

/// Declare a struct and implement [`Reflect`](crate::Reflect) for it
///
/// Every field is exported under its Rust name; the mapper matches names
/// after normalization, so `created_at` lines up with `CreatedAt`. A field
/// attribute `#[json = "..."]` sets the name listed by
/// [`ObjectModel::json_keys`](crate::ObjectModel::json_keys), and
/// `#[json = "-"]` leaves the field out of that list. An optional trailing
/// `hooks = ...;` attaches [`Hooks`](crate::Hooks) to the type.
///
/// ```
/// use shapeshift_core::reflect_struct;
///
/// reflect_struct! {
///     #[derive(Debug, Clone, Default, PartialEq)]
///     pub struct Profile {
///         pub name: String,
///         #[json = "years"]
///         pub age: i64,
///     }
/// }
///
/// assert_eq!(shapeshift_core::json_keys::<Profile>(), vec!["name", "years"]);
/// ```
#[macro_export]
macro_rules! reflect_struct {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident {
            $( $(#[$($fattr:tt)*])* $fvis:vis $field:ident : $fty:ty ),* $(,)?
        }
        $( hooks = $hooks:expr ; )?
    ) => {
        $crate::__reflect_struct! {
            head [$(#[$meta])* $vis struct $name]
            hooks [$crate::__reflect_hooks!($($hooks)?)]
            done []
            todo [$( { [$(#[$($fattr)*])*] [] [] $fvis $field : $fty } )*]
        }
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __reflect_struct {
    // A `json` attribute is recorded and dropped from the emitted field
    (
        head [$($head:tt)*]
        hooks [$hooks:expr]
        done [$($done:tt)*]
        todo [
            { [#[json = $json:literal] $($attrs:tt)*] [$($kept:tt)*] []
              $fvis:vis $field:ident : $fty:ty }
            $($todo:tt)*
        ]
    ) => {
        $crate::__reflect_struct! {
            head [$($head)*]
            hooks [$hooks]
            done [$($done)*]
            todo [{ [$($attrs)*] [$($kept)*] [$json] $fvis $field : $fty } $($todo)*]
        }
    };
    (
        head [$($head:tt)*]
        hooks [$hooks:expr]
        done [$($done:tt)*]
        todo [
            { [#[$($attr:tt)*] $($attrs:tt)*] [$($kept:tt)*] [$($json:literal)?]
              $fvis:vis $field:ident : $fty:ty }
            $($todo:tt)*
        ]
    ) => {
        $crate::__reflect_struct! {
            head [$($head)*]
            hooks [$hooks]
            done [$($done)*]
            todo [
                { [$($attrs)*] [$($kept)* #[$($attr)*]] [$($json)?] $fvis $field : $fty }
                $($todo)*
            ]
        }
    };
    (
        head [$($head:tt)*]
        hooks [$hooks:expr]
        done [$($done:tt)*]
        todo [
            { [] [$($kept:tt)*] [$($json:literal)?] $fvis:vis $field:ident : $fty:ty }
            $($todo:tt)*
        ]
    ) => {
        $crate::__reflect_struct! {
            head [$($head)*]
            hooks [$hooks]
            done [$($done)* { [$($kept)*] [$($json)?] $fvis $field : $fty }]
            todo [$($todo)*]
        }
    };
    (
        head [$(#[$meta:meta])* $vis:vis struct $name:ident]
        hooks [$hooks:expr]
        done [$( { [$($kept:tt)*] [$($json:literal)?] $fvis:vis $field:ident : $fty:ty } )*]
        todo []
    ) => {
        $(#[$meta])*
        $vis struct $name {
            $( $($kept)* $fvis $field : $fty ),*
        }

        impl $crate::Reflect for $name {
            fn reflect_type() -> $crate::Type {
                $crate::Type::structure(
                    stringify!($name),
                    vec![
                        $( $crate::FieldDesc::new(
                            stringify!($field),
                            <$fty as $crate::Reflect>::reflect_type(),
                        )
                        $( .with_json_name($json) )? ),*
                    ],
                )
                .with_hooks($hooks)
            }

            fn to_value(&self) -> $crate::Value {
                $crate::Value::from_parts(
                    <Self as $crate::Reflect>::reflect_type(),
                    $crate::Data::Struct(vec![
                        $( $crate::Reflect::to_value(&self.$field) ),*
                    ]),
                )
            }

            fn from_value(value: &$crate::Value) -> $crate::Result<Self> {
                Ok(Self {
                    $( $field: <$fty as $crate::Reflect>::from_value(
                        value.require_field(stringify!($field))?,
                    )? ),*
                })
            }
        }
    };
}

/// Declare a single-field tuple struct as a named type over its inner type
///
/// ```
/// use shapeshift_core::reflect_newtype;
///
/// reflect_newtype! {
///     #[derive(Debug, Clone, Default, PartialEq)]
///     pub struct Kind(pub String);
/// }
/// ```
#[macro_export]
macro_rules! reflect_newtype {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident ( $fvis:vis $inner:ty ) ;
        $( hooks = $hooks:expr ; )?
    ) => {
        $(#[$meta])*
        $vis struct $name($fvis $inner);

        impl $crate::Reflect for $name {
            fn reflect_type() -> $crate::Type {
                <$inner as $crate::Reflect>::reflect_type()
                    .renamed(stringify!($name))
                    .with_hooks($crate::__reflect_hooks!($($hooks)?))
            }

            fn to_value(&self) -> $crate::Value {
                $crate::Reflect::to_value(&self.0).retag(<Self as $crate::Reflect>::reflect_type())
            }

            fn from_value(value: &$crate::Value) -> $crate::Result<Self> {
                let inner = value.clone().retag(<$inner as $crate::Reflect>::reflect_type());
                Ok(Self(<$inner as $crate::Reflect>::from_value(&inner)?))
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Kind, TypeRepr};

    crate::reflect_newtype! {
        #[derive(Debug, Clone, Default, PartialEq)]
        struct Label(String);
    }

    crate::reflect_struct! {
        #[derive(Debug, Clone, Default, PartialEq)]
        struct Row {
            id: i32,
            label: Label,
            tags: Vec<String>,
            parent: Option<u16>,
        }
    }

    crate::reflect_struct! {
        #[derive(Debug, Clone, Default, PartialEq)]
        struct Session {
            /// Storage identifier
            id: i64,
            #[json = "created_at"]
            #[allow(dead_code)]
            created: DateTime<Utc>,
            #[json = "-"]
            token: String,
            #[allow(dead_code)]
            #[json = "owner,omitempty"]
            owner: String,
        }
    }

    #[test]
    fn test_struct_type_shape() {
        let ty = Row::reflect_type();
        assert_eq!(ty.name(), Some("Row"));
        let names: Vec<&str> = ty.fields().iter().map(|field| field.name()).collect();
        assert_eq!(names, vec!["id", "label", "tags", "parent"]);
        assert_eq!(ty.fields()[1].ty(), &Type::named("Label", TypeRepr::String));
        assert_eq!(ty.fields()[3].ty().kind(), Kind::Pointer);
    }

    #[test]
    fn test_struct_round_trip() {
        let row = Row {
            id: 7,
            label: Label("seven".to_string()),
            tags: vec!["a".to_string(), "b".to_string()],
            parent: Some(3),
        };
        let value = row.to_value();
        assert_eq!(value.ty(), &Row::reflect_type());
        assert_eq!(Row::from_value(&value).unwrap(), row);
    }

    #[test]
    fn test_json_attributes_are_recorded() {
        let ty = Session::reflect_type();
        let names: Vec<&str> = ty.fields().iter().map(|field| field.name()).collect();
        assert_eq!(names, vec!["id", "created", "token", "owner"]);
        let json: Vec<Option<&str>> =
            ty.fields().iter().map(|field| field.json_key()).collect();
        assert_eq!(json, vec![Some("id"), Some("created_at"), None, Some("owner")]);
        assert!(ty.fields()[2].is_json_skipped());
    }

    #[test]
    fn test_json_attributes_keep_round_trip() {
        let session = Session {
            id: 4,
            created: DateTime::<Utc>::MIN_UTC,
            token: "t".to_string(),
            owner: "ann".to_string(),
        };
        assert_eq!(Session::from_value(&session.to_value()).unwrap(), session);
    }

    #[test]
    fn test_integer_range_is_checked() {
        let err = i8::from_value(&Value::int(300)).unwrap_err();
        assert!(matches!(err, Error::TypeMismatch { .. }));
    }

    #[test]
    fn test_array_length_is_checked() {
        let value = Value::from_parts(
            <[i64; 2]>::reflect_type(),
            Data::List(vec![Value::int(1)]),
        );
        assert!(<[i64; 2]>::from_value(&value).is_err());
    }

    #[test]
    fn test_min_utc_is_the_zero_timestamp() {
        assert!(DateTime::<Utc>::MIN_UTC.to_value().is_zero());
        let zero = Value::zero(&Type::timestamp());
        assert_eq!(DateTime::<Utc>::from_value(&zero).unwrap(), DateTime::<Utc>::MIN_UTC);
    }

    #[test]
    fn test_json_field_reflects_as_any() {
        let json = serde_json::json!({"a": [1, 2]});
        let value = json.to_value();
        assert_eq!(value.kind(), Kind::Any);
        assert_eq!(serde_json::Value::from_value(&value).unwrap(), json);
    }
}
