//! Property-based testing strategies for generating test data
//!
//! This module provides proptest strategies for generating random field
//! names, scalar values and untyped maps for property testing.

#![cfg(test)]

use crate::mapper::normalize;
use crate::types::{FieldDesc, Kind, Type};
use crate::value::Value;
use proptest::collection::{hash_map, vec};
use proptest::prelude::*;

/// Strategy for generating snake_case field names
pub fn field_name_strategy() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9]{0,6}(_[a-z0-9]{1,6}){0,2}"
}

/// Strategy for generating one spelling of a field name
///
/// The result always normalizes to the same key as `name`.
pub fn spelling_strategy(name: String) -> impl Strategy<Value = String> {
    prop_oneof![
        Just(name.clone()),
        Just(name.to_uppercase()),
        Just(name.replace('_', "")),
        Just(
            name.split('_')
                .map(|part| {
                    let mut chars = part.chars();
                    match chars.next() {
                        Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
                        None => String::new(),
                    }
                })
                .collect::<String>()
        ),
    ]
}

/// Strategy for generating scalar values with their declared types
pub fn scalar_strategy() -> impl Strategy<Value = Value> {
    prop_oneof![
        any::<bool>().prop_map(Value::bool),
        any::<i64>().prop_map(Value::int),
        any::<u64>().prop_map(Value::uint),
        (-1.0e9f64..1.0e9).prop_map(Value::float),
        "[a-zA-Z0-9 ]{0,16}".prop_map(Value::string),
    ]
}

/// Strategy for generating a struct type whose fields have distinct normalized keys
pub fn struct_type_strategy() -> impl Strategy<Value = Type> {
    hash_map(field_name_strategy(), scalar_strategy(), 1..6).prop_map(|fields| {
        let mut seen = std::collections::HashSet::new();
        let fields = fields
            .into_iter()
            .filter(|(name, _)| seen.insert(normalize(name)))
            .map(|(name, value)| FieldDesc::new(name, value.ty().clone()))
            .collect();
        Type::structure("Generated", fields)
    })
}

/// Strategy for generating a struct type together with a random value of it
pub fn struct_value_strategy() -> impl Strategy<Value = Value> {
    struct_type_strategy().prop_flat_map(struct_of)
}

/// Strategy for generating random values of a given struct type
pub fn struct_of(ty: Type) -> impl Strategy<Value = Value> {
    let fields: Vec<BoxedStrategy<Value>> =
        ty.fields().iter().map(|field| value_of(field.ty())).collect();
    fields.prop_map(move |values| Value::structure(&ty, values).unwrap())
}

/// Strategy for generating values of a scalar type, zero included
pub fn value_of(ty: &Type) -> BoxedStrategy<Value> {
    let ty = ty.clone();
    match ty.kind() {
        Kind::Bool => any::<bool>().prop_map(Value::bool).boxed(),
        Kind::Int => prop_oneof![Just(0i64), any::<i64>()].prop_map(Value::int).boxed(),
        Kind::Uint => prop_oneof![Just(0u64), any::<u64>()].prop_map(Value::uint).boxed(),
        Kind::Float => prop_oneof![Just(0.0f64), -1.0e9f64..1.0e9].prop_map(Value::float).boxed(),
        Kind::String => "[a-z]{0,8}".prop_map(Value::string).boxed(),
        _ => Just(Value::zero(&ty)).boxed(),
    }
}

/// Strategy for generating untyped maps with string values
pub fn untyped_map_strategy() -> impl Strategy<Value = Value> {
    vec((field_name_strategy(), "[a-z]{0,8}"), 0..6)
        .prop_map(|entries| {
            Value::untyped_map(entries.into_iter().map(|(k, v)| (k, Value::string(v))))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    proptest! {
        #[test]
        fn test_spellings_share_a_key(
            (name, spelling) in field_name_strategy()
                .prop_flat_map(|n| (Just(n.clone()), spelling_strategy(n)))
        ) {
            prop_assert_eq!(normalize(&name), normalize(&spelling));
        }

        #[test]
        fn test_generated_structs_match_their_type(value in struct_value_strategy()) {
            let parts = value
                .struct_parts()
                .map(|(ty, values)| ty.fields().len() == values.len());
            prop_assert_eq!(parts, Some(true));
        }

        #[test]
        fn test_untyped_maps_are_maps(map in untyped_map_strategy()) {
            prop_assert!(map.ty().is_untyped_map());
        }
    }
}
