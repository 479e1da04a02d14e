//! Field views over values
//!
//! An [`ObjectModel`] wraps one value for the duration of a call and exposes
//! its exported fields under their normalized keys. Hidden fields are never
//! listed, so they can never be read from or written to by the mapper.
//!
//! Copyright (c) 2025 Shapeshift Team
//! Licensed under the Apache-2.0 license

use super::normalize::{normalize, NormalizedKey};
use crate::types::{FieldDesc, Type};
use crate::value::Value;
use std::collections::HashMap;

/// Access to a field's value
#[derive(Debug)]
pub enum FieldHandle<'a> {
    ReadOnly(&'a Value),
    Writable(&'a mut Value),
}

/// One exported field of a struct
#[derive(Debug)]
pub struct Field<'a> {
    name: &'a str,
    key: NormalizedKey,
    ty: &'a Type,
    json_key: Option<&'a str>,
    handle: FieldHandle<'a>,
}

impl<'a> Field<'a> {
    fn new(desc: &'a FieldDesc, handle: FieldHandle<'a>) -> Self {
        Self {
            name: desc.name(),
            key: normalize(desc.name()),
            ty: desc.ty(),
            json_key: desc.json_key(),
            handle,
        }
    }

    /// Declared name, original casing
    pub fn name(&self) -> &str {
        self.name
    }

    pub fn key(&self) -> &NormalizedKey {
        &self.key
    }

    /// Declared type
    pub fn ty(&self) -> &Type {
        self.ty
    }

    /// JSON name, falling back to the declared name; `None` when skipped
    pub fn json_key(&self) -> Option<&str> {
        self.json_key
    }

    pub fn value(&self) -> &Value {
        match &self.handle {
            FieldHandle::ReadOnly(value) => value,
            FieldHandle::Writable(value) => &**value,
        }
    }

    pub fn is_settable(&self) -> bool {
        matches!(self.handle, FieldHandle::Writable(_))
    }

    /// The writable slot, if any
    pub fn slot(&mut self) -> Option<&mut Value> {
        match &mut self.handle {
            FieldHandle::Writable(value) => Some(&mut **value),
            FieldHandle::ReadOnly(_) => None,
        }
    }
}

#[derive(Debug)]
enum Slot<'a> {
    ReadOnly(&'a Value),
    Writable(&'a mut Value),
}

/// A per-call view over a value
#[derive(Debug)]
pub struct ObjectModel<'a> {
    slot: Slot<'a>,
}

impl<'a> ObjectModel<'a> {
    /// A read-only model; writes through it fail as unsettable
    pub fn new(value: &'a Value) -> Self {
        Self {
            slot: Slot::ReadOnly(value),
        }
    }

    /// A model whose fields can be written
    pub fn writable(value: &'a mut Value) -> Self {
        Self {
            slot: Slot::Writable(value),
        }
    }

    pub fn is_mutable(&self) -> bool {
        matches!(self.slot, Slot::Writable(_))
    }

    pub fn value(&self) -> &Value {
        match &self.slot {
            Slot::ReadOnly(value) => value,
            Slot::Writable(value) => &**value,
        }
    }

    /// Exported fields in declaration order, read-only
    pub fn ordered_fields(&self) -> Vec<Field<'_>> {
        read_only_fields(self.value())
    }

    /// Exported fields in declaration order, writable when the model is
    pub fn ordered_fields_mut(&mut self) -> Vec<Field<'_>> {
        match &mut self.slot {
            Slot::ReadOnly(value) => read_only_fields(value),
            Slot::Writable(value) => {
                let Some((ty, values)) = value.struct_parts_mut() else {
                    return Vec::new();
                };
                ty.fields()
                    .iter()
                    .zip(values.iter_mut())
                    .filter(|(desc, _)| desc.is_exported())
                    .map(|(desc, value)| Field::new(desc, FieldHandle::Writable(value)))
                    .collect()
            }
        }
    }

    /// Exported fields by normalized key
    ///
    /// When two fields share a key, the one declared last is kept.
    pub fn fields(&self) -> HashMap<NormalizedKey, Field<'_>> {
        by_key(self.ordered_fields())
    }

    /// Mutable counterpart of [`ObjectModel::fields`]
    pub fn fields_mut(&mut self) -> HashMap<NormalizedKey, Field<'_>> {
        by_key(self.ordered_fields_mut())
    }

    /// Exported field names to their values, one level deep
    pub fn plain_map(&self) -> HashMap<String, Value> {
        self.ordered_fields()
            .into_iter()
            .map(|field| (field.name().to_string(), field.value().clone()))
            .collect()
    }

    /// Exported field names in declaration order
    pub fn keys(&self) -> Vec<String> {
        self.ordered_fields()
            .into_iter()
            .map(|field| field.name().to_string())
            .collect()
    }

    /// JSON names of the exported fields in declaration order, skipped fields left out
    pub fn json_keys(&self) -> Vec<String> {
        self.ordered_fields()
            .into_iter()
            .filter_map(|field| field.json_key().map(str::to_string))
            .collect()
    }
}

fn read_only_fields(value: &Value) -> Vec<Field<'_>> {
    let Some((ty, values)) = value.struct_parts() else {
        return Vec::new();
    };
    ty.fields()
        .iter()
        .zip(values)
        .filter(|(desc, _)| desc.is_exported())
        .map(|(desc, value)| Field::new(desc, FieldHandle::ReadOnly(value)))
        .collect()
}

fn by_key(fields: Vec<Field<'_>>) -> HashMap<NormalizedKey, Field<'_>> {
    fields.into_iter().map(|field| (field.key.clone(), field)).collect()
}
