//! Element-wise list and map conversion
//!
//! Copyright (c) 2025 Shapeshift Team
//! Licensed under the Apache-2.0 license

use super::coerce::convert;
use super::{Mapper, Mode};
use crate::error::{Error, Result};
use crate::types::{Kind, Type, TypeRepr};
use crate::value::{Data, Value};

/// Text form of a map key, for normalization and diagnostics
pub(crate) fn key_text(key: &Value) -> String {
    match key.indirect().as_str() {
        Some(text) => text.to_string(),
        None => key.to_json().to_string(),
    }
}

/// Convert a map key to `target`: as-is, by direct conversion, or by parsing text into an integer
pub(crate) fn convert_key(key: &Value, target: &Type) -> Result<Value> {
    if key.ty() == target {
        return Ok(key.clone());
    }
    if let Some(converted) = convert(key, target) {
        return Ok(converted);
    }

    let failure = || Error::KeyConversion {
        key: key_text(key),
        from: key.ty().to_string(),
        to: target.to_string(),
    };

    let text = key.indirect().as_str().ok_or_else(failure)?;
    let data = match target.repr() {
        TypeRepr::Int => Data::Int(text.parse::<i64>().map_err(|_| failure())?),
        TypeRepr::Uint => Data::Uint(text.parse::<u64>().map_err(|_| failure())?),
        _ => return Err(failure()),
    };
    Ok(Value::from_parts(target.clone(), data))
}

impl Mapper {
    /// Copy the elements of a slice or array into a slice or array target
    ///
    /// Every element is coerced in copy mode into a fresh zero element. A
    /// slice target is replaced; an array target receives as many elements
    /// as fit and keeps the rest.
    pub(crate) fn copy_list(&self, target: &mut Value, source: &Value) -> Result<()> {
        let (Some(elem), Some(items)) = (target.ty().elem().cloned(), source.items()) else {
            return Ok(());
        };

        let mut staged = Vec::with_capacity(items.len());
        for item in items {
            let mut slot = Value::zero(&elem);
            self.coerce(&mut slot, item, Mode::Copy)?;
            staged.push(slot);
        }

        let fixed = target.kind() == Kind::Array;
        if let Data::List(existing) = target.data_mut() {
            if fixed {
                for (slot, item) in existing.iter_mut().zip(staged) {
                    *slot = item;
                }
            } else {
                *existing = staged;
            }
        }
        self.validate(target)
    }

    /// Copy map entries into a map target, converting keys as needed
    ///
    /// Existing target entries are kept unless a source key replaces them.
    pub(crate) fn copy_map(&self, target: &mut Value, source: &Value) -> Result<()> {
        let Some((key_type, value_type)) = target
            .ty()
            .map_types()
            .map(|(k, v)| (k.clone(), v.clone()))
        else {
            return Ok(());
        };
        let entries = source.entries().unwrap_or_default();
        if entries.is_empty() {
            return Ok(());
        }

        let mut staged = Vec::with_capacity(entries.len());
        for (key, value) in entries {
            let mut slot = Value::zero(&value_type);
            self.coerce(&mut slot, value, Mode::Copy)?;
            staged.push((convert_key(key, &key_type)?, slot));
        }

        for (key, value) in staged {
            target.map_insert(key, value);
        }
        self.validate(target)
    }
}
