//! Field-by-field merges
//!
//! Copyright (c) 2025 Shapeshift Team
//! Licensed under the Apache-2.0 license

use super::collections::key_text;
use super::model::ObjectModel;
use super::normalize::{normalize, NormalizedKey};
use super::{Mapper, Mode};
use crate::error::{Error, Result};
use crate::types::Kind;
use crate::value::{Data, Value};
use std::collections::HashMap;

/// Map entries by normalized key, with the original key kept for diagnostics
///
/// Values are stored with their dynamic container stripped, so the zero
/// check in merge mode sees the concrete value.
type NormalizedEntries<'v> = HashMap<NormalizedKey, (String, &'v Value)>;

impl Mapper {
    /// Write each exported field of `source` into the same-keyed field of `target`
    ///
    /// Target fields missing from `source` are left alone. The source is
    /// validated before anything is written.
    pub(crate) fn merge_fields(
        &self,
        target: &mut Value,
        source: &Value,
        mode: Mode,
    ) -> Result<()> {
        self.validate(source)?;

        let sources = ObjectModel::new(source);
        let mut targets = ObjectModel::writable(target);
        let mut slots = targets.fields_mut();

        for field in sources.ordered_fields() {
            match slots.get_mut(field.key()) {
                Some(slot) => self.set_field(slot, field.value(), mode)?,
                None => log::trace!("no target field for {}", field.name()),
            }
        }
        Ok(())
    }

    /// Merge a string-keyed map into `target`, flattening into nested structs
    pub(crate) fn apply_map(&self, target: &mut Value, edited: &Value) -> Result<()> {
        let entries = normalize_entries(edited);
        self.apply_entries(target, &entries)
    }

    fn apply_entries(&self, target: &mut Value, entries: &NormalizedEntries<'_>) -> Result<()> {
        let mut model = ObjectModel::writable(target);

        for mut field in model.ordered_fields_mut() {
            if let Some((_, source)) = entries.get(field.key()) {
                self.set_field(&mut field, source, Mode::Merge)?;
                continue;
            }

            if field.ty().kind() != Kind::Struct || self.wrappers.is_opaque(field.ty()) {
                continue;
            }

            match field.slot() {
                Some(nested) => self.apply_entries(nested, entries)?,
                None => {
                    return Err(Error::Unsettable {
                        field: field.name().to_string(),
                    })
                }
            }
        }
        Ok(())
    }
}

fn normalize_entries(edited: &Value) -> NormalizedEntries<'_> {
    let mut entries = NormalizedEntries::new();

    for (key, value) in edited.indirect().entries().unwrap_or_default() {
        let name = key_text(key);
        let normalized = normalize(&name);
        if let Some((previous, _)) = entries.get(&normalized) {
            log::warn!(
                "Map keys {:?} and {:?} both normalize to {:?}, keeping {:?}",
                previous,
                name,
                normalized.as_str(),
                name
            );
        }
        entries.insert(normalized, (name, concrete(value)));
    }

    entries
}

/// The value held by a present dynamic container, or `value` itself
fn concrete(value: &Value) -> &Value {
    match value.data() {
        Data::Any(Some(inner)) => concrete(inner),
        _ => value,
    }
}
