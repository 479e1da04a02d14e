//! The mapper: merges and copies between differently declared shapes
//!
//! A [`Mapper`] owns its configuration and the registry of wrapper types.
//! Typed entry points take anything implementing [`Reflect`]; value-level
//! entry points work directly on [`Value`]s. Both honour the configured
//! [`WriteStrategy`].
//!
//! Copyright (c) 2025 Shapeshift Team
//! Licensed under the Apache-2.0 license

mod coerce;
mod collections;
mod copy;
mod merge;
pub mod model;
pub mod normalize;


use crate::config::{MapperConfig, WriteStrategy};
use crate::error::{Error, Result};
use crate::reflect::Reflect;
use crate::types::Kind;
use crate::value::Value;
use crate::wrappers::WrapperRegistry;
use tracing::instrument;

pub use coerce::parse_bool;
pub use model::{Field, FieldHandle, ObjectModel};
pub use normalize::{normalize, NormalizedKey};

/// Whether zero-valued sources are skipped or written through
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Zero values leave the target untouched
    Merge,
    /// Zero values overwrite the target
    Copy,
}

/// Struct transformation engine
#[derive(Debug, Clone, Default)]
pub struct Mapper {
    config: MapperConfig,
    wrappers: WrapperRegistry,
}

impl Mapper {
    /// A mapper with the default configuration and the built-in wrappers
    pub fn new() -> Self {
        Self::default()
    }

    /// A mapper with a validated configuration
    pub fn with_config(config: MapperConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            wrappers: WrapperRegistry::default(),
        })
    }

    /// Replace the wrapper registry
    pub fn with_wrappers(mut self, wrappers: WrapperRegistry) -> Self {
        self.wrappers = wrappers;
        self
    }

    pub fn config(&self) -> &MapperConfig {
        &self.config
    }

    pub fn wrappers(&self) -> &WrapperRegistry {
        &self.wrappers
    }

    pub fn wrappers_mut(&mut self) -> &mut WrapperRegistry {
        &mut self.wrappers
    }

    /// Overwrite `target` fields with the non-zero fields of `edited`
    ///
    /// Field names are matched after normalization; mismatched types go
    /// through the coercion cascade.
    #[instrument(
        level = "debug",
        skip_all,
        fields(
            target = std::any::type_name::<T>(),
            edited = std::any::type_name::<E>()
        )
    )]
    pub fn update<T: Reflect, E: Reflect>(&self, target: &mut T, edited: &E) -> Result<()> {
        let edited = edited.to_value();
        self.with_reflected(target, |value| self.update_value(value, &edited))
    }

    /// Overwrite `target` fields from a string-keyed map
    ///
    /// Nested struct fields with no matching key receive the same map, so a
    /// flat map can reach into substructures.
    #[instrument(
        level = "debug",
        skip_all,
        fields(target = std::any::type_name::<T>())
    )]
    pub fn update_via_map<T: Reflect>(&self, target: &mut T, edited: &Value) -> Result<()> {
        self.with_reflected(target, |value| self.update_value_via_map(value, edited))
    }

    /// [`Mapper::update_via_map`] with a decoded JSON object
    pub fn update_via_json<T: Reflect>(
        &self,
        target: &mut T,
        edited: &serde_json::Value,
    ) -> Result<()> {
        self.update_via_map(target, &Value::from_json(edited))
    }

    /// Copy every field of `source` into `target`, zero values included
    #[instrument(
        level = "debug",
        skip_all,
        fields(
            source = std::any::type_name::<S>(),
            target = std::any::type_name::<T>()
        )
    )]
    pub fn copy<S: Reflect, T: Reflect>(&self, source: &S, target: &mut T) -> Result<()> {
        let source = source.to_value();
        self.with_reflected(target, |value| self.copy_value(&source, value))
    }

    /// Copy each element of `source` into a fresh `T` and append it to `target`
    #[instrument(
        level = "debug",
        skip_all,
        fields(len = source.len(), target = std::any::type_name::<T>())
    )]
    pub fn copy_slice<S: Reflect, T: Reflect>(
        &self,
        source: &[S],
        target: &mut Vec<T>,
    ) -> Result<()> {
        let source = Value::slice(
            S::reflect_type(),
            source.iter().map(Reflect::to_value).collect(),
        );
        self.with_reflected(target, |value| self.copy_slice_value(&source, value))
    }

    /// Value-level [`Mapper::update`]
    #[instrument(level = "debug", skip_all, fields(target = %target.ty(), edited = %edited.ty()))]
    pub fn update_value(&self, target: &mut Value, edited: &Value) -> Result<()> {
        self.transact(target, |staged| self.merge_fields(staged, edited, Mode::Merge))
    }

    /// Value-level [`Mapper::update_via_map`]; `edited` must be a map
    #[instrument(level = "debug", skip_all, fields(target = %target.ty()))]
    pub fn update_value_via_map(&self, target: &mut Value, edited: &Value) -> Result<()> {
        if edited.indirect().kind() != Kind::Map {
            return Err(Error::TypeMismatch {
                expected: "map".to_string(),
                found: edited.ty().to_string(),
            });
        }
        self.transact(target, |staged| self.apply_map(staged, edited))
    }

    /// Value-level [`Mapper::copy`]
    #[instrument(level = "debug", skip_all, fields(source = %source.ty(), target = %target.ty()))]
    pub fn copy_value(&self, source: &Value, target: &mut Value) -> Result<()> {
        self.transact(target, |staged| self.copy_into(source, staged))
    }

    /// Value-level [`Mapper::copy_slice`]; `target` must be a slice
    #[instrument(level = "debug", skip_all, fields(source = %source.ty(), target = %target.ty()))]
    pub fn copy_slice_value(&self, source: &Value, target: &mut Value) -> Result<()> {
        self.transact(target, |staged| self.append_copies(source, staged))
    }

    /// Run the coercion cascade once, writing `source` into `target`
    ///
    /// This is the primitive every other operation is built on; it ignores
    /// the write strategy.
    pub fn set_value(&self, target: &mut Value, source: &Value, mode: Mode) -> Result<()> {
        self.coerce(target, source, mode)
    }

    fn transact<F>(&self, target: &mut Value, op: F) -> Result<()>
    where
        F: FnOnce(&mut Value) -> Result<()>,
    {
        match self.config.write_strategy {
            WriteStrategy::Partial => op(target),
            WriteStrategy::Atomic => {
                let mut staged = target.clone();
                match op(&mut staged) {
                    Ok(()) => {
                        *target = staged;
                        Ok(())
                    }
                    Err(e) => {
                        tracing::debug!(error = %e, "rolled back atomic write");
                        Err(e)
                    }
                }
            }
        }
    }

    /// Run `op` on the value form of `target`, then write the result back
    ///
    /// On failure the partially written value is still written back unless
    /// the write strategy is atomic.
    fn with_reflected<T, F>(&self, target: &mut T, op: F) -> Result<()>
    where
        T: Reflect,
        F: FnOnce(&mut Value) -> Result<()>,
    {
        let mut value = target.to_value();
        let outcome = op(&mut value);
        if outcome.is_err() && self.config.write_strategy == WriteStrategy::Atomic {
            return outcome;
        }

        match T::from_value(&value) {
            Ok(next) => {
                *target = next;
                outcome
            }
            Err(e) => outcome.and(Err(e)),
        }
    }
}
