//! Registry of opaque wrapper types
//!
//! Some types carry their own coercion rules: timestamps and UUIDs are parsed
//! from text, nullable wrappers unwrap to their payload, and none of them is
//! ever deep-merged field by field. The coercion cascade consults the
//! [`WrapperRegistry`] before falling back to generic struct, list and map
//! handling.
//!
//! Copyright (c) 2025 Shapeshift Team
//! Licensed under the Apache-2.0 license

pub mod media;
pub mod nullable;
pub mod time;

use crate::config::MapperConfig;
use crate::error::Result;
use crate::types::{Kind, Type};
use crate::value::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

pub use media::{Media, MediaWrapper};
pub use nullable::{NullJson, NullJsonWrapper, NullString, NullStringWrapper, RawJson};
pub use time::{
    parse_timestamp, NullTime, NullTimeWrapper, Timestamp, TimestampWrapper, UuidWrapper,
};

/// Custom coercion behaviour for a registered type
///
/// Every method has a "not handled" default, so a wrapper only implements
/// the steps it takes part in.
pub trait Wrapper: Send + Sync + fmt::Debug {
    /// Opaque types are assigned whole, never merged field by field
    fn opaque(&self) -> bool {
        true
    }

    /// Inner payload of a source value, unwrapped before conversion
    fn payload(&self, _source: &Value) -> Option<Value> {
        None
    }

    /// New target value built from a source of a different type
    fn absorb(&self, _target: &Value, _source: &Value) -> Option<Value> {
        None
    }

    /// Parse `text` into a value of `target`
    fn parse(&self, _target: &Type, _text: &str, _config: &MapperConfig) -> Option<Result<Value>> {
        None
    }

    /// Last-resort replacement for a source nothing else could handle
    fn fallback(&self, _source: &Value) -> Option<Value> {
        None
    }
}

/// Wrappers keyed by type name, with a per-representation fallback
#[derive(Debug, Clone)]
pub struct WrapperRegistry {
    named: HashMap<String, Arc<dyn Wrapper>>,
    by_kind: HashMap<Kind, Arc<dyn Wrapper>>,
}

impl Default for WrapperRegistry {
    fn default() -> Self {
        let mut registry = Self::empty();
        registry
            .register("Timestamp", TimestampWrapper)
            .register("Uuid", UuidWrapper)
            .register("NullTime", NullTimeWrapper)
            .register("NullString", NullStringWrapper)
            .register("NullJson", NullJsonWrapper)
            .register("Media", MediaWrapper)
            .register_kind(Kind::Timestamp, TimestampWrapper)
            .register_kind(Kind::Uuid, UuidWrapper);
        registry
    }
}

impl WrapperRegistry {
    /// A registry without any wrapper
    pub fn empty() -> Self {
        Self {
            named: HashMap::new(),
            by_kind: HashMap::new(),
        }
    }

    /// Register `wrapper` for the type called `type_name`
    pub fn register(
        &mut self,
        type_name: impl Into<String>,
        wrapper: impl Wrapper + 'static,
    ) -> &mut Self {
        self.named.insert(type_name.into(), Arc::new(wrapper));
        self
    }

    /// Register `wrapper` for every type of representation `kind` whose name is not registered
    pub fn register_kind(&mut self, kind: Kind, wrapper: impl Wrapper + 'static) -> &mut Self {
        self.by_kind.insert(kind, Arc::new(wrapper));
        self
    }

    pub fn lookup(&self, ty: &Type) -> Option<&dyn Wrapper> {
        ty.name()
            .and_then(|name| self.named.get(name))
            .or_else(|| self.by_kind.get(&ty.kind()))
            .map(|wrapper| wrapper.as_ref())
    }

    /// Whether values of `ty` must be assigned whole
    pub fn is_opaque(&self, ty: &Type) -> bool {
        self.lookup(ty).is_some_and(|wrapper| wrapper.opaque())
    }

    pub fn payload(&self, source: &Value) -> Option<Value> {
        self.lookup(source.ty())?.payload(source)
    }

    pub fn absorb(&self, target: &Value, source: &Value) -> Option<Value> {
        self.lookup(target.ty())?.absorb(target, source)
    }

    pub fn parse(&self, target: &Type, text: &str, config: &MapperConfig) -> Option<Result<Value>> {
        self.lookup(target)?.parse(target, text, config)
    }

    pub fn fallback(&self, source: &Value) -> Option<Value> {
        self.lookup(source.ty())?.fallback(source)
    }
}
