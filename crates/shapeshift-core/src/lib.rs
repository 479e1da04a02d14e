//! Shapeshift Core - runtime-typed struct transformation engine
//!
//! This crate merges and copies values between differently declared shapes.
//! Fields are matched by normalized name, and mismatched types go through a
//! fixed coercion cascade.
//!
//! # Main Components
//!
//! - **Error Handling**: error types using `thiserror` and `anyhow`
//! - **Dynamic Model**: [`Type`], [`Value`] and the [`Reflect`] bridge for plain Rust structs
//! - **Mapper**: update, update-via-map, copy and copy-slice over any two shapes
//! - **Wrappers**: opaque types such as timestamps and nullable payloads with their own coercions
//!
//! # Example
//!
//! ```
//! use shapeshift_core::{reflect_struct, Result};
//!
//! reflect_struct! {
//!     #[derive(Debug, Clone, Default, PartialEq)]
//!     pub struct User {
//!         pub user_name: String,
//!         pub age: i64,
//!     }
//! }
//!
//! reflect_struct! {
//!     #[derive(Debug, Clone, Default, PartialEq)]
//!     pub struct UserForm {
//!         pub user_name: String,
//!         pub age: String,
//!     }
//! }
//!
//! fn example() -> Result<()> {
//!     let mut user = User { user_name: "ann".to_string(), age: 30 };
//!     let form = UserForm { user_name: String::new(), age: "31".to_string() };
//!     shapeshift_core::update(&mut user, &form)?;
//!     assert_eq!(user, User { user_name: "ann".to_string(), age: 31 });
//!     Ok(())
//! }
//! # example().unwrap();
//! ```

pub mod config;
pub mod error;
pub mod mapper;
pub mod reflect;
pub mod types;
pub mod value;
pub mod wrappers;

#[cfg(test)]
mod proptest_strategies;

use std::sync::OnceLock;

// Re-export main types for convenience
pub use config::{MapperConfig, WriteStrategy, WRITE_STRATEGY_ENV};
pub use error::{Error, ParseBoolError, ParseFailure, Result};
pub use mapper::{normalize, Field, FieldHandle, Mapper, Mode, NormalizedKey, ObjectModel};
pub use reflect::{Bytes, Reflect};
pub use types::{FieldDesc, Hooks, Kind, MarshalHook, Type, TypeRepr, UnmarshalHook, ValidateHook};
pub use value::{Data, Value};
pub use wrappers::{
    Media, NullJson, NullString, NullTime, RawJson, Timestamp, Wrapper, WrapperRegistry,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

fn default_mapper() -> &'static Mapper {
    static MAPPER: OnceLock<Mapper> = OnceLock::new();
    MAPPER.get_or_init(Mapper::new)
}

/// [`Mapper::update`] with the default mapper
pub fn update<T: Reflect, E: Reflect>(target: &mut T, edited: &E) -> Result<()> {
    default_mapper().update(target, edited)
}

/// [`Mapper::update_via_map`] with the default mapper
pub fn update_via_map<T: Reflect>(target: &mut T, edited: &Value) -> Result<()> {
    default_mapper().update_via_map(target, edited)
}

/// [`Mapper::update_via_json`] with the default mapper
pub fn update_via_json<T: Reflect>(target: &mut T, edited: &serde_json::Value) -> Result<()> {
    default_mapper().update_via_json(target, edited)
}

/// [`Mapper::copy`] with the default mapper
pub fn copy<S: Reflect, T: Reflect>(source: &S, target: &mut T) -> Result<()> {
    default_mapper().copy(source, target)
}

/// [`Mapper::copy_slice`] with the default mapper
pub fn copy_slice<S: Reflect, T: Reflect>(source: &[S], target: &mut Vec<T>) -> Result<()> {
    default_mapper().copy_slice(source, target)
}

/// Exported field names of `T` in declaration order
pub fn keys<T: Reflect>() -> Vec<String> {
    ObjectModel::new(&Value::zero(&T::reflect_type())).keys()
}

/// JSON names of `T`'s exported fields; see [`ObjectModel::json_keys`]
pub fn json_keys<T: Reflect>() -> Vec<String> {
    ObjectModel::new(&Value::zero(&T::reflect_type())).json_keys()
}
