//! Declared types for the dynamic value model
//!
//! Every [`Value`](crate::Value) carries the [`Type`] it was declared with.
//! Types are shared, immutable descriptions: an optional name (named types
//! such as `Kind` over `string` are distinct from their representation), a
//! [`TypeRepr`] and a set of per-type [`Hooks`].
//!
//! Copyright (c) 2025 Shapeshift Team
//! Licensed under the Apache-2.0 license

use crate::value::Value;
use std::fmt;
use std::sync::Arc;

/// Self-validation hook, invoked on values of the type
pub type ValidateHook = fn(&Value) -> anyhow::Result<()>;

/// Produces the JSON byte form of a value
pub type MarshalHook = fn(&Value) -> anyhow::Result<Vec<u8>>;

/// Rebuilds a value in place from JSON bytes
pub type UnmarshalHook = fn(&[u8], &mut Value) -> anyhow::Result<()>;

/// Optional behaviour attached to a type
///
/// Hooks are not part of type identity: two types that differ only by their
/// hooks compare equal.
#[derive(Clone, Copy, Default)]
pub struct Hooks {
    pub validate: Option<ValidateHook>,
    pub marshal_json: Option<MarshalHook>,
    pub unmarshal_json: Option<UnmarshalHook>,
}

impl Hooks {
    /// No hooks at all
    pub const NONE: Hooks = Hooks {
        validate: None,
        marshal_json: None,
        unmarshal_json: None,
    };

    /// Attach a validation hook
    pub fn with_validate(mut self, hook: ValidateHook) -> Self {
        self.validate = Some(hook);
        self
    }

    /// Attach a marshal hook
    pub fn with_marshal_json(mut self, hook: MarshalHook) -> Self {
        self.marshal_json = Some(hook);
        self
    }

    /// Attach an unmarshal hook
    pub fn with_unmarshal_json(mut self, hook: UnmarshalHook) -> Self {
        self.unmarshal_json = Some(hook);
        self
    }

    /// Whether no hook is set
    pub fn is_empty(&self) -> bool {
        self.validate.is_none() && self.marshal_json.is_none() && self.unmarshal_json.is_none()
    }
}

impl fmt::Debug for Hooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hooks")
            .field("validate", &self.validate.is_some())
            .field("marshal_json", &self.marshal_json.is_some())
            .field("unmarshal_json", &self.unmarshal_json.is_some())
            .finish()
    }
}

/// Closed classification of a representation, used for dispatch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    Bool,
    Int,
    Uint,
    Float,
    String,
    Bytes,
    Timestamp,
    Uuid,
    Struct,
    Slice,
    Array,
    Map,
    Pointer,
    Any,
}

impl Kind {
    /// Integer, unsigned or floating point
    pub fn is_numeric(self) -> bool {
        matches!(self, Kind::Int | Kind::Uint | Kind::Float)
    }

    /// Scalars that are neither containers nor opaque leaves
    pub fn is_primitive(self) -> bool {
        matches!(self, Kind::Bool | Kind::String | Kind::Bytes) || self.is_numeric()
    }

    /// Slices and arrays
    pub fn is_list(self) -> bool {
        matches!(self, Kind::Slice | Kind::Array)
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Kind::Bool => "bool",
            Kind::Int => "int",
            Kind::Uint => "uint",
            Kind::Float => "float",
            Kind::String => "string",
            Kind::Bytes => "bytes",
            Kind::Timestamp => "timestamp",
            Kind::Uuid => "uuid",
            Kind::Struct => "struct",
            Kind::Slice => "slice",
            Kind::Array => "array",
            Kind::Map => "map",
            Kind::Pointer => "pointer",
            Kind::Any => "any",
        };
        f.write_str(name)
    }
}

/// Structural representation of a type
#[derive(Debug, Clone, PartialEq)]
pub enum TypeRepr {
    Bool,
    Int,
    Uint,
    Float,
    String,
    Bytes,
    Timestamp,
    Uuid,
    Struct(Vec<FieldDesc>),
    Slice(Type),
    Array(Type, usize),
    Map(Type, Type),
    /// Optional indirection; `None` plays the role of a nil pointer
    Pointer(Type),
    /// Dynamically typed container
    Any,
}

impl TypeRepr {
    pub fn kind(&self) -> Kind {
        match self {
            TypeRepr::Bool => Kind::Bool,
            TypeRepr::Int => Kind::Int,
            TypeRepr::Uint => Kind::Uint,
            TypeRepr::Float => Kind::Float,
            TypeRepr::String => Kind::String,
            TypeRepr::Bytes => Kind::Bytes,
            TypeRepr::Timestamp => Kind::Timestamp,
            TypeRepr::Uuid => Kind::Uuid,
            TypeRepr::Struct(_) => Kind::Struct,
            TypeRepr::Slice(_) => Kind::Slice,
            TypeRepr::Array(_, _) => Kind::Array,
            TypeRepr::Map(_, _) => Kind::Map,
            TypeRepr::Pointer(_) => Kind::Pointer,
            TypeRepr::Any => Kind::Any,
        }
    }
}

/// Declaration of a struct field
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDesc {
    name: String,
    ty: Type,
    exported: bool,
    embedded: bool,
    json: Option<String>,
}

impl FieldDesc {
    /// An exported, non-embedded field
    pub fn new(name: impl Into<String>, ty: Type) -> Self {
        Self {
            name: name.into(),
            ty,
            exported: true,
            embedded: false,
            json: None,
        }
    }

    /// Attach a JSON tag such as `created_at`, `created_at,omitempty` or `-`
    pub fn with_json_name(mut self, tag: impl Into<String>) -> Self {
        self.json = Some(tag.into());
        self
    }

    /// Mark the field as private; the mapper never sees it
    pub fn hidden(mut self) -> Self {
        self.exported = false;
        self
    }

    /// Mark the field as an embedded (anonymous) struct
    pub fn embedded(mut self) -> Self {
        self.embedded = true;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn ty(&self) -> &Type {
        &self.ty
    }

    pub fn is_exported(&self) -> bool {
        self.exported
    }

    pub fn is_embedded(&self) -> bool {
        self.embedded
    }

    /// The JSON name from the tag, without options
    pub fn json_name(&self) -> Option<&str> {
        self.json
            .as_deref()
            .map(|tag| tag.split(',').next().unwrap_or_default())
            .filter(|name| !name.is_empty())
    }

    pub fn is_json_skipped(&self) -> bool {
        self.json_name() == Some("-")
    }

    /// The key this field is listed under in JSON, `None` when skipped
    pub fn json_key(&self) -> Option<&str> {
        match self.json_name() {
            Some("-") => None,
            Some(name) => Some(name),
            None => Some(&self.name),
        }
    }
}

/// The shared description behind a [`Type`]
#[derive(Debug)]
pub struct TypeDesc {
    name: Option<String>,
    repr: TypeRepr,
    hooks: Hooks,
}

impl PartialEq for TypeDesc {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.repr == other.repr
    }
}

/// A declared type, cheap to clone
#[derive(Clone)]
pub struct Type(Arc<TypeDesc>);

impl PartialEq for Type {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0) || *self.0 == *other.0
    }
}

impl Type {
    pub fn new(name: Option<String>, repr: TypeRepr) -> Self {
        Type(Arc::new(TypeDesc {
            name,
            repr,
            hooks: Hooks::NONE,
        }))
    }

    pub fn bool() -> Self {
        Self::new(None, TypeRepr::Bool)
    }

    pub fn int() -> Self {
        Self::new(None, TypeRepr::Int)
    }

    pub fn uint() -> Self {
        Self::new(None, TypeRepr::Uint)
    }

    pub fn float() -> Self {
        Self::new(None, TypeRepr::Float)
    }

    pub fn string() -> Self {
        Self::new(None, TypeRepr::String)
    }

    pub fn bytes() -> Self {
        Self::new(None, TypeRepr::Bytes)
    }

    pub fn any() -> Self {
        Self::new(None, TypeRepr::Any)
    }

    /// The registered timestamp type
    pub fn timestamp() -> Self {
        Self::named("Timestamp", TypeRepr::Timestamp)
    }

    /// The registered UUID type
    pub fn uuid() -> Self {
        Self::named("Uuid", TypeRepr::Uuid)
    }

    /// A named type over `repr`
    pub fn named(name: impl Into<String>, repr: TypeRepr) -> Self {
        Self::new(Some(name.into()), repr)
    }

    /// A named struct type
    pub fn structure(name: impl Into<String>, fields: Vec<FieldDesc>) -> Self {
        Self::named(name, TypeRepr::Struct(fields))
    }

    /// An unnamed struct type
    pub fn anonymous_struct(fields: Vec<FieldDesc>) -> Self {
        Self::new(None, TypeRepr::Struct(fields))
    }

    pub fn slice(elem: Type) -> Self {
        Self::new(None, TypeRepr::Slice(elem))
    }

    pub fn array(elem: Type, len: usize) -> Self {
        Self::new(None, TypeRepr::Array(elem, len))
    }

    pub fn map(key: Type, value: Type) -> Self {
        Self::new(None, TypeRepr::Map(key, value))
    }

    pub fn pointer(elem: Type) -> Self {
        Self::new(None, TypeRepr::Pointer(elem))
    }

    /// `map[string]any`, the shape of decoded JSON objects
    pub fn untyped_map() -> Self {
        Self::map(Self::string(), Self::any())
    }

    /// Same name and representation, with `hooks` attached
    pub fn with_hooks(self, hooks: Hooks) -> Self {
        Type(Arc::new(TypeDesc {
            name: self.0.name.clone(),
            repr: self.0.repr.clone(),
            hooks,
        }))
    }

    /// Same representation and hooks under another name
    pub fn renamed(&self, name: impl Into<String>) -> Self {
        Type(Arc::new(TypeDesc {
            name: Some(name.into()),
            repr: self.0.repr.clone(),
            hooks: self.0.hooks,
        }))
    }

    pub fn name(&self) -> Option<&str> {
        self.0.name.as_deref()
    }

    pub fn repr(&self) -> &TypeRepr {
        &self.0.repr
    }

    pub fn kind(&self) -> Kind {
        self.0.repr.kind()
    }

    pub fn hooks(&self) -> &Hooks {
        &self.0.hooks
    }

    /// Declared fields; empty for non-struct types
    pub fn fields(&self) -> &[FieldDesc] {
        match &self.0.repr {
            TypeRepr::Struct(fields) => fields,
            _ => &[],
        }
    }

    /// Element type of slices, arrays and pointers
    pub fn elem(&self) -> Option<&Type> {
        match &self.0.repr {
            TypeRepr::Slice(elem) | TypeRepr::Array(elem, _) | TypeRepr::Pointer(elem) => {
                Some(elem)
            }
            _ => None,
        }
    }

    /// Key and value types of maps
    pub fn map_types(&self) -> Option<(&Type, &Type)> {
        match &self.0.repr {
            TypeRepr::Map(key, value) => Some((key, value)),
            _ => None,
        }
    }

    pub fn array_len(&self) -> Option<usize> {
        match &self.0.repr {
            TypeRepr::Array(_, len) => Some(*len),
            _ => None,
        }
    }

    /// Whether this is exactly `map[string]any`
    pub fn is_untyped_map(&self) -> bool {
        match self.map_types() {
            Some((key, value)) => {
                key.name().is_none() && key.kind() == Kind::String && value.kind() == Kind::Any
            }
            None => false,
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(name) = self.name() {
            return f.write_str(name);
        }

        match self.repr() {
            TypeRepr::Bool => f.write_str("bool"),
            TypeRepr::Int => f.write_str("int"),
            TypeRepr::Uint => f.write_str("uint"),
            TypeRepr::Float => f.write_str("float"),
            TypeRepr::String => f.write_str("string"),
            TypeRepr::Bytes => f.write_str("[]byte"),
            TypeRepr::Timestamp => f.write_str("timestamp"),
            TypeRepr::Uuid => f.write_str("uuid"),
            TypeRepr::Any => f.write_str("any"),
            TypeRepr::Struct(fields) => {
                f.write_str("struct {")?;
                for (i, field) in fields.iter().enumerate() {
                    if i > 0 {
                        f.write_str(";")?;
                    }
                    write!(f, " {} {}", field.name(), field.ty())?;
                }
                f.write_str(" }")
            }
            TypeRepr::Slice(elem) => write!(f, "[]{}", elem),
            TypeRepr::Array(elem, len) => write!(f, "[{}]{}", len, elem),
            TypeRepr::Map(key, value) => write!(f, "map[{}]{}", key, value),
            TypeRepr::Pointer(elem) => write!(f, "*{}", elem),
        }
    }
}

impl fmt::Debug for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Type({})", self)
    }
}
