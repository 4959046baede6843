//! Type references, record schemas and the collaborator traits
//!
//! The codec never discovers record layouts on its own. It asks three
//! collaborators: a [`TypeRegistry`] mapping handles to portable names, a
//! [`FieldSchemaProvider`] listing the serializable fields of a type and an
//! [`InstanceBuilder`] producing fresh records while decoding.

use std::sync::Arc;

use whiteshark_format::{Result, SharkError};

use crate::value::{Record, Value};

/// Opaque identity of a registered record type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeHandle(pub u32);

/// Element or object type as carried in array/object headers
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeRef {
    /// Any value; elements carry their own tags
    Any,
    /// `bool`
    Bool,
    /// `i8`
    I8,
    /// `i16`
    I16,
    /// `i32`
    I32,
    /// `i64`
    I64,
    /// `f32`
    F32,
    /// `f64`
    F64,
    /// UTF-16 code unit
    Char,
    /// UTF-8 string
    String,
    /// Nested array of the inner type
    Array(Box<TypeRef>),
    /// Registered record type
    Record(TypeHandle),
}

const BUILTIN_NAMES: [(&str, TypeRef); 10] = [
    ("any", TypeRef::Any),
    ("bool", TypeRef::Bool),
    ("i8", TypeRef::I8),
    ("i16", TypeRef::I16),
    ("i32", TypeRef::I32),
    ("i64", TypeRef::I64),
    ("f32", TypeRef::F32),
    ("f64", TypeRef::F64),
    ("char", TypeRef::Char),
    ("string", TypeRef::String),
];

impl TypeRef {
    /// Builtin type for a wire name, without array brackets
    pub fn builtin(name: &str) -> Option<TypeRef> {
        BUILTIN_NAMES
            .iter()
            .find(|(builtin, _)| *builtin == name)
            .map(|(_, ty)| ty.clone())
    }

    /// True for names the catalog must not hand out to records
    pub fn is_reserved_name(name: &str) -> bool {
        Self::builtin(name).is_some() || name.starts_with('[') || name.ends_with(']')
    }

    /// True when the type is a record or may hold records
    pub fn is_primitive(&self) -> bool {
        !matches!(self, TypeRef::Any | TypeRef::Array(_) | TypeRef::Record(_))
    }

    /// Portable name written to the stream
    pub fn wire_name<R: TypeRegistry + ?Sized>(&self, registry: &R) -> Result<String> {
        let mut depth = 0;
        let mut inner = self;
        while let TypeRef::Array(element) = inner {
            depth += 1;
            inner = element;
        }

        let base = match inner {
            TypeRef::Record(handle) => registry
                .name_of(*handle)
                .map(str::to_owned)
                .ok_or_else(|| {
                    SharkError::UnknownType(format!("unregistered type handle {}", handle.0))
                })?,
            other => BUILTIN_NAMES
                .iter()
                .find(|(_, ty)| ty == other)
                .map(|(name, _)| (*name).to_owned())
                .unwrap_or_default(),
        };

        let mut name = String::with_capacity(base.len() + depth * 2);
        name.extend(std::iter::repeat('[').take(depth));
        name.push_str(&base);
        name.extend(std::iter::repeat(']').take(depth));
        Ok(name)
    }

    /// Resolve a wire name, nesting at most `max_nesting` array levels
    pub fn from_wire_name<R: TypeRegistry + ?Sized>(
        name: &str,
        registry: &R,
        max_nesting: usize,
    ) -> Result<TypeRef> {
        let mut depth = 0;
        let mut inner = name;
        while let Some(rest) = inner.strip_prefix('[').and_then(|r| r.strip_suffix(']')) {
            depth += 1;
            if depth > max_nesting {
                return Err(SharkError::LimitExceeded(format!(
                    "array type '{}' nests deeper than {}",
                    name, max_nesting
                )));
            }
            inner = rest;
        }

        let mut ty = match Self::builtin(inner) {
            Some(builtin) => builtin,
            None => registry
                .resolve(inner)
                .map(TypeRef::Record)
                .ok_or_else(|| SharkError::UnknownType(inner.to_owned()))?,
        };
        for _ in 0..depth {
            ty = TypeRef::Array(Box::new(ty));
        }
        Ok(ty)
    }
}

/// How a field's value behaves once decoded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FieldKind {
    /// Ordinary value
    #[default]
    Plain,
    /// Holds a record that accepts map entries
    Map,
    /// Holds a record that accepts collection items
    Collection,
}

/// One serializable field of a record type
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDescriptor {
    /// Field name as written to the stream
    pub name: String,
    /// Capability granted to the field's value
    pub kind: FieldKind,
    /// Value a freshly built record starts with
    pub default: Value,
}

impl FieldDescriptor {
    /// Plain field defaulting to null
    pub fn plain(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: FieldKind::Plain,
            default: Value::Null,
        }
    }

    /// Map-valued field
    pub fn map(name: impl Into<String>) -> Self {
        Self {
            kind: FieldKind::Map,
            ..Self::plain(name)
        }
    }

    /// Collection-valued field
    pub fn collection(name: impl Into<String>) -> Self {
        Self {
            kind: FieldKind::Collection,
            ..Self::plain(name)
        }
    }

    /// Replace the default value
    pub fn with_default(mut self, default: impl Into<Value>) -> Self {
        self.default = default.into();
        self
    }
}

/// Ordered field layout and opt-ins of a record type
#[derive(Debug, Clone, PartialEq)]
pub struct TypeSchema {
    /// Local type name
    pub name: String,
    /// Serializable fields in wire order
    pub fields: Vec<FieldDescriptor>,
    /// Always serialize instances without a type reference
    pub generics: bool,
    /// Instances carry string-keyed map entries
    pub map: bool,
    /// Instances carry positional collection items
    pub collection: bool,
}

impl TypeSchema {
    /// Empty schema for `name`
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
            generics: false,
            map: false,
            collection: false,
        }
    }

    /// Append a plain field
    pub fn field(self, name: impl Into<String>) -> Self {
        self.with_field(FieldDescriptor::plain(name))
    }

    /// Append a field descriptor
    pub fn with_field(mut self, field: FieldDescriptor) -> Self {
        self.fields.push(field);
        self
    }

    /// Opt into generics serialization
    pub fn as_generics(mut self) -> Self {
        self.generics = true;
        self
    }

    /// Opt into map entries
    pub fn as_map(mut self) -> Self {
        self.map = true;
        self
    }

    /// Opt into collection items
    pub fn as_collection(mut self) -> Self {
        self.collection = true;
        self
    }

    /// Slot of the field called `name`
    pub fn field_index(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|field| field.name == name)
    }
}

/// Maps record types to portable names and back
pub trait TypeRegistry {
    /// Handle registered under `name`
    fn resolve(&self, name: &str) -> Option<TypeHandle>;
    /// Name written to the stream for `handle`
    fn name_of(&self, handle: TypeHandle) -> Option<&str>;
}

/// Lists the serializable fields of a record type
pub trait FieldSchemaProvider {
    /// Schema of `handle`
    fn schema(&self, handle: TypeHandle) -> Option<Arc<TypeSchema>>;
}

/// Builds fresh records while decoding
pub trait InstanceBuilder {
    /// New record of type `handle` with every field at its default
    fn instantiate(&self, handle: TypeHandle) -> Option<Record>;
}

/// Everything the serializer and decoders call into
pub trait Collaborators: TypeRegistry + FieldSchemaProvider + InstanceBuilder {}

impl<T> Collaborators for T where T: TypeRegistry + FieldSchemaProvider + InstanceBuilder + ?Sized {}
