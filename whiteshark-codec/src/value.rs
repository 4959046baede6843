//! In-memory value graph

use std::sync::Arc;

use crate::types::{TypeHandle, TypeRef, TypeSchema};

/// Any value the codec can encode or reconstruct
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Null
    Null,
    /// Boolean
    Bool(bool),
    /// Signed integer; the wire width follows the magnitude
    Int(i64),
    /// Single precision real
    F32(f32),
    /// Double precision real
    F64(f64),
    /// One UTF-16 code unit
    Char(u16),
    /// UTF-8 string
    String(String),
    /// Typed array
    Array(Array),
    /// Typed record
    Record(Record),
    /// Object decoded without a type reference
    Generic(GenericObject),
}

impl Value {
    /// String contents, if this is a string
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Integer value, if this is an integer
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// Boolean value, if this is a boolean
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(v) => Some(*v),
            _ => None,
        }
    }

    /// Record, if this is one
    pub fn as_record(&self) -> Option<&Record> {
        match self {
            Value::Record(r) => Some(r),
            _ => None,
        }
    }

    /// Generic object, if this is one
    pub fn as_generic(&self) -> Option<&GenericObject> {
        match self {
            Value::Generic(g) => Some(g),
            _ => None,
        }
    }

    /// Array, if this is one
    pub fn as_array(&self) -> Option<&Array> {
        match self {
            Value::Array(a) => Some(a),
            _ => None,
        }
    }

    /// True for `Value::Null`
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(i64::from(v))
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::F32(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::F64(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_owned())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<Array> for Value {
    fn from(v: Array) -> Self {
        Value::Array(v)
    }
}

impl From<Record> for Value {
    fn from(v: Record) -> Self {
        Value::Record(v)
    }
}

impl From<GenericObject> for Value {
    fn from(v: GenericObject) -> Self {
        Value::Generic(v)
    }
}

/// Array with a declared element type
#[derive(Debug, Clone, PartialEq)]
pub struct Array {
    /// Declared element type
    pub element_type: TypeRef,
    /// Elements in order
    pub items: Vec<Value>,
}

impl Array {
    /// Empty array of `element_type`
    pub fn new(element_type: TypeRef) -> Self {
        Self::with_capacity(element_type, 0)
    }

    /// Empty array with room for `capacity` elements
    pub fn with_capacity(element_type: TypeRef, capacity: usize) -> Self {
        Self {
            element_type,
            items: Vec::with_capacity(capacity),
        }
    }

    /// Array of `element_type` holding `items`
    pub fn from_items<I, V>(element_type: TypeRef, items: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Self {
            element_type,
            items: items.into_iter().map(Into::into).collect(),
        }
    }

    /// Number of elements
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// True when there are no elements
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Ordered string-keyed mapping
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GenericObject {
    entries: Vec<(String, Value)>,
}

impl GenericObject {
    /// Empty object
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty object with room for `capacity` entries
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
        }
    }

    /// Insert or replace `key`, keeping the original position on replace
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, slot)) => Some(std::mem::replace(slot, value)),
            None => {
                self.entries.push((key, value));
                None
            }
        }
    }

    /// Builder form of [`insert`](Self::insert)
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    /// Value stored under `key`
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Entries in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Keys in insertion order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when there are no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for GenericObject {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut object = GenericObject::new();
        for (k, v) in iter {
            object.insert(k, v);
        }
        object
    }
}

/// Instance of a registered record type
///
/// Field slots follow the schema order. Map entries and collection items are
/// kept apart from the declared fields and only travel on the wire when the
/// record has the matching capability.
#[derive(Debug, Clone)]
pub struct Record {
    handle: TypeHandle,
    schema: Arc<TypeSchema>,
    fields: Vec<Value>,
    entries: GenericObject,
    items: Vec<Value>,
}

impl Record {
    /// Record of type `handle` with every field at its schema default
    pub fn new(handle: TypeHandle, schema: Arc<TypeSchema>) -> Self {
        let fields = schema.fields.iter().map(|f| f.default.clone()).collect();
        Self {
            handle,
            schema,
            fields,
            entries: GenericObject::new(),
            items: Vec::new(),
        }
    }

    /// Type handle
    pub fn handle(&self) -> TypeHandle {
        self.handle
    }

    /// Schema the field slots follow
    pub fn schema(&self) -> &Arc<TypeSchema> {
        &self.schema
    }

    /// Local type name
    pub fn type_name(&self) -> &str {
        &self.schema.name
    }

    /// Value of field `name`
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.schema.field_index(name).map(|i| &self.fields[i])
    }

    /// Set field `name`; returns false when the schema has no such field
    pub fn set(&mut self, name: &str, value: impl Into<Value>) -> bool {
        match self.schema.field_index(name) {
            Some(i) => {
                self.fields[i] = value.into();
                true
            }
            None => false,
        }
    }

    pub(crate) fn slot_mut(&mut self, index: usize) -> &mut Value {
        &mut self.fields[index]
    }

    /// Builder form of [`set`](Self::set); unknown names are ignored
    pub fn with(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.set(name, value);
        self
    }

    /// Declared fields in schema order
    pub fn fields(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.schema
            .fields
            .iter()
            .zip(&self.fields)
            .map(|(f, v)| (f.name.as_str(), v))
    }

    /// Map entries
    pub fn entries(&self) -> &GenericObject {
        &self.entries
    }

    /// Mutable map entries
    pub fn entries_mut(&mut self) -> &mut GenericObject {
        &mut self.entries
    }

    /// Collection items
    pub fn items(&self) -> &[Value] {
        &self.items
    }

    /// Mutable collection items
    pub fn items_mut(&mut self) -> &mut Vec<Value> {
        &mut self.items
    }
}

impl PartialEq for Record {
    fn eq(&self, other: &Self) -> bool {
        self.handle == other.handle
            && self.fields == other.fields
            && self.entries == other.entries
            && self.items == other.items
    }
}
