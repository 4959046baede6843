//! Serializer: value graph to byte stream
//!
//! Walks the value depth-first. Every tag byte is assembled together with its
//! fixed header bytes in a [`TagBuf`] and written with one call, so the sink
//! sees exactly the byte sequence the decoders read back.

use std::io::Write;

use tracing::{debug, trace};
use whiteshark_format::constants::{COLLECTION_ITEM_NAME, MAP_ENTRY_PREFIX};
use whiteshark_format::primitives::{
    put_bool, put_char, put_f32, put_f64, put_int, put_length, put_null, put_string_header,
    put_u16,
};
use whiteshark_format::{Identifier, LengthClass, Result, Shape, SharkError, StreamHeader, TagBuf};

use crate::dictionary::Dictionary;
use crate::options::SerializeOptions;
use crate::types::{Collaborators, FieldKind, TypeRef};
use crate::value::{Array, GenericObject, Record, Value};

/// How a type reference is written after an array/object tag
enum TypeField {
    Indexed(u16),
    Inline(String),
}

impl TypeField {
    fn in_dictionary(&self) -> bool {
        matches!(self, TypeField::Indexed(_))
    }

    fn put(&self, buf: &mut TagBuf) {
        match self {
            TypeField::Indexed(index) => put_u16(buf, *index),
            TypeField::Inline(name) => {
                // Length checked when the field was built
                put_u16(buf, name.len() as u16);
                buf.extend_from_slice(name.as_bytes());
            }
        }
    }
}

/// Stream serializer
///
/// Dictionaries live for one [`serialize`](Serializer::serialize) call and are
/// cleared at the start of the next one.
pub struct Serializer<'c, C: ?Sized> {
    collaborators: &'c C,
    options: SerializeOptions,
    types: Dictionary<TypeRef>,
    names: Dictionary<String>,
    written: u64,
}

impl<'c, C: Collaborators + ?Sized> Serializer<'c, C> {
    /// Create a serializer
    pub fn new(collaborators: &'c C, options: SerializeOptions) -> Self {
        let capacity = options.limits.dictionary_capacity();
        Self {
            collaborators,
            options,
            types: Dictionary::new(capacity),
            names: Dictionary::new(capacity),
            written: 0,
        }
    }

    /// Write the header and `value` to `sink`, returning the byte count
    pub fn serialize<W: Write>(
        &mut self,
        identifier: Identifier,
        sink: &mut W,
        value: &Value,
    ) -> Result<u64> {
        self.types.clear();
        self.names.clear();
        self.written = 0;

        let header = StreamHeader::new(identifier, self.options.stream);
        self.emit(sink, &header.encode())?;
        debug!(
            %identifier,
            objects_as_generics = self.options.stream.objects_as_generics,
            "header written"
        );

        self.write_value(sink, value, FieldKind::Plain, 0)?;
        sink.flush()?;

        debug!(
            bytes = self.written,
            types = self.types.len(),
            names = self.names.len(),
            "stream serialized"
        );
        Ok(self.written)
    }

    fn emit<W: Write>(&mut self, sink: &mut W, bytes: &[u8]) -> Result<()> {
        sink.write_all(bytes)?;
        self.written += bytes.len() as u64;
        Ok(())
    }

    fn write_value<W: Write>(
        &mut self,
        sink: &mut W,
        value: &Value,
        kind: FieldKind,
        depth: usize,
    ) -> Result<()> {
        let mut buf = TagBuf::new();
        match value {
            Value::Null => put_null(&mut buf),
            Value::String(s) => {
                put_string_header(&mut buf, s.len())?;
                self.emit(sink, &buf)?;
                return self.emit(sink, s.as_bytes());
            }
            Value::Char(c) => put_char(&mut buf, *c),
            Value::Int(v) => put_int(&mut buf, *v),
            Value::F32(v) => put_f32(&mut buf, *v),
            Value::F64(v) => put_f64(&mut buf, *v),
            Value::Bool(v) => put_bool(&mut buf, *v),
            Value::Array(array) => return self.write_array(sink, array, depth + 1),
            Value::Record(record) => return self.write_record(sink, record, kind, depth + 1),
            Value::Generic(object) => return self.write_generic(sink, object, depth + 1),
        }
        self.emit(sink, &buf)
    }

    fn write_array<W: Write>(&mut self, sink: &mut W, array: &Array, depth: usize) -> Result<()> {
        self.options.limits.check_depth(depth)?;

        let element_type = self.wire_element_type(&array.element_type)?;
        let type_field = self.type_field(&element_type)?;
        let count = LengthClass::for_len(array.items.len())?;

        let mut buf = TagBuf::new();
        buf.push(
            Shape::Array {
                count,
                type_in_dictionary: type_field.in_dictionary(),
            }
            .to_byte(),
        );
        type_field.put(&mut buf);
        put_length(&mut buf, count, array.items.len());
        self.emit(sink, &buf)?;

        for item in &array.items {
            self.write_value(sink, item, FieldKind::Plain, depth)?;
        }
        Ok(())
    }

    fn write_record<W: Write>(
        &mut self,
        sink: &mut W,
        record: &Record,
        kind: FieldKind,
        depth: usize,
    ) -> Result<()> {
        self.options.limits.check_depth(depth)?;

        let handle = record.handle();
        let schema = self
            .collaborators
            .schema(handle)
            .ok_or_else(|| SharkError::UnknownType(record.type_name().to_owned()))?;

        let generics = self.options.stream.objects_as_generics || schema.generics;
        let map = schema.map || kind == FieldKind::Map;
        let collection = schema.collection || kind == FieldKind::Collection;
        if !map && !record.entries().is_empty() {
            return Err(SharkError::MissingCapability {
                type_name: schema.name.clone(),
                capability: "map",
            });
        }
        if !collection && !record.items().is_empty() {
            return Err(SharkError::MissingCapability {
                type_name: schema.name.clone(),
                capability: "collection",
            });
        }

        let total = schema.fields.len() + record.entries().len() + record.items().len();
        let count = LengthClass::for_len(total)?;
        let type_field = if generics {
            None
        } else {
            Some(self.type_field(&TypeRef::Record(handle))?)
        };

        let mut buf = TagBuf::new();
        buf.push(
            Shape::Object {
                count,
                type_in_dictionary: type_field.as_ref().is_some_and(TypeField::in_dictionary),
                generics,
            }
            .to_byte(),
        );
        if let Some(field) = &type_field {
            field.put(&mut buf);
        }
        put_length(&mut buf, count, total);
        self.emit(sink, &buf)?;
        trace!(type_name = %schema.name, fields = total, generics, "record header");

        for field in &schema.fields {
            let value = record.get(&field.name).unwrap_or(&Value::Null);
            self.write_property(sink, &field.name, value, field.kind, depth)?;
        }
        for (key, value) in record.entries().iter() {
            let name = format!("{MAP_ENTRY_PREFIX}{key}");
            self.write_property(sink, &name, value, FieldKind::Plain, depth)?;
        }
        for item in record.items() {
            self.write_property(sink, COLLECTION_ITEM_NAME, item, FieldKind::Plain, depth)?;
        }
        Ok(())
    }

    fn write_generic<W: Write>(
        &mut self,
        sink: &mut W,
        object: &GenericObject,
        depth: usize,
    ) -> Result<()> {
        self.options.limits.check_depth(depth)?;

        let count = LengthClass::for_len(object.len())?;
        let mut buf = TagBuf::new();
        buf.push(
            Shape::Object {
                count,
                type_in_dictionary: false,
                generics: true,
            }
            .to_byte(),
        );
        put_length(&mut buf, count, object.len());
        self.emit(sink, &buf)?;

        for (key, value) in object.iter() {
            self.write_property(sink, key, value, FieldKind::Plain, depth)?;
        }
        Ok(())
    }

    fn write_property<W: Write>(
        &mut self,
        sink: &mut W,
        name: &str,
        value: &Value,
        kind: FieldKind,
        depth: usize,
    ) -> Result<()> {
        let mut buf = TagBuf::new();
        match self.names.lookup(name) {
            Some(index) => {
                trace!(index, name, "name dictionary hit");
                buf.push(
                    Shape::Property {
                        name_in_dictionary: true,
                        long_name: false,
                    }
                    .to_byte(),
                );
                put_u16(&mut buf, index);
            }
            None => {
                let len = name.len();
                if len > usize::from(u16::MAX) {
                    return Err(SharkError::LimitExceeded(format!(
                        "property name of {} bytes",
                        len
                    )));
                }
                self.names.push(name.to_owned())?;
                let long_name = len > usize::from(u8::MAX);
                buf.push(
                    Shape::Property {
                        name_in_dictionary: false,
                        long_name,
                    }
                    .to_byte(),
                );
                if long_name {
                    put_u16(&mut buf, len as u16);
                } else {
                    buf.push(len as u8);
                }
                buf.extend_from_slice(name.as_bytes());
            }
        }
        self.emit(sink, &buf)?;
        self.write_value(sink, value, kind, depth)
    }

    /// Element type as announced on the wire
    fn wire_element_type(&self, declared: &TypeRef) -> Result<TypeRef> {
        if self.options.stream.objects_as_generics {
            return Ok(match declared {
                TypeRef::Record(_) | TypeRef::Any => TypeRef::Any,
                TypeRef::Array(_) => TypeRef::Array(Box::new(TypeRef::Any)),
                other => other.clone(),
            });
        }

        if let TypeRef::Record(handle) = declared {
            let schema = self.collaborators.schema(*handle).ok_or_else(|| {
                SharkError::UnknownType(format!("type handle {}", handle.0))
            })?;
            if schema.generics {
                return Ok(TypeRef::Any);
            }
        }
        Ok(declared.clone())
    }

    fn type_field(&mut self, ty: &TypeRef) -> Result<TypeField> {
        if let Some(index) = self.types.lookup(ty) {
            trace!(index, ?ty, "type dictionary hit");
            return Ok(TypeField::Indexed(index));
        }

        let name = ty.wire_name(self.collaborators)?;
        if name.len() > usize::from(u16::MAX) {
            return Err(SharkError::LimitExceeded(format!(
                "type name of {} bytes",
                name.len()
            )));
        }
        let index = self.types.push(ty.clone())?;
        trace!(index, %name, "type dictionary add");
        Ok(TypeField::Inline(name))
    }
}

/// Serialize `value` into `sink` and return the number of bytes written
pub fn serialize<W, C>(
    identifier: impl Into<Identifier>,
    sink: &mut W,
    value: &Value,
    options: &SerializeOptions,
    collaborators: &C,
) -> Result<u64>
where
    W: Write,
    C: Collaborators + ?Sized,
{
    Serializer::new(collaborators, options.clone()).serialize(identifier.into(), sink, value)
}

/// Serialize `value` into a new buffer
pub fn to_vec<C: Collaborators + ?Sized>(
    identifier: impl Into<Identifier>,
    value: &Value,
    options: &SerializeOptions,
    collaborators: &C,
) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    serialize(identifier, &mut out, value, options, collaborators)?;
    Ok(out)
}
