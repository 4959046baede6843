//! Element reader shared by both decoders
//!
//! An element is one tag byte plus everything that belongs to it before any
//! child element starts: a complete scalar, an array/object header or a
//! property name. Reading an element registers first-seen names and types in
//! the session dictionaries, in the same order the serializer added them.

use tracing::trace;
use whiteshark_format::{
    ByteReader, LengthClass, Limits, Precision, Result, Shape, SharkError, StreamOptions,
};

use crate::dictionary::Dictionary;
use crate::types::{TypeHandle, TypeRef, TypeRegistry};
use crate::value::Value;

/// What an object header says about the object's reconstruction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ObjectKind {
    /// No type reference, rebuilt as a generic object
    Generic,
    /// Typed record
    Record(TypeHandle),
}

/// One decoded element
#[derive(Debug)]
pub(crate) enum Element {
    /// Complete scalar value
    Leaf(Value),
    /// Array header; `count` elements follow
    Array { element_type: TypeRef, count: usize },
    /// Object header; `count` properties follow
    Object { kind: ObjectKind, count: usize },
    /// Property name; its value follows
    Property(String),
}

/// Per-stream decoding state: dictionaries, header options and limits
#[derive(Debug)]
pub(crate) struct Session {
    types: Dictionary<TypeRef>,
    names: Dictionary<String>,
    options: StreamOptions,
    limits: Limits,
}

impl Session {
    pub(crate) fn new(limits: Limits) -> Self {
        let capacity = limits.dictionary_capacity();
        Self {
            types: Dictionary::new(capacity),
            names: Dictionary::new(capacity),
            options: StreamOptions::default(),
            limits,
        }
    }

    /// Start a new stream with the options read from its header
    pub(crate) fn begin(&mut self, options: StreamOptions) {
        self.types.clear();
        self.names.clear();
        self.options = options;
    }

    pub(crate) fn limits(&self) -> &Limits {
        &self.limits
    }

    /// Read the element starting at the reader's position
    pub(crate) fn read_element<R: TypeRegistry + ?Sized>(
        &mut self,
        reader: &mut ByteReader<'_>,
        registry: &R,
    ) -> Result<Element> {
        let element = match reader.read_shape()? {
            Shape::Null => Element::Leaf(Value::Null),
            Shape::Boolean(v) => Element::Leaf(Value::Bool(v)),
            Shape::Integer(width) => Element::Leaf(Value::Int(reader.read_int(width)?)),
            Shape::Real(Precision::Single) => Element::Leaf(Value::F32(reader.read_f32()?)),
            Shape::Real(Precision::Double) => Element::Leaf(Value::F64(reader.read_f64()?)),
            Shape::Char => Element::Leaf(Value::Char(reader.read_u16()?)),
            Shape::String(class) => {
                let len = reader.read_length(class)?;
                self.limits.check_string_len(len)?;
                Element::Leaf(Value::String(reader.read_utf8(len, "string")?))
            }
            Shape::Array {
                count,
                type_in_dictionary,
            } => {
                let element_type = self.read_type_field(reader, type_in_dictionary, registry)?;
                let count = self.read_count(reader, count)?;
                Element::Array {
                    element_type,
                    count,
                }
            }
            Shape::Object {
                count,
                type_in_dictionary,
                generics,
            } => {
                let kind = if generics {
                    ObjectKind::Generic
                } else {
                    match self.read_type_field(reader, type_in_dictionary, registry)? {
                        _ if self.options.objects_as_generics => ObjectKind::Generic,
                        TypeRef::Record(handle) => ObjectKind::Record(handle),
                        other => {
                            return Err(SharkError::UnexpectedShape(format!(
                                "object type {:?} is not a record",
                                other
                            )))
                        }
                    }
                };
                let count = self.read_count(reader, count)?;
                Element::Object { kind, count }
            }
            Shape::Property {
                name_in_dictionary,
                long_name,
            } => Element::Property(self.read_property_name(reader, name_in_dictionary, long_name)?),
        };
        Ok(element)
    }

    fn read_type_field<R: TypeRegistry + ?Sized>(
        &mut self,
        reader: &mut ByteReader<'_>,
        in_dictionary: bool,
        registry: &R,
    ) -> Result<TypeRef> {
        let field = reader.read_u16()?;
        if in_dictionary {
            let ty = self.types.get(field)?.clone();
            trace!(index = field, ?ty, "type dictionary hit");
            return Ok(ty);
        }

        let name = reader.read_utf8(usize::from(field), "type name")?;
        let ty = TypeRef::from_wire_name(&name, registry, self.limits.max_depth)?;
        let index = self.types.push(ty.clone())?;
        trace!(index, %name, "type dictionary add");
        Ok(ty)
    }

    fn read_count(&self, reader: &mut ByteReader<'_>, class: LengthClass) -> Result<usize> {
        let count = reader.read_length(class)?;
        self.limits.check_container_len(count)?;
        Ok(count)
    }

    fn read_property_name(
        &mut self,
        reader: &mut ByteReader<'_>,
        in_dictionary: bool,
        long_name: bool,
    ) -> Result<String> {
        if in_dictionary {
            let index = reader.read_u16()?;
            let name = self.names.get(index)?.clone();
            trace!(index, %name, "name dictionary hit");
            return Ok(name);
        }

        let len = if long_name {
            usize::from(reader.read_u16()?)
        } else {
            usize::from(reader.read_u8()?)
        };
        let name = reader.read_utf8(len, "property name")?;
        let index = self.names.push(name.clone())?;
        trace!(index, %name, "name dictionary add");
        Ok(name)
    }
}
