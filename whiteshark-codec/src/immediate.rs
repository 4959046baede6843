//! Immediate decoder for fully buffered streams

use std::io::Read;

use tracing::debug;
use whiteshark_format::constants::HEADER_LEN;
use whiteshark_format::{ByteReader, Identifier, Result, SharkError, StreamHeader};

use crate::container::{Container, Placement};
use crate::element::{Element, Session};
use crate::options::DecodeOptions;
use crate::types::Collaborators;
use crate::value::Value;

/// One-pass decoder over a complete byte buffer
pub struct ImmediateDecoder<'c, C: ?Sized> {
    collaborators: &'c C,
    identifier: Identifier,
    options: DecodeOptions,
}

impl<'c, C: Collaborators + ?Sized> ImmediateDecoder<'c, C> {
    /// Decoder expecting streams tagged with `identifier`
    pub fn new(identifier: impl Into<Identifier>, collaborators: &'c C) -> Self {
        Self {
            collaborators,
            identifier: identifier.into(),
            options: DecodeOptions::default(),
        }
    }

    /// Replace the decode options
    pub fn with_options(mut self, options: DecodeOptions) -> Self {
        self.options = options;
        self
    }

    /// Read `source` to exhaustion and decode it
    pub fn decode<R: Read>(&self, mut source: R) -> Result<Value> {
        let mut bytes = Vec::new();
        source.read_to_end(&mut bytes)?;
        self.decode_slice(&bytes)
    }

    /// Decode one value from `bytes`; bytes after the value are ignored
    pub fn decode_slice(&self, bytes: &[u8]) -> Result<Value> {
        let header = StreamHeader::decode(bytes, self.identifier)?;
        debug!(
            identifier = %header.identifier,
            objects_as_generics = header.options.objects_as_generics,
            "header read"
        );

        let mut session = Session::new(self.options.limits.clone());
        session.begin(header.options);

        let mut reader = ByteReader::new(&bytes[HEADER_LEN..]);
        let element = session.read_element(&mut reader, self.collaborators)?;
        let value = self.materialize(&mut session, &mut reader, element, Placement::ROOT, 0)?;

        debug!(
            consumed = HEADER_LEN + reader.position(),
            trailing = reader.remaining(),
            "stream decoded"
        );
        Ok(value)
    }

    /// Turn an element into a value, reading container children recursively
    fn materialize(
        &self,
        session: &mut Session,
        reader: &mut ByteReader<'_>,
        element: Element,
        placement: Placement,
        depth: usize,
    ) -> Result<Value> {
        let mut container = match element {
            Element::Leaf(value) => return Ok(value),
            Element::Property(name) => {
                return Err(SharkError::UnexpectedShape(format!(
                    "property '{}' outside of an object",
                    name
                )))
            }
            Element::Array {
                element_type,
                count,
            } => Container::array(element_type, count, placement),
            Element::Object { kind, count } => {
                Container::object(kind, count, placement, self.collaborators)?
            }
        };
        session.limits().check_depth(depth + 1)?;

        while !container.is_complete() {
            let mut child = session.read_element(reader, self.collaborators)?;
            if let Element::Property(name) = child {
                container.accept_name(name)?;
                child = session.read_element(reader, self.collaborators)?;
            }
            let child_placement = container.placement();
            let value = self.materialize(session, reader, child, child_placement, depth + 1)?;
            container.assign(value)?;
        }
        Ok(container.finish())
    }
}

/// Decode a value from a readable source
pub fn deserialize<R, C>(identifier: impl Into<Identifier>, source: R, collaborators: &C) -> Result<Value>
where
    R: Read,
    C: Collaborators + ?Sized,
{
    ImmediateDecoder::new(identifier, collaborators).decode(source)
}

/// Decode a value from a byte slice
pub fn deserialize_slice<C: Collaborators + ?Sized>(
    identifier: impl Into<Identifier>,
    bytes: &[u8],
    collaborators: &C,
) -> Result<Value> {
    ImmediateDecoder::new(identifier, collaborators).decode_slice(bytes)
}
