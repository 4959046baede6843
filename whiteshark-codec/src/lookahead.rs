//! Element availability oracle for the progressive decoder

use whiteshark_format::constants::TAG_TYPE_MASK;
use whiteshark_format::{ByteReader, DataType, Limits, Result, Shape, SharkError};

/// Whether one complete element starts at `offset` in `buf`
///
/// Scalars need their full payload. Array and object headers need their type
/// field and count prefix; their children are checked one by one later. A
/// property needs its name and its complete value. Consumes nothing; fails
/// early when an available tag byte or length is already invalid.
pub fn element_available(buf: &[u8], offset: usize, limits: &Limits) -> Result<bool> {
    let Some(rest) = buf.get(offset..) else {
        return Ok(false);
    };
    match scan(&mut ByteReader::new(rest), limits) {
        Ok(()) => Ok(true),
        Err(SharkError::UnexpectedEof) => Ok(false),
        Err(err) => Err(err),
    }
}

/// Walk over one element header; running out of bytes surfaces as `UnexpectedEof`
fn scan(reader: &mut ByteReader<'_>, limits: &Limits) -> Result<()> {
    let shape = reader.read_shape()?;
    if let Some(len) = shape.fixed_payload_len() {
        reader.take(len)?;
        return Ok(());
    }

    match shape {
        Shape::String(class) => {
            let len = reader.read_length(class)?;
            limits.check_string_len(len)?;
            reader.take(len)?;
        }
        Shape::Array {
            count,
            type_in_dictionary,
        } => {
            skip_type_field(reader, type_in_dictionary)?;
            reader.read_length(count)?;
        }
        Shape::Object {
            count,
            type_in_dictionary,
            generics,
        } => {
            if !generics {
                skip_type_field(reader, type_in_dictionary)?;
            }
            reader.read_length(count)?;
        }
        Shape::Property {
            name_in_dictionary,
            long_name,
        } => {
            if name_in_dictionary {
                reader.read_u16()?;
            } else {
                let len = if long_name {
                    usize::from(reader.read_u16()?)
                } else {
                    usize::from(reader.read_u8()?)
                };
                reader.take(len)?;
            }
            // One level of recursion at most: a property never holds a property
            if let Some(value_tag) = reader.peek_u8() {
                if DataType::from_u8(value_tag & TAG_TYPE_MASK)? == DataType::Property {
                    return Err(SharkError::UnexpectedShape(
                        "property value is itself a property".to_string(),
                    ));
                }
            }
            scan(reader, limits)?;
        }
        // Fixed-width shapes returned above
        _ => {}
    }
    Ok(())
}

/// Skip a type field: dictionary index, or length-prefixed name
fn skip_type_field(reader: &mut ByteReader<'_>, in_dictionary: bool) -> Result<()> {
    let field = reader.read_u16()?;
    if !in_dictionary {
        reader.take(usize::from(field))?;
    }
    Ok(())
}
