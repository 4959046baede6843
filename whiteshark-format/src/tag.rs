//! Tag byte codec
//!
//! Every encoded value starts with one tag byte. The low nibble selects the
//! [`DataType`]; the high nibble carries shape-specific metadata (integer width,
//! length prefix class, dictionary and generics flags). [`Shape`] is the decoded
//! form of a whole tag byte.

use crate::constants::{
    TAG_BOOL_TRUE, TAG_GENERICS, TAG_LENGTH_MASK, TAG_LONG_NAME, TAG_META_SHIFT,
    TAG_NAME_IN_DICTIONARY, TAG_REAL_DOUBLE, TAG_TYPE_IN_DICTIONARY, TAG_TYPE_MASK,
};
use crate::error::{Result, SharkError};

/// Data type codes (low nibble of a tag byte)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum DataType {
    /// Null value
    Null = 0,
    /// Boolean value, stored in the tag byte itself
    Boolean = 1,
    /// Signed little-endian integer of 1, 2, 4 or 8 bytes
    Integer = 2,
    /// One UTF-16 code unit
    Char = 3,
    /// Length-prefixed UTF-8 string
    String = 4,
    /// Single or double precision float
    Real = 5,
    /// Typed array header
    Array = 6,
    /// Record or generic object header
    Object = 7,
    /// Named property of an object
    Property = 8,
}

impl DataType {
    /// Convert from the low nibble of a tag byte
    pub fn from_u8(val: u8) -> Result<Self> {
        match val {
            0 => Ok(DataType::Null),
            1 => Ok(DataType::Boolean),
            2 => Ok(DataType::Integer),
            3 => Ok(DataType::Char),
            4 => Ok(DataType::String),
            5 => Ok(DataType::Real),
            6 => Ok(DataType::Array),
            7 => Ok(DataType::Object),
            8 => Ok(DataType::Property),
            _ => Err(SharkError::UnexpectedShape(format!(
                "Unknown data type: {}",
                val
            ))),
        }
    }
}

/// Byte width of an encoded integer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntWidth {
    /// `i8`
    W1,
    /// `i16`
    W2,
    /// `i32`
    W4,
    /// `i64`
    W8,
}

impl IntWidth {
    /// Smallest width that holds `value`
    pub fn for_value(value: i64) -> Self {
        if i8::try_from(value).is_ok() {
            IntWidth::W1
        } else if i16::try_from(value).is_ok() {
            IntWidth::W2
        } else if i32::try_from(value).is_ok() {
            IntWidth::W4
        } else {
            IntWidth::W8
        }
    }

    /// Number of payload bytes
    pub fn byte_len(self) -> usize {
        match self {
            IntWidth::W1 => 1,
            IntWidth::W2 => 2,
            IntWidth::W4 => 4,
            IntWidth::W8 => 8,
        }
    }

    fn from_nibble(nibble: u8) -> Result<Self> {
        match nibble {
            1 => Ok(IntWidth::W1),
            2 => Ok(IntWidth::W2),
            4 => Ok(IntWidth::W4),
            // 0 is the historical default for eight-byte integers
            0 | 8 => Ok(IntWidth::W8),
            other => Err(SharkError::UnexpectedShape(format!(
                "Invalid integer width selector: {}",
                other
            ))),
        }
    }
}

/// Floating-point precision
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Precision {
    /// `f32`
    Single,
    /// `f64`
    Double,
}

impl Precision {
    /// Number of payload bytes
    pub fn byte_len(self) -> usize {
        match self {
            Precision::Single => 4,
            Precision::Double => 8,
        }
    }
}

/// Length/count prefix class (2-bit selector)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LengthClass {
    /// No prefix, length is zero
    Absent,
    /// `u8` prefix
    U8,
    /// `u16` prefix
    U16,
    /// `u32` prefix
    U32,
}

impl LengthClass {
    /// Smallest class able to hold `len`
    pub fn for_len(len: usize) -> Result<Self> {
        if len == 0 {
            Ok(LengthClass::Absent)
        } else if len <= u8::MAX as usize {
            Ok(LengthClass::U8)
        } else if len <= u16::MAX as usize {
            Ok(LengthClass::U16)
        } else if len <= u32::MAX as usize {
            Ok(LengthClass::U32)
        } else {
            Err(SharkError::LimitExceeded(format!(
                "Length {} does not fit a 32-bit prefix",
                len
            )))
        }
    }

    /// Number of prefix bytes
    pub fn byte_len(self) -> usize {
        match self {
            LengthClass::Absent => 0,
            LengthClass::U8 => 1,
            LengthClass::U16 => 2,
            LengthClass::U32 => 4,
        }
    }

    fn selector(self) -> u8 {
        match self {
            LengthClass::Absent => 0,
            LengthClass::U8 => 1,
            LengthClass::U16 => 2,
            LengthClass::U32 => 3,
        }
    }

    fn from_selector(selector: u8) -> Self {
        match selector & 0b11 {
            0 => LengthClass::Absent,
            1 => LengthClass::U8,
            2 => LengthClass::U16,
            _ => LengthClass::U32,
        }
    }

    fn from_tag(byte: u8) -> Self {
        Self::from_selector((byte & TAG_LENGTH_MASK) >> TAG_META_SHIFT)
    }
}

/// Decoded tag byte
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    /// Null value
    Null,
    /// Boolean value carried by the tag
    Boolean(bool),
    /// Integer of the given width follows
    Integer(IntWidth),
    /// Float of the given precision follows
    Real(Precision),
    /// Two-byte UTF-16 code unit follows
    Char,
    /// String with the given length prefix class follows
    String(LengthClass),
    /// Array header: type reference then element count
    Array {
        /// Class of the element count prefix
        count: LengthClass,
        /// Type reference is a dictionary index
        type_in_dictionary: bool,
    },
    /// Object header: optional type reference then field count
    Object {
        /// Class of the field count prefix
        count: LengthClass,
        /// Type reference is a dictionary index
        type_in_dictionary: bool,
        /// Object carries no type reference
        generics: bool,
    },
    /// Property header: name (inline or dictionary index), value follows
    Property {
        /// Name is a dictionary index
        name_in_dictionary: bool,
        /// Inline name length is stored on two bytes
        long_name: bool,
    },
}

impl Shape {
    /// Data type of this shape
    pub fn data_type(&self) -> DataType {
        match self {
            Shape::Null => DataType::Null,
            Shape::Boolean(_) => DataType::Boolean,
            Shape::Integer(_) => DataType::Integer,
            Shape::Real(_) => DataType::Real,
            Shape::Char => DataType::Char,
            Shape::String(_) => DataType::String,
            Shape::Array { .. } => DataType::Array,
            Shape::Object { .. } => DataType::Object,
            Shape::Property { .. } => DataType::Property,
        }
    }

    /// Encode this shape as a tag byte
    pub fn to_byte(self) -> u8 {
        let base = self.data_type() as u8;
        match self {
            Shape::Null | Shape::Char => base,
            Shape::Boolean(value) => {
                if value {
                    base | TAG_BOOL_TRUE
                } else {
                    base
                }
            }
            Shape::Integer(width) => base | ((width.byte_len() as u8) << TAG_META_SHIFT),
            Shape::Real(Precision::Single) => base,
            Shape::Real(Precision::Double) => base | TAG_REAL_DOUBLE,
            Shape::String(class) => base | (class.selector() << TAG_META_SHIFT),
            Shape::Array {
                count,
                type_in_dictionary,
            } => {
                let mut byte = base | (count.selector() << TAG_META_SHIFT);
                if type_in_dictionary {
                    byte |= TAG_TYPE_IN_DICTIONARY;
                }
                byte
            }
            Shape::Object {
                count,
                type_in_dictionary,
                generics,
            } => {
                let mut byte = base | (count.selector() << TAG_META_SHIFT);
                if generics {
                    byte |= TAG_GENERICS;
                } else if type_in_dictionary {
                    byte |= TAG_TYPE_IN_DICTIONARY;
                }
                byte
            }
            Shape::Property {
                name_in_dictionary,
                long_name,
            } => {
                if name_in_dictionary {
                    base | TAG_NAME_IN_DICTIONARY
                } else if long_name {
                    base | TAG_LONG_NAME
                } else {
                    base
                }
            }
        }
    }

    /// Decode a tag byte
    pub fn from_byte(byte: u8) -> Result<Self> {
        let meta = byte >> TAG_META_SHIFT;
        let shape = match DataType::from_u8(byte & TAG_TYPE_MASK)? {
            DataType::Null => Shape::Null,
            DataType::Boolean => Shape::Boolean(meta != 0),
            DataType::Integer => Shape::Integer(IntWidth::from_nibble(meta)?),
            DataType::Real => {
                if meta != 0 {
                    Shape::Real(Precision::Double)
                } else {
                    Shape::Real(Precision::Single)
                }
            }
            DataType::Char => Shape::Char,
            DataType::String => match meta {
                0..=3 => Shape::String(LengthClass::from_selector(meta)),
                // Nibble 4 is how early writers flagged a four-byte length
                4 => Shape::String(LengthClass::U32),
                other => {
                    return Err(SharkError::UnexpectedShape(format!(
                        "Invalid string length selector: {}",
                        other
                    )))
                }
            },
            DataType::Array => Shape::Array {
                count: LengthClass::from_tag(byte),
                type_in_dictionary: byte & TAG_TYPE_IN_DICTIONARY != 0,
            },
            DataType::Object => {
                let generics = byte & TAG_GENERICS != 0;
                Shape::Object {
                    count: LengthClass::from_tag(byte),
                    type_in_dictionary: !generics && byte & TAG_TYPE_IN_DICTIONARY != 0,
                    generics,
                }
            }
            DataType::Property => {
                let name_in_dictionary = byte & TAG_NAME_IN_DICTIONARY != 0;
                Shape::Property {
                    name_in_dictionary,
                    long_name: !name_in_dictionary && byte & TAG_LONG_NAME != 0,
                }
            }
        };
        Ok(shape)
    }

    /// Payload size for fixed-width shapes, `None` for prefixed ones
    pub fn fixed_payload_len(&self) -> Option<usize> {
        match self {
            Shape::Null | Shape::Boolean(_) => Some(0),
            Shape::Integer(width) => Some(width.byte_len()),
            Shape::Real(precision) => Some(precision.byte_len()),
            Shape::Char => Some(2),
            _ => None,
        }
    }
}
