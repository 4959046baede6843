//! Primitive encoders and decoders
//!
//! Encoders append to a small stack buffer ([`TagBuf`]) so a tag byte and its
//! fixed payload reach the sink in one write. [`ByteReader`] is the matching
//! bounds-checked little-endian cursor over a byte slice.

use smallvec::SmallVec;

use crate::error::{Result, SharkError};
use crate::tag::{IntWidth, LengthClass, Precision, Shape};

/// Scratch buffer for one tag byte plus its header/payload bytes
pub type TagBuf = SmallVec<[u8; 16]>;

/// Append a null value
pub fn put_null(buf: &mut TagBuf) {
    buf.push(Shape::Null.to_byte());
}

/// Append a boolean value
pub fn put_bool(buf: &mut TagBuf, value: bool) {
    buf.push(Shape::Boolean(value).to_byte());
}

/// Append an integer using the smallest width that holds it
pub fn put_int(buf: &mut TagBuf, value: i64) {
    let width = IntWidth::for_value(value);
    buf.push(Shape::Integer(width).to_byte());
    buf.extend_from_slice(&value.to_le_bytes()[..width.byte_len()]);
}

/// Append a single precision real
pub fn put_f32(buf: &mut TagBuf, value: f32) {
    buf.push(Shape::Real(Precision::Single).to_byte());
    buf.extend_from_slice(&value.to_le_bytes());
}

/// Append a double precision real
pub fn put_f64(buf: &mut TagBuf, value: f64) {
    buf.push(Shape::Real(Precision::Double).to_byte());
    buf.extend_from_slice(&value.to_le_bytes());
}

/// Append a UTF-16 code unit
pub fn put_char(buf: &mut TagBuf, value: u16) {
    buf.push(Shape::Char.to_byte());
    buf.extend_from_slice(&value.to_le_bytes());
}

/// Append a string tag and length prefix; the UTF-8 bytes follow separately
pub fn put_string_header(buf: &mut TagBuf, len: usize) -> Result<()> {
    let class = LengthClass::for_len(len)?;
    buf.push(Shape::String(class).to_byte());
    put_length(buf, class, len);
    Ok(())
}

/// Append a length/count prefix of the given class
///
/// `len` must fit `class`; callers obtain the class from [`LengthClass::for_len`].
pub fn put_length(buf: &mut TagBuf, class: LengthClass, len: usize) {
    match class {
        LengthClass::Absent => {}
        LengthClass::U8 => buf.push(len as u8),
        LengthClass::U16 => buf.extend_from_slice(&(len as u16).to_le_bytes()),
        LengthClass::U32 => buf.extend_from_slice(&(len as u32).to_le_bytes()),
    }
}

/// Append a little-endian u16
pub fn put_u16(buf: &mut TagBuf, value: u16) {
    buf.extend_from_slice(&value.to_le_bytes());
}

/// Bounds-checked little-endian reader over a byte slice
#[derive(Debug, Clone)]
pub struct ByteReader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> ByteReader<'a> {
    /// Create a reader positioned at the start of `buf`
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    /// Bytes consumed so far
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Bytes left to read
    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    /// Next byte without consuming it
    pub fn peek_u8(&self) -> Option<u8> {
        self.buf.get(self.pos).copied()
    }

    /// Consume `len` bytes
    pub fn take(&mut self, len: usize) -> Result<&'a [u8]> {
        if self.remaining() < len {
            return Err(SharkError::UnexpectedEof);
        }
        let bytes = &self.buf[self.pos..self.pos + len];
        self.pos += len;
        Ok(bytes)
    }

    fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N)?);
        Ok(out)
    }

    /// Read one byte
    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.take(1)?[0])
    }

    /// Read a little-endian u16
    pub fn read_u16(&mut self) -> Result<u16> {
        Ok(u16::from_le_bytes(self.read_array()?))
    }

    /// Read a little-endian u32
    pub fn read_u32(&mut self) -> Result<u32> {
        Ok(u32::from_le_bytes(self.read_array()?))
    }

    /// Read and decode a tag byte
    pub fn read_shape(&mut self) -> Result<Shape> {
        Shape::from_byte(self.read_u8()?)
    }

    /// Read a signed integer of the given width, sign-extended to i64
    pub fn read_int(&mut self, width: IntWidth) -> Result<i64> {
        let value = match width {
            IntWidth::W1 => i64::from(i8::from_le_bytes(self.read_array()?)),
            IntWidth::W2 => i64::from(i16::from_le_bytes(self.read_array()?)),
            IntWidth::W4 => i64::from(i32::from_le_bytes(self.read_array()?)),
            IntWidth::W8 => i64::from_le_bytes(self.read_array()?),
        };
        Ok(value)
    }

    /// Read a little-endian f32
    pub fn read_f32(&mut self) -> Result<f32> {
        Ok(f32::from_le_bytes(self.read_array()?))
    }

    /// Read a little-endian f64
    pub fn read_f64(&mut self) -> Result<f64> {
        Ok(f64::from_le_bytes(self.read_array()?))
    }

    /// Read a length/count prefix of the given class
    pub fn read_length(&mut self, class: LengthClass) -> Result<usize> {
        let len = match class {
            LengthClass::Absent => 0,
            LengthClass::U8 => usize::from(self.read_u8()?),
            LengthClass::U16 => usize::from(self.read_u16()?),
            LengthClass::U32 => self.read_u32()? as usize,
        };
        Ok(len)
    }

    /// Read `len` bytes as UTF-8; `what` names the element in errors
    pub fn read_utf8(&mut self, len: usize, what: &'static str) -> Result<String> {
        let bytes = self.take(len)?;
        std::str::from_utf8(bytes)
            .map(str::to_owned)
            .map_err(|_| SharkError::InvalidUtf8(what))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_int_uses_smallest_width() {
        let cases: [(i64, &[u8]); 5] = [
            (0, &[0x12, 0x00]),
            (-1, &[0x12, 0xFF]),
            (300, &[0x22, 0x2C, 0x01]),
            (70_000, &[0x42, 0x70, 0x11, 0x01, 0x00]),
            (
                i64::MIN,
                &[0x82, 0, 0, 0, 0, 0, 0, 0, 0x80],
            ),
        ];
        for (value, expected) in cases {
            let mut buf = TagBuf::new();
            put_int(&mut buf, value);
            assert_eq!(buf.as_slice(), expected, "value {value}");

            let mut reader = ByteReader::new(&buf);
            match reader.read_shape().unwrap() {
                Shape::Integer(width) => assert_eq!(reader.read_int(width).unwrap(), value),
                other => panic!("expected integer shape, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_string_header_thresholds() {
        let mut buf = TagBuf::new();
        put_string_header(&mut buf, 0).unwrap();
        assert_eq!(buf.as_slice(), &[0x04]);

        buf.clear();
        put_string_header(&mut buf, 255).unwrap();
        assert_eq!(buf.as_slice(), &[0x14, 0xFF]);

        buf.clear();
        put_string_header(&mut buf, 256).unwrap();
        assert_eq!(buf.as_slice(), &[0x24, 0x00, 0x01]);

        buf.clear();
        put_string_header(&mut buf, 65_536).unwrap();
        assert_eq!(buf.as_slice(), &[0x34, 0x00, 0x00, 0x01, 0x00]);
    }

    #[test]
    fn test_reals_and_chars() {
        let mut buf = TagBuf::new();
        put_f32(&mut buf, 1.5);
        put_f64(&mut buf, -2.25);
        put_char(&mut buf, 0x00E9);
        assert_eq!(buf[0], 0x05);
        assert_eq!(buf[5], 0x15);
        assert_eq!(buf[14], 0x03);

        let mut reader = ByteReader::new(&buf);
        assert_eq!(reader.read_shape().unwrap(), Shape::Real(Precision::Single));
        assert_eq!(reader.read_f32().unwrap(), 1.5);
        assert_eq!(reader.read_shape().unwrap(), Shape::Real(Precision::Double));
        assert_eq!(reader.read_f64().unwrap(), -2.25);
        assert_eq!(reader.read_shape().unwrap(), Shape::Char);
        assert_eq!(reader.read_u16().unwrap(), 0x00E9);
        assert_eq!(reader.remaining(), 0);
    }

    #[test]
    fn test_reader_eof() {
        let mut reader = ByteReader::new(&[0x01]);
        match reader.read_u16() {
            Err(SharkError::UnexpectedEof) => {}
            other => panic!("expected UnexpectedEof, got {other:?}"),
        }
        // A failed read consumes nothing
        assert_eq!(reader.position(), 0);
    }

    #[test]
    fn test_read_utf8_rejects_invalid() {
        let mut reader = ByteReader::new(&[0xC3, 0x28]);
        match reader.read_utf8(2, "string") {
            Err(SharkError::InvalidUtf8("string")) => {}
            other => panic!("expected InvalidUtf8, got {other:?}"),
        }
    }
}
