//! Property-based tests for WhiteShark format primitives

use proptest::prelude::*;
use whiteshark_format::primitives::{put_int, put_length, put_string_header};
use whiteshark_format::{ByteReader, Identifier, LengthClass, Shape, TagBuf};

proptest! {
    #[test]
    fn int_roundtrip_property(value in any::<i64>()) {
        let mut buf = TagBuf::new();
        put_int(&mut buf, value);

        let mut reader = ByteReader::new(&buf);
        let width = match reader.read_shape().expect("Failed to decode tag") {
            Shape::Integer(width) => width,
            other => return Err(TestCaseError::fail(format!("unexpected shape {other:?}"))),
        };
        prop_assert_eq!(reader.read_int(width).expect("Failed to decode int"), value);
        prop_assert_eq!(reader.remaining(), 0);
    }

    #[test]
    fn int_encoding_size_property(value in any::<i64>()) {
        let mut buf = TagBuf::new();
        put_int(&mut buf, value);

        // Tag byte plus the smallest width that holds the value
        if i8::try_from(value).is_ok() {
            prop_assert_eq!(buf.len(), 2);
        } else if i16::try_from(value).is_ok() {
            prop_assert_eq!(buf.len(), 3);
        } else if i32::try_from(value).is_ok() {
            prop_assert_eq!(buf.len(), 5);
        } else {
            prop_assert_eq!(buf.len(), 9);
        }
    }

    #[test]
    fn length_prefix_roundtrip_property(len in 0usize..=u32::MAX as usize) {
        let class = LengthClass::for_len(len).expect("length fits u32");
        let mut buf = TagBuf::new();
        put_length(&mut buf, class, len);
        prop_assert_eq!(buf.len(), class.byte_len());

        let mut reader = ByteReader::new(&buf);
        prop_assert_eq!(reader.read_length(class).expect("Failed to decode length"), len);
    }

    #[test]
    fn string_header_roundtrip_property(len in 0usize..200_000) {
        let mut buf = TagBuf::new();
        put_string_header(&mut buf, len).expect("Failed to encode string header");

        let mut reader = ByteReader::new(&buf);
        match reader.read_shape().expect("Failed to decode tag") {
            Shape::String(class) => {
                prop_assert_eq!(reader.read_length(class).expect("length"), len);
            }
            other => return Err(TestCaseError::fail(format!("unexpected shape {other:?}"))),
        }
    }

    #[test]
    fn tag_byte_decoding_is_total(byte in any::<u8>()) {
        // Every byte either decodes to a shape that re-encodes losslessly in
        // meaning, or is rejected; it never panics.
        if let Ok(shape) = Shape::from_byte(byte) {
            let reencoded = Shape::from_byte(shape.to_byte()).expect("canonical tag decodes");
            prop_assert_eq!(reencoded, shape);
        }
    }

    #[test]
    fn identifier_is_always_four_ascii_bytes(raw in ".{0,12}") {
        let identifier = Identifier::new(&raw);
        prop_assert_eq!(identifier.as_bytes().len(), 4);
        prop_assert!(identifier
            .as_bytes()
            .iter()
            .all(|b| b.is_ascii_alphanumeric() || *b == b' '));
    }
}
