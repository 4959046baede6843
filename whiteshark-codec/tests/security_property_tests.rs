//! Security-focused property tests for WhiteShark
//!
//! Arbitrary or hostile bytes must never panic either decoder, never allocate
//! in proportion to declared counts, and both decoders must reach the same
//! verdict on the same input.

use proptest::prelude::*;
use whiteshark_codec::{
    deserialize_slice, lookahead::element_available, Catalog, DecodeOptions, ImmediateDecoder,
    Limits, ProgressiveDecoder, SharkError, TypeSchema, Value,
};

const HEADER: &[u8; 12] = b"WSFIFUZZ\x01\x00\x00\x00";

fn catalog() -> Catalog {
    let mut catalog = Catalog::new();
    catalog
        .register(TypeSchema::new("a").field("a").field("b"))
        .expect("register");
    catalog
        .register(TypeSchema::new("m").field("a").as_map().as_collection())
        .expect("register");
    catalog
}

fn with_header(body: &[u8]) -> Vec<u8> {
    let mut bytes = HEADER.to_vec();
    bytes.extend_from_slice(body);
    bytes
}

fn progressive(bytes: &[u8], chunk: usize, catalog: &Catalog) -> Result<Value, SharkError> {
    let mut decoder = ProgressiveDecoder::new("FUZZ", catalog);
    let mut chunks = bytes.chunks(chunk.max(1)).peekable();
    while let Some(piece) = chunks.next() {
        if chunks.peek().is_none() {
            return decoder.finalize(piece);
        }
        if let Some(value) = decoder.update(piece)?.into_value() {
            return Ok(value);
        }
    }
    decoder.finalize(&[])
}

// Bodies are biased towards container, property and name bytes so that
// decoding reaches nested frames instead of failing on the first tag
proptest! {
    #![proptest_config(ProptestConfig::with_cases(512))]

    #[test]
    fn test_decoders_agree_on_arbitrary_bodies(
        body in prop::collection::vec(
            prop_oneof![
                any::<u8>(),
                Just(0x17u8),
                Just(0x97u8),
                Just(0x16u8),
                Just(0x08u8),
                Just(0x48u8),
                Just(0x12u8),
                Just(0x00u8),
                Just(b'a'),
                Just(b'm'),
            ],
            0..256,
        ),
        chunk in 1usize..16,
    ) {
        let catalog = catalog();
        let bytes = with_header(&body);

        let immediate = deserialize_slice("FUZZ", &bytes, &catalog);
        let progressive = progressive(&bytes, chunk, &catalog);
        match (immediate, progressive) {
            (Ok(a), Ok(b)) => prop_assert_eq!(a, b),
            (Err(_), Err(_)) => {}
            (a, b) => prop_assert!(false, "decoders disagree: {:?} vs {:?}", a, b),
        }
    }

    #[test]
    fn test_arbitrary_headers_never_panic(bytes in prop::collection::vec(any::<u8>(), 0..64)) {
        let catalog = catalog();
        let _ = deserialize_slice("FUZZ", &bytes, &catalog);
        let _ = progressive(&bytes, 3, &catalog);
    }

    #[test]
    fn test_lookahead_never_overruns(
        body in prop::collection::vec(any::<u8>(), 0..64),
        offset in 0usize..80,
    ) {
        let limits = Limits::default();
        if let Ok(true) = element_available(&body, offset, &limits) {
            prop_assert!(offset < body.len());
        }
    }

    #[test]
    fn test_declared_counts_do_not_allocate(count in any::<u32>()) {
        // u32 count with no children behind it
        let mut body = vec![0x36, 0x03, 0x00, b'a', b'n', b'y'];
        body.extend_from_slice(&count.to_le_bytes());
        let catalog = catalog();
        let bytes = with_header(&body);

        match deserialize_slice("FUZZ", &bytes, &catalog) {
            Ok(value) => prop_assert_eq!(count, 0, "decoded {:?}", value),
            Err(SharkError::UnexpectedEof) | Err(SharkError::LimitExceeded(_)) => {}
            Err(other) => prop_assert!(false, "unexpected error {:?}", other),
        }
    }
}

#[test]
fn depth_bomb_is_rejected() {
    // 10_000 nested single-element arrays
    let mut body = Vec::new();
    for _ in 0..10_000 {
        body.extend_from_slice(&[0x16, 0x03, 0x00, b'a', b'n', b'y', 0x01]);
    }
    body.push(0x00);
    let bytes = with_header(&body);
    let catalog = catalog();

    match deserialize_slice("FUZZ", &bytes, &catalog) {
        Err(SharkError::LimitExceeded(msg)) => assert!(msg.contains("depth")),
        other => panic!("expected LimitExceeded, got {other:?}"),
    }
    match progressive(&bytes, 4096, &catalog) {
        Err(SharkError::LimitExceeded(msg)) => assert!(msg.contains("depth")),
        other => panic!("expected LimitExceeded, got {other:?}"),
    }
}

#[test]
fn depth_limit_counts_empty_containers() {
    let mut options = DecodeOptions::default();
    options.limits.max_depth = 2;
    let catalog = catalog();
    // [[[]]]: the innermost array sits at depth 3
    let bytes = with_header(&[
        0x16, 0x03, 0x00, b'a', b'n', b'y', 0x01, 0x56, 0x00, 0x00, 0x01, 0x56, 0x00, 0x00,
        0x00,
    ]);

    let immediate = ImmediateDecoder::new("FUZZ", &catalog)
        .with_options(options.clone())
        .decode_slice(&bytes);
    assert!(matches!(immediate, Err(SharkError::LimitExceeded(_))));

    let mut decoder = ProgressiveDecoder::with_options("FUZZ", &catalog, options);
    assert!(matches!(
        decoder.update(&bytes),
        Err(SharkError::LimitExceeded(_))
    ));
}

#[test]
fn oversized_string_is_rejected_before_buffering() {
    let mut options = DecodeOptions::default();
    options.limits.max_string_len = 16;
    let catalog = catalog();
    // Declares a 1 MiB string but carries none of it
    let bytes = with_header(&[0x34, 0x00, 0x00, 0x10, 0x00]);

    let mut decoder = ProgressiveDecoder::with_options("FUZZ", &catalog, options);
    match decoder.update(&bytes) {
        Err(SharkError::LimitExceeded(_)) => {}
        other => panic!("expected LimitExceeded, got {other:?}"),
    }
}

#[test]
fn chained_properties_are_rejected() {
    let catalog = catalog();
    let mut body = vec![0x97, 0x01];
    for _ in 0..1000 {
        body.extend_from_slice(&[0x08, 0x01, b'p']);
    }
    body.push(0x00);
    let bytes = with_header(&body);

    assert!(matches!(
        deserialize_slice("FUZZ", &bytes, &catalog),
        Err(SharkError::UnexpectedShape(_))
    ));
    assert!(matches!(
        progressive(&bytes, bytes.len(), &catalog),
        Err(SharkError::UnexpectedShape(_))
    ));
}
