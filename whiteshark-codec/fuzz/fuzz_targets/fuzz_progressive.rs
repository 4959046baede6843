#![no_main]

use libfuzzer_sys::fuzz_target;
use whiteshark_codec::{deserialize_slice, Catalog, ProgressiveDecoder, TypeSchema};

fuzz_target!(|input: (u8, &[u8])| {
    let (chunk, data) = input;
    let mut catalog = Catalog::new();
    let _ = catalog.register(TypeSchema::new("a").field("a").as_map().as_collection());

    let mut bytes = b"WSFIFUZZ\x01\x00\x00\x00".to_vec();
    bytes.extend_from_slice(data);

    let mut decoder = ProgressiveDecoder::new("FUZZ", &catalog);
    let mut progressive = None;
    for piece in bytes.chunks(usize::from(chunk.max(1))) {
        match decoder.update(piece) {
            Ok(progress) => {
                if let Some(value) = progress.into_value() {
                    progressive = Some(Ok(value));
                    break;
                }
            }
            Err(err) => {
                progressive = Some(Err(err));
                break;
            }
        }
    }
    let progressive = progressive.unwrap_or_else(|| decoder.finalize(&[]));

    // Both decoders must reach the same verdict
    match (deserialize_slice("FUZZ", &bytes, &catalog), progressive) {
        (Ok(a), Ok(b)) => assert_eq!(a, b),
        (Err(_), Err(_)) => {}
        (a, b) => panic!("decoders disagree: {a:?} vs {b:?}"),
    }
});
