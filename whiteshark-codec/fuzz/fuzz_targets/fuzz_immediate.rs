#![no_main]

use libfuzzer_sys::fuzz_target;
use whiteshark_codec::{Catalog, DecodeOptions, ImmediateDecoder, TypeSchema};
use whiteshark_format::Limits;

fuzz_target!(|data: &[u8]| {
    let mut catalog = Catalog::new();
    let _ = catalog.register(TypeSchema::new("a").field("a").as_map().as_collection());

    let options = DecodeOptions {
        limits: Limits {
            max_depth: 64,
            max_container_len: 1 << 16,
            max_string_len: 1 << 16,
            ..Limits::default()
        },
    };

    // Fuzz input is the body; the header is fixed so the decoder gets past it
    let mut bytes = b"WSFIFUZZ\x01\x00\x00\x00".to_vec();
    bytes.extend_from_slice(data);
    let _ = ImmediateDecoder::new("FUZZ", &catalog)
        .with_options(options)
        .decode_slice(&bytes);
});
