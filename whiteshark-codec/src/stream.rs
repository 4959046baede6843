//! Reader-driven progressive decoding

use std::io::{ErrorKind, Read};

use tracing::trace;
use whiteshark_format::{Identifier, Result, SharkError};

use crate::options::DecodeOptions;
use crate::progressive::{Progress, ProgressiveDecoder};
use crate::types::Collaborators;
use crate::value::Value;

/// Default chunk size used by [`decode_reader`] callers that have no preference
pub const DEFAULT_CHUNK_SIZE: usize = 8 * 1024;

/// Feed `reader` to a progressive decoder `chunk_size` bytes at a time
///
/// Stops reading as soon as the value is complete. Reaching end of input
/// first fails with [`SharkError::IncompleteStream`].
pub fn decode_reader<R, C>(
    identifier: impl Into<Identifier>,
    mut reader: R,
    chunk_size: usize,
    collaborators: &C,
    options: DecodeOptions,
) -> Result<Value>
where
    R: Read,
    C: Collaborators + ?Sized,
{
    if chunk_size == 0 {
        return Err(SharkError::InvalidState(
            "chunk size must be non-zero".to_string(),
        ));
    }

    let mut decoder = ProgressiveDecoder::with_options(identifier, collaborators, options);
    let mut chunk = vec![0u8; chunk_size];
    loop {
        let read = match reader.read(&mut chunk) {
            Ok(0) => return decoder.finalize(&[]),
            Ok(n) => n,
            Err(err) if err.kind() == ErrorKind::Interrupted => continue,
            Err(err) => return Err(err.into()),
        };
        trace!(read, "chunk read");
        if let Progress::Complete(value) = decoder.update(&chunk[..read])? {
            return Ok(value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;

    #[test]
    fn test_small_chunks() {
        let catalog = Catalog::new();
        let bytes = b"WSFITEST\x01\x00\x00\x00\x14\x05hello".to_vec();
        for chunk_size in [1, 2, 7, DEFAULT_CHUNK_SIZE] {
            let value = decode_reader(
                "TEST",
                std::io::Cursor::new(&bytes),
                chunk_size,
                &catalog,
                DecodeOptions::default(),
            )
            .unwrap();
            assert_eq!(value, Value::from("hello"));
        }
    }

    #[test]
    fn test_truncated_reader() {
        let catalog = Catalog::new();
        let bytes = b"WSFITEST\x01\x00\x00\x00\x14\x05hel".to_vec();
        match decode_reader(
            "TEST",
            std::io::Cursor::new(bytes),
            4,
            &catalog,
            DecodeOptions::default(),
        ) {
            Err(SharkError::IncompleteStream { buffered: 5, .. }) => {}
            other => panic!("expected IncompleteStream, got {other:?}"),
        }
    }

    #[test]
    fn test_zero_chunk_size() {
        let catalog = Catalog::new();
        assert!(decode_reader(
            "TEST",
            std::io::empty(),
            0,
            &catalog,
            DecodeOptions::default()
        )
        .is_err());
    }
}
