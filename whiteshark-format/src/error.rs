//! Error types for the WhiteShark format

use thiserror::Error;

/// WhiteShark error types
///
/// Every variant is terminal for the encode/decode call that produced it.
#[derive(Debug, Error)]
pub enum SharkError {
    /// Stream does not start with the format magic or carries another identifier.
    #[error("Malformed header: {0}")]
    MalformedHeader(String),
    /// Stream version is not supported by this decoder.
    #[error("Unsupported version: {0}")]
    UnsupportedVersion(u16),
    /// A tag byte did not describe the shape expected at this position.
    #[error("Unexpected shape: {0}")]
    UnexpectedShape(String),
    /// A type name could not be resolved by the type registry.
    #[error("Unknown type: {0}")]
    UnknownType(String),
    /// A dictionary back-reference points past the entries added so far.
    #[error("Dictionary index {index} out of range ({len} entries)")]
    DictionaryIndexOutOfRange {
        /// Index found in the stream
        index: usize,
        /// Number of entries in the dictionary
        len: usize,
    },
    /// The progressive decoder was finalized before the value was complete.
    #[error("Incomplete stream: {buffered} bytes buffered, {open_frames} containers open")]
    IncompleteStream {
        /// Bytes held in the accumulator when finalizing
        buffered: usize,
        /// Containers still waiting for children
        open_frames: usize,
    },
    /// A fully buffered stream ended in the middle of an element.
    #[error("Unexpected end of stream")]
    UnexpectedEof,
    /// String or name bytes are not valid UTF-8.
    #[error("Invalid UTF-8 in {0}")]
    InvalidUtf8(&'static str),
    /// A map entry or collection item targets a container without that capability.
    #[error("Type '{type_name}' has no {capability} capability")]
    MissingCapability {
        /// Name of the container type
        type_name: String,
        /// Capability that was required
        capability: &'static str,
    },
    /// A configured security limit was exceeded.
    #[error("Limit exceeded: {0}")]
    LimitExceeded(String),
    /// Catalog registration was rejected.
    #[error("Registration error: {0}")]
    Registration(String),
    /// The decoder was used after completing or failing.
    #[error("Invalid decoder state: {0}")]
    InvalidState(String),
    /// I/O operation failed while reading or writing the stream.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, SharkError>;
