//! WhiteShark Format - Core primitives for the WhiteShark object-graph codec
//!
//! This crate provides the fundamental encoding/decoding utilities for the
//! WhiteShark wire format with no I/O dependencies. It includes:
//!
//! - Magic numbers and constants
//! - The 12-byte stream header
//! - The tag byte codec
//! - Primitive encoders and a bounds-checked reader
//! - Error types
//! - Security limits

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod constants;
pub mod error;
pub mod header;
pub mod limits;
pub mod primitives;
pub mod tag;

// Re-export commonly used types
pub use error::{Result, SharkError};
pub use header::{Identifier, StreamHeader, StreamOptions};
pub use limits::Limits;
pub use primitives::{ByteReader, TagBuf};
pub use tag::{DataType, IntWidth, LengthClass, Precision, Shape};
