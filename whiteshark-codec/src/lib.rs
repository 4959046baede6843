//! WhiteShark Codec - Serializer and decoders for the WhiteShark format
//!
//! This crate turns value graphs into WhiteShark streams and back:
//!
//! - Value model and record schemas
//! - Collaborator traits plus a static [`Catalog`] implementing them
//! - Session-scoped name/type dictionaries
//! - The serializer
//! - The immediate decoder for fully buffered input
//! - The progressive decoder for input arriving in arbitrary chunks
//! - JSON rendering for inspection
//!
//! ```
//! use whiteshark_codec::{
//!     deserialize_slice, to_vec, Catalog, InstanceBuilder, ProgressiveDecoder, SerializeOptions,
//!     TypeSchema, Value,
//! };
//!
//! let mut catalog = Catalog::new();
//! let person = catalog
//!     .register(TypeSchema::new("Person").field("firstName").field("age"))
//!     .unwrap();
//! let ann = catalog.instantiate(person).unwrap().with("firstName", "Ann").with("age", 30);
//!
//! let bytes = to_vec("TEST", &Value::Record(ann.clone()), &SerializeOptions::default(), &catalog)
//!     .unwrap();
//! assert_eq!(deserialize_slice("TEST", &bytes, &catalog).unwrap(), Value::Record(ann.clone()));
//!
//! let mut decoder = ProgressiveDecoder::new("TEST", &catalog);
//! for byte in &bytes[..bytes.len() - 1] {
//!     assert!(decoder.update(std::slice::from_ref(byte)).unwrap().is_incomplete());
//! }
//! assert_eq!(decoder.finalize(&bytes[bytes.len() - 1..]).unwrap(), Value::Record(ann));
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod catalog;
pub mod container;
pub mod dictionary;
mod element;
pub mod immediate;
pub mod json;
pub mod lookahead;
pub mod options;
pub mod progressive;
pub mod serializer;
pub mod stream;
pub mod types;
pub mod value;

// Re-export commonly used types
pub use whiteshark_format::{Identifier, Limits, Result, SharkError, StreamOptions};

// Re-export our own types
pub use catalog::Catalog;
pub use container::{Append, IndexedWrite, KeyedWrite};
pub use immediate::{deserialize, deserialize_slice, ImmediateDecoder};
pub use json::to_json;
pub use options::{DecodeOptions, SerializeOptions};
pub use progressive::{DecoderState, Progress, ProgressiveDecoder};
pub use serializer::{serialize, to_vec, Serializer};
pub use stream::decode_reader;
pub use types::{
    Collaborators, FieldDescriptor, FieldKind, FieldSchemaProvider, InstanceBuilder, TypeHandle,
    TypeRef, TypeRegistry, TypeSchema,
};
pub use value::{Array, GenericObject, Record, Value};
