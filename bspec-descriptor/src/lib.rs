//! Closure descriptor decoding for bspec
//!
//! A closure descriptor is a serialized closure object in a tagged,
//! length-prefixed, back-referencing binary stream. The decoder here covers
//! only the part of that format closures use and recovers the field map,
//! in particular the implementation method name and signature that make
//! derived assertion failures readable.
//!
//! ## Stream layout
//!
//! A 4-byte header (magic + version) followed by one content unit. A content
//! unit starts with a tag byte; handles for back-references start at
//! [`decoder::BASE_HANDLE`].

pub mod closure;
pub mod decoder;
pub mod error;
pub mod mutf8;
pub mod value;
pub mod writer;

pub use closure::{ClosureDescriptor, ClosureDescriptorBuilder, IMPL_METHOD_NAME, IMPL_METHOD_SIGNATURE};
pub use decoder::Decoder;
pub use error::{DescriptorError, Result};
pub use value::{Array, ClassDesc, ClassFlags, FieldDesc, FieldType, Object, Value};
pub use writer::DescriptorWriter;

/// Decode a stream into its top-level value
pub fn decode(bytes: &[u8]) -> Result<Value> {
    Decoder::decode(bytes)
}
