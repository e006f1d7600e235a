//! Descriptor error types

use thiserror::Error;

pub type Result<T> = std::result::Result<T, DescriptorError>;

/// Every way a descriptor stream can be rejected.
///
/// All variants are flavours of a malformed descriptor: decoding stops at the
/// first one and no partial value is returned.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DescriptorError {
    #[error("malformed descriptor: truncated at offset {offset}, needed {needed} more byte(s)")]
    Truncated { offset: usize, needed: usize },

    #[error("malformed descriptor: unsupported tag 0x{tag:02x} at offset {offset}")]
    UnsupportedTag { tag: u8, offset: usize },

    #[error("malformed descriptor: expected end-of-block marker at offset {offset}, found 0x{found:02x}")]
    MissingEndBlock { offset: usize, found: u8 },

    #[error("malformed descriptor: handle 0x{handle:x} at offset {offset} does not name a decoded value")]
    DanglingHandle { handle: u32, offset: usize },

    #[error("malformed descriptor: invalid modified UTF-8 at offset {offset}")]
    InvalidModifiedUtf8 { offset: usize },

    #[error("malformed descriptor: expected {expected} at offset {offset}")]
    UnexpectedContent { expected: String, offset: usize },

    #[error("malformed descriptor: class {class} uses unsupported flags {flags:#04x}")]
    UnsupportedClass { class: String, flags: u8 },

    #[error("malformed descriptor: missing string field `{field}`")]
    MissingField { field: String },
}

impl DescriptorError {
    pub fn truncated(offset: usize, needed: usize) -> Self {
        Self::Truncated { offset, needed }
    }

    pub fn unsupported_tag(tag: u8, offset: usize) -> Self {
        Self::UnsupportedTag { tag, offset }
    }

    pub fn unexpected(expected: impl Into<String>, offset: usize) -> Self {
        Self::UnexpectedContent {
            expected: expected.into(),
            offset,
        }
    }

    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingField {
            field: field.into(),
        }
    }

    /// Byte offset the decoder had reached, when known
    pub fn offset(&self) -> Option<usize> {
        match self {
            Self::Truncated { offset, .. }
            | Self::UnsupportedTag { offset, .. }
            | Self::MissingEndBlock { offset, .. }
            | Self::DanglingHandle { offset, .. }
            | Self::InvalidModifiedUtf8 { offset }
            | Self::UnexpectedContent { offset, .. } => Some(*offset),
            Self::UnsupportedClass { .. } | Self::MissingField { .. } => None,
        }
    }
}
