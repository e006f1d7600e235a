//! Error types for the assertion algebra
//!
//! These are precondition violations, not assertion failures: they come back
//! as `Err` from derivations that cannot produce a value at all.

use bspec_descriptor::DescriptorError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, AssertError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AssertError {
    #[error("{operation}() called on an empty {container}")]
    EmptyContainer {
        container: &'static str,
        operation: &'static str,
    },

    #[error("index {index} is out of bounds for a list of size {size}")]
    IndexOutOfBounds { index: usize, size: usize },

    #[error("no value for key {key}")]
    MissingKey { key: String },

    #[error("cannot name accessor")]
    Descriptor(#[from] DescriptorError),
}

impl AssertError {
    pub fn empty(container: &'static str, operation: &'static str) -> Self {
        AssertError::EmptyContainer {
            container,
            operation,
        }
    }

    pub fn out_of_bounds(index: usize, size: usize) -> Self {
        AssertError::IndexOutOfBounds { index, size }
    }

    pub fn missing_key(key: impl std::fmt::Debug) -> Self {
        AssertError::MissingKey {
            key: format!("{:?}", key),
        }
    }

    pub fn is_empty_container(&self) -> bool {
        matches!(self, AssertError::EmptyContainer { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(
            AssertError::empty("ordered set", "first").to_string(),
            "first() called on an empty ordered set"
        );
        assert_eq!(
            AssertError::out_of_bounds(3, 1).to_string(),
            "index 3 is out of bounds for a list of size 1"
        );
        assert_eq!(AssertError::missing_key("a").to_string(), "no value for key \"a\"");
    }

    #[test]
    fn test_descriptor_errors_convert() {
        let error: AssertError = DescriptorError::missing_field("implMethodName").into();
        assert!(matches!(error, AssertError::Descriptor(_)));
        assert_eq!(error.to_string(), "cannot name accessor");
        assert_eq!(
            std::error::Error::source(&error).map(ToString::to_string),
            Some("malformed descriptor: missing string field `implMethodName`".to_string())
        );
        assert!(!error.is_empty_container());
    }
}
