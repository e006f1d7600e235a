//! Accessor names for projected assertions

use std::fmt;

use bspec_descriptor::ClosureDescriptor;

use crate::checker::{escape, placeholder_position, PLACEHOLDER};
use crate::error::Result;

/// Method name and signature shown for a value extracted by a projection
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AccessorName {
    method: String,
    signature: String,
}

impl AccessorName {
    pub fn new(method: impl Into<String>, signature: impl Into<String>) -> Self {
        AccessorName {
            method: method.into(),
            signature: signature.into(),
        }
    }

    /// Name the accessor after the implementation method recorded in a
    /// closure descriptor
    pub fn from_descriptor(bytes: &[u8]) -> Result<Self> {
        let descriptor = ClosureDescriptor::from_bytes(bytes)?;
        Ok(AccessorName::new(
            descriptor.impl_method_name()?,
            descriptor.impl_method_signature()?,
        ))
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn signature(&self) -> &str {
        &self.signature
    }

    /// `%s == 3` becomes `%s.len() == 3`
    pub fn apply(&self, template: &str) -> String {
        match placeholder_position(template) {
            Some(at) => {
                let (head, tail) = template.split_at(at + PLACEHOLDER.len());
                format!("{}.{}{}", head, escape(&self.to_string()), tail)
            }
            None => template.to_string(),
        }
    }
}

impl fmt::Display for AccessorName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.method, self.signature)
    }
}

/// `"len"` and `"len()"` both name the method `len` with signature `()`
impl From<&str> for AccessorName {
    fn from(name: &str) -> Self {
        match name.find('(') {
            Some(open) => AccessorName::new(&name[..open], &name[open..]),
            None => AccessorName::new(name, "()"),
        }
    }
}

impl From<String> for AccessorName {
    fn from(name: String) -> Self {
        AccessorName::from(name.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AssertError;
    use bspec_descriptor::ClosureDescriptorBuilder;

    #[test]
    fn test_apply_inserts_accessor_after_placeholder() {
        let name = AccessorName::new("size", "()");
        assert_eq!(name.apply("%s"), "%s.size()");
        assert_eq!(name.apply("%s == 3"), "%s.size() == 3");
        assert_eq!(name.apply("size of %s"), "size of %s.size()");
        assert_eq!(
            name.apply("index of \"%%s\" in %s == 1"),
            "index of \"%%s\" in %s.size() == 1"
        );
    }

    #[test]
    fn test_from_str() {
        assert_eq!(AccessorName::from("len"), AccessorName::new("len", "()"));
        assert_eq!(
            AccessorName::from("get(I)"),
            AccessorName::new("get", "(I)")
        );
        assert_eq!(AccessorName::from("name").to_string(), "name()");
    }

    #[test]
    fn test_from_descriptor() {
        let bytes = ClosureDescriptorBuilder::new("size").encode().unwrap();
        let name = AccessorName::from_descriptor(&bytes).unwrap();
        assert_eq!(name.method(), "size");
        assert_eq!(name.signature(), "()");
        assert_eq!(name.apply("%s"), "%s.size()");
    }

    #[test]
    fn test_malformed_descriptor() {
        let error = AccessorName::from_descriptor(&[0xAC, 0xED, 0x00, 0x05, 0x7B]).unwrap_err();
        assert!(matches!(error, AssertError::Descriptor(_)));
    }
}
