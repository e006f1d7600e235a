//! Closure descriptors: the decoded form of one serialized closure object

use std::rc::Rc;

use crate::decoder::Decoder;
use crate::error::{DescriptorError, Result};
use crate::value::{Array, ClassDesc, ClassFlags, FieldDesc, FieldType, Object, Value};
use crate::writer::DescriptorWriter;

pub const IMPL_METHOD_NAME: &str = "implMethodName";
pub const IMPL_METHOD_SIGNATURE: &str = "implMethodSignature";

/// Class name serialized closures are written under
pub const SERIALIZED_CLOSURE_CLASS: &str = "java.lang.invoke.SerializedLambda";
const SERIALIZED_CLOSURE_UID: i64 = 8_025_925_345_765_570_181;

/// Field map recovered from one encoded closure
#[derive(Debug, Clone, PartialEq)]
pub struct ClosureDescriptor {
    object: Rc<Object>,
}

impl ClosureDescriptor {
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        match Decoder::decode(bytes)? {
            Value::Object(object) => Ok(Self { object }),
            other => Err(DescriptorError::unexpected(
                format!("a closure object, found {}", other.kind()),
                0,
            )),
        }
    }

    pub fn builder(impl_method_name: impl Into<String>) -> ClosureDescriptorBuilder {
        ClosureDescriptorBuilder::new(impl_method_name)
    }

    pub fn class_name(&self) -> &str {
        &self.object.class.name
    }

    pub fn impl_method_name(&self) -> Result<&str> {
        self.string_field(IMPL_METHOD_NAME)
    }

    pub fn impl_method_signature(&self) -> Result<&str> {
        self.string_field(IMPL_METHOD_SIGNATURE)
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.object.get(field)
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.object
            .fields
            .iter()
            .map(|(name, value)| (name.as_str(), value))
    }

    fn string_field(&self, field: &str) -> Result<&str> {
        self.object
            .get(field)
            .and_then(Value::as_str)
            .ok_or_else(|| DescriptorError::missing_field(field))
    }
}

/// Builds a serialized-closure-shaped stream.
///
/// Field layout follows the serialized closure class: the one primitive
/// field first, then the object fields in name order.
#[derive(Debug, Clone)]
pub struct ClosureDescriptorBuilder {
    capturing_class: String,
    functional_interface_class: String,
    functional_interface_method_name: String,
    functional_interface_method_signature: String,
    impl_class: String,
    impl_method_name: String,
    impl_method_signature: String,
    impl_method_kind: i32,
    instantiated_method_type: String,
}

impl ClosureDescriptorBuilder {
    pub fn new(impl_method_name: impl Into<String>) -> Self {
        Self {
            capturing_class: "Spec".to_string(),
            functional_interface_class: "Accessor".to_string(),
            functional_interface_method_name: "apply".to_string(),
            functional_interface_method_signature: "(Ljava/lang/Object;)Ljava/lang/Object;"
                .to_string(),
            impl_class: "Subject".to_string(),
            impl_method_name: impl_method_name.into(),
            impl_method_signature: "()".to_string(),
            // invokevirtual
            impl_method_kind: 5,
            instantiated_method_type: "(Ljava/lang/Object;)Ljava/lang/Object;".to_string(),
        }
    }

    pub fn signature(mut self, signature: impl Into<String>) -> Self {
        self.impl_method_signature = signature.into();
        self
    }

    pub fn impl_class(mut self, class: impl Into<String>) -> Self {
        self.impl_class = class.into();
        self
    }

    pub fn capturing_class(mut self, class: impl Into<String>) -> Self {
        self.capturing_class = class.into();
        self
    }

    pub fn build(&self) -> Value {
        let string = "Ljava/lang/String;";
        let class = Rc::new(ClassDesc::new(
            SERIALIZED_CLOSURE_CLASS,
            SERIALIZED_CLOSURE_UID,
            vec![
                FieldDesc::primitive(FieldType::Int, "implMethodKind"),
                FieldDesc::reference(FieldType::Array, "capturedArgs", "[Ljava/lang/Object;"),
                FieldDesc::reference(FieldType::Object, "capturingClass", "Ljava/lang/Class;"),
                FieldDesc::reference(FieldType::Object, "functionalInterfaceClass", string),
                FieldDesc::reference(FieldType::Object, "functionalInterfaceMethodName", string),
                FieldDesc::reference(FieldType::Object, "functionalInterfaceMethodSignature", string),
                FieldDesc::reference(FieldType::Object, "implClass", string),
                FieldDesc::reference(FieldType::Object, IMPL_METHOD_NAME, string),
                FieldDesc::reference(FieldType::Object, IMPL_METHOD_SIGNATURE, string),
                FieldDesc::reference(FieldType::Object, "instantiatedMethodType", string),
            ],
        ));
        let captured_args = Value::Array(Rc::new(Array {
            class: Rc::new(ClassDesc::new("[Ljava.lang.Object;", 0, vec![])),
            elements: vec![],
        }));
        let mut capturing_class = ClassDesc::new(self.capturing_class.as_str(), 0, vec![]);
        capturing_class.flags = ClassFlags::empty();

        Value::Object(Rc::new(Object {
            class,
            fields: vec![
                ("implMethodKind".into(), Value::Int(self.impl_method_kind)),
                ("capturedArgs".into(), captured_args),
                ("capturingClass".into(), Value::Class(Rc::new(capturing_class))),
                (
                    "functionalInterfaceClass".into(),
                    Value::string(&self.functional_interface_class),
                ),
                (
                    "functionalInterfaceMethodName".into(),
                    Value::string(&self.functional_interface_method_name),
                ),
                (
                    "functionalInterfaceMethodSignature".into(),
                    Value::string(&self.functional_interface_method_signature),
                ),
                ("implClass".into(), Value::string(&self.impl_class)),
                (IMPL_METHOD_NAME.into(), Value::string(&self.impl_method_name)),
                (IMPL_METHOD_SIGNATURE.into(), Value::string(&self.impl_method_signature)),
                (
                    "instantiatedMethodType".into(),
                    Value::string(&self.instantiated_method_type),
                ),
            ],
        }))
    }

    pub fn encode(&self) -> Result<Vec<u8>> {
        DescriptorWriter::encode(&self.build())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encoded_closure_exposes_method_name_and_signature() {
        let bytes = ClosureDescriptor::builder("size").encode().unwrap();
        let descriptor = ClosureDescriptor::from_bytes(&bytes).unwrap();

        assert_eq!(descriptor.class_name(), SERIALIZED_CLOSURE_CLASS);
        assert_eq!(descriptor.impl_method_name().unwrap(), "size");
        assert_eq!(descriptor.impl_method_signature().unwrap(), "()");
        assert_eq!(descriptor.get("implMethodKind"), Some(&Value::Int(5)));
    }

    #[test]
    fn test_fields_keep_declared_order() {
        let bytes = ClosureDescriptor::builder("name")
            .signature("()Ljava/lang/String;")
            .impl_class("Person")
            .encode()
            .unwrap();
        let descriptor = ClosureDescriptor::from_bytes(&bytes).unwrap();

        let names: Vec<_> = descriptor.fields().map(|(name, _)| name).collect();
        assert_eq!(names.first(), Some(&"implMethodKind"));
        assert_eq!(names.last(), Some(&"instantiatedMethodType"));
        assert_eq!(names.len(), 10);
        assert_eq!(descriptor.get("implClass").and_then(Value::as_str), Some("Person"));
        assert_eq!(descriptor.impl_method_signature().unwrap(), "()Ljava/lang/String;");
    }

    #[test]
    fn test_non_object_stream_is_rejected() {
        let bytes = DescriptorWriter::encode(&Value::string("size")).unwrap();
        assert!(ClosureDescriptor::from_bytes(&bytes).is_err());
    }

    #[test]
    fn test_missing_method_name() {
        let class = Rc::new(ClassDesc::new("Other", 0, vec![]));
        let bytes = DescriptorWriter::encode(&Value::Object(Rc::new(Object {
            class,
            fields: vec![],
        })))
        .unwrap();

        let descriptor = ClosureDescriptor::from_bytes(&bytes).unwrap();
        assert_eq!(
            descriptor.impl_method_name().unwrap_err(),
            DescriptorError::missing_field(IMPL_METHOD_NAME)
        );
    }
}
