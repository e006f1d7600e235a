//! Writer producing streams in the subset the decoder understands
//!
//! Handles are assigned in the same order the decoder assigns them, and
//! repeated class descriptors and equal strings are written as back-references.

use std::collections::HashMap;

use crate::decoder::{
    BASE_HANDLE, TC_ARRAY, TC_CLASS, TC_CLASSDESC, TC_ENDBLOCKDATA, TC_NULL, TC_OBJECT,
    TC_REFERENCE, TC_STRING,
};
use crate::error::{DescriptorError, Result};
use crate::mutf8;
use crate::value::{ClassDesc, FieldType, Value};

/// Stream magic and version written ahead of the content
pub const STREAM_HEADER: [u8; 4] = [0xAC, 0xED, 0x00, 0x05];

pub struct DescriptorWriter {
    buffer: Vec<u8>,
    next_handle: u32,
    strings: HashMap<String, u32>,
    classes: HashMap<String, u32>,
}

impl Default for DescriptorWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl DescriptorWriter {
    pub fn new() -> Self {
        DescriptorWriter {
            buffer: STREAM_HEADER.to_vec(),
            next_handle: 0,
            strings: HashMap::new(),
            classes: HashMap::new(),
        }
    }

    /// Encode a single value as a complete stream
    pub fn encode(value: &Value) -> Result<Vec<u8>> {
        let mut writer = Self::new();
        writer.write(value)?;
        Ok(writer.into_bytes())
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buffer
    }

    /// Write one content unit
    pub fn write(&mut self, value: &Value) -> Result<()> {
        match value {
            Value::Null => {
                self.buffer.push(TC_NULL);
                Ok(())
            }
            Value::String(s) => self.write_string(s),
            Value::Class(class) => {
                self.buffer.push(TC_CLASS);
                self.write_class_desc(class)?;
                self.register();
                Ok(())
            }
            Value::Object(object) => {
                self.buffer.push(TC_OBJECT);
                self.write_class_desc(&object.class)?;
                self.register();

                let declared: Vec<_> = object
                    .class
                    .hierarchy()
                    .iter()
                    .flat_map(|level| level.fields.clone())
                    .collect();
                if declared.len() != object.fields.len() {
                    return Err(self.mismatch(format!(
                        "{} field value(s) for {}",
                        declared.len(),
                        object.class.name
                    )));
                }
                for (field, (name, value)) in declared.iter().zip(&object.fields) {
                    if field.name != *name {
                        return Err(self.mismatch(format!("field `{}`", field.name)));
                    }
                    self.write_field_value(field.field_type, value)?;
                }
                Ok(())
            }
            Value::Array(array) => {
                let element_type = array
                    .class
                    .array_element_type()
                    .ok_or_else(|| self.mismatch("array class"))?;
                self.buffer.push(TC_ARRAY);
                self.write_class_desc(&array.class)?;
                self.buffer.extend((array.elements.len() as i32).to_be_bytes());
                self.register();
                for element in &array.elements {
                    self.write_field_value(element_type, element)?;
                }
                Ok(())
            }
            primitive => Err(self.mismatch(format!(
                "content unit, not a bare {}",
                primitive.kind()
            ))),
        }
    }

    fn write_string(&mut self, s: &str) -> Result<()> {
        if let Some(handle) = self.strings.get(s) {
            self.buffer.push(TC_REFERENCE);
            self.buffer.extend(handle.to_be_bytes());
            return Ok(());
        }
        self.buffer.push(TC_STRING);
        self.write_utf(s)?;
        let handle = self.register();
        self.strings.insert(s.to_string(), handle);
        Ok(())
    }

    fn write_class_desc(&mut self, class: &ClassDesc) -> Result<()> {
        if let Some(handle) = self.classes.get(&class.name) {
            self.buffer.push(TC_REFERENCE);
            self.buffer.extend(handle.to_be_bytes());
            return Ok(());
        }

        self.buffer.push(TC_CLASSDESC);
        self.write_utf(&class.name)?;
        self.buffer.extend(class.serial_version_uid.to_be_bytes());
        self.buffer.push(class.flags.bits());
        let handle = self.register();
        self.classes.insert(class.name.clone(), handle);

        self.buffer.extend((class.fields.len() as u16).to_be_bytes());
        for field in &class.fields {
            self.buffer.push(field.field_type.code());
            self.write_utf(&field.name)?;
            if !field.field_type.is_primitive() {
                let signature = field
                    .class_name
                    .as_deref()
                    .ok_or_else(|| self.mismatch(format!("type signature for `{}`", field.name)))?;
                self.write_string(signature)?;
            }
        }
        self.buffer.push(TC_ENDBLOCKDATA);

        match &class.super_class {
            Some(super_class) => self.write_class_desc(super_class),
            None => {
                self.buffer.push(TC_NULL);
                Ok(())
            }
        }
    }

    fn write_field_value(&mut self, field_type: FieldType, value: &Value) -> Result<()> {
        match (field_type, value) {
            (FieldType::Boolean, Value::Boolean(b)) => self.buffer.push(u8::from(*b)),
            (FieldType::Byte, Value::Byte(b)) => self.buffer.push(*b as u8),
            (FieldType::Char, Value::Char(c)) => self.buffer.extend(c.to_be_bytes()),
            (FieldType::Short, Value::Short(s)) => self.buffer.extend(s.to_be_bytes()),
            (FieldType::Int, Value::Int(i)) => self.buffer.extend(i.to_be_bytes()),
            (FieldType::Long, Value::Long(l)) => self.buffer.extend(l.to_be_bytes()),
            (FieldType::Float, Value::Float(x)) => self.buffer.extend(x.to_bits().to_be_bytes()),
            (FieldType::Double, Value::Double(x)) => self.buffer.extend(x.to_bits().to_be_bytes()),
            (FieldType::Object | FieldType::Array, nested) if !is_primitive(nested) => {
                return self.write(nested);
            }
            (expected, found) => {
                return Err(self.mismatch(format!(
                    "{:?} value, found {}",
                    expected,
                    found.kind()
                )))
            }
        }
        Ok(())
    }

    fn write_utf(&mut self, s: &str) -> Result<()> {
        let bytes = mutf8::encode(s);
        let len = u16::try_from(bytes.len())
            .map_err(|_| self.mismatch("string shorter than 65536 encoded bytes"))?;
        self.buffer.extend(len.to_be_bytes());
        self.buffer.extend(bytes);
        Ok(())
    }

    fn register(&mut self) -> u32 {
        let handle = BASE_HANDLE + self.next_handle;
        self.next_handle += 1;
        handle
    }

    fn mismatch(&self, expected: impl Into<String>) -> DescriptorError {
        DescriptorError::unexpected(expected, self.buffer.len())
    }
}

fn is_primitive(value: &Value) -> bool {
    !matches!(
        value,
        Value::Null | Value::String(_) | Value::Object(_) | Value::Array(_) | Value::Class(_)
    )
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use super::*;
    use crate::decoder::Decoder;
    use crate::value::{Array, FieldDesc, Object};

    fn person() -> Value {
        let class = Rc::new(ClassDesc::new(
            "Person",
            7,
            vec![
                FieldDesc::primitive(FieldType::Int, "age"),
                FieldDesc::reference(FieldType::Object, "first", "Ljava/lang/String;"),
                FieldDesc::reference(FieldType::Object, "last", "Ljava/lang/String;"),
            ],
        ));
        Value::Object(Rc::new(Object {
            class,
            fields: vec![
                ("age".into(), Value::Int(41)),
                ("first".into(), Value::string("Ada")),
                ("last".into(), Value::string("Ada")),
            ],
        }))
    }

    #[test]
    fn test_written_object_decodes_back() {
        let bytes = DescriptorWriter::encode(&person()).unwrap();
        assert_eq!(&bytes[..4], &STREAM_HEADER);
        assert_eq!(Decoder::decode(&bytes).unwrap(), person());
    }

    #[test]
    fn test_equal_strings_are_back_referenced() {
        let bytes = DescriptorWriter::encode(&person()).unwrap();
        let references = bytes.iter().filter(|b| **b == TC_REFERENCE).count();
        // the second field signature and the second "Ada"
        assert_eq!(references, 2);
    }

    #[test]
    fn test_repeated_class_is_written_once() {
        let class = Rc::new(ClassDesc::new("[Ljava.lang.Object;", 0, vec![]));
        let inner = Value::Array(Rc::new(Array {
            class: Rc::clone(&class),
            elements: vec![],
        }));
        let outer = Value::Array(Rc::new(Array {
            class,
            elements: vec![inner.clone(), Value::Null],
        }));

        let bytes = DescriptorWriter::encode(&outer).unwrap();
        let class_descs = bytes.iter().filter(|b| **b == TC_CLASSDESC).count();
        assert_eq!(class_descs, 1);
        assert_eq!(Decoder::decode(&bytes).unwrap(), outer);
    }

    #[test]
    fn test_rejects_mismatched_field_value() {
        let class = Rc::new(ClassDesc::new(
            "Counter",
            0,
            vec![FieldDesc::primitive(FieldType::Int, "count")],
        ));
        let value = Value::Object(Rc::new(Object {
            class,
            fields: vec![("count".into(), Value::string("three"))],
        }));

        assert!(matches!(
            DescriptorWriter::encode(&value).unwrap_err(),
            DescriptorError::UnexpectedContent { .. }
        ));
    }

    #[test]
    fn test_rejects_bare_primitive() {
        assert!(DescriptorWriter::encode(&Value::Int(3)).is_err());
    }
}
