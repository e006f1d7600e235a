//! Decoder for the tagged, back-referencing descriptor stream
//!
//! Only the subset needed for closure descriptors is understood: null,
//! back-references, class descriptors, objects, strings, arrays and class
//! values. Anything else is rejected rather than skipped.

use std::rc::Rc;

use tracing::trace;

use crate::error::{DescriptorError, Result};
use crate::mutf8;
use crate::value::{Array, ClassDesc, ClassFlags, FieldDesc, FieldType, Object, Value};

pub const TC_NULL: u8 = 0x70;
pub const TC_REFERENCE: u8 = 0x71;
pub const TC_CLASSDESC: u8 = 0x72;
pub const TC_OBJECT: u8 = 0x73;
pub const TC_STRING: u8 = 0x74;
pub const TC_ARRAY: u8 = 0x75;
pub const TC_CLASS: u8 = 0x76;
pub const TC_BLOCKDATA: u8 = 0x77;
pub const TC_ENDBLOCKDATA: u8 = 0x78;

/// Encoded handles start here; the first registered value is handle `BASE_HANDLE`
pub const BASE_HANDLE: u32 = 0x7e_0000;

/// Length of the stream header (magic + version) skipped before the content
pub const HEADER_LEN: usize = 4;

/// Nested content units allowed before the input is considered hostile
const MAX_DEPTH: usize = 256;

/// A handle-table slot. Objects and class descriptors take their slot before
/// their contents are read, so a slot can be observed while still pending.
#[derive(Debug, Clone)]
enum Slot {
    Pending,
    Ready(Value),
}

/// Stream decoder. One instance decodes one stream.
pub struct Decoder<'b> {
    data: &'b [u8],
    pos: usize,
    handles: Vec<Slot>,
    depth: usize,
}

impl<'b> Decoder<'b> {
    pub fn new(data: &'b [u8]) -> Self {
        Decoder {
            data,
            pos: 0,
            handles: Vec::new(),
            depth: 0,
        }
    }

    /// Decode a whole stream: skip the header and read one content unit
    pub fn decode(data: &'b [u8]) -> Result<Value> {
        let mut decoder = Decoder::new(data);
        decoder.skip_header()?;
        let value = decoder.read_content()?;
        trace!(
            kind = value.kind(),
            handles = decoder.handles.len(),
            consumed = decoder.pos,
            "decoded descriptor stream"
        );
        Ok(value)
    }

    /// Position of the next unread byte
    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn skip_header(&mut self) -> Result<()> {
        self.take(HEADER_LEN).map(|_| ())
    }

    /// Read one tagged content unit
    pub fn read_content(&mut self) -> Result<Value> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(DescriptorError::unexpected("shallower nesting", self.pos));
        }
        let result = self.read_tagged();
        self.depth -= 1;
        result
    }

    fn read_tagged(&mut self) -> Result<Value> {
        let offset = self.pos;
        let tag = self.read_u8()?;
        match tag {
            TC_NULL => Ok(Value::Null),
            TC_REFERENCE => self.read_reference(),
            TC_CLASSDESC => self.read_class_desc_body().map(Value::Class),
            TC_OBJECT => self.read_object(),
            TC_STRING => {
                let string: Rc<str> = Rc::from(self.read_utf()?);
                let value = Value::String(string);
                self.register(value.clone());
                Ok(value)
            }
            TC_ARRAY => self.read_array(),
            TC_CLASS => {
                let class = self.read_class_desc()?;
                let value = Value::Class(class);
                self.register(value.clone());
                Ok(value)
            }
            other => Err(DescriptorError::unsupported_tag(other, offset)),
        }
    }

    fn read_reference(&mut self) -> Result<Value> {
        let offset = self.pos;
        let handle = self.read_u32()?;
        let slot = handle
            .checked_sub(BASE_HANDLE)
            .and_then(|index| self.handles.get(index as usize));
        match slot {
            Some(Slot::Ready(value)) => Ok(value.clone()),
            _ => Err(DescriptorError::DanglingHandle { handle, offset }),
        }
    }

    /// A class descriptor in any of the forms allowed where one is expected
    fn read_class_desc(&mut self) -> Result<Rc<ClassDesc>> {
        let offset = self.pos;
        match self.read_content()? {
            Value::Class(class) => Ok(class),
            _ => Err(DescriptorError::unexpected("class descriptor", offset)),
        }
    }

    /// Superclass slot: a class descriptor or null
    fn read_super_class(&mut self) -> Result<Option<Rc<ClassDesc>>> {
        let offset = self.pos;
        match self.read_content()? {
            Value::Null => Ok(None),
            Value::Class(class) => Ok(Some(class)),
            _ => Err(DescriptorError::unexpected("superclass descriptor or null", offset)),
        }
    }

    fn read_class_desc_body(&mut self) -> Result<Rc<ClassDesc>> {
        let name = self.read_utf()?;
        let serial_version_uid = self.read_i64()?;
        let flags = ClassFlags::from_bits_retain(self.read_u8()?);
        let handle = self.reserve();

        if flags.intersects(ClassFlags::WRITE_METHOD | ClassFlags::EXTERNALIZABLE) {
            return Err(DescriptorError::UnsupportedClass {
                class: name,
                flags: flags.bits(),
            });
        }

        let field_count = self.read_u16()?;
        let mut fields = Vec::with_capacity(field_count as usize);
        for _ in 0..field_count {
            let offset = self.pos;
            let code = self.read_u8()?;
            let field_type = FieldType::from_code(code)
                .ok_or_else(|| DescriptorError::unexpected("field type code", offset))?;
            let field_name = self.read_utf()?;
            let class_name = if field_type.is_primitive() {
                None
            } else {
                let offset = self.pos;
                match self.read_content()? {
                    Value::String(s) => Some(s),
                    _ => return Err(DescriptorError::unexpected("field type signature", offset)),
                }
            };
            fields.push(FieldDesc {
                field_type,
                name: field_name,
                class_name,
            });
        }

        let offset = self.pos;
        let annotation_end = self.read_u8()?;
        if annotation_end != TC_ENDBLOCKDATA {
            return Err(DescriptorError::MissingEndBlock {
                offset,
                found: annotation_end,
            });
        }
        let super_class = self.read_super_class()?;

        let class = Rc::new(ClassDesc {
            name,
            serial_version_uid,
            flags,
            fields,
            super_class,
        });
        trace!(class = %class.name, fields = class.fields.len(), "decoded class descriptor");
        self.fill(handle, Value::Class(Rc::clone(&class)));
        Ok(class)
    }

    fn read_object(&mut self) -> Result<Value> {
        let class = self.read_class_desc()?;
        let handle = self.reserve();

        let mut fields = Vec::new();
        for level in class.hierarchy() {
            for field in &level.fields {
                let value = self.read_field_value(field.field_type)?;
                fields.push((field.name.clone(), value));
            }
        }

        let value = Value::Object(Rc::new(Object { class, fields }));
        self.fill(handle, value.clone());
        Ok(value)
    }

    fn read_array(&mut self) -> Result<Value> {
        let class = self.read_class_desc()?;
        let offset = self.pos;
        let element_type = class
            .array_element_type()
            .ok_or_else(|| DescriptorError::unexpected("array class", offset))?;
        let len = self.read_i32()?;
        if len < 0 {
            return Err(DescriptorError::unexpected("non-negative array length", offset));
        }
        let handle = self.reserve();

        // Every element needs at least one byte, which bounds the allocation.
        let mut elements = Vec::with_capacity((len as usize).min(self.remaining()));
        for _ in 0..len {
            elements.push(self.read_field_value(element_type)?);
        }

        let value = Value::Array(Rc::new(Array { class, elements }));
        self.fill(handle, value.clone());
        Ok(value)
    }

    fn read_field_value(&mut self, field_type: FieldType) -> Result<Value> {
        Ok(match field_type {
            FieldType::Boolean => Value::Boolean(self.read_u8()? != 0),
            FieldType::Byte => Value::Byte(self.read_u8()? as i8),
            FieldType::Char => Value::Char(self.read_u16()?),
            FieldType::Double => Value::Double(f64::from_bits(self.read_i64()? as u64)),
            FieldType::Float => Value::Float(f32::from_bits(self.read_u32()?)),
            FieldType::Int => Value::Int(self.read_i32()?),
            FieldType::Long => Value::Long(self.read_i64()?),
            FieldType::Short => Value::Short(self.read_u16()? as i16),
            FieldType::Array | FieldType::Object => self.read_content()?,
        })
    }

    fn reserve(&mut self) -> usize {
        self.handles.push(Slot::Pending);
        self.handles.len() - 1
    }

    fn fill(&mut self, handle: usize, value: Value) {
        self.handles[handle] = Slot::Ready(value);
    }

    fn register(&mut self, value: Value) {
        self.handles.push(Slot::Ready(value));
    }

    fn read_utf(&mut self) -> Result<String> {
        let len = self.read_u16()? as usize;
        let start = self.pos;
        let bytes = self.take(len)?;
        mutf8::decode(bytes).map_err(|at| DescriptorError::InvalidModifiedUtf8 { offset: start + at })
    }

    fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    fn take(&mut self, len: usize) -> Result<&'b [u8]> {
        if self.remaining() < len {
            return Err(DescriptorError::truncated(self.pos, len - self.remaining()));
        }
        let bytes = &self.data[self.pos..self.pos + len];
        self.pos += len;
        Ok(bytes)
    }

    fn read_u8(&mut self) -> Result<u8> {
        Ok(self.take(1)?[0])
    }

    fn read_u16(&mut self) -> Result<u16> {
        let bytes = self.take(2)?;
        Ok(u16::from_be_bytes([bytes[0], bytes[1]]))
    }

    fn read_u32(&mut self) -> Result<u32> {
        let bytes = self.take(4)?;
        Ok(u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    fn read_i32(&mut self) -> Result<i32> {
        self.read_u32().map(|v| v as i32)
    }

    fn read_i64(&mut self) -> Result<i64> {
        let bytes = self.take(8)?;
        let mut buf = [0u8; 8];
        buf.copy_from_slice(bytes);
        Ok(i64::from_be_bytes(buf))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: [u8; 4] = [0xAC, 0xED, 0x00, 0x05];

    fn stream(body: &[u8]) -> Vec<u8> {
        let mut bytes = HEADER.to_vec();
        bytes.extend_from_slice(body);
        bytes
    }

    fn utf(s: &str) -> Vec<u8> {
        let mut bytes = (s.len() as u16).to_be_bytes().to_vec();
        bytes.extend_from_slice(s.as_bytes());
        bytes
    }

    /// `class Point { int x; String label; }` with no superclass
    fn point_class_desc() -> Vec<u8> {
        let mut bytes = vec![TC_CLASSDESC];
        bytes.extend(utf("Point"));
        bytes.extend(42i64.to_be_bytes());
        bytes.push(ClassFlags::SERIALIZABLE.bits());
        bytes.extend(2u16.to_be_bytes());
        bytes.push(b'I');
        bytes.extend(utf("x"));
        bytes.push(b'L');
        bytes.extend(utf("label"));
        bytes.push(TC_STRING);
        bytes.extend(utf("Ljava/lang/String;"));
        bytes.push(TC_ENDBLOCKDATA);
        bytes.push(TC_NULL);
        bytes
    }

    #[test]
    fn test_decode_null() {
        assert_eq!(Decoder::decode(&stream(&[TC_NULL])).unwrap(), Value::Null);
    }

    #[test]
    fn test_decode_string() {
        let mut body = vec![TC_STRING];
        body.extend(utf("hello"));
        assert_eq!(Decoder::decode(&stream(&body)).unwrap(), Value::string("hello"));
    }

    #[test]
    fn test_decode_object_fields_in_declared_order() {
        let mut body = vec![TC_OBJECT];
        body.extend(point_class_desc());
        body.extend(7i32.to_be_bytes());
        body.push(TC_STRING);
        body.extend(utf("origin"));

        let value = Decoder::decode(&stream(&body)).unwrap();
        let object = value.as_object().expect("object");
        assert_eq!(object.class.name, "Point");
        assert_eq!(object.class.serial_version_uid, 42);
        let names: Vec<_> = object.fields.iter().map(|(name, _)| name.as_str()).collect();
        assert_eq!(names, vec!["x", "label"]);
        assert_eq!(object.get("x"), Some(&Value::Int(7)));
        assert_eq!(object.get("label").and_then(Value::as_str), Some("origin"));
    }

    #[test]
    fn test_back_reference_resolves_registered_string() {
        // handles: 0 = array class, 1 = array, 2 = "dup"
        let mut body = vec![TC_ARRAY];
        body.push(TC_CLASSDESC);
        body.extend(utf("[Ljava.lang.Object;"));
        body.extend(0i64.to_be_bytes());
        body.push(ClassFlags::SERIALIZABLE.bits());
        body.extend(0u16.to_be_bytes());
        body.push(TC_ENDBLOCKDATA);
        body.push(TC_NULL);
        body.extend(2i32.to_be_bytes());
        body.push(TC_STRING);
        body.extend(utf("dup"));
        body.push(TC_REFERENCE);
        body.extend((BASE_HANDLE + 2).to_be_bytes());

        let value = Decoder::decode(&stream(&body)).unwrap();
        match value {
            Value::Array(array) => {
                assert_eq!(array.elements, vec![Value::string("dup"), Value::string("dup")]);
            }
            other => panic!("expected array, got {:?}", other),
        }
    }

    #[test]
    fn test_primitive_array() {
        let mut body = vec![TC_ARRAY, TC_CLASSDESC];
        body.extend(utf("[I"));
        body.extend(0i64.to_be_bytes());
        body.push(ClassFlags::SERIALIZABLE.bits());
        body.extend(0u16.to_be_bytes());
        body.push(TC_ENDBLOCKDATA);
        body.push(TC_NULL);
        body.extend(3i32.to_be_bytes());
        for n in [1i32, -2, 3] {
            body.extend(n.to_be_bytes());
        }

        match Decoder::decode(&stream(&body)).unwrap() {
            Value::Array(array) => {
                assert_eq!(array.elements, vec![Value::Int(1), Value::Int(-2), Value::Int(3)]);
            }
            other => panic!("expected array, got {:?}", other),
        }
    }

    #[test]
    fn test_class_value() {
        let mut body = vec![TC_CLASS];
        body.extend(point_class_desc());
        match Decoder::decode(&stream(&body)).unwrap() {
            Value::Class(class) => assert_eq!(class.name, "Point"),
            other => panic!("expected class, got {:?}", other),
        }
    }

    #[test]
    fn test_unsupported_tag_fails_fast() {
        let err = Decoder::decode(&stream(&[TC_BLOCKDATA, 0x01, 0x00])).unwrap_err();
        assert_eq!(err, DescriptorError::unsupported_tag(TC_BLOCKDATA, 4));
    }

    #[test]
    fn test_missing_end_block_sentinel() {
        let mut body = vec![TC_OBJECT];
        let mut class = point_class_desc();
        let sentinel = class.len() - 2;
        class[sentinel] = 0x00;
        body.extend(class);

        match Decoder::decode(&stream(&body)).unwrap_err() {
            DescriptorError::MissingEndBlock { found, .. } => assert_eq!(found, 0x00),
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_truncated_input() {
        assert!(matches!(
            Decoder::decode(&[0xAC, 0xED]).unwrap_err(),
            DescriptorError::Truncated { offset: 0, needed: 2 }
        ));

        let mut body = vec![TC_STRING];
        body.extend(utf("hello"));
        body.truncate(body.len() - 1);
        assert!(matches!(
            Decoder::decode(&stream(&body)).unwrap_err(),
            DescriptorError::Truncated { .. }
        ));
    }

    #[test]
    fn test_dangling_reference() {
        let mut body = vec![TC_REFERENCE];
        body.extend((BASE_HANDLE + 5).to_be_bytes());
        assert!(matches!(
            Decoder::decode(&stream(&body)).unwrap_err(),
            DescriptorError::DanglingHandle { handle, .. } if handle == BASE_HANDLE + 5
        ));

        let mut below_base = vec![TC_REFERENCE];
        below_base.extend(1u32.to_be_bytes());
        assert!(Decoder::decode(&stream(&below_base)).is_err());
    }

    #[test]
    fn test_object_requires_class_descriptor() {
        let mut body = vec![TC_OBJECT, TC_STRING];
        body.extend(utf("not a class"));
        assert!(matches!(
            Decoder::decode(&stream(&body)).unwrap_err(),
            DescriptorError::UnexpectedContent { .. }
        ));
    }

    #[test]
    fn test_write_method_classes_are_rejected() {
        let mut body = vec![TC_OBJECT];
        let mut class = point_class_desc();
        // flags byte sits after tag, name and serial id
        let flags_at = 1 + 2 + "Point".len() + 8;
        class[flags_at] = (ClassFlags::SERIALIZABLE | ClassFlags::WRITE_METHOD).bits();
        body.extend(class);

        assert!(matches!(
            Decoder::decode(&stream(&body)).unwrap_err(),
            DescriptorError::UnsupportedClass { .. }
        ));
    }

    #[test]
    fn test_deep_nesting_is_rejected() {
        let mut body = Vec::new();
        for _ in 0..(MAX_DEPTH + 1) {
            body.push(TC_ARRAY);
            body.push(TC_CLASSDESC);
            body.extend(utf("[Ljava.lang.Object;"));
            body.extend(0i64.to_be_bytes());
            body.push(ClassFlags::SERIALIZABLE.bits());
            body.extend(0u16.to_be_bytes());
            body.push(TC_ENDBLOCKDATA);
            body.push(TC_NULL);
            body.extend(1i32.to_be_bytes());
        }
        body.push(TC_NULL);

        assert!(Decoder::decode(&stream(&body)).is_err());
    }
}
