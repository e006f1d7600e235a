//! Values materialized from a descriptor stream

use std::fmt;
use std::rc::Rc;

bitflags::bitflags! {
    /// Flags byte carried by every class descriptor
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ClassFlags: u8 {
        const WRITE_METHOD = 0x01;    // class writes custom data after its fields
        const SERIALIZABLE = 0x02;
        const EXTERNALIZABLE = 0x04;
        const BLOCK_DATA = 0x08;
        const ENUM = 0x10;
    }
}

/// Declared type of a field, taken from its one-byte type code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldType {
    Byte,
    Char,
    Double,
    Float,
    Int,
    Long,
    Short,
    Boolean,
    Array,
    Object,
}

impl FieldType {
    pub fn from_code(code: u8) -> Option<Self> {
        Some(match code {
            b'B' => Self::Byte,
            b'C' => Self::Char,
            b'D' => Self::Double,
            b'F' => Self::Float,
            b'I' => Self::Int,
            b'J' => Self::Long,
            b'S' => Self::Short,
            b'Z' => Self::Boolean,
            b'[' => Self::Array,
            b'L' => Self::Object,
            _ => return None,
        })
    }

    pub fn code(self) -> u8 {
        match self {
            Self::Byte => b'B',
            Self::Char => b'C',
            Self::Double => b'D',
            Self::Float => b'F',
            Self::Int => b'I',
            Self::Long => b'J',
            Self::Short => b'S',
            Self::Boolean => b'Z',
            Self::Array => b'[',
            Self::Object => b'L',
        }
    }

    /// Primitive fields are stored inline; the others are nested content units
    pub fn is_primitive(self) -> bool {
        !matches!(self, Self::Array | Self::Object)
    }
}

/// One declared field of a class descriptor
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDesc {
    pub field_type: FieldType,
    pub name: String,
    /// Type signature for object and array fields, e.g. `Ljava/lang/String;`
    pub class_name: Option<Rc<str>>,
}

impl FieldDesc {
    pub fn primitive(field_type: FieldType, name: impl Into<String>) -> Self {
        Self {
            field_type,
            name: name.into(),
            class_name: None,
        }
    }

    pub fn reference(field_type: FieldType, name: impl Into<String>, class_name: &str) -> Self {
        Self {
            field_type,
            name: name.into(),
            class_name: Some(Rc::from(class_name)),
        }
    }
}

/// A decoded type descriptor
#[derive(Debug, Clone, PartialEq)]
pub struct ClassDesc {
    pub name: String,
    pub serial_version_uid: i64,
    pub flags: ClassFlags,
    pub fields: Vec<FieldDesc>,
    pub super_class: Option<Rc<ClassDesc>>,
}

impl ClassDesc {
    pub fn new(name: impl Into<String>, serial_version_uid: i64, fields: Vec<FieldDesc>) -> Self {
        Self {
            name: name.into(),
            serial_version_uid,
            flags: ClassFlags::SERIALIZABLE,
            fields,
            super_class: None,
        }
    }

    /// Descriptors from the top-most superclass down to `self`, the order in
    /// which field values appear in the stream
    pub fn hierarchy(self: &Rc<Self>) -> Vec<Rc<ClassDesc>> {
        let mut chain = Vec::new();
        let mut current = Some(Rc::clone(self));
        while let Some(class) = current {
            current = class.super_class.clone();
            chain.push(class);
        }
        chain.reverse();
        chain
    }

    /// Element type of an array class such as `[I` or `[Ljava.lang.String;`
    pub fn array_element_type(&self) -> Option<FieldType> {
        let bytes = self.name.as_bytes();
        if bytes.first() != Some(&b'[') {
            return None;
        }
        bytes.get(1).copied().and_then(FieldType::from_code)
    }
}

/// A decoded object: its class plus one value per declared field
#[derive(Debug, Clone, PartialEq)]
pub struct Object {
    pub class: Rc<ClassDesc>,
    pub fields: Vec<(String, Value)>,
}

impl Object {
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields
            .iter()
            .find(|(field, _)| field == name)
            .map(|(_, value)| value)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Array {
    pub class: Rc<ClassDesc>,
    pub elements: Vec<Value>,
}

/// Anything the decoder can materialize
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Boolean(bool),
    Byte(i8),
    /// A UTF-16 code unit
    Char(u16),
    Short(i16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    String(Rc<str>),
    Object(Rc<Object>),
    Array(Rc<Array>),
    Class(Rc<ClassDesc>),
}

impl Value {
    pub fn string(s: &str) -> Self {
        Self::String(Rc::from(s))
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&Rc<Object>> {
        match self {
            Self::Object(object) => Some(object),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Boolean(_) => "boolean",
            Self::Byte(_) => "byte",
            Self::Char(_) => "char",
            Self::Short(_) => "short",
            Self::Int(_) => "int",
            Self::Long(_) => "long",
            Self::Float(_) => "float",
            Self::Double(_) => "double",
            Self::String(_) => "string",
            Self::Object(_) => "object",
            Self::Array(_) => "array",
            Self::Class(_) => "class",
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "null"),
            Self::Boolean(b) => write!(f, "{}", b),
            Self::Byte(b) => write!(f, "{}", b),
            Self::Char(c) => match char::from_u32(u32::from(*c)) {
                Some(c) => write!(f, "{}", c),
                None => write!(f, "\\u{:04x}", c),
            },
            Self::Short(s) => write!(f, "{}", s),
            Self::Int(i) => write!(f, "{}", i),
            Self::Long(l) => write!(f, "{}", l),
            Self::Float(x) => write!(f, "{}", x),
            Self::Double(x) => write!(f, "{}", x),
            Self::String(s) => write!(f, "{}", s),
            Self::Object(object) => write!(f, "{}{{{} field(s)}}", object.class.name, object.fields.len()),
            Self::Array(array) => {
                write!(f, "[")?;
                for (i, element) in array.elements.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", element)?;
                }
                write!(f, "]")
            }
            Self::Class(class) => write!(f, "class {}", class.name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_type_codes() {
        for code in b"BCDFIJSZ[L" {
            let field_type = FieldType::from_code(*code).expect("known code");
            assert_eq!(field_type.code(), *code);
        }
        assert_eq!(FieldType::from_code(b'X'), None);
        assert!(FieldType::Int.is_primitive());
        assert!(!FieldType::Object.is_primitive());
    }

    #[test]
    fn test_hierarchy_runs_from_superclass_down() {
        let base = Rc::new(ClassDesc::new("Base", 1, vec![]));
        let mut derived = ClassDesc::new("Derived", 2, vec![]);
        derived.super_class = Some(base);
        let derived = Rc::new(derived);

        let names: Vec<_> = derived.hierarchy().iter().map(|c| c.name.clone()).collect();
        assert_eq!(names, vec!["Base", "Derived"]);
    }

    #[test]
    fn test_array_element_type() {
        assert_eq!(ClassDesc::new("[I", 0, vec![]).array_element_type(), Some(FieldType::Int));
        assert_eq!(
            ClassDesc::new("[Ljava.lang.Object;", 0, vec![]).array_element_type(),
            Some(FieldType::Object)
        );
        assert_eq!(ClassDesc::new("java.lang.String", 0, vec![]).array_element_type(), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(Value::Char(0x41).to_string(), "A");
        assert_eq!(Value::string("size").to_string(), "size");
        assert_eq!(Value::Null.to_string(), "null");
    }
}
