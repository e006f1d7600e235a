//! Decode command implementation

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use bspec_assert::{AccessorName, PLACEHOLDER};
use bspec_descriptor::{ClosureDescriptor, Value};
use colored::*;
use serde_json::json;

use crate::DecodeFormat;

pub fn decode_command(input: &Path, format: DecodeFormat) -> Result<()> {
    let bytes = fs::read(input).with_context(|| format!("Failed to read {}", input.display()))?;
    let descriptor = ClosureDescriptor::from_bytes(&bytes)
        .with_context(|| format!("Failed to decode {}", input.display()))?;

    match format {
        DecodeFormat::Table => {
            println!("{} {}", "Closure".bold(), input.display());
            print!("{}", render_table(&descriptor));
        }
        DecodeFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&descriptor_to_json(&descriptor))?);
        }
    }
    Ok(())
}

/// How a projection through this closure reads in a failure message
fn accessor(descriptor: &ClosureDescriptor) -> Option<String> {
    let method = descriptor.impl_method_name().ok()?;
    let signature = descriptor.impl_method_signature().ok()?;
    Some(AccessorName::new(method, signature).apply(PLACEHOLDER))
}

pub fn render_table(descriptor: &ClosureDescriptor) -> String {
    let mut out = format!("class: {}\n", descriptor.class_name());
    for (name, value) in descriptor.fields() {
        out.push_str(&format!("  {:<36} {:<8} {}\n", name, value.kind(), value));
    }
    if let Some(accessor) = accessor(descriptor) {
        out.push_str(&format!("accessor: {}\n", accessor));
    }
    out
}

pub fn descriptor_to_json(descriptor: &ClosureDescriptor) -> serde_json::Value {
    let fields: serde_json::Map<String, serde_json::Value> = descriptor
        .fields()
        .map(|(name, value)| (name.to_string(), value_to_json(value)))
        .collect();
    json!({
        "class": descriptor.class_name(),
        "accessor": accessor(descriptor),
        "fields": fields,
    })
}

pub fn value_to_json(value: &Value) -> serde_json::Value {
    match value {
        Value::Null => serde_json::Value::Null,
        Value::Boolean(b) => json!(b),
        Value::Byte(b) => json!(b),
        Value::Short(s) => json!(s),
        Value::Int(i) => json!(i),
        Value::Long(l) => json!(l),
        Value::Float(x) => json!(x),
        Value::Double(x) => json!(x),
        Value::Char(_) | Value::String(_) => json!(value.to_string()),
        Value::Object(object) => {
            let fields: serde_json::Map<String, serde_json::Value> = object
                .fields
                .iter()
                .map(|(name, value)| (name.clone(), value_to_json(value)))
                .collect();
            json!({ "class": object.class.name, "fields": fields })
        }
        Value::Array(array) => {
            serde_json::Value::Array(array.elements.iter().map(value_to_json).collect())
        }
        Value::Class(class) => json!({ "class": class.name }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptor() -> ClosureDescriptor {
        let bytes = ClosureDescriptor::builder("size").impl_class("List").encode().unwrap();
        ClosureDescriptor::from_bytes(&bytes).unwrap()
    }

    #[test]
    fn test_table_lists_fields_and_accessor() {
        let table = render_table(&descriptor());
        assert!(table.contains("implMethodName"));
        assert!(table.contains("implMethodKind"));
        assert!(table.ends_with("accessor: %s.size()\n"), "{}", table);
    }

    #[test]
    fn test_json_shape() {
        let value = descriptor_to_json(&descriptor());
        assert_eq!(value["accessor"], "%s.size()");
        assert_eq!(value["fields"]["implMethodName"], "size");
        assert_eq!(value["fields"]["implClass"], "List");
        assert_eq!(value["fields"]["implMethodKind"], 5);
        assert_eq!(value["fields"]["capturedArgs"], json!([]));
    }

    #[test]
    fn test_decode_command_reads_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("size.ser");
        fs::write(&path, ClosureDescriptor::builder("size").encode().unwrap()).unwrap();
        decode_command(&path, DecodeFormat::Json).unwrap();

        let broken = dir.path().join("broken.ser");
        fs::write(&broken, [0xAC, 0xED, 0x00]).unwrap();
        let error = decode_command(&broken, DecodeFormat::Table).unwrap_err();
        assert!(format!("{:#}", error).contains("Failed to decode"));

        assert!(decode_command(&dir.path().join("missing.ser"), DecodeFormat::Table).is_err());
    }
}
