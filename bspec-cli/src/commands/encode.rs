//! Encode command implementation

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use bspec_descriptor::ClosureDescriptor;
use colored::*;

/// Write a closure descriptor naming `method`, e.g. as a fixture
pub fn encode_command(
    method: &str,
    signature: Option<&str>,
    impl_class: Option<&str>,
    output: &Path,
) -> Result<()> {
    let mut builder = ClosureDescriptor::builder(method);
    if let Some(signature) = signature {
        builder = builder.signature(signature);
    }
    if let Some(impl_class) = impl_class {
        builder = builder.impl_class(impl_class);
    }

    let bytes = builder.encode().context("Failed to encode descriptor")?;
    fs::write(output, &bytes).with_context(|| format!("Failed to write {}", output.display()))?;

    println!(
        "{} {} ({} bytes)",
        "Wrote".green(),
        output.display(),
        bytes.len()
    );
    Ok(())
}
