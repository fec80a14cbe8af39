//! Types command: list registered artifact and attribute types.

use std::path::Path;

use anyhow::{Context, Result};
use serde_json::json;

use crate::case::SqliteCaseStore;
use crate::output::OutputControls;

pub fn list(case_path: &Path, output: &OutputControls) -> Result<()> {
    let store = SqliteCaseStore::open(case_path)
        .with_context(|| format!("Failed to open case database at {:?}", case_path))?;
    let artifact_types = store.artifact_types()?;
    let attribute_types = store.attribute_types()?;

    if output.json {
        output.print(&json!({
            "artifact_types": artifact_types,
            "attribute_types": attribute_types,
        }));
        return Ok(());
    }

    if artifact_types.is_empty() {
        println!("No types registered. Run 'proton-extract ingest' first.");
        return Ok(());
    }

    println!("Artifact types ({}):", artifact_types.len());
    println!("{}", "-".repeat(50));
    for t in &artifact_types {
        println!("{:>4}  {:<28} {}", t.id.0, t.type_name, t.display_name);
    }

    println!();
    println!("Attribute types ({}):", attribute_types.len());
    println!("{}", "-".repeat(50));
    for t in &attribute_types {
        println!(
            "{:>4}  {:<46} {:<9} {}",
            t.id.0,
            t.type_name,
            t.value_type.as_str(),
            t.display_name
        );
    }

    Ok(())
}
