//! Artifacts command: show extracted artifacts from a case database.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{TimeZone, Utc};

use crate::case::sqlite_store::{StoredArtifact, StoredAttribute};
use crate::case::{AttributeValue, SqliteCaseStore};
use crate::output::OutputControls;

pub fn list(
    case_path: &Path,
    kind: Option<&str>,
    limit: Option<u32>,
    output: &OutputControls,
) -> Result<()> {
    let store = SqliteCaseStore::open(case_path)
        .with_context(|| format!("Failed to open case database at {:?}", case_path))?;
    let artifacts = store.artifacts(kind, limit)?;

    if output.json {
        output.print(&artifacts);
        return Ok(());
    }

    if artifacts.is_empty() {
        match kind {
            Some(k) => println!("No {} artifacts found.", k),
            None => println!("No artifacts found."),
        }
        return Ok(());
    }

    for artifact in &artifacts {
        print_artifact(artifact, output);
    }
    println!("{} artifact(s)", artifacts.len());

    Ok(())
}

fn print_artifact(artifact: &StoredArtifact, output: &OutputControls) {
    println!(
        "#{} {}  {}",
        artifact.id.0, artifact.artifact_type, artifact.file_path
    );
    for attr in &artifact.attributes {
        println!("  {}: {}", attr.display_name, output.clip(&render_value(attr)));
    }
    println!();
}

/// Human-readable value. Date-times are epoch seconds rendered as RFC 3339.
fn render_value(attr: &StoredAttribute) -> String {
    match &attr.value {
        AttributeValue::String(Some(s)) => s.clone(),
        AttributeValue::Integer(Some(n)) => n.to_string(),
        AttributeValue::DateTime(Some(secs)) => match Utc.timestamp_opt(*secs, 0).single() {
            Some(dt) => dt.to_rfc3339(),
            None => secs.to_string(),
        },
        _ => "(null)".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::case::ValueType;

    fn attr(value: AttributeValue) -> StoredAttribute {
        StoredAttribute {
            type_name: "TSK_PM_MESSAGE_TIME".to_string(),
            display_name: "Time".to_string(),
            value_type: value.value_type(),
            source: "ProtonMail".to_string(),
            value,
        }
    }

    #[test]
    fn test_render_datetime_as_rfc3339() {
        let rendered = render_value(&attr(AttributeValue::DateTime(Some(1_700_000_000))));
        assert_eq!(rendered, "2023-11-14T22:13:20+00:00");
    }

    #[test]
    fn test_render_nulls_and_text() {
        assert_eq!(render_value(&attr(AttributeValue::DateTime(None))), "(null)");
        assert_eq!(render_value(&attr(AttributeValue::String(None))), "(null)");
        assert_eq!(
            render_value(&attr(AttributeValue::String(Some("Alice".to_string())))),
            "Alice"
        );
        assert_eq!(attr(AttributeValue::Integer(Some(3))).value_type, ValueType::Integer);
    }
}
