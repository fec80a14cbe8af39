//! Table extraction: one record per source row, one attribute per column.
//!
//! Every table is its own failure boundary. A missing table or column, or
//! a failed read or store call, ends that table only; the remaining tables
//! still run.

use rusqlite::types::ValueRef;
use rusqlite::{Connection, Row};
use serde::Serialize;
use tracing::{debug, warn};

use super::queries;
use crate::case::{Attribute, AttributeValue, CaseStore, FileEntry, ValueType};
use crate::config::ModuleInfo;
use crate::error::ExtractError;
use crate::schema::{ArtifactKind, FieldDef, Registry};

/// Result of extracting one table.
#[derive(Debug)]
pub struct TableOutcome {
    pub kind: ArtifactKind,
    /// Records stored before the table finished or failed.
    pub emitted: u64,
    pub error: Option<ExtractError>,
}

impl TableOutcome {
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

/// Per-file aggregate of table outcomes.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct ExtractionReport {
    pub records: u64,
    pub tables_ok: u32,
    pub tables_failed: Vec<String>,
}

impl ExtractionReport {
    pub fn from_outcomes(outcomes: &[TableOutcome]) -> Self {
        let mut report = Self::default();
        for outcome in outcomes {
            report.records += outcome.emitted;
            if outcome.is_ok() {
                report.tables_ok += 1;
            } else {
                report.tables_failed.push(outcome.kind.table().to_string());
            }
        }
        report
    }
}

pub struct TableExtractor<'a> {
    store: &'a dyn CaseStore,
    registry: &'a Registry,
    module: &'a ModuleInfo,
}

impl<'a> TableExtractor<'a> {
    pub fn new(store: &'a dyn CaseStore, registry: &'a Registry, module: &'a ModuleInfo) -> Self {
        Self {
            store,
            registry,
            module,
        }
    }

    /// Extract all six tables, in order, attaching records to `file`.
    pub fn extract_all(&self, conn: &Connection, file: &FileEntry) -> Vec<TableOutcome> {
        ArtifactKind::ALL
            .iter()
            .map(|&kind| {
                let mut emitted = 0;
                let error = self.extract_table(conn, file, kind, &mut emitted).err();
                match &error {
                    None => debug!(table = kind.table(), emitted, "Table extracted"),
                    Some(e) => warn!(
                        table = kind.table(),
                        emitted,
                        "SQL error in {}: {}",
                        file.unique_path(),
                        e
                    ),
                }
                TableOutcome {
                    kind,
                    emitted,
                    error,
                }
            })
            .collect()
    }

    /// Extract one table. `emitted` counts stored records even when a later
    /// row fails.
    pub fn extract_table(
        &self,
        conn: &Connection,
        file: &FileEntry,
        kind: ArtifactKind,
        emitted: &mut u64,
    ) -> Result<(), ExtractError> {
        let table = kind.table();
        let resolved = self.registry.kind(kind);

        let mut stmt = conn
            .prepare(queries::select_for(kind))
            .map_err(|source| ExtractError::Query { table, source })?;
        let mut rows = stmt
            .query([])
            .map_err(|source| ExtractError::Query { table, source })?;

        while let Some(row) = rows
            .next()
            .map_err(|source| ExtractError::Query { table, source })?
        {
            let mut attributes = Vec::with_capacity(resolved.fields.len());
            for (field, &attribute_type) in kind.fields().iter().zip(&resolved.fields) {
                let value = read_value(row, field).map_err(|source| ExtractError::Column {
                    table,
                    column: field.column,
                    source,
                })?;
                attributes.push(Attribute {
                    attribute_type,
                    source: self.module.name.to_string(),
                    value,
                });
            }

            self.store
                .add_artifact(file, resolved.artifact_type, &attributes)
                .map_err(|source| ExtractError::Store { table, source })?;
            *emitted += 1;
        }

        Ok(())
    }
}

/// Read a column by name, typed per its field definition.
///
/// String fields take whatever the column holds, rendered as text; NULL
/// stays NULL. Time fields that hold something other than a number are
/// stored as NULL so the row is still emitted. Only a missing column is
/// an error.
fn read_value(row: &Row, field: &FieldDef) -> rusqlite::Result<AttributeValue> {
    let value = row.get_ref(field.column)?;
    Ok(match field.value_type {
        ValueType::String => AttributeValue::String(value_as_text(value)),
        ValueType::Integer => AttributeValue::Integer(read_integer(field, value)),
        ValueType::DateTime => AttributeValue::DateTime(read_integer(field, value)),
    })
}

fn value_as_text(value: ValueRef<'_>) -> Option<String> {
    match value {
        ValueRef::Null => None,
        ValueRef::Integer(i) => Some(i.to_string()),
        ValueRef::Real(f) => Some(f.to_string()),
        ValueRef::Text(bytes) | ValueRef::Blob(bytes) => {
            Some(String::from_utf8_lossy(bytes).into_owned())
        }
    }
}

fn read_integer(field: &FieldDef, value: ValueRef<'_>) -> Option<i64> {
    match value {
        ValueRef::Null => None,
        ValueRef::Integer(i) => Some(i),
        ValueRef::Real(f) => Some(f as i64),
        ValueRef::Text(bytes) => {
            let text = String::from_utf8_lossy(bytes);
            match text.trim().parse::<i64>() {
                Ok(n) => Some(n),
                Err(_) => {
                    warn!(column = field.column, value = %text, "Non-numeric time value stored as NULL");
                    None
                }
            }
        }
        ValueRef::Blob(bytes) => {
            warn!(column = field.column, len = bytes.len(), "Blob in time column stored as NULL");
            None
        }
    }
}
