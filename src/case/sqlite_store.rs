//! SQLite-backed case store.
//!
//! Four tables: artifact and attribute type registries keyed by unique
//! `type_name`, plus artifacts and their positional attributes. String
//! values live in `value_text`, integer and datetime values in `value_int`.
//!
//! CHANGELOG:
//! - 10/19/2026 - Map UNIQUE violations to StoreError::AlreadyExists

use std::path::Path;

use rusqlite::{params, Connection, OptionalExtension};
use serde::Serialize;

use super::{
    ArtifactId, ArtifactTypeId, Attribute, AttributeType, AttributeTypeId, AttributeValue,
    CaseStore, FileEntry, ValueType,
};
use crate::error::StoreError;

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS artifact_types (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    type_name TEXT NOT NULL UNIQUE,
    display_name TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS attribute_types (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    type_name TEXT NOT NULL UNIQUE,
    value_type TEXT NOT NULL,
    display_name TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS artifacts (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    artifact_type_id INTEGER NOT NULL REFERENCES artifact_types(id),
    file_id INTEGER NOT NULL,
    file_path TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS attributes (
    artifact_id INTEGER NOT NULL REFERENCES artifacts(id),
    position INTEGER NOT NULL,
    attribute_type_id INTEGER NOT NULL REFERENCES attribute_types(id),
    source TEXT NOT NULL,
    value_text TEXT,
    value_int INTEGER,
    PRIMARY KEY (artifact_id, position)
);

CREATE INDEX IF NOT EXISTS idx_artifacts_file ON artifacts(file_id);
CREATE INDEX IF NOT EXISTS idx_artifacts_type ON artifacts(artifact_type_id);
"#;

/// A registered artifact type, as listed by the `types` command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArtifactTypeRow {
    pub id: ArtifactTypeId,
    pub type_name: String,
    pub display_name: String,
}

/// An attribute read back from the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoredAttribute {
    pub type_name: String,
    pub display_name: String,
    pub value_type: ValueType,
    pub source: String,
    pub value: AttributeValue,
}

/// An artifact read back from the store, attributes in insertion order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoredArtifact {
    pub id: ArtifactId,
    pub artifact_type: String,
    pub file_id: i64,
    pub file_path: String,
    pub attributes: Vec<StoredAttribute>,
}

impl StoredArtifact {
    /// Value of the attribute with the given type name.
    pub fn value(&self, type_name: &str) -> Option<&AttributeValue> {
        self.attributes
            .iter()
            .find(|a| a.type_name == type_name)
            .map(|a| &a.value)
    }
}

pub struct SqliteCaseStore {
    conn: Connection,
}

impl SqliteCaseStore {
    /// Open (or create) a case database at `path`.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|source| StoreError::CreateDirectory {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        let conn = Connection::open(path)?;
        let store = Self { conn };
        store.init_schema()?;
        Ok(store)
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        let store = Self { conn };
        store.init_schema()?;
        Ok(store)
    }

    fn init_schema(&self) -> Result<(), StoreError> {
        self.conn.execute_batch(SCHEMA)?;
        Ok(())
    }

    pub fn artifact_types(&self) -> Result<Vec<ArtifactTypeRow>, StoreError> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, type_name, display_name FROM artifact_types ORDER BY id")?;
        let rows = stmt.query_map([], |row| {
            Ok(ArtifactTypeRow {
                id: ArtifactTypeId(row.get(0)?),
                type_name: row.get(1)?,
                display_name: row.get(2)?,
            })
        })?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    pub fn attribute_types(&self) -> Result<Vec<AttributeType>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, type_name, value_type, display_name FROM attribute_types ORDER BY id",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
            ))
        })?;

        let mut types = Vec::new();
        for row in rows {
            let (id, type_name, value_type, display_name) = row?;
            types.push(AttributeType {
                id: AttributeTypeId(id),
                type_name,
                value_type: value_type.parse()?,
                display_name,
            });
        }
        Ok(types)
    }

    pub fn artifact_count(&self) -> Result<u64, StoreError> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM artifacts", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    /// Artifacts in insertion order, optionally filtered by artifact type name.
    pub fn artifacts(
        &self,
        type_name: Option<&str>,
        limit: Option<u32>,
    ) -> Result<Vec<StoredArtifact>, StoreError> {
        let limit = limit.map(i64::from).unwrap_or(-1);
        let mut stmt = self.conn.prepare(
            r#"
            SELECT a.id, t.type_name, a.file_id, a.file_path
            FROM artifacts a
            JOIN artifact_types t ON a.artifact_type_id = t.id
            WHERE ?1 IS NULL OR t.type_name = ?1
            ORDER BY a.id
            LIMIT ?2
            "#,
        )?;
        let headers = stmt
            .query_map(params![type_name, limit], artifact_header)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        self.with_attributes(headers)
    }

    /// All artifacts attached to one source file.
    pub fn artifacts_for_file(&self, file_id: i64) -> Result<Vec<StoredArtifact>, StoreError> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT a.id, t.type_name, a.file_id, a.file_path
            FROM artifacts a
            JOIN artifact_types t ON a.artifact_type_id = t.id
            WHERE a.file_id = ?1
            ORDER BY a.id
            "#,
        )?;
        let headers = stmt
            .query_map([file_id], artifact_header)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        self.with_attributes(headers)
    }

    fn with_attributes(
        &self,
        headers: Vec<StoredArtifact>,
    ) -> Result<Vec<StoredArtifact>, StoreError> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT t.type_name, t.display_name, t.value_type, v.source, v.value_text, v.value_int
            FROM attributes v
            JOIN attribute_types t ON v.attribute_type_id = t.id
            WHERE v.artifact_id = ?1
            ORDER BY v.position
            "#,
        )?;

        let mut artifacts = Vec::with_capacity(headers.len());
        for mut artifact in headers {
            let rows = stmt.query_map([artifact.id.0], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, Option<String>>(4)?,
                    row.get::<_, Option<i64>>(5)?,
                ))
            })?;
            for row in rows {
                let (type_name, display_name, value_type, source, text, int) = row?;
                let value_type: ValueType = value_type.parse()?;
                let value = match value_type {
                    ValueType::String => AttributeValue::String(text),
                    ValueType::Integer => AttributeValue::Integer(int),
                    ValueType::DateTime => AttributeValue::DateTime(int),
                };
                artifact.attributes.push(StoredAttribute {
                    type_name,
                    display_name,
                    value_type,
                    source,
                    value,
                });
            }
            artifacts.push(artifact);
        }
        Ok(artifacts)
    }
}

fn artifact_header(row: &rusqlite::Row) -> rusqlite::Result<StoredArtifact> {
    Ok(StoredArtifact {
        id: ArtifactId(row.get(0)?),
        artifact_type: row.get(1)?,
        file_id: row.get(2)?,
        file_path: row.get(3)?,
        attributes: Vec::new(),
    })
}

/// Map a UNIQUE constraint violation on `type_name` to `AlreadyExists`.
fn map_unique(err: rusqlite::Error, kind: &'static str, name: &str) -> StoreError {
    match &err {
        rusqlite::Error::SqliteFailure(e, _)
            if e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE =>
        {
            StoreError::AlreadyExists {
                kind,
                name: name.to_string(),
            }
        }
        _ => StoreError::Database(err),
    }
}

impl CaseStore for SqliteCaseStore {
    fn add_artifact_type(
        &self,
        type_name: &str,
        display_name: &str,
    ) -> Result<ArtifactTypeId, StoreError> {
        self.conn
            .execute(
                "INSERT INTO artifact_types (type_name, display_name) VALUES (?1, ?2)",
                params![type_name, display_name],
            )
            .map_err(|e| map_unique(e, "artifact type", type_name))?;
        Ok(ArtifactTypeId(self.conn.last_insert_rowid()))
    }

    fn artifact_type(&self, type_name: &str) -> Result<Option<ArtifactTypeId>, StoreError> {
        let id = self
            .conn
            .query_row(
                "SELECT id FROM artifact_types WHERE type_name = ?1",
                [type_name],
                |row| row.get::<_, i64>(0),
            )
            .optional()?;
        Ok(id.map(ArtifactTypeId))
    }

    fn add_attribute_type(
        &self,
        type_name: &str,
        value_type: ValueType,
        display_name: &str,
    ) -> Result<AttributeType, StoreError> {
        self.conn
            .execute(
                "INSERT INTO attribute_types (type_name, value_type, display_name) VALUES (?1, ?2, ?3)",
                params![type_name, value_type.as_str(), display_name],
            )
            .map_err(|e| map_unique(e, "attribute type", type_name))?;
        Ok(AttributeType {
            id: AttributeTypeId(self.conn.last_insert_rowid()),
            type_name: type_name.to_string(),
            value_type,
            display_name: display_name.to_string(),
        })
    }

    fn attribute_type(&self, type_name: &str) -> Result<Option<AttributeType>, StoreError> {
        let row = self
            .conn
            .query_row(
                "SELECT id, value_type, display_name FROM attribute_types WHERE type_name = ?1",
                [type_name],
                |row| {
                    Ok((
                        row.get::<_, i64>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                    ))
                },
            )
            .optional()?;

        match row {
            Some((id, value_type, display_name)) => Ok(Some(AttributeType {
                id: AttributeTypeId(id),
                type_name: type_name.to_string(),
                value_type: value_type.parse()?,
                display_name,
            })),
            None => Ok(None),
        }
    }

    fn add_artifact(
        &self,
        file: &FileEntry,
        artifact_type: ArtifactTypeId,
        attributes: &[Attribute],
    ) -> Result<ArtifactId, StoreError> {
        let tx = self.conn.unchecked_transaction()?;
        tx.execute(
            "INSERT INTO artifacts (artifact_type_id, file_id, file_path) VALUES (?1, ?2, ?3)",
            params![artifact_type.0, file.id, file.unique_path()],
        )?;
        let artifact_id = tx.last_insert_rowid();

        {
            let mut stmt = tx.prepare(
                r#"
                INSERT INTO attributes
                    (artifact_id, position, attribute_type_id, source, value_text, value_int)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                "#,
            )?;
            for (position, attribute) in attributes.iter().enumerate() {
                let (text, int) = match &attribute.value {
                    AttributeValue::String(s) => (s.as_deref(), None),
                    AttributeValue::Integer(v) | AttributeValue::DateTime(v) => (None, *v),
                };
                stmt.execute(params![
                    artifact_id,
                    position as i64,
                    attribute.attribute_type.0,
                    attribute.source,
                    text,
                    int,
                ])?;
            }
        }

        tx.commit()?;
        Ok(ArtifactId(artifact_id))
    }
}
