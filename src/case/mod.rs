//! Case-side interfaces: the typed-attribute store and the data source.
//!
//! The ingest module only talks to these traits. `SqliteCaseStore` and
//! `DirectoryDataSource` are the implementations the CLI host uses.
//!
//! CHANGELOG:
//! - 10/19/2026 - Initial module structure

pub mod directory;
pub mod sqlite_store;

pub use directory::DirectoryDataSource;
pub use sqlite_store::SqliteCaseStore;

use std::fmt;
use std::io::Read;
use std::str::FromStr;

use serde::Serialize;

use crate::error::StoreError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct ArtifactTypeId(pub i64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct AttributeTypeId(pub i64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct ArtifactId(pub i64);

/// Value type of an attribute, fixed at registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    String,
    Integer,
    DateTime,
}

impl ValueType {
    pub fn as_str(self) -> &'static str {
        match self {
            ValueType::String => "string",
            ValueType::Integer => "integer",
            ValueType::DateTime => "datetime",
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ValueType {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "string" => Ok(ValueType::String),
            "integer" => Ok(ValueType::Integer),
            "datetime" => Ok(ValueType::DateTime),
            other => Err(StoreError::UnknownValueType(other.to_string())),
        }
    }
}

/// A single attribute value. `None` carries a NULL source column through.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum AttributeValue {
    String(Option<String>),
    Integer(Option<i64>),
    /// Seconds since the Unix epoch.
    DateTime(Option<i64>),
}

impl AttributeValue {
    pub fn value_type(&self) -> ValueType {
        match self {
            AttributeValue::String(_) => ValueType::String,
            AttributeValue::Integer(_) => ValueType::Integer,
            AttributeValue::DateTime(_) => ValueType::DateTime,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            AttributeValue::String(s) => s.as_deref(),
            _ => None,
        }
    }
}

/// A registered attribute type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttributeType {
    pub id: AttributeTypeId,
    pub type_name: String,
    pub value_type: ValueType,
    pub display_name: String,
}

/// One attribute to attach to a new artifact.
#[derive(Debug, Clone, PartialEq)]
pub struct Attribute {
    pub attribute_type: AttributeTypeId,
    /// Name of the module that produced the value.
    pub source: String,
    pub value: AttributeValue,
}

/// A file inside a data source.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct FileEntry {
    /// Unique within the data source.
    pub id: i64,
    pub name: String,
    /// Parent directory inside the data source, always starting with '/'.
    pub parent_path: String,
}

impl FileEntry {
    /// Full path of the file inside its data source.
    pub fn unique_path(&self) -> String {
        if self.parent_path.ends_with('/') {
            format!("{}{}", self.parent_path, self.name)
        } else {
            format!("{}/{}", self.parent_path, self.name)
        }
    }
}

/// Typed-attribute store that receives extracted records.
pub trait CaseStore {
    /// Create an artifact type. Fails with `StoreError::AlreadyExists` if the
    /// name is taken.
    fn add_artifact_type(
        &self,
        type_name: &str,
        display_name: &str,
    ) -> Result<ArtifactTypeId, StoreError>;

    fn artifact_type(&self, type_name: &str) -> Result<Option<ArtifactTypeId>, StoreError>;

    /// Create an attribute type. Fails with `StoreError::AlreadyExists` if the
    /// name is taken.
    fn add_attribute_type(
        &self,
        type_name: &str,
        value_type: ValueType,
        display_name: &str,
    ) -> Result<AttributeType, StoreError>;

    fn attribute_type(&self, type_name: &str) -> Result<Option<AttributeType>, StoreError>;

    /// Persist one artifact with all of its attributes, atomically.
    fn add_artifact(
        &self,
        file: &FileEntry,
        artifact_type: ArtifactTypeId,
        attributes: &[Attribute],
    ) -> Result<ArtifactId, StoreError>;
}

/// The image or container under analysis.
pub trait DataSource {
    fn name(&self) -> &str;

    /// All files whose name matches `file_name`, case-insensitively.
    fn find_files(&self, file_name: &str) -> std::io::Result<Vec<FileEntry>>;

    /// Open the content of a file previously returned by `find_files`.
    fn open(&self, file: &FileEntry) -> std::io::Result<Box<dyn Read + '_>>;
}
