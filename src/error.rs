//! Error types for the ingest pipeline.
//!
//! Only `IngestError` ends a run. Everything else is absorbed at the
//! file or table that produced it and shows up in the run summary.
//!
//! CHANGELOG:
//! - 10/19/2026 - Split "already exists" out of store failures

use std::path::PathBuf;

use thiserror::Error;

use crate::case::ValueType;

/// Errors raised by a case store.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("{kind} '{name}' already exists")]
    AlreadyExists { kind: &'static str, name: String },

    #[error("Unknown value type '{0}' in case database")]
    UnknownValueType(String),

    #[error("Failed to prepare case database directory '{path}': {source}")]
    CreateDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Case database error: {0}")]
    Database(#[from] rusqlite::Error),
}

impl StoreError {
    /// True when the store refused a creation because the name is taken.
    pub fn is_already_exists(&self) -> bool {
        matches!(self, StoreError::AlreadyExists { .. })
    }
}

/// Setup failures while registering artifact and attribute types.
#[derive(Error, Debug)]
pub enum SchemaError {
    #[error("Failed to register {kind} '{name}': {source}")]
    Registration {
        kind: &'static str,
        name: String,
        #[source]
        source: StoreError,
    },

    #[error("{kind} '{name}' already exists but could not be resolved by name")]
    Unresolved { kind: &'static str, name: String },

    #[error("Attribute type '{name}' is registered as {existing}, expected {expected}")]
    ValueTypeConflict {
        name: String,
        existing: ValueType,
        expected: ValueType,
    },
}

/// Failures while copying a candidate file to its scratch path.
#[derive(Error, Debug)]
pub enum StagingError {
    #[error("Failed to create scratch directory '{path}': {source}")]
    CreateDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read '{name}' from data source: {source}")]
    Read {
        name: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write scratch file '{path}': {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// A failure confined to one source table.
#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("Query on table '{table}' failed: {source}")]
    Query {
        table: &'static str,
        #[source]
        source: rusqlite::Error,
    },

    #[error("Failed to read column '{column}' of table '{table}': {source}")]
    Column {
        table: &'static str,
        column: &'static str,
        #[source]
        source: rusqlite::Error,
    },

    #[error("Failed to store record from table '{table}': {source}")]
    Store {
        table: &'static str,
        #[source]
        source: StoreError,
    },
}

/// Errors that abort an ingest run.
#[derive(Error, Debug)]
pub enum IngestError {
    #[error("Schema registration failed: {0}")]
    Schema(#[from] SchemaError),

    #[error("Failed to enumerate data source '{data_source}': {source}")]
    Locate {
        data_source: String,
        #[source]
        source: std::io::Error,
    },
}
