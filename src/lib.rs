//! proton-extract library
//!
//! Extracts contacts, labels, messages and notifications from ProtonMail
//! desktop `proton.db` files found in a data source, and records them as
//! typed artifacts in a case store.
//!
//! CHANGELOG:
//! - 10/19/2026 - Initial library structure

pub mod case;
pub mod commands;
pub mod config;
pub mod db;
pub mod error;
pub mod ingest;
pub mod output;
pub mod progress;
pub mod schema;
pub mod staging;

pub use config::{IngestSettings, ModuleInfo};
pub use error::IngestError;
pub use ingest::{IngestSummary, ProtonMailIngest};
