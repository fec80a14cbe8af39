//! Command implementations for the reference host CLI.
//!
//! CHANGELOG:
//! - 10/19/2026 - Initial ingest, types and artifacts commands

pub mod artifacts;
pub mod ingest;
pub mod types;
