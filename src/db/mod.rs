//! Read access to staged proton.db files.
//!
//! CHANGELOG:
//! - 10/19/2026 - Per-table extraction replaces the single query block

pub mod connection;
pub mod extract;
pub mod queries;
