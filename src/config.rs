//! Module identity and run settings.
//!
//! `ModuleInfo` is passed by reference to everything that stamps records
//! or messages with the module name.

use std::path::PathBuf;

use serde::Serialize;

/// Identity reported to the host and recorded as the source of every attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ModuleInfo {
    pub name: &'static str,
    pub description: &'static str,
    pub version: &'static str,
}

impl ModuleInfo {
    pub const PROTONMAIL: ModuleInfo = ModuleInfo {
        name: "ProtonMail",
        description: "Parse the ProtonMail SQLite database",
        version: "1.0",
    };
}

impl Default for ModuleInfo {
    fn default() -> Self {
        Self::PROTONMAIL
    }
}

/// Database file name the ProtonMail desktop client writes.
pub const DEFAULT_TARGET_FILE: &str = "proton.db";

/// Per-run settings supplied by the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestSettings {
    /// File name to search for in the data source.
    pub target_file_name: String,
    /// Where candidate files are staged before sniffing.
    pub scratch_dir: PathBuf,
}

impl Default for IngestSettings {
    fn default() -> Self {
        Self {
            target_file_name: DEFAULT_TARGET_FILE.to_string(),
            scratch_dir: default_scratch_dir(),
        }
    }
}

/// Default scratch directory.
///
/// 1. PROTON_EXTRACT_SCRATCH_DIR env var
/// 2. `<system temp>/proton-extract`
pub fn default_scratch_dir() -> PathBuf {
    if let Ok(path) = std::env::var("PROTON_EXTRACT_SCRATCH_DIR") {
        return PathBuf::from(path);
    }
    std::env::temp_dir().join("proton-extract")
}

/// Default case database path.
///
/// 1. PROTON_EXTRACT_CASE_DB env var
/// 2. `<local data dir>/proton-extract/case.db`
pub fn default_case_path() -> PathBuf {
    if let Ok(path) = std::env::var("PROTON_EXTRACT_CASE_DB") {
        return PathBuf::from(path);
    }
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("proton-extract")
        .join("case.db")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_module_identity() {
        let module = ModuleInfo::default();
        assert_eq!(module.name, "ProtonMail");
        assert_eq!(module.version, "1.0");
    }

    #[test]
    fn test_default_settings_target_proton_db() {
        let settings = IngestSettings::default();
        assert_eq!(settings.target_file_name, "proton.db");
    }

    #[test]
    fn test_default_case_path() {
        if std::env::var("PROTON_EXTRACT_CASE_DB").is_err() {
            assert!(default_case_path().ends_with("proton-extract/case.db"));
        }
    }
}
