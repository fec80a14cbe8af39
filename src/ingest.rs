//! The ingest run: register types, locate candidates, stage, sniff, extract.
//!
//! Only setup failures (registration, enumeration) abort a run. Per-file
//! and per-table failures are logged, counted in the summary, and skipped.
//!
//! CHANGELOG:
//! - 10/19/2026 - Scratch files are removed on every path, not just success
//! - 10/19/2026 - Initial run loop

use std::path::Path;

use serde::Serialize;
use tracing::{debug, info, info_span, warn};
use uuid::Uuid;

use crate::case::{CaseStore, DataSource, FileEntry};
use crate::config::{IngestSettings, ModuleInfo};
use crate::db::connection;
use crate::db::extract::{ExtractionReport, TableExtractor};
use crate::error::IngestError;
use crate::progress::{IngestJobContext, IngestMessage, MessageSink, ProgressSink};
use crate::schema;
use crate::staging::{ScratchDir, ScratchFile};

/// What happened to one candidate file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum FileOutcome {
    /// Could not be copied out of the data source.
    StagingFailed,
    /// Header is not `SQLite format 3`.
    NotSqlite,
    /// Header matched but SQLite refused to open it.
    OpenFailed,
    Extracted(ExtractionReport),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileReport {
    pub file: FileEntry,
    #[serde(flatten)]
    pub outcome: FileOutcome,
}

/// Totals for one run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IngestSummary {
    pub job_id: Uuid,
    pub module: ModuleInfo,
    pub data_source: String,
    pub files_found: usize,
    pub files_processed: usize,
    pub files_extracted: usize,
    pub files_not_sqlite: usize,
    pub files_staging_failed: usize,
    pub files_open_failed: usize,
    pub records: u64,
    pub tables_failed: usize,
    pub cancelled: bool,
    pub files: Vec<FileReport>,
}

impl IngestSummary {
    fn new(job_id: Uuid, module: ModuleInfo, data_source: &str, files_found: usize) -> Self {
        Self {
            job_id,
            module,
            data_source: data_source.to_string(),
            files_found,
            files_processed: 0,
            files_extracted: 0,
            files_not_sqlite: 0,
            files_staging_failed: 0,
            files_open_failed: 0,
            records: 0,
            tables_failed: 0,
            cancelled: false,
            files: Vec::new(),
        }
    }

    fn record(&mut self, file: &FileEntry, outcome: FileOutcome) {
        self.files_processed += 1;
        match &outcome {
            FileOutcome::StagingFailed => self.files_staging_failed += 1,
            FileOutcome::NotSqlite => self.files_not_sqlite += 1,
            FileOutcome::OpenFailed => self.files_open_failed += 1,
            FileOutcome::Extracted(report) => {
                self.files_extracted += 1;
                self.records += report.records;
                self.tables_failed += report.tables_failed.len();
            }
        }
        self.files.push(FileReport {
            file: file.clone(),
            outcome,
        });
    }

    /// One-line breakdown posted with the final message.
    pub fn detail(&self) -> String {
        format!(
            "{} record(s) from {} file(s); {} not SQLite, {} unreadable, {} failed to open, {} table(s) failed",
            self.records,
            self.files_extracted,
            self.files_not_sqlite,
            self.files_staging_failed,
            self.files_open_failed,
            self.tables_failed,
        )
    }
}

/// One ingest module instance, bound to a host job.
pub struct ProtonMailIngest {
    module: ModuleInfo,
    settings: IngestSettings,
    context: IngestJobContext,
}

impl ProtonMailIngest {
    pub fn new(module: ModuleInfo, settings: IngestSettings, context: IngestJobContext) -> Self {
        Self {
            module,
            settings,
            context,
        }
    }

    /// Analyze one data source.
    ///
    /// Cancellation is checked before each file and returns the partial
    /// summary with `cancelled` set; records already stored stay stored.
    pub fn process(
        &self,
        data_source: &dyn DataSource,
        store: &dyn CaseStore,
        progress: &dyn ProgressSink,
        messages: &dyn MessageSink,
    ) -> Result<IngestSummary, IngestError> {
        let job_id = Uuid::new_v4();
        let span = info_span!(
            "ingest",
            %job_id,
            module = self.module.name,
            data_source = data_source.name()
        );
        let _enter = span.enter();

        progress.switch_to_indeterminate();

        let registry = schema::register(store, &self.module)?;

        let files = data_source
            .find_files(&self.settings.target_file_name)
            .map_err(|source| IngestError::Locate {
                data_source: data_source.name().to_string(),
                source,
            })?;
        let num_files = files.len();
        let mut summary = IngestSummary::new(job_id, self.module, data_source.name(), num_files);
        let scratch = ScratchDir::for_job(&self.settings.scratch_dir, job_id);

        messages.post(IngestMessage::data(
            self.module.name,
            format!("Starting to analyze {} file(s)", num_files),
        ));
        progress.switch_to_determinate(num_files);

        let extractor = TableExtractor::new(store, &registry, &self.module);
        for (index, file) in files.iter().enumerate() {
            if self.context.is_job_cancelled() {
                info!(
                    processed = summary.files_processed,
                    remaining = num_files - index,
                    "Ingest cancelled"
                );
                summary.cancelled = true;
                return Ok(summary);
            }

            info!("Processing file: {}", file.name);
            let file_count = index + 1;
            progress.progress(file_count);
            progress.progress_text(self.module.name);

            let outcome =
                self.process_file(data_source, &extractor, file, scratch.path(), messages);
            summary.record(file, outcome);

            progress.progress(file_count);
        }

        if num_files == 0 {
            messages.post(IngestMessage::data(self.module.name, "No files to analyze"));
        } else {
            messages.post(
                IngestMessage::data(
                    self.module.name,
                    format!("Finished to analyze {} file(s)", summary.files_processed),
                )
                .with_detail(summary.detail()),
            );
        }

        info!(
            files = summary.files_processed,
            records = summary.records,
            "Ingest finished"
        );
        Ok(summary)
    }

    fn process_file(
        &self,
        data_source: &dyn DataSource,
        extractor: &TableExtractor<'_>,
        file: &FileEntry,
        scratch_dir: &Path,
        messages: &dyn MessageSink,
    ) -> FileOutcome {
        let staged = match ScratchFile::stage(data_source, file, scratch_dir) {
            Ok(staged) => staged,
            Err(e) => {
                warn!("Skipping {}: {}", file.unique_path(), e);
                return FileOutcome::StagingFailed;
            }
        };

        match staged.has_sqlite_header() {
            Ok(true) => {}
            Ok(false) => {
                debug!("{} is not a SQLite database", file.unique_path());
                return FileOutcome::NotSqlite;
            }
            Err(e) => {
                warn!("Failed to read header of {}: {}", staged.path().display(), e);
                return FileOutcome::StagingFailed;
            }
        }

        let conn = match connection::open_staged(staged.path()) {
            Ok(conn) => conn,
            Err(e) => {
                warn!("Failed to open {} as SQLite: {}", file.unique_path(), e);
                messages.post(
                    IngestMessage::error(
                        self.module.name,
                        format!("Failed to open {} as SQLite", file.name),
                    )
                    .with_detail(e.to_string()),
                );
                return FileOutcome::OpenFailed;
            }
        };

        let outcomes = extractor.extract_all(&conn, file);
        if let Err((_, e)) = conn.close() {
            warn!("Error closing {}: {}", staged.path().display(), e);
        }

        let report = ExtractionReport::from_outcomes(&outcomes);
        debug!(
            records = report.records,
            tables_failed = report.tables_failed.len(),
            "Extracted {}",
            file.unique_path()
        );
        FileOutcome::Extracted(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(id: i64) -> FileEntry {
        FileEntry {
            id,
            name: "proton.db".to_string(),
            parent_path: "/".to_string(),
        }
    }

    #[test]
    fn test_summary_counts_outcomes() {
        let mut summary = IngestSummary::new(Uuid::new_v4(), ModuleInfo::PROTONMAIL, "image", 4);
        summary.record(&file(1), FileOutcome::NotSqlite);
        summary.record(&file(2), FileOutcome::OpenFailed);
        summary.record(
            &file(3),
            FileOutcome::Extracted(ExtractionReport {
                records: 5,
                tables_ok: 5,
                tables_failed: vec!["message".to_string()],
            }),
        );
        summary.record(&file(4), FileOutcome::StagingFailed);

        assert_eq!(summary.files_processed, 4);
        assert_eq!(summary.files_extracted, 1);
        assert_eq!(summary.records, 5);
        assert_eq!(
            summary.detail(),
            "5 record(s) from 1 file(s); 1 not SQLite, 1 unreadable, 1 failed to open, 1 table(s) failed"
        );
    }

    #[test]
    fn test_file_report_serializes_flat() {
        let report = FileReport {
            file: file(9),
            outcome: FileOutcome::NotSqlite,
        };
        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["outcome"], "not_sqlite");
        assert_eq!(value["file"]["id"], 9);
    }

    #[test]
    fn test_summary_carries_module_identity() {
        let summary = IngestSummary::new(Uuid::new_v4(), ModuleInfo::PROTONMAIL, "image", 0);
        let value = serde_json::to_value(&summary).unwrap();
        assert_eq!(value["module"]["name"], "ProtonMail");
        assert_eq!(value["module"]["version"], "1.0");
        assert_eq!(
            value["module"]["description"],
            "Parse the ProtonMail SQLite database"
        );
    }
}
