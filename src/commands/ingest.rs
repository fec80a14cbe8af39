//! Ingest command: run the ProtonMail module over a directory data source.

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use serde_json::json;
use tracing::warn;

use crate::case::{DirectoryDataSource, SqliteCaseStore};
use crate::config::{IngestSettings, ModuleInfo};
use crate::ingest::{FileOutcome, IngestSummary, ProtonMailIngest};
use crate::output::OutputControls;
use crate::progress::{
    CollectedMessages, IngestJobContext, IngestMessage, MessageSink, MessageType,
    TracingProgress,
};

/// Prints ingest inbox messages as they arrive.
struct ConsoleMessages;

impl MessageSink for ConsoleMessages {
    fn post(&self, message: IngestMessage) {
        let line = format!("[{}] {}", message.module, message.subject);
        match message.message_type {
            MessageType::Data => println!("{}", line),
            MessageType::Error => eprintln!("{}", line),
        }
        if let Some(detail) = message.detail {
            println!("    {}", detail);
        }
    }
}

/// Run one ingest of `source` into the case database at `case_path`.
pub fn run(
    source: &Path,
    case_path: &Path,
    settings: IngestSettings,
    output: &OutputControls,
) -> Result<()> {
    if !source.is_dir() {
        bail!("Data source is not a directory: {}", source.display());
    }

    let store = SqliteCaseStore::open(case_path)
        .with_context(|| format!("Failed to open case database at {:?}", case_path))?;
    let data_source = DirectoryDataSource::new(source);

    let cancelled = Arc::new(AtomicBool::new(false));
    let flag = cancelled.clone();
    if let Err(e) = ctrlc::set_handler(move || flag.store(true, Ordering::Relaxed)) {
        warn!("Could not install Ctrl-C handler: {}", e);
    }

    let ingest = ProtonMailIngest::new(
        ModuleInfo::PROTONMAIL,
        settings,
        IngestJobContext::with_flag(cancelled),
    );

    let collected = CollectedMessages::new();
    let console = ConsoleMessages;
    let messages: &dyn MessageSink = if output.json { &collected } else { &console };

    let summary = ingest
        .process(&data_source, &store, &TracingProgress, messages)
        .context("Ingest failed")?;

    if output.json {
        output.print(&json!({
            "summary": summary,
            "messages": collected.messages(),
        }));
    } else {
        print_summary(&summary, output);
    }

    Ok(())
}

fn print_summary(summary: &IngestSummary, output: &OutputControls) {
    println!(
        "{} {} ({}), job {}",
        summary.module.name,
        summary.module.version,
        summary.module.description,
        summary.job_id
    );
    if summary.cancelled {
        println!(
            "Cancelled after {} of {} file(s)",
            summary.files_processed, summary.files_found
        );
    }

    for report in &summary.files {
        let status = match &report.outcome {
            FileOutcome::StagingFailed => "unreadable".to_string(),
            FileOutcome::NotSqlite => "not SQLite".to_string(),
            FileOutcome::OpenFailed => "failed to open".to_string(),
            FileOutcome::Extracted(r) if r.tables_failed.is_empty() => {
                format!("{} record(s)", r.records)
            }
            FileOutcome::Extracted(r) => format!(
                "{} record(s), failed tables: {}",
                r.records,
                r.tables_failed.join(", ")
            ),
        };
        println!("{}: {}", output.clip(&report.file.unique_path()), status);
    }
}
