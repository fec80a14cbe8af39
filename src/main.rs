//! proton-extract - Extract ProtonMail artifacts from proton.db files
//!
//! Scans a directory data source for proton.db, stages each candidate,
//! and records contacts, labels, messages and notifications in a case database.
//!
//! CHANGELOG:
//! - 10/19/2026 - ingest, types and artifacts commands

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use proton_extract::commands;
use proton_extract::config::{self, IngestSettings};
use proton_extract::output::{self, OutputControls};

/// Extract ProtonMail artifacts from proton.db SQLite files.
#[derive(Parser, Debug)]
#[command(name = "proton-extract")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Compact JSON output (no whitespace)
    #[arg(long, global = true)]
    compact: bool,

    /// Comma-separated field allowlist
    #[arg(long, global = true)]
    fields: Option<String>,

    /// Truncate text fields to this length
    #[arg(long, global = true)]
    max_text_chars: Option<u32>,

    /// Log progress at info level (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Analyze a directory and record ProtonMail artifacts
    Ingest {
        /// Directory to scan
        source: PathBuf,

        /// Case database path
        #[arg(long)]
        case: Option<PathBuf>,

        /// Scratch directory for staged copies
        #[arg(long)]
        scratch: Option<PathBuf>,

        /// File name to look for (case-insensitive)
        #[arg(long, default_value = config::DEFAULT_TARGET_FILE)]
        file_name: String,
    },

    /// List registered artifact and attribute types
    Types {
        /// Case database path
        #[arg(long)]
        case: Option<PathBuf>,
    },

    /// Show extracted artifacts
    Artifacts {
        /// Case database path
        #[arg(long)]
        case: Option<PathBuf>,

        /// Only this artifact type (e.g. TSK_PM_MESSAGE)
        #[arg(short, long)]
        kind: Option<String>,

        /// Max artifacts
        #[arg(short, long)]
        limit: Option<u32>,
    },
}

/// WARN by default, INFO with `-v`. A non-empty RUST_LOG replaces both.
fn log_filter(verbose: bool, rust_log: Option<&str>) -> EnvFilter {
    let level = if verbose { "info" } else { "warn" };
    rust_log
        .filter(|s| !s.trim().is_empty())
        .and_then(|s| EnvFilter::try_new(s).ok())
        .unwrap_or_else(|| EnvFilter::new(level))
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let rust_log = std::env::var("RUST_LOG").ok();
    let filter = log_filter(cli.verbose, rust_log.as_deref());
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .init();

    let output_controls = OutputControls {
        json: cli.json,
        compact: cli.compact,
        fields: cli.fields.clone(),
        max_text_chars: cli.max_text_chars,
    };

    let result = match cli.command {
        Command::Ingest {
            source,
            case,
            scratch,
            file_name,
        } => {
            let settings = IngestSettings {
                target_file_name: file_name,
                scratch_dir: scratch.unwrap_or_else(config::default_scratch_dir),
            };
            let case = case.unwrap_or_else(config::default_case_path);
            commands::ingest::run(&source, &case, settings, &output_controls)
        }
        Command::Types { case } => {
            let case = case.unwrap_or_else(config::default_case_path);
            commands::types::list(&case, &output_controls)
        }
        Command::Artifacts { case, kind, limit } => {
            let case = case.unwrap_or_else(config::default_case_path);
            commands::artifacts::list(&case, kind.as_deref(), limit, &output_controls)
        }
    };

    match result {
        Ok(()) => ExitCode::from(0),
        Err(e) => {
            if cli.json {
                eprintln!("{}", output::format_error(&format!("{:#}", e)));
            } else {
                eprintln!("Error: {:#}", e);
            }
            ExitCode::from(1)
        }
    }
}
