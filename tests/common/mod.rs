//! Shared fixtures: proton.db builders and a recording progress sink.

#![allow(dead_code)]

use std::path::Path;
use std::sync::Mutex;

use proton_extract::progress::{IngestJobContext, ProgressSink};
use rusqlite::{params, Connection};

pub const CONTACT: &str = "CREATE TABLE contact (CreateTime INTEGER, ModifyTime INTEGER, Name TEXT)";
pub const CONTACT_DATA: &str = "CREATE TABLE contact_data (Name TEXT, PrimaryEmail TEXT)";
pub const CONTACT_EMAILS: &str = "CREATE TABLE contact_emails (Name TEXT, Email TEXT)";
pub const LABEL: &str = "CREATE TABLE label (Name TEXT, Color TEXT)";
pub const MESSAGE: &str = r#"
CREATE TABLE message (
    BCCListString TEXT, Body TEXT, CCListString TEXT, Header TEXT,
    IsDownloaded INTEGER, IsEncrypted INTEGER, IsForwarded INTEGER, IsRead INTEGER,
    IsReplied INTEGER, IsRepliedAll INTEGER, ReplyTosString TEXT, SenderAddress TEXT,
    SenderName TEXT, TotalSize INTEGER, SpamScore INTEGER, Starred INTEGER,
    Subject TEXT, Time INTEGER, ToListString TEXT
)"#;
pub const NOTIFICATION: &str =
    "CREATE TABLE notification (notification_body TEXT, notification_title TEXT)";

pub const ALL_TABLES: [&str; 6] = [
    CONTACT,
    CONTACT_DATA,
    CONTACT_EMAILS,
    LABEL,
    MESSAGE,
    NOTIFICATION,
];

/// Create a SQLite database at `path` with the given CREATE TABLE statements.
pub fn create_db(path: &Path, tables: &[&str]) -> Connection {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    let conn = Connection::open(path).unwrap();
    for ddl in tables {
        conn.execute_batch(ddl).unwrap();
    }
    conn
}

/// One row in every table.
pub fn populate(conn: &Connection) {
    conn.execute(
        "INSERT INTO contact VALUES (?1, ?2, ?3)",
        params![1000, 2000, "Alice"],
    )
    .unwrap();
    conn.execute(
        "INSERT INTO contact_data VALUES (?1, ?2)",
        params!["Alice", "alice@proton.me"],
    )
    .unwrap();
    conn.execute(
        "INSERT INTO contact_emails VALUES (?1, ?2)",
        params!["Alice", "alice@example.org"],
    )
    .unwrap();
    conn.execute("INSERT INTO label VALUES (?1, ?2)", params!["Work", "#7272a7"])
        .unwrap();
    conn.execute(
        r#"INSERT INTO message (
            BCCListString, Body, CCListString, Header, IsDownloaded, IsEncrypted,
            IsForwarded, IsRead, IsReplied, IsRepliedAll, ReplyTosString,
            SenderAddress, SenderName, TotalSize, SpamScore, Starred, Subject,
            Time, ToListString
        ) VALUES ('', 'encrypted body', '', 'Received: x', 1, 2, 0, 1, 0, 0,
            'bob@proton.me', 'bob@proton.me', 'Bob', 2048, 0, 1, 'Lunch?',
            1600000000, 'alice@proton.me')"#,
        [],
    )
    .unwrap();
    conn.execute(
        "INSERT INTO notification VALUES (?1, ?2)",
        params!["You have a new message", "New mail"],
    )
    .unwrap();
}

/// A complete proton.db with one row per table.
pub fn full_proton_db(path: &Path) {
    let conn = create_db(path, &ALL_TABLES);
    populate(&conn);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressEvent {
    Indeterminate,
    Determinate(usize),
    Progress(usize),
    Text(String),
}

/// Records every progress call. Optionally cancels the job once a given
/// file count is reported.
#[derive(Default)]
pub struct RecordingProgress {
    events: Mutex<Vec<ProgressEvent>>,
    cancel_at: Option<(usize, IngestJobContext)>,
}

impl RecordingProgress {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancelling_at(done: usize, context: IngestJobContext) -> Self {
        Self {
            events: Mutex::new(Vec::new()),
            cancel_at: Some((done, context)),
        }
    }

    pub fn events(&self) -> Vec<ProgressEvent> {
        self.events.lock().unwrap().clone()
    }
}

impl ProgressSink for RecordingProgress {
    fn switch_to_indeterminate(&self) {
        self.events.lock().unwrap().push(ProgressEvent::Indeterminate);
    }

    fn switch_to_determinate(&self, total: usize) {
        self.events
            .lock()
            .unwrap()
            .push(ProgressEvent::Determinate(total));
    }

    fn progress(&self, done: usize) {
        self.events.lock().unwrap().push(ProgressEvent::Progress(done));
        if let Some((at, context)) = &self.cancel_at {
            if *at == done {
                context.cancel();
            }
        }
    }

    fn progress_text(&self, text: &str) {
        self.events
            .lock()
            .unwrap()
            .push(ProgressEvent::Text(text.to_string()));
    }
}
