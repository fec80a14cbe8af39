//! SQL queries for proton.db.
//!
//! One fixed SELECT per source table. Columns are read back by name.

use crate::schema::ArtifactKind;

pub const CONTACT: &str = r#"
SELECT CreateTime, ModifyTime, Name
FROM contact
"#;

pub const CONTACT_DATA: &str = r#"
SELECT Name, PrimaryEmail
FROM contact_data
"#;

pub const CONTACT_EMAILS: &str = r#"
SELECT Name, Email
FROM contact_emails
"#;

pub const LABEL: &str = r#"
SELECT Name, Color
FROM label
"#;

pub const MESSAGE: &str = r#"
SELECT
    BCCListString,
    Body,
    CCListString,
    Header,
    IsDownloaded,
    IsEncrypted,
    IsForwarded,
    IsRead,
    IsReplied,
    IsRepliedAll,
    ReplyTosString,
    SenderAddress,
    SenderName,
    TotalSize,
    SpamScore,
    Starred,
    Subject,
    Time,
    ToListString
FROM message
"#;

pub const NOTIFICATION: &str = r#"
SELECT notification_body, notification_title
FROM notification
"#;

/// The SELECT for a record kind's source table.
pub fn select_for(kind: ArtifactKind) -> &'static str {
    match kind {
        ArtifactKind::Contact => CONTACT,
        ArtifactKind::ContactData => CONTACT_DATA,
        ArtifactKind::ContactEmails => CONTACT_EMAILS,
        ArtifactKind::ContactLabel => LABEL,
        ArtifactKind::ContactMessage => MESSAGE,
        ArtifactKind::ContactNotification => NOTIFICATION,
    }
}
