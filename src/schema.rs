//! Record kinds, their fields, and registration against a case store.
//!
//! Registration runs at the start of every ingest. Creating a type that
//! already exists resolves it by name instead; any other store failure
//! aborts the run.
//!
//! CHANGELOG:
//! - 10/19/2026 - Check value types of pre-existing attribute types
//! - 10/19/2026 - Initial registrar

use serde::Serialize;
use tracing::{debug, info};

use crate::case::{ArtifactTypeId, AttributeTypeId, CaseStore, ValueType};
use crate::config::ModuleInfo;
use crate::error::SchemaError;

/// One source column mapped to one attribute type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDef {
    pub column: &'static str,
    pub type_name: &'static str,
    pub value_type: ValueType,
    pub display_name: &'static str,
}

const fn string(column: &'static str, type_name: &'static str, display: &'static str) -> FieldDef {
    FieldDef {
        column,
        type_name,
        value_type: ValueType::String,
        display_name: display,
    }
}

const fn datetime(
    column: &'static str,
    type_name: &'static str,
    display: &'static str,
) -> FieldDef {
    FieldDef {
        column,
        type_name,
        value_type: ValueType::DateTime,
        display_name: display,
    }
}

const CONTACT_FIELDS: &[FieldDef] = &[
    string("Name", "TSK_PM_CONTACT_NAME", "Name"),
    datetime("CreateTime", "TSK_PM_CONTACT_CREATETIME", "Create Time"),
    datetime("ModifyTime", "TSK_PM_CONTACT_MODIFYTIME", "Modify Time"),
];

const CONTACT_DATA_FIELDS: &[FieldDef] = &[
    string("Name", "TSK_PM_CONTACTDATA_NAME", "Name"),
    string("PrimaryEmail", "TSK_PM_CONTACTDATA_PRIMARYEMAIL", "Primary Email"),
];

const CONTACT_EMAILS_FIELDS: &[FieldDef] = &[
    string("Name", "TSK_PM_CONTACTEMAILS_NAME", "Name"),
    string("Email", "TSK_PM_CONTACTEMAILS_EMAIL", "Email"),
];

const LABEL_FIELDS: &[FieldDef] = &[
    string("Name", "TSK_PM_CONTACTLABEL_NAME", "Name"),
    string("Color", "TSK_PM_CONTACTLABEL_COLOR", "Color"),
];

const MESSAGE_FIELDS: &[FieldDef] = &[
    datetime("Time", "TSK_PM_CONTACTMESSAGE_TIME", "Time"),
    string("ToListString", "TSK_PM_CONTACTMESSAGE_TO", "To"),
    string("ReplyTosString", "TSK_PM_CONTACTMESSAGE_REPLYTO", "Reply To"),
    string("SenderName", "TSK_PM_CONTACTMESSAGE_SENDERNAME", "From"),
    string("SenderAddress", "TSK_PM_CONTACTMESSAGE_SENDERADDRESS", "Sender Address"),
    string("Subject", "TSK_PM_CONTACTMESSAGE_SUBJECT", "Subject"),
    string("Body", "TSK_PM_CONTACTMESSAGE_BODY", "Body"),
    string("Header", "TSK_PM_CONTACTMESSAGE_HEADER", "Header"),
    string("TotalSize", "TSK_PM_CONTACTMESSAGE_TOTALSIZE", "Total Size"),
    string("BCCListString", "TSK_PM_CONTACTMESSAGE_BCCLIST", "BCC List"),
    string("CCListString", "TSK_PM_CONTACTMESSAGE_CCLIST", "CC List"),
    string("IsDownloaded", "TSK_PM_CONTACTMESSAGE_ISDOWNLOADED", "Is Downloaded?"),
    string("IsEncrypted", "TSK_PM_CONTACTMESSAGE_ISENCRYPTED", "Is Encrypted?"),
    string("IsForwarded", "TSK_PM_CONTACTMESSAGE_ISFORWARDED", "Is Forwarded?"),
    string("IsRead", "TSK_PM_CONTACTMESSAGE_ISREAD", "Is Read?"),
    string("IsReplied", "TSK_PM_CONTACTMESSAGE_ISREPLIED", "Is Replied?"),
    string("IsRepliedAll", "TSK_PM_CONTACTMESSAGE_ISREPLIEDALL", "Is Replied All?"),
    string("SpamScore", "TSK_PM_CONTACTMESSAGE_SPAMSCORE", "Spam Score"),
    string("Starred", "TSK_PM_CONTACTMESSAGE_STARRED", "Starred"),
];

const NOTIFICATION_FIELDS: &[FieldDef] = &[
    string(
        "notification_title",
        "TSK_PM_CONTACTNOTIFICATION_NOTIFICATIONTITLE",
        "Notification Title",
    ),
    string(
        "notification_body",
        "TSK_PM_CONTACTNOTIFICATION_NOTIFICATIONBODY",
        "Notification Body",
    ),
];

/// The six record kinds, one per source table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ArtifactKind {
    Contact,
    ContactData,
    ContactEmails,
    ContactLabel,
    ContactMessage,
    ContactNotification,
}

impl ArtifactKind {
    /// Extraction order.
    pub const ALL: [ArtifactKind; 6] = [
        ArtifactKind::Contact,
        ArtifactKind::ContactData,
        ArtifactKind::ContactEmails,
        ArtifactKind::ContactLabel,
        ArtifactKind::ContactMessage,
        ArtifactKind::ContactNotification,
    ];

    pub fn type_name(self) -> &'static str {
        match self {
            ArtifactKind::Contact => "TSK_PM_CONTACT",
            ArtifactKind::ContactData => "TSK_PM_CONTACTDATA",
            ArtifactKind::ContactEmails => "TSK_PM_CONTACTEMAILS",
            ArtifactKind::ContactLabel => "TSK_PM_CONTACTLABEL",
            ArtifactKind::ContactMessage => "TSK_PM_CONTACTMESSAGE",
            ArtifactKind::ContactNotification => "TSK_PM_CONTACTNOTIFICATION",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            ArtifactKind::Contact => "ProtonMail Contact",
            ArtifactKind::ContactData => "ProtonMail Contact Data",
            ArtifactKind::ContactEmails => "ProtonMail Contact Emails",
            ArtifactKind::ContactLabel => "ProtonMail User Labels",
            ArtifactKind::ContactMessage => "ProtonMail Messages",
            ArtifactKind::ContactNotification => "ProtonMail Notifications",
        }
    }

    /// Source table in proton.db.
    pub fn table(self) -> &'static str {
        match self {
            ArtifactKind::Contact => "contact",
            ArtifactKind::ContactData => "contact_data",
            ArtifactKind::ContactEmails => "contact_emails",
            ArtifactKind::ContactLabel => "label",
            ArtifactKind::ContactMessage => "message",
            ArtifactKind::ContactNotification => "notification",
        }
    }

    /// Attributes attached to each record, in attachment order.
    pub fn fields(self) -> &'static [FieldDef] {
        match self {
            ArtifactKind::Contact => CONTACT_FIELDS,
            ArtifactKind::ContactData => CONTACT_DATA_FIELDS,
            ArtifactKind::ContactEmails => CONTACT_EMAILS_FIELDS,
            ArtifactKind::ContactLabel => LABEL_FIELDS,
            ArtifactKind::ContactMessage => MESSAGE_FIELDS,
            ArtifactKind::ContactNotification => NOTIFICATION_FIELDS,
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

/// Store identifiers for one kind; `fields` is parallel to `ArtifactKind::fields`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedKind {
    pub artifact_type: ArtifactTypeId,
    pub fields: Vec<AttributeTypeId>,
}

/// Identifiers for every kind and field, resolved against one store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registry {
    kinds: Vec<ResolvedKind>,
}

impl Registry {
    pub fn kind(&self, kind: ArtifactKind) -> &ResolvedKind {
        &self.kinds[kind.index()]
    }
}

/// Make sure every kind and field exists in `store`, and resolve their ids.
pub fn register(store: &dyn CaseStore, module: &ModuleInfo) -> Result<Registry, SchemaError> {
    info!(module = module.name, "Registering artifact and attribute types");

    let mut kinds = Vec::with_capacity(ArtifactKind::ALL.len());
    for kind in ArtifactKind::ALL {
        let artifact_type = ensure_artifact_type(store, kind)?;
        let fields = kind
            .fields()
            .iter()
            .map(|field| ensure_attribute_type(store, field))
            .collect::<Result<Vec<_>, _>>()?;
        kinds.push(ResolvedKind {
            artifact_type,
            fields,
        });
    }

    Ok(Registry { kinds })
}

fn ensure_artifact_type(
    store: &dyn CaseStore,
    kind: ArtifactKind,
) -> Result<ArtifactTypeId, SchemaError> {
    let name = kind.type_name();
    match store.add_artifact_type(name, kind.display_name()) {
        Ok(id) => {
            debug!("Created artifact type {}", name);
            Ok(id)
        }
        Err(e) if e.is_already_exists() => {
            debug!("Artifact type {} already exists", name);
            store
                .artifact_type(name)
                .map_err(|source| SchemaError::Registration {
                    kind: "artifact type",
                    name: name.to_string(),
                    source,
                })?
                .ok_or_else(|| SchemaError::Unresolved {
                    kind: "artifact type",
                    name: name.to_string(),
                })
        }
        Err(source) => Err(SchemaError::Registration {
            kind: "artifact type",
            name: name.to_string(),
            source,
        }),
    }
}

fn ensure_attribute_type(
    store: &dyn CaseStore,
    field: &FieldDef,
) -> Result<AttributeTypeId, SchemaError> {
    let name = field.type_name;
    match store.add_attribute_type(name, field.value_type, field.display_name) {
        Ok(created) => Ok(created.id),
        Err(e) if e.is_already_exists() => {
            let existing = store
                .attribute_type(name)
                .map_err(|source| SchemaError::Registration {
                    kind: "attribute type",
                    name: name.to_string(),
                    source,
                })?
                .ok_or_else(|| SchemaError::Unresolved {
                    kind: "attribute type",
                    name: name.to_string(),
                })?;
            if existing.value_type != field.value_type {
                return Err(SchemaError::ValueTypeConflict {
                    name: name.to_string(),
                    existing: existing.value_type,
                    expected: field.value_type,
                });
            }
            Ok(existing.id)
        }
        Err(source) => Err(SchemaError::Registration {
            kind: "attribute type",
            name: name.to_string(),
            source,
        }),
    }
}
