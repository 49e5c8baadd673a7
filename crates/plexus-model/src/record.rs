//! Base records and their type-specific extension documents.
//!
//! A `Record` is the base node for one external item (file, mail, ticket...).
//! Record types that carry extra fields have a companion document in a type
//! collection, joined to the base node by a single typing edge. Absence of a
//! type document is legal; such records live as the base variant only.

use serde::{Deserialize, Serialize};

use crate::Named;

// ============================================================================
// Enums
// ============================================================================

/// Kind of external item a record represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RecordType {
    File,
    Mail,
    Webpage,
    Ticket,
    Comment,
    Drive,
    Others,
}

impl RecordType {
    /// Record types without a type collection fall back to the base variant.
    pub fn has_type_collection(self) -> bool {
        !matches!(self, RecordType::Drive | RecordType::Others)
    }
}

/// Where a record entered the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Origin {
    /// Knowledge-base upload.
    Upload,
    /// Pulled from an external connector.
    Connector,
}

/// Closed set of source-system connectors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConnectorKind {
    KnowledgeBase,
    GoogleDrive,
    Gmail,
    Outlook,
}

/// Ingestion pipeline status for a record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IndexingStatus {
    #[default]
    NotStarted,
    InProgress,
    Completed,
    Failed,
    FileTypeNotSupported,
    AutoIndexOff,
}

// ============================================================================
// Base record
// ============================================================================

/// Base record node. Business fields originate in the ingestion pipeline;
/// this engine reads and retires them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    pub id: String,
    pub org_id: String,
    pub record_name: String,
    pub record_type: RecordType,
    pub external_record_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_parent_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_group_id: Option<String>,
    pub origin: Origin,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connector_name: Option<ConnectorKind>,
    #[serde(default)]
    pub indexing_status: IndexingStatus,
    #[serde(default)]
    pub version: i64,
    #[serde(default)]
    pub created_at_timestamp: i64,
    #[serde(default)]
    pub updated_at_timestamp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_created_at_timestamp: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_last_modified_timestamp: Option<i64>,
    #[serde(default)]
    pub is_deleted: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary_document_id: Option<String>,
}

impl Named for Record {
    const NAME: &'static str = "record";
}

impl Record {
    /// Connector this record is routed by: explicit connector name, or
    /// knowledge base for uploads without one.
    pub fn effective_connector(&self) -> ConnectorKind {
        match (self.origin, self.connector_name) {
            (_, Some(kind)) => kind,
            (Origin::Upload, None) => ConnectorKind::KnowledgeBase,
            (Origin::Connector, None) => ConnectorKind::KnowledgeBase,
        }
    }
}

// ============================================================================
// Type-specific documents
// ============================================================================

/// Extension document for FILE records.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileDocument {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extension: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size_in_bytes: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub web_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub md5_checksum: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub etag: Option<String>,
    #[serde(default)]
    pub is_file: bool,
}

impl Named for FileDocument {
    const NAME: &'static str = "file";
}

/// Extension document for MAIL records.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MailDocument {
    pub from: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub to: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub cc: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub bcc: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thread_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub internal_date: Option<i64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub label_ids: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body_preview: Option<String>,
}

impl Named for MailDocument {
    const NAME: &'static str = "mail";
}

impl MailDocument {
    /// True when `email` appears in any recipient list.
    pub fn is_recipient(&self, email: &str) -> bool {
        self.to.iter().chain(&self.cc).chain(&self.bcc).any(|r| r.eq_ignore_ascii_case(email))
    }

    /// True when `email` is the sender.
    pub fn is_sender(&self, email: &str) -> bool {
        self.from.eq_ignore_ascii_case(email)
    }
}

/// Extension document for WEBPAGE records.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebpageDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_crawled_at: Option<i64>,
}

impl Named for WebpageDocument {
    const NAME: &'static str = "webpage";
}

/// Extension document for TICKET records.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignee_email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reporter_email: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub labels: Vec<String>,
}

impl Named for TicketDocument {
    const NAME: &'static str = "ticket";
}

/// Extension document for COMMENT records.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author_email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_external_id: Option<String>,
}

impl Named for CommentDocument {
    const NAME: &'static str = "comment";
}

// ============================================================================
// Typed record
// ============================================================================

/// A base record together with its type-specific extension, when one exists.
///
/// The factory guarantees every reconstruction lands in one of these
/// variants; `Base` is the fallback when no type document is present or the
/// extension fails to parse.
#[derive(Debug, Clone, PartialEq)]
pub enum TypedRecord {
    Base(Record),
    File(Record, FileDocument),
    Mail(Record, MailDocument),
    Webpage(Record, WebpageDocument),
    Ticket(Record, TicketDocument),
    Comment(Record, CommentDocument),
}

impl TypedRecord {
    pub fn record(&self) -> &Record {
        match self {
            TypedRecord::Base(r)
            | TypedRecord::File(r, _)
            | TypedRecord::Mail(r, _)
            | TypedRecord::Webpage(r, _)
            | TypedRecord::Ticket(r, _)
            | TypedRecord::Comment(r, _) => r,
        }
    }

    pub fn into_record(self) -> Record {
        match self {
            TypedRecord::Base(r)
            | TypedRecord::File(r, _)
            | TypedRecord::Mail(r, _)
            | TypedRecord::Webpage(r, _)
            | TypedRecord::Ticket(r, _)
            | TypedRecord::Comment(r, _) => r,
        }
    }

    pub fn mail(&self) -> Option<&MailDocument> {
        match self {
            TypedRecord::Mail(_, m) => Some(m),
            _ => None,
        }
    }

    pub fn file(&self) -> Option<&FileDocument> {
        match self {
            TypedRecord::File(_, f) => Some(f),
            _ => None,
        }
    }

    /// Serialized type-specific document, when this variant carries one.
    pub fn to_type_document(&self) -> Option<crate::Document> {
        use crate::Entity;
        match self {
            TypedRecord::Base(_) => None,
            TypedRecord::File(_, d) => Some(d.to_native()),
            TypedRecord::Mail(_, d) => Some(d.to_native()),
            TypedRecord::Webpage(_, d) => Some(d.to_native()),
            TypedRecord::Ticket(_, d) => Some(d.to_native()),
            TypedRecord::Comment(_, d) => Some(d.to_native()),
        }
    }
}
