//! Plexus data model
//!
//! Typed surface for everything the graph store persists: base records and
//! their type-specific extensions, principals (users, groups, orgs),
//! permission grants, record groups and sync checkpoints.
//!
//! This crate is a leaf: no I/O, no store knowledge. Every persisted type
//! implements the [`Entity`] seam (construction "from native document" and
//! serialization "to native document") which the store and engine crates
//! build on for typed-record reconstruction and batch upserts.

pub mod permission;
pub mod principal;
pub mod record;
pub mod sync_point;

pub use permission::{AnyoneAccess, Permission, PermissionType, Role, SourcePermission};
pub use principal::{Org, RecordGroup, User, UserGroup};
pub use record::{
    CommentDocument, ConnectorKind, FileDocument, IndexingStatus, MailDocument, Origin, Record,
    RecordType, TicketDocument, TypedRecord, WebpageDocument,
};
pub use sync_point::SyncPoint;

use serde::{de::DeserializeOwned, Serialize};

/// Native document shape: a flat JSON object as the graph store returns it.
pub type Document = serde_json::Map<String, serde_json::Value>;

/// Errors raised while (de)serializing model entities.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("malformed {entity} document: {source}")]
    Malformed {
        entity: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error("document is missing required field `{0}`")]
    MissingField(&'static str),
}

/// The (de)serialization seam between model types and native documents.
///
/// `from_native` expects a document already passed through the store's
/// translation layer (`id` present, `_key` stripped).
pub trait Entity: Sized {
    const ENTITY_NAME: &'static str;

    fn from_native(doc: &Document) -> Result<Self, ModelError>;
    fn to_native(&self) -> Document;
}

impl<T> Entity for T
where
    T: Serialize + DeserializeOwned + Named,
{
    const ENTITY_NAME: &'static str = T::NAME;

    fn from_native(doc: &Document) -> Result<Self, ModelError> {
        serde_json::from_value(serde_json::Value::Object(doc.clone())).map_err(|source| {
            ModelError::Malformed {
                entity: T::NAME,
                source,
            }
        })
    }

    fn to_native(&self) -> Document {
        match serde_json::to_value(self) {
            Ok(serde_json::Value::Object(map)) => map,
            // Model types are structs with named fields; anything else is a bug.
            _ => Document::new(),
        }
    }
}

/// Marker supplying the entity name used in error messages.
pub trait Named {
    const NAME: &'static str;
}

/// Current wall-clock time in epoch milliseconds, the timestamp unit used
/// across all persisted documents.
pub fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
