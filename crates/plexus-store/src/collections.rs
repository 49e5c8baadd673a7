//! Logical collection kinds and their physical store names.
//!
//! The engine addresses collections through these enums; the physical name
//! appears exactly once, here, so a rename or store migration touches one
//! place.

use plexus_model::RecordType;
use serde::{Deserialize, Serialize};

/// Name of the working graph whose edge definitions drive the cascade.
pub const GRAPH_NAME: &str = "knowledgeGraph";

/// Node (document) collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeCollection {
    Records,
    Files,
    Mails,
    Webpages,
    Tickets,
    Comments,
    RecordGroups,
    Users,
    Groups,
    People,
    Orgs,
    Anyone,
    SyncPoints,
}

impl NodeCollection {
    pub fn as_str(self) -> &'static str {
        match self {
            NodeCollection::Records => "records",
            NodeCollection::Files => "files",
            NodeCollection::Mails => "mails",
            NodeCollection::Webpages => "webpages",
            NodeCollection::Tickets => "tickets",
            NodeCollection::Comments => "comments",
            NodeCollection::RecordGroups => "recordGroups",
            NodeCollection::Users => "users",
            NodeCollection::Groups => "groups",
            NodeCollection::People => "people",
            NodeCollection::Orgs => "organizations",
            NodeCollection::Anyone => "anyone",
            NodeCollection::SyncPoints => "syncPoints",
        }
    }

    /// Type collection for a record type, when one exists. Types without an
    /// entry fall back to the base record variant.
    pub fn for_record_type(record_type: RecordType) -> Option<NodeCollection> {
        match record_type {
            RecordType::File => Some(NodeCollection::Files),
            RecordType::Mail => Some(NodeCollection::Mails),
            RecordType::Webpage => Some(NodeCollection::Webpages),
            RecordType::Ticket => Some(NodeCollection::Tickets),
            RecordType::Comment => Some(NodeCollection::Comments),
            RecordType::Drive | RecordType::Others => None,
        }
    }
}

impl std::fmt::Display for NodeCollection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Edge collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EdgeCollection {
    IsOfType,
    BelongsTo,
    Permissions,
    RecordRelations,
    UserDrive,
}

impl EdgeCollection {
    pub fn as_str(self) -> &'static str {
        match self {
            EdgeCollection::IsOfType => "isOfType",
            EdgeCollection::BelongsTo => "belongsTo",
            EdgeCollection::Permissions => "permissions",
            EdgeCollection::RecordRelations => "recordRelations",
            EdgeCollection::UserDrive => "userDriveRelation",
        }
    }

    pub fn all() -> [EdgeCollection; 5] {
        [
            EdgeCollection::IsOfType,
            EdgeCollection::BelongsTo,
            EdgeCollection::Permissions,
            EdgeCollection::RecordRelations,
            EdgeCollection::UserDrive,
        ]
    }
}

impl std::fmt::Display for EdgeCollection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One edge definition of the working graph, as reported by the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeDefinition {
    pub edge_collection: String,
    pub from: Vec<String>,
    pub to: Vec<String>,
}

/// Edge definitions used when the graph schema lookup fails: every edge
/// collection this schema ships, so the cascade cannot miss one it knows
/// about.
pub fn fallback_edge_definitions() -> Vec<EdgeDefinition> {
    EdgeCollection::all()
        .into_iter()
        .map(|edge| EdgeDefinition {
            edge_collection: edge.as_str().to_string(),
            from: Vec::new(),
            to: Vec::new(),
        })
        .collect()
}

/// Composite document reference of the form `"collection/key"`.
pub fn document_ref(collection: &str, key: &str) -> String {
    format!("{collection}/{key}")
}
