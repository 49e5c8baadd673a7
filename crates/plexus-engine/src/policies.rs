//! Connector deletion policies.
//!
//! Each connector pipeline is an immutable policy record: the roles allowed
//! to delete, the edge collections the pipeline must clean, and the document
//! collections holding its type-specific data. The table is process-wide
//! configuration, built once and selected by a pure mapping function.

use plexus_model::{ConnectorKind, Role};
use plexus_store::{EdgeCollection, NodeCollection};

/// Immutable deletion policy for one connector pipeline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConnectorPolicy {
    pub connector: ConnectorKind,
    pub allowed_roles: &'static [Role],
    pub edge_collections: &'static [EdgeCollection],
    pub document_collections: &'static [NodeCollection],
    /// Drive also retires the "anyone" record tied to the record.
    pub cleans_anyone: bool,
    /// Mail pipelines recursively delete ATTACHMENT children.
    pub cascades_attachments: bool,
}

static KNOWLEDGE_BASE: ConnectorPolicy = ConnectorPolicy {
    connector: ConnectorKind::KnowledgeBase,
    allowed_roles: &[Role::Owner, Role::Organizer, Role::FileOrganizer, Role::Writer],
    edge_collections: &[
        EdgeCollection::Permissions,
        EdgeCollection::BelongsTo,
        EdgeCollection::IsOfType,
        EdgeCollection::RecordRelations,
    ],
    document_collections: &[NodeCollection::Files],
    cleans_anyone: false,
    cascades_attachments: false,
};

static GOOGLE_DRIVE: ConnectorPolicy = ConnectorPolicy {
    connector: ConnectorKind::GoogleDrive,
    allowed_roles: &[Role::Owner, Role::Writer, Role::FileOrganizer],
    edge_collections: &[
        EdgeCollection::Permissions,
        EdgeCollection::BelongsTo,
        EdgeCollection::IsOfType,
        EdgeCollection::RecordRelations,
        EdgeCollection::UserDrive,
    ],
    document_collections: &[NodeCollection::Files],
    cleans_anyone: true,
    cascades_attachments: false,
};

static GMAIL: ConnectorPolicy = ConnectorPolicy {
    connector: ConnectorKind::Gmail,
    allowed_roles: &[Role::Owner, Role::Writer],
    edge_collections: &[
        EdgeCollection::Permissions,
        EdgeCollection::BelongsTo,
        EdgeCollection::IsOfType,
        EdgeCollection::RecordRelations,
    ],
    document_collections: &[NodeCollection::Mails],
    cleans_anyone: false,
    cascades_attachments: true,
};

/// Stricter mail pipeline: only an explicit OWNER grant may delete.
static OUTLOOK: ConnectorPolicy = ConnectorPolicy {
    connector: ConnectorKind::Outlook,
    allowed_roles: &[Role::Owner],
    edge_collections: &[
        EdgeCollection::Permissions,
        EdgeCollection::BelongsTo,
        EdgeCollection::IsOfType,
        EdgeCollection::RecordRelations,
    ],
    document_collections: &[NodeCollection::Mails],
    cleans_anyone: false,
    cascades_attachments: true,
};

/// Pure mapping from connector kind to its deletion policy.
pub fn policy_for(connector: ConnectorKind) -> &'static ConnectorPolicy {
    match connector {
        ConnectorKind::KnowledgeBase => &KNOWLEDGE_BASE,
        ConnectorKind::GoogleDrive => &GOOGLE_DRIVE,
        ConnectorKind::Gmail => &GMAIL,
        ConnectorKind::Outlook => &OUTLOOK,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_connector_has_a_policy() {
        for connector in [
            ConnectorKind::KnowledgeBase,
            ConnectorKind::GoogleDrive,
            ConnectorKind::Gmail,
            ConnectorKind::Outlook,
        ] {
            let policy = policy_for(connector);
            assert_eq!(policy.connector, connector);
            assert!(!policy.allowed_roles.is_empty());
            assert!(policy
                .edge_collections
                .contains(&EdgeCollection::Permissions));
        }
    }

    #[test]
    fn outlook_is_owner_only() {
        assert_eq!(policy_for(ConnectorKind::Outlook).allowed_roles, &[Role::Owner]);
    }

    #[test]
    fn only_drive_cleans_anyone_records() {
        assert!(policy_for(ConnectorKind::GoogleDrive).cleans_anyone);
        assert!(!policy_for(ConnectorKind::Gmail).cleans_anyone);
        assert!(!policy_for(ConnectorKind::KnowledgeBase).cleans_anyone);
    }
}
