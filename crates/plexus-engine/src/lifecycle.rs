//! Cascading lifecycle manager.
//!
//! Two layers: a generic schema-driven cascade (`delete_nodes_and_edges`)
//! used for bulk deletes, and the connector-specific `delete_record` entry
//! point that retires one record on behalf of a user:
//!
//! ```text
//! start → lookup record → route by connector → authorize → execute → result
//! ```
//!
//! `delete_record` never returns an error: every path ends in a structured
//! [`DeleteOutcome`] (200 / 404 / 403 / 500). The execution phase runs in a
//! store transaction; any step failure aborts it and surfaces as code 500.

use plexus_model::{
    AnyoneAccess, ConnectorKind, Entity, Permission, Record, Role, TypedRecord, User,
};
use plexus_store::{
    collections::{document_ref, fallback_edge_definitions},
    query::Query,
    EdgeCollection, NodeCollection, StoreError, TransactionId, GRAPH_NAME,
};
use serde_json::Value;

use crate::graph::Direction;
use crate::policies::{policy_for, ConnectorPolicy};
use crate::GraphProvider;

/// Typed relation value marking attachment children in RECORD_RELATIONS.
const RELATION_ATTACHMENT: &str = "ATTACHMENT";

/// Structured outcome of a record deletion. Callers distinguish not-found,
/// unauthorized and internal failure from success; nothing is silently
/// dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteOutcome {
    pub success: bool,
    pub code: u16,
    pub reason: Option<String>,
    pub attachments_deleted: usize,
}

impl DeleteOutcome {
    pub fn ok(attachments_deleted: usize) -> Self {
        Self {
            success: true,
            code: 200,
            reason: None,
            attachments_deleted,
        }
    }

    pub fn not_found(reason: impl Into<String>) -> Self {
        Self {
            success: false,
            code: 404,
            reason: Some(reason.into()),
            attachments_deleted: 0,
        }
    }

    pub fn forbidden(reason: impl Into<String>) -> Self {
        Self {
            success: false,
            code: 403,
            reason: Some(reason.into()),
            attachments_deleted: 0,
        }
    }

    pub fn internal(reason: impl Into<String>) -> Self {
        Self {
            success: false,
            code: 500,
            reason: Some(reason.into()),
            attachments_deleted: 0,
        }
    }
}

impl GraphProvider {
    /// Generic cascade: delete `keys` from `collection` together with every
    /// edge in the working graph that references them.
    ///
    /// Edge collections come from the graph's declared edge definitions,
    /// falling back to the full known list when the schema lookup fails.
    /// Without a transaction, a single edge collection's failure is logged
    /// and the cascade continues; node deletion failures are always fatal.
    pub async fn delete_nodes_and_edges(
        &self,
        collection: NodeCollection,
        keys: &[String],
        txn: Option<&TransactionId>,
    ) -> Result<usize, StoreError> {
        if keys.is_empty() {
            return Ok(0);
        }
        let definitions = match self.executor().get_graph_edge_definitions(GRAPH_NAME).await {
            Ok(Some(definitions)) => definitions,
            Ok(None) => {
                tracing::warn!(graph = GRAPH_NAME, "graph schema unavailable; using fallback edge list");
                fallback_edge_definitions()
            }
            Err(err) => {
                tracing::warn!(graph = GRAPH_NAME, error = %err, "graph schema lookup failed; using fallback edge list");
                fallback_edge_definitions()
            }
        };

        let refs: Vec<Value> = keys
            .iter()
            .map(|key| Value::String(document_ref(collection.as_str(), key)))
            .collect();

        for definition in &definitions {
            let query = Query::remove(&definition.edge_collection)
                .filter_any_in(["_from", "_to"], refs.clone());
            match self.executor().execute_query(&query, txn).await {
                Ok(_) => {}
                Err(err) if txn.is_none() => {
                    tracing::warn!(
                        edge_collection = %definition.edge_collection,
                        error = %err,
                        "edge cleanup failed; continuing cascade"
                    );
                }
                Err(err) => return Err(err),
            }
        }

        self.executor()
            .batch_delete_documents(collection.as_str(), keys, txn)
            .await
    }

    /// Retire one record on behalf of a user. Routes by connector, checks
    /// the pipeline's role policy, then deletes the record, its type
    /// document, its attachment children and every edge referencing it.
    pub async fn delete_record(&self, record_key: &str, user_key: &str) -> DeleteOutcome {
        match self.delete_record_inner(record_key, user_key).await {
            Ok(outcome) => outcome,
            Err(err) => {
                tracing::error!(record = %record_key, error = %err, "record deletion failed");
                DeleteOutcome::internal(err.to_string())
            }
        }
    }

    /// Resolve a record by its source-system identity, then retire it.
    pub async fn delete_record_by_external_id(
        &self,
        connector: ConnectorKind,
        external_id: &str,
        user_key: &str,
    ) -> DeleteOutcome {
        let typed = match self.get_record_by_external_id(connector, external_id, None).await {
            Ok(Some(typed)) => typed,
            Ok(None) => return DeleteOutcome::not_found("record not found"),
            Err(err) => return DeleteOutcome::internal(err.to_string()),
        };
        let key = typed.record().id.clone();
        self.delete_record(&key, user_key).await
    }

    /// Drop one user's permission edge on a record. When no live grants
    /// remain afterwards, the record is retired through the generic cascade.
    pub async fn remove_user_access_to_record(
        &self,
        record_key: &str,
        user_key: &str,
        txn: Option<&TransactionId>,
    ) -> Result<(), StoreError> {
        if let Some(edge) = self
            .get_edge(
                EdgeCollection::Permissions,
                (NodeCollection::Users, user_key),
                (NodeCollection::Records, record_key),
                txn,
            )
            .await?
        {
            let stored = Permission::from_native(&edge)?;
            self.delete_edge(EdgeCollection::Permissions, &stored.id, txn)
                .await?;
        }

        let remaining = self.permissions_on_record(record_key, txn).await?;
        if remaining.iter().any(|p| p.active) {
            return Ok(());
        }

        let Some(typed) = self.get_record(record_key, txn).await? else {
            return Ok(());
        };
        let record = typed.record();
        self.remove_anyone_access(record_key, &record.org_id, txn)
            .await?;
        if let Some(collection) = NodeCollection::for_record_type(record.record_type) {
            self.delete_nodes(collection, &[record_key.to_string()], txn)
                .await?;
        }
        self.delete_nodes_and_edges(NodeCollection::Records, &[record_key.to_string()], txn)
            .await?;
        Ok(())
    }

    async fn delete_record_inner(
        &self,
        record_key: &str,
        user_key: &str,
    ) -> Result<DeleteOutcome, StoreError> {
        let Some(typed) = self.get_record(record_key, None).await? else {
            return Ok(DeleteOutcome::not_found("record not found"));
        };
        let Some(user_doc) = self.get_document(NodeCollection::Users, user_key, None).await? else {
            return Ok(DeleteOutcome::not_found("user not found"));
        };
        let user = User::from_native(&user_doc)?;

        let record = typed.record().clone();
        let policy = policy_for(record.effective_connector());

        let role = self.resolve_role(policy, &record, &typed, &user).await?;
        let Some(role) = role.filter(|r| policy.allowed_roles.contains(r)) else {
            tracing::warn!(
                record = %record.id,
                user = %user.id,
                connector = ?policy.connector,
                role = ?role,
                "deletion denied by connector role policy"
            );
            return Ok(DeleteOutcome::forbidden(
                "user role does not permit deletion",
            ));
        };
        tracing::debug!(record = %record.id, user = %user.id, role = ?role, "deletion authorized");

        let txn = self
            .executor()
            .begin_transaction(&[], &write_collections())
            .await?;
        match self.execute_deletion(policy, &record, &txn).await {
            Ok(attachments_deleted) => {
                self.executor().commit_transaction(&txn).await?;
                Ok(DeleteOutcome::ok(attachments_deleted))
            }
            Err(err) => {
                if let Err(abort_err) = self.executor().abort_transaction(&txn).await {
                    tracing::error!(error = %abort_err, "failed to abort deletion transaction");
                }
                Err(err)
            }
        }
    }

    /// The execution phase, entirely inside `txn`: every failure re-raises
    /// so the caller aborts.
    async fn execute_deletion(
        &self,
        policy: &ConnectorPolicy,
        record: &Record,
        txn: &TransactionId,
    ) -> Result<usize, StoreError> {
        // Attachment children must be discovered before their relation
        // edges are removed below.
        let attachment_keys = if policy.cascades_attachments {
            self.attachment_children(&record.id, Some(txn)).await?
        } else {
            Vec::new()
        };

        let record_ref = document_ref(NodeCollection::Records.as_str(), &record.id);
        for edge in policy.edge_collections {
            let query =
                Query::remove(edge.as_str()).filter_any_eq(["_from", "_to"], record_ref.clone());
            self.executor().execute_query(&query, Some(txn)).await?;
        }

        if policy.cleans_anyone {
            self.remove_anyone_access(&record.id, &record.org_id, Some(txn))
                .await?;
        }

        let attachments_deleted = attachment_keys.len();
        for child_key in attachment_keys {
            self.delete_child_record(&child_key, txn).await?;
        }

        for collection in policy.document_collections {
            self.delete_nodes(*collection, &[record.id.clone()], Some(txn))
                .await?;
        }

        let deleted = self
            .delete_nodes(NodeCollection::Records, &[record.id.clone()], Some(txn))
            .await?;
        if deleted == 0 {
            return Err(StoreError::not_found(
                NodeCollection::Records.as_str(),
                record.id.clone(),
            ));
        }
        Ok(attachments_deleted)
    }

    /// Delete one attachment child: its type document, then the child node
    /// with every edge referencing it.
    async fn delete_child_record(
        &self,
        child_key: &str,
        txn: &TransactionId,
    ) -> Result<(), StoreError> {
        if let Some(child) = self.get_record(child_key, Some(txn)).await? {
            if let Some(collection) = NodeCollection::for_record_type(child.record().record_type) {
                self.delete_nodes(collection, &[child_key.to_string()], Some(txn))
                    .await?;
            }
        }
        self.delete_nodes_and_edges(NodeCollection::Records, &[child_key.to_string()], Some(txn))
            .await?;
        Ok(())
    }

    /// Keys of records attached to `record_key` via RECORD_RELATIONS edges
    /// of type ATTACHMENT.
    async fn attachment_children(
        &self,
        record_key: &str,
        txn: Option<&TransactionId>,
    ) -> Result<Vec<String>, StoreError> {
        let query = Query::fetch(EdgeCollection::RecordRelations.as_str())
            .filter_eq(
                "_from",
                document_ref(NodeCollection::Records.as_str(), record_key),
            )
            .filter_eq("relationshipType", RELATION_ATTACHMENT)
            .returning_field("_to");
        let rows = self.executor().execute_query(&query, txn).await?;
        Ok(rows
            .into_iter()
            .filter_map(|row| match row {
                Value::String(composite) => composite
                    .split_once('/')
                    .map(|(_, key)| key.to_string()),
                _ => None,
            })
            .collect())
    }

    /// Connector-specific permission resolution for the acting user.
    async fn resolve_role(
        &self,
        policy: &ConnectorPolicy,
        record: &Record,
        typed: &TypedRecord,
        user: &User,
    ) -> Result<Option<Role>, StoreError> {
        match policy.connector {
            // Knowledge base: the user's role on the owning record group.
            ConnectorKind::KnowledgeBase => self.record_group_role(record, user).await,
            // Drive: direct → group → domain → anyone, first match wins.
            ConnectorKind::GoogleDrive => {
                if let Some(role) = self
                    .direct_role((NodeCollection::Users, &user.id), &record.id)
                    .await?
                {
                    return Ok(Some(role));
                }
                if let Some(role) = self.group_role(record, user).await? {
                    return Ok(Some(role));
                }
                if let Some(role) = self
                    .direct_role((NodeCollection::Orgs, &record.org_id), &record.id)
                    .await?
                {
                    return Ok(Some(role));
                }
                self.anyone_role(record).await
            }
            // Mail: sender owns, recipients may write, else any direct edge.
            ConnectorKind::Gmail => {
                if let Some(mail) = typed.mail() {
                    if mail.is_sender(&user.email) {
                        return Ok(Some(Role::Owner));
                    }
                    if mail.is_recipient(&user.email) {
                        return Ok(Some(Role::Writer));
                    }
                }
                self.direct_role((NodeCollection::Users, &user.id), &record.id)
                    .await
            }
            // Strict mail pipeline: only an explicit grant counts.
            ConnectorKind::Outlook => {
                self.direct_role((NodeCollection::Users, &user.id), &record.id)
                    .await
            }
        }
    }

    /// Role carried by the live permission edge principal → record, if any.
    async fn direct_role(
        &self,
        principal: (NodeCollection, &str),
        record_key: &str,
    ) -> Result<Option<Role>, StoreError> {
        let Some(edge) = self
            .get_edge(
                EdgeCollection::Permissions,
                principal,
                (NodeCollection::Records, record_key),
                None,
            )
            .await?
        else {
            return Ok(None);
        };
        let permission = Permission::from_native(&edge)?;
        Ok(permission.active.then_some(permission.role))
    }

    /// Best role among the user's group memberships.
    async fn group_role(&self, record: &Record, user: &User) -> Result<Option<Role>, StoreError> {
        let group_refs = self
            .related_refs(
                (NodeCollection::Users, &user.id),
                EdgeCollection::BelongsTo,
                Direction::Out,
                None,
            )
            .await?;
        for composite in group_refs {
            let Some((collection, key)) = composite.split_once('/') else {
                continue;
            };
            if collection != NodeCollection::Groups.as_str() {
                continue;
            }
            if let Some(role) = self
                .direct_role((NodeCollection::Groups, key), &record.id)
                .await?
            {
                return Ok(Some(role));
            }
        }
        Ok(None)
    }

    /// Role granted by the record's anonymous-access record, if live.
    async fn anyone_role(&self, record: &Record) -> Result<Option<Role>, StoreError> {
        let key = AnyoneAccess::key_for(&record.id, &record.org_id);
        let Some(doc) = self.get_document(NodeCollection::Anyone, &key, None).await? else {
            return Ok(None);
        };
        let access = AnyoneAccess::from_native(&doc)?;
        Ok(access.active.then_some(access.role))
    }

    /// Knowledge-base resolution: role on the record group the record
    /// belongs to.
    async fn record_group_role(
        &self,
        record: &Record,
        user: &User,
    ) -> Result<Option<Role>, StoreError> {
        let group_refs = self
            .related_refs(
                (NodeCollection::Records, &record.id),
                EdgeCollection::BelongsTo,
                Direction::Out,
                None,
            )
            .await?;
        for composite in group_refs {
            let Some((collection, key)) = composite.split_once('/') else {
                continue;
            };
            if collection != NodeCollection::RecordGroups.as_str() {
                continue;
            }
            let Some(edge) = self
                .get_edge(
                    EdgeCollection::Permissions,
                    (NodeCollection::Users, &user.id),
                    (NodeCollection::RecordGroups, key),
                    None,
                )
                .await?
            else {
                continue;
            };
            let permission = Permission::from_native(&edge)?;
            if permission.active {
                return Ok(Some(permission.role));
            }
        }
        Ok(None)
    }
}

/// Every collection a deletion may touch; declared up front so the store
/// transaction covers the whole cascade.
fn write_collections() -> Vec<&'static str> {
    let mut collections: Vec<&'static str> = vec![
        NodeCollection::Records.as_str(),
        NodeCollection::Files.as_str(),
        NodeCollection::Mails.as_str(),
        NodeCollection::Webpages.as_str(),
        NodeCollection::Tickets.as_str(),
        NodeCollection::Comments.as_str(),
        NodeCollection::Anyone.as_str(),
    ];
    collections.extend(EdgeCollection::all().map(|e| e.as_str()));
    collections
}

#[cfg(test)]
mod tests {
    use super::*;
    use plexus_model::{
        FileDocument, IndexingStatus, MailDocument, Origin, PermissionType, RecordType,
        SourcePermission, TypedRecord,
    };
    use plexus_store::MemoryExecutor;
    use serde_json::json;
    use std::sync::Arc;

    fn doc(value: Value) -> plexus_model::Document {
        value.as_object().unwrap().clone()
    }

    fn record(key: &str, record_type: RecordType, connector: ConnectorKind) -> Record {
        Record {
            id: key.to_string(),
            org_id: "org1".into(),
            record_name: format!("record {key}"),
            record_type,
            external_record_id: format!("ext-{key}"),
            external_parent_id: None,
            external_group_id: None,
            origin: if connector == ConnectorKind::KnowledgeBase {
                Origin::Upload
            } else {
                Origin::Connector
            },
            connector_name: Some(connector),
            indexing_status: IndexingStatus::Completed,
            version: 1,
            created_at_timestamp: 1,
            updated_at_timestamp: 1,
            source_created_at_timestamp: None,
            source_last_modified_timestamp: None,
            is_deleted: false,
            summary_document_id: None,
        }
    }

    fn grant(external_id: &str, kind: PermissionType, role: Role, email: Option<&str>) -> SourcePermission {
        SourcePermission {
            external_id: external_id.into(),
            kind,
            role,
            email: email.map(Into::into),
            active: true,
            details: None,
        }
    }

    async fn setup() -> (Arc<MemoryExecutor>, GraphProvider) {
        let executor = Arc::new(MemoryExecutor::new());
        let provider = GraphProvider::new(executor.clone());
        provider
            .batch_upsert_nodes(
                NodeCollection::Users,
                vec![
                    doc(json!({"id": "u1", "orgId": "org1", "email": "alice@example.com"})),
                    doc(json!({"id": "u2", "orgId": "org1", "email": "bob@example.com"})),
                ],
                None,
            )
            .await
            .unwrap();
        (executor, provider)
    }

    async fn seed_drive_file(provider: &GraphProvider) -> Record {
        let base = record("r1", RecordType::File, ConnectorKind::GoogleDrive);
        provider
            .batch_upsert_records(
                &[TypedRecord::File(
                    base.clone(),
                    FileDocument {
                        name: "report.pdf".into(),
                        ..Default::default()
                    },
                )],
                None,
            )
            .await
            .unwrap();
        provider
            .process_file_permissions(
                &base,
                &[
                    grant("p1", PermissionType::User, Role::Owner, Some("alice@example.com")),
                    grant("pa", PermissionType::Anyone, Role::Reader, None),
                ],
                None,
            )
            .await
            .unwrap();
        base
    }

    #[tokio::test]
    async fn missing_record_is_a_404() {
        let (_, provider) = setup().await;
        let outcome = provider.delete_record("ghost", "u1").await;
        assert_eq!(outcome.code, 404);
        assert!(!outcome.success);
    }

    #[tokio::test]
    async fn missing_user_is_a_404() {
        let (_, provider) = setup().await;
        seed_drive_file(&provider).await;
        let outcome = provider.delete_record("r1", "ghost").await;
        assert_eq!(outcome.code, 404);
    }

    #[tokio::test]
    async fn unauthorized_role_is_a_403_and_deletes_nothing() {
        let (executor, provider) = setup().await;
        let base = seed_drive_file(&provider).await;
        // Bob only gets READER, which Drive's policy does not accept.
        provider
            .process_file_permissions(
                &base,
                &[
                    grant("p1", PermissionType::User, Role::Owner, Some("alice@example.com")),
                    grant("p2", PermissionType::User, Role::Reader, Some("bob@example.com")),
                    grant("pa", PermissionType::Anyone, Role::Reader, None),
                ],
                None,
            )
            .await
            .unwrap();

        let outcome = provider.delete_record("r1", "u2").await;
        assert_eq!(outcome.code, 403);
        assert!(!outcome.success);
        assert!(provider.get_record("r1", None).await.unwrap().is_some());
        assert_eq!(executor.len(NodeCollection::Files.as_str()), 1);
    }

    #[tokio::test]
    async fn drive_owner_delete_removes_record_edges_and_anyone() {
        let (executor, provider) = setup().await;
        seed_drive_file(&provider).await;
        assert_eq!(executor.len(NodeCollection::Anyone.as_str()), 1);

        let outcome = provider.delete_record("r1", "u1").await;
        assert!(outcome.success, "owner delete should succeed: {outcome:?}");

        assert!(provider
            .get_record_by_external_id(ConnectorKind::GoogleDrive, "ext-r1", None)
            .await
            .unwrap()
            .is_none());
        assert!(executor.is_empty(NodeCollection::Files.as_str()));
        assert!(executor.is_empty(NodeCollection::Anyone.as_str()));
        for edge in EdgeCollection::all() {
            assert!(
                executor.is_empty(edge.as_str()),
                "no edge referencing r1 may remain in {edge}"
            );
        }
    }

    #[tokio::test]
    async fn drive_anyone_grant_alone_does_not_allow_deletion() {
        let (_, provider) = setup().await;
        let base = seed_drive_file(&provider).await;
        // u2 has no direct/group/domain grant; anyone only carries READER.
        provider
            .process_file_permissions(
                &base,
                &[
                    grant("p1", PermissionType::User, Role::Owner, Some("alice@example.com")),
                    grant("pa", PermissionType::Anyone, Role::Reader, None),
                ],
                None,
            )
            .await
            .unwrap();
        let outcome = provider.delete_record("r1", "u2").await;
        assert_eq!(outcome.code, 403);
    }

    /// Puts u2 in group g1 and grants g1 `role` on r1.
    async fn seed_group_grant(provider: &GraphProvider, role: &str) {
        provider
            .batch_upsert_nodes(
                NodeCollection::Groups,
                vec![doc(json!({"id": "g1", "orgId": "org1", "mail": "eng@example.com"}))],
                None,
            )
            .await
            .unwrap();
        provider
            .batch_create_edges(
                EdgeCollection::BelongsTo,
                vec![doc(json!({
                    "id": "m1",
                    "fromId": "u2", "fromCollection": "users",
                    "toId": "g1", "toCollection": "groups"
                }))],
                None,
            )
            .await
            .unwrap();
        provider
            .batch_create_edges(
                EdgeCollection::Permissions,
                vec![doc(json!({
                    "id": "gperm",
                    "fromId": "g1", "fromCollection": "groups",
                    "toId": "r1", "toCollection": "records",
                    "type": "GROUP", "role": role
                }))],
                None,
            )
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn drive_group_membership_grants_the_group_role() {
        let (_, provider) = setup().await;
        seed_drive_file(&provider).await;
        seed_group_grant(&provider, "OWNER").await;

        // u2 holds no direct grant; OWNER arrives through g1.
        let outcome = provider.delete_record("r1", "u2").await;
        assert!(outcome.success, "group OWNER should authorize: {outcome:?}");
    }

    #[tokio::test]
    async fn drive_domain_grant_authorizes_org_members() {
        let (_, provider) = setup().await;
        seed_drive_file(&provider).await;
        provider
            .batch_upsert_nodes(
                NodeCollection::Orgs,
                vec![doc(json!({"id": "org1", "domain": "example.com"}))],
                None,
            )
            .await
            .unwrap();
        provider
            .batch_create_edges(
                EdgeCollection::Permissions,
                vec![doc(json!({
                    "id": "dperm",
                    "fromId": "org1", "fromCollection": "organizations",
                    "toId": "r1", "toCollection": "records",
                    "type": "DOMAIN", "role": "WRITER"
                }))],
                None,
            )
            .await
            .unwrap();

        // Neither a direct nor a group grant exists for u2.
        let outcome = provider.delete_record("r1", "u2").await;
        assert!(outcome.success, "domain WRITER should authorize: {outcome:?}");
    }

    #[tokio::test]
    async fn drive_direct_grant_shadows_a_stronger_group_role() {
        let (_, provider) = setup().await;
        let base = seed_drive_file(&provider).await;
        provider
            .process_file_permissions(
                &base,
                &[
                    grant("p1", PermissionType::User, Role::Owner, Some("alice@example.com")),
                    grant("p2", PermissionType::User, Role::Reader, Some("bob@example.com")),
                ],
                None,
            )
            .await
            .unwrap();
        seed_group_grant(&provider, "OWNER").await;

        // First match wins: u2's direct READER is consulted before the
        // group's OWNER, and READER does not permit deletion.
        let outcome = provider.delete_record("r1", "u2").await;
        assert_eq!(outcome.code, 403);
        assert!(provider.get_record("r1", None).await.unwrap().is_some());
    }

    async fn seed_mail_with_attachments(
        provider: &GraphProvider,
        connector: ConnectorKind,
    ) -> Record {
        let base = record("m1", RecordType::Mail, connector);
        let mail = MailDocument {
            from: "alice@example.com".into(),
            to: vec!["bob@example.com".into()],
            subject: Some("quarterly numbers".into()),
            ..Default::default()
        };
        let a1 = record("a1", RecordType::File, connector);
        let a2 = record("a2", RecordType::File, connector);
        provider
            .batch_upsert_records(
                &[
                    TypedRecord::Mail(base.clone(), mail),
                    TypedRecord::File(a1, FileDocument { name: "one.xlsx".into(), ..Default::default() }),
                    TypedRecord::File(a2, FileDocument { name: "two.xlsx".into(), ..Default::default() }),
                ],
                None,
            )
            .await
            .unwrap();
        provider
            .batch_create_edges(
                EdgeCollection::RecordRelations,
                vec![
                    doc(json!({
                        "id": "rel1", "relationshipType": "ATTACHMENT",
                        "fromId": "m1", "fromCollection": "records",
                        "toId": "a1", "toCollection": "records"
                    })),
                    doc(json!({
                        "id": "rel2", "relationshipType": "ATTACHMENT",
                        "fromId": "m1", "fromCollection": "records",
                        "toId": "a2", "toCollection": "records"
                    })),
                ],
                None,
            )
            .await
            .unwrap();
        base
    }

    #[tokio::test]
    async fn mail_delete_cascades_to_attachments() {
        let (executor, provider) = setup().await;
        seed_mail_with_attachments(&provider, ConnectorKind::Gmail).await;

        // Alice is the sender, so the pipeline derives OWNER.
        let outcome = provider.delete_record("m1", "u1").await;
        assert!(outcome.success, "{outcome:?}");
        assert_eq!(outcome.attachments_deleted, 2);

        assert!(executor.is_empty(NodeCollection::Mails.as_str()));
        assert!(executor.is_empty(NodeCollection::Files.as_str()));
        assert!(executor.is_empty(NodeCollection::Records.as_str()));
        assert!(executor.is_empty(EdgeCollection::RecordRelations.as_str()));
    }

    #[tokio::test]
    async fn mail_recipient_derives_writer_and_may_delete() {
        let (_, provider) = setup().await;
        seed_mail_with_attachments(&provider, ConnectorKind::Gmail).await;
        let outcome = provider.delete_record("m1", "u2").await;
        assert!(outcome.success, "recipient WRITER is allowed for gmail: {outcome:?}");
    }

    #[tokio::test]
    async fn strict_mail_pipeline_ignores_sender_heuristics() {
        let (_, provider) = setup().await;
        let base = seed_mail_with_attachments(&provider, ConnectorKind::Outlook).await;

        // Sender without an explicit OWNER edge is refused.
        let outcome = provider.delete_record("m1", "u1").await;
        assert_eq!(outcome.code, 403);

        provider
            .process_file_permissions(
                &base,
                &[grant("p1", PermissionType::User, Role::Owner, Some("alice@example.com"))],
                None,
            )
            .await
            .unwrap();
        let outcome = provider.delete_record("m1", "u1").await;
        assert!(outcome.success, "{outcome:?}");
    }

    #[tokio::test]
    async fn knowledge_base_role_comes_from_the_owning_group() {
        let (_, provider) = setup().await;
        let base = record("k1", RecordType::File, ConnectorKind::KnowledgeBase);
        provider
            .batch_upsert_records(
                &[TypedRecord::File(
                    base.clone(),
                    FileDocument { name: "notes.md".into(), ..Default::default() },
                )],
                None,
            )
            .await
            .unwrap();
        provider
            .batch_upsert_nodes(
                NodeCollection::RecordGroups,
                vec![doc(json!({
                    "id": "kb1", "orgId": "org1",
                    "groupName": "Team KB", "externalGroupId": "kb-ext"
                }))],
                None,
            )
            .await
            .unwrap();
        provider
            .batch_create_edges(
                EdgeCollection::BelongsTo,
                vec![doc(json!({
                    "id": "b1",
                    "fromId": "k1", "fromCollection": "records",
                    "toId": "kb1", "toCollection": "recordGroups"
                }))],
                None,
            )
            .await
            .unwrap();

        // Without a group role the delete is refused.
        assert_eq!(provider.delete_record("k1", "u1").await.code, 403);

        provider
            .batch_create_edges(
                EdgeCollection::Permissions,
                vec![doc(json!({
                    "id": "kperm",
                    "fromId": "u1", "fromCollection": "users",
                    "toId": "kb1", "toCollection": "recordGroups",
                    "type": "USER", "role": "WRITER"
                }))],
                None,
            )
            .await
            .unwrap();
        let outcome = provider.delete_record("k1", "u1").await;
        assert!(outcome.success, "{outcome:?}");
    }

    #[tokio::test]
    async fn generic_cascade_uses_fallback_when_schema_lookup_fails() {
        let executor = Arc::new(MemoryExecutor::without_graph_schema());
        let provider = GraphProvider::new(executor.clone());
        provider
            .batch_upsert_nodes(
                NodeCollection::Records,
                vec![doc(json!({"id": "r1"})), doc(json!({"id": "r2"}))],
                None,
            )
            .await
            .unwrap();
        provider
            .batch_create_edges(
                EdgeCollection::Permissions,
                vec![doc(json!({
                    "id": "e1",
                    "fromId": "u1", "fromCollection": "users",
                    "toId": "r1", "toCollection": "records"
                }))],
                None,
            )
            .await
            .unwrap();
        provider
            .batch_create_edges(
                EdgeCollection::BelongsTo,
                vec![doc(json!({
                    "id": "e2",
                    "fromId": "r2", "fromCollection": "records",
                    "toId": "r1", "toCollection": "records"
                }))],
                None,
            )
            .await
            .unwrap();

        let deleted = provider
            .delete_nodes_and_edges(NodeCollection::Records, &["r1".to_string()], None)
            .await
            .unwrap();
        assert_eq!(deleted, 1);
        assert!(executor.is_empty(EdgeCollection::Permissions.as_str()));
        assert!(
            executor.is_empty(EdgeCollection::BelongsTo.as_str()),
            "edges touching r1 from either side are gone"
        );
        assert_eq!(executor.len(NodeCollection::Records.as_str()), 1);
    }

    #[tokio::test]
    async fn removing_last_grant_retires_the_record() {
        let (executor, provider) = setup().await;
        let base = seed_drive_file(&provider).await;
        // Drop the anyone grant so alice holds the only live permission.
        provider
            .process_file_permissions(
                &base,
                &[grant("p1", PermissionType::User, Role::Owner, Some("alice@example.com"))],
                None,
            )
            .await
            .unwrap();

        provider
            .remove_user_access_to_record("r1", "u1", None)
            .await
            .unwrap();
        assert!(provider.get_record("r1", None).await.unwrap().is_none());
        assert!(executor.is_empty(NodeCollection::Files.as_str()));
        assert!(executor.is_empty(EdgeCollection::Permissions.as_str()));
    }

    #[tokio::test]
    async fn removing_one_of_many_grants_keeps_the_record() {
        let (_, provider) = setup().await;
        let base = seed_drive_file(&provider).await;
        provider
            .process_file_permissions(
                &base,
                &[
                    grant("p1", PermissionType::User, Role::Owner, Some("alice@example.com")),
                    grant("p2", PermissionType::User, Role::Reader, Some("bob@example.com")),
                ],
                None,
            )
            .await
            .unwrap();

        provider
            .remove_user_access_to_record("r1", "u2", None)
            .await
            .unwrap();
        assert!(provider.get_record("r1", None).await.unwrap().is_some());
        let remaining = provider.permissions_on_record("r1", None).await.unwrap();
        assert_eq!(remaining.len(), 1);
    }

    #[tokio::test]
    async fn delete_by_external_id_routes_to_the_same_pipeline() {
        let (_, provider) = setup().await;
        seed_drive_file(&provider).await;
        let outcome = provider
            .delete_record_by_external_id(ConnectorKind::GoogleDrive, "ext-r1", "u1")
            .await;
        assert!(outcome.success, "{outcome:?}");

        let outcome = provider
            .delete_record_by_external_id(ConnectorKind::GoogleDrive, "ext-r1", "u1")
            .await;
        assert_eq!(outcome.code, 404);
    }
}
