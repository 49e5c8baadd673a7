//! Permission reconciliation.
//!
//! Makes the graph's permission edges match the authoritative grant list
//! from a record's source system, with minimal writes: revocations are
//! diffed by external permission id, updates go through field-level change
//! detection, and edge keys are stable per (principal, record) pair so
//! replays upsert instead of duplicating. Replaying an unchanged grant list
//! performs zero edge writes.

use std::collections::HashSet;

use plexus_model::{
    now_ms, AnyoneAccess, Document, Entity, Permission, PermissionType, Record, SourcePermission,
};
use plexus_store::{
    collections::document_ref, query::Query, translate, EdgeCollection, NodeCollection,
    StoreError, TransactionId,
};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::graph::into_document;
use crate::GraphProvider;

impl GraphProvider {
    /// Reconcile every grant for one record against its source system.
    pub async fn process_file_permissions(
        &self,
        record: &Record,
        grants: &[SourcePermission],
        txn: Option<&TransactionId>,
    ) -> Result<(), StoreError> {
        // Anonymous access is recomputed from scratch on every pass.
        self.remove_anyone_access(&record.id, &record.org_id, txn)
            .await?;

        let existing = self.permissions_on_record(&record.id, txn).await?;

        // Revocation: stored grants the source no longer reports.
        let live_ids: HashSet<&str> = grants.iter().map(|g| g.external_id.as_str()).collect();
        for stored in &existing {
            let Some(external_id) = stored.external_permission_id.as_deref() else {
                continue;
            };
            if !live_ids.contains(external_id) {
                self.delete_edge(EdgeCollection::Permissions, &stored.id, txn)
                    .await?;
            }
        }

        for grant in grants {
            match grant.kind {
                PermissionType::User | PermissionType::Group | PermissionType::Domain => {
                    let stored = existing.iter().find(|p| {
                        p.external_permission_id.as_deref() == Some(grant.external_id.as_str())
                    });
                    if let Some(stored) = stored {
                        self.update_permission_if_changed(stored, grant, txn).await?;
                        continue;
                    }
                    let Some(principal) = self.resolve_principal(record, grant, txn).await? else {
                        tracing::warn!(
                            record = %record.id,
                            external_id = %grant.external_id,
                            kind = ?grant.kind,
                            "grant principal could not be resolved; skipping"
                        );
                        continue;
                    };
                    self.store_permission(record, (principal.0, &principal.1), grant, txn)
                        .await?;
                }
                PermissionType::Anyone => {
                    self.store_anyone_access(record, grant, txn).await?;
                }
            }
        }
        Ok(())
    }

    /// Upsert one permission edge from a resolved principal to a record.
    ///
    /// The edge key is the existing edge's key when one already connects
    /// this pair, else a fresh unique id, so replays upsert by key and
    /// never duplicate the edge.
    pub async fn store_permission(
        &self,
        record: &Record,
        principal: (NodeCollection, &str),
        grant: &SourcePermission,
        txn: Option<&TransactionId>,
    ) -> Result<(), StoreError> {
        let existing = self
            .get_edge(
                EdgeCollection::Permissions,
                principal,
                (NodeCollection::Records, &record.id),
                txn,
            )
            .await?;

        if let Some(existing) = existing {
            let stored = Permission::from_native(&existing)?;
            return self.update_permission_if_changed(&stored, grant, txn).await;
        }

        let now = now_ms();
        let edge = Permission {
            id: Uuid::new_v4().to_string(),
            from_id: principal.1.to_string(),
            from_collection: principal.0.as_str().to_string(),
            to_id: record.id.clone(),
            to_collection: NodeCollection::Records.as_str().to_string(),
            permission_type: grant.kind,
            role: grant.role,
            external_permission_id: Some(grant.external_id.clone()),
            created_at_timestamp: now,
            updated_at_timestamp: now,
            active: grant.active,
            permission_details: grant.details.clone(),
        };
        self.batch_create_edges(EdgeCollection::Permissions, vec![edge.to_native()], txn)
            .await
    }

    /// Change-detection update path: persists only when role, deep-compared
    /// details or active differ; otherwise a no-op.
    async fn update_permission_if_changed(
        &self,
        stored: &Permission,
        grant: &SourcePermission,
        txn: Option<&TransactionId>,
    ) -> Result<(), StoreError> {
        if !stored.differs_from(grant) {
            return Ok(());
        }
        let mut patch = Document::new();
        patch.insert("role".into(), serde_json::to_value(grant.role)?);
        patch.insert("active".into(), Value::Bool(grant.active));
        patch.insert(
            "permissionDetails".into(),
            grant.details.clone().unwrap_or(Value::Null),
        );
        patch.insert("updatedAtTimestamp".into(), json!(now_ms()));
        self.executor()
            .update_document(EdgeCollection::Permissions.as_str(), &stored.id, patch, txn)
            .await?;
        Ok(())
    }

    /// All permission edges pointing at a record, in logical shape.
    pub async fn permissions_on_record(
        &self,
        record_key: &str,
        txn: Option<&TransactionId>,
    ) -> Result<Vec<Permission>, StoreError> {
        let query = Query::fetch(EdgeCollection::Permissions.as_str()).filter_eq(
            "_to",
            document_ref(NodeCollection::Records.as_str(), record_key),
        );
        let rows = self.executor().execute_query(&query, txn).await?;
        let mut permissions = Vec::with_capacity(rows.len());
        for row in rows {
            let Some(doc) = into_document(row) else { continue };
            match Permission::from_native(&translate::from_native_edge(doc)) {
                Ok(permission) => permissions.push(permission),
                Err(err) => {
                    tracing::warn!(record = %record_key, error = %err, "skipping malformed permission edge");
                }
            }
        }
        Ok(permissions)
    }

    /// Write an "anyone" grant as an anonymous-access record keyed by
    /// (record, org), not as an edge.
    async fn store_anyone_access(
        &self,
        record: &Record,
        grant: &SourcePermission,
        txn: Option<&TransactionId>,
    ) -> Result<(), StoreError> {
        let now = now_ms();
        let access = AnyoneAccess {
            id: AnyoneAccess::key_for(&record.id, &record.org_id),
            record_id: record.id.clone(),
            org_id: record.org_id.clone(),
            role: grant.role,
            external_permission_id: Some(grant.external_id.clone()),
            created_at_timestamp: now,
            updated_at_timestamp: now,
            active: grant.active,
        };
        self.batch_upsert_nodes(NodeCollection::Anyone, vec![access.to_native()], txn)
            .await
    }

    /// Retire any anonymous-access record tied to (record, org).
    pub(crate) async fn remove_anyone_access(
        &self,
        record_key: &str,
        org_id: &str,
        txn: Option<&TransactionId>,
    ) -> Result<usize, StoreError> {
        let query = Query::remove(NodeCollection::Anyone.as_str())
            .filter_eq("recordId", record_key)
            .filter_eq("orgId", org_id);
        Ok(self.executor().execute_query(&query, txn).await?.len())
    }

    /// Map a grant's principal to an internal node: users and groups by
    /// email (people as a fallback for users), the org itself for domain
    /// grants.
    async fn resolve_principal(
        &self,
        record: &Record,
        grant: &SourcePermission,
        txn: Option<&TransactionId>,
    ) -> Result<Option<(NodeCollection, String)>, StoreError> {
        match grant.kind {
            PermissionType::User => {
                let Some(email) = grant.email.as_deref() else {
                    return Ok(None);
                };
                for collection in [NodeCollection::Users, NodeCollection::People] {
                    if let Some(key) = self.key_by_email(collection, "email", email, txn).await? {
                        return Ok(Some((collection, key)));
                    }
                }
                Ok(None)
            }
            PermissionType::Group => {
                let Some(email) = grant.email.as_deref() else {
                    return Ok(None);
                };
                Ok(self
                    .key_by_email(NodeCollection::Groups, "mail", email, txn)
                    .await?
                    .map(|key| (NodeCollection::Groups, key)))
            }
            PermissionType::Domain => Ok(Some((NodeCollection::Orgs, record.org_id.clone()))),
            PermissionType::Anyone => Ok(None),
        }
    }

    async fn key_by_email(
        &self,
        collection: NodeCollection,
        field: &str,
        email: &str,
        txn: Option<&TransactionId>,
    ) -> Result<Option<String>, StoreError> {
        let query = Query::fetch(collection.as_str())
            .filter_eq(field, email)
            .returning_field("_key")
            .limit(1);
        let rows = self.executor().execute_query(&query, txn).await?;
        Ok(rows.into_iter().next().and_then(|v| match v {
            Value::String(key) => Some(key),
            _ => None,
        }))
    }
}
