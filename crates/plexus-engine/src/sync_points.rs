//! Sync checkpoint store.
//!
//! Small key/value-style store of per-principal, per-resource incremental
//! sync cursors. Upserts key on `sync_point_key`, not the internal id, so a
//! connector can re-checkpoint without knowing store identities.

use plexus_model::{now_ms, Entity, SyncPoint};
use plexus_store::{query::Query, translate, NodeCollection, StoreError, TransactionId};
use uuid::Uuid;

use crate::graph::into_document;
use crate::GraphProvider;

impl GraphProvider {
    pub async fn get_sync_point(
        &self,
        sync_point_key: &str,
        txn: Option<&TransactionId>,
    ) -> Result<Option<SyncPoint>, StoreError> {
        let query = Query::fetch(NodeCollection::SyncPoints.as_str())
            .filter_eq("syncPointKey", sync_point_key)
            .limit(1);
        let rows = self.executor().execute_query(&query, txn).await?;
        let Some(doc) = rows.into_iter().next().and_then(into_document) else {
            return Ok(None);
        };
        Ok(Some(SyncPoint::from_native(&translate::from_native_node(
            doc,
        ))?))
    }

    /// Create or replace the checkpoint for `sync_point.sync_point_key`.
    /// The internal id of an existing checkpoint is preserved.
    pub async fn upsert_sync_point(
        &self,
        mut sync_point: SyncPoint,
        txn: Option<&TransactionId>,
    ) -> Result<(), StoreError> {
        let existing = self.get_sync_point(&sync_point.sync_point_key, txn).await?;
        let now = now_ms();
        match existing {
            Some(stored) => {
                sync_point.id = stored.id;
                sync_point.created_at_timestamp = stored.created_at_timestamp;
            }
            None => {
                sync_point.id = Some(Uuid::new_v4().to_string());
                sync_point.created_at_timestamp = now;
            }
        }
        sync_point.updated_at_timestamp = now;
        self.batch_upsert_nodes(
            NodeCollection::SyncPoints,
            vec![sync_point.to_native()],
            txn,
        )
        .await
    }

    /// Drop the checkpoint; returns how many documents were removed.
    pub async fn remove_sync_point(
        &self,
        sync_point_key: &str,
        txn: Option<&TransactionId>,
    ) -> Result<usize, StoreError> {
        self.remove_nodes_by_field(
            NodeCollection::SyncPoints,
            "syncPointKey",
            sync_point_key.into(),
            txn,
        )
        .await
    }
}
