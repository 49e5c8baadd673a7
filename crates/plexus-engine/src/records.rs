//! Typed record access and batch ingestion writes.
//!
//! Readers reconstruct [`TypedRecord`]s through the factory; the batch
//! upsert writes base document, type document and typing edge in one call,
//! keyed so replays upsert instead of duplicating.

use std::collections::HashMap;

use plexus_model::{
    now_ms, ConnectorKind, Document, Entity, IndexingStatus, Record, TypedRecord,
};
use plexus_store::{query::Query, translate, EdgeCollection, NodeCollection, StoreError, TransactionId};
use serde_json::{json, Value};

use crate::factory::typed_record_from_documents;
use crate::graph::{into_document, Direction};
use crate::GraphProvider;

impl GraphProvider {
    /// Fetch one record with its type document, when present.
    pub async fn get_record(
        &self,
        key: &str,
        txn: Option<&TransactionId>,
    ) -> Result<Option<TypedRecord>, StoreError> {
        let Some(base) = self
            .executor()
            .get_document(NodeCollection::Records.as_str(), key, txn)
            .await?
        else {
            return Ok(None);
        };
        let type_doc = self.type_document_for(key, txn).await?;
        Ok(Some(typed_record_from_documents(&base, type_doc.as_ref())?))
    }

    /// Fetch a record by its identity in the source system.
    pub async fn get_record_by_external_id(
        &self,
        connector: ConnectorKind,
        external_id: &str,
        txn: Option<&TransactionId>,
    ) -> Result<Option<TypedRecord>, StoreError> {
        let query = Query::fetch(NodeCollection::Records.as_str())
            .filter_eq("externalRecordId", external_id)
            .filter_eq("connectorName", serde_json::to_value(connector)?)
            .limit(1);
        let rows = self.executor().execute_query(&query, txn).await?;
        let Some(base) = rows.into_iter().next().and_then(into_document) else {
            return Ok(None);
        };
        let key = match base.get("_key").and_then(Value::as_str) {
            Some(key) => key.to_string(),
            None => return Ok(None),
        };
        let type_doc = self.type_document_for(&key, txn).await?;
        Ok(Some(typed_record_from_documents(&base, type_doc.as_ref())?))
    }

    /// Base records of an org in a given indexing state.
    pub async fn get_records_by_status(
        &self,
        org_id: &str,
        status: IndexingStatus,
        txn: Option<&TransactionId>,
    ) -> Result<Vec<Record>, StoreError> {
        let query = Query::fetch(NodeCollection::Records.as_str())
            .filter_eq("orgId", org_id)
            .filter_eq("indexingStatus", serde_json::to_value(status)?);
        self.fetch_base_records(&query, txn).await
    }

    /// Base records whose source parent is `external_parent_id`.
    pub async fn get_records_by_parent(
        &self,
        external_parent_id: &str,
        txn: Option<&TransactionId>,
    ) -> Result<Vec<Record>, StoreError> {
        let query = Query::fetch(NodeCollection::Records.as_str())
            .filter_eq("externalParentId", external_parent_id);
        self.fetch_base_records(&query, txn).await
    }

    /// Move a record to a new indexing state; returns false when absent.
    pub async fn update_record_indexing_status(
        &self,
        key: &str,
        status: IndexingStatus,
        txn: Option<&TransactionId>,
    ) -> Result<bool, StoreError> {
        let patch = json!({
            "indexingStatus": serde_json::to_value(status)?,
            "updatedAtTimestamp": now_ms(),
        });
        let updated = self
            .executor()
            .update_document(
                NodeCollection::Records.as_str(),
                key,
                patch.as_object().cloned().unwrap_or_default(),
                txn,
            )
            .await?;
        Ok(updated.is_some())
    }

    /// Write base documents, type documents and typing edges for a batch of
    /// records in one call. Type documents and typing edges share the
    /// record's key, so replays land as upserts. Raises on any per-document
    /// failure; run inside a caller transaction for atomicity.
    pub async fn batch_upsert_records(
        &self,
        records: &[TypedRecord],
        txn: Option<&TransactionId>,
    ) -> Result<(), StoreError> {
        let mut bases: Vec<Document> = Vec::with_capacity(records.len());
        let mut typed: HashMap<NodeCollection, Vec<Document>> = HashMap::new();
        let mut typing_edges: Vec<Document> = Vec::new();

        for record in records {
            let base = record.record();
            bases.push(base.to_native());

            let Some(collection) = NodeCollection::for_record_type(base.record_type) else {
                continue;
            };
            let Some(mut type_doc) = record.to_type_document() else {
                continue;
            };
            type_doc.insert("id".to_string(), Value::String(base.id.clone()));
            typed.entry(collection).or_default().push(type_doc);

            let edge = json!({
                "id": base.id,
                "fromId": base.id,
                "fromCollection": NodeCollection::Records.as_str(),
                "toId": base.id,
                "toCollection": collection.as_str(),
                "createdAtTimestamp": now_ms(),
            });
            typing_edges.push(edge.as_object().cloned().unwrap_or_default());
        }

        self.batch_upsert_nodes(NodeCollection::Records, bases, txn)
            .await?;
        for (collection, docs) in typed {
            self.batch_upsert_nodes(collection, docs, txn).await?;
        }
        if !typing_edges.is_empty() {
            self.batch_create_edges(EdgeCollection::IsOfType, typing_edges, txn)
                .await?;
        }
        Ok(())
    }

    /// Native type document joined to `record_key` by the typing edge.
    pub(crate) async fn type_document_for(
        &self,
        record_key: &str,
        txn: Option<&TransactionId>,
    ) -> Result<Option<Document>, StoreError> {
        let refs = self
            .related_refs(
                (NodeCollection::Records, record_key),
                EdgeCollection::IsOfType,
                Direction::Out,
                txn,
            )
            .await?;
        for composite in refs {
            let Some((collection, key)) = composite.split_once('/') else {
                continue;
            };
            if let Some(doc) = self.executor().get_document(collection, key, txn).await? {
                return Ok(Some(doc));
            }
        }
        Ok(None)
    }

    async fn fetch_base_records(
        &self,
        query: &Query,
        txn: Option<&TransactionId>,
    ) -> Result<Vec<Record>, StoreError> {
        let rows = self.executor().execute_query(query, txn).await?;
        let mut records = Vec::with_capacity(rows.len());
        for row in rows {
            let Some(doc) = into_document(row) else { continue };
            records.push(Record::from_native(&translate::from_native_node(doc))?);
        }
        Ok(records)
    }
}
