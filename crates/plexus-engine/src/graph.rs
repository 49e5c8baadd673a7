//! Node and edge primitives.
//!
//! Every operation here speaks logical documents; translation to and from
//! the store's native shape happens at this boundary and nowhere above it.
//! Batch writes raise on any per-document failure and are expected to run
//! inside a caller-managed transaction.

use plexus_model::Document;
use plexus_store::{
    collections::document_ref, query::Query, translate, EdgeCollection, NodeCollection,
    StoreError, TransactionId,
};
use serde_json::Value;

use crate::GraphProvider;

/// Traversal direction relative to the starting node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Out,
    In,
    Any,
}

impl GraphProvider {
    /// Fetch one node in logical shape.
    pub async fn get_document(
        &self,
        collection: NodeCollection,
        key: &str,
        txn: Option<&TransactionId>,
    ) -> Result<Option<Document>, StoreError> {
        let doc = self
            .executor()
            .get_document(collection.as_str(), key, txn)
            .await?;
        Ok(doc.map(translate::from_native_node))
    }

    /// Upsert a batch of logical nodes. Any store-side rejection raises.
    pub async fn batch_upsert_nodes(
        &self,
        collection: NodeCollection,
        nodes: Vec<Document>,
        txn: Option<&TransactionId>,
    ) -> Result<(), StoreError> {
        let native = nodes.into_iter().map(translate::to_native_node).collect();
        let report = self
            .executor()
            .batch_upsert_documents(collection.as_str(), native, txn, true)
            .await?;
        if report.errors > 0 {
            return Err(StoreError::query(
                collection.as_str(),
                format!("{} node(s) failed to upsert", report.errors),
            ));
        }
        Ok(())
    }

    /// Delete nodes by key. Missing keys are no-ops; returns how many
    /// documents existed.
    pub async fn delete_nodes(
        &self,
        collection: NodeCollection,
        keys: &[String],
        txn: Option<&TransactionId>,
    ) -> Result<usize, StoreError> {
        self.executor()
            .batch_delete_documents(collection.as_str(), keys, txn)
            .await
    }

    /// Merge a logical patch into one node; `None` when the node is absent.
    pub async fn update_node(
        &self,
        collection: NodeCollection,
        key: &str,
        patch: Document,
        txn: Option<&TransactionId>,
    ) -> Result<Option<Document>, StoreError> {
        let native_patch = translate::to_native_node(patch);
        let updated = self
            .executor()
            .update_document(collection.as_str(), key, native_patch, txn)
            .await?;
        Ok(updated.map(translate::from_native_node))
    }

    /// Upsert a batch of logical edges. Each edge must carry `id` plus
    /// endpoint id/collection pairs.
    pub async fn batch_create_edges(
        &self,
        edge: EdgeCollection,
        edges: Vec<Document>,
        txn: Option<&TransactionId>,
    ) -> Result<(), StoreError> {
        let native: Vec<Document> = edges.into_iter().map(translate::to_native_edge).collect();
        if let Some(bad) = native.iter().find(|e| !e.contains_key("_from") || !e.contains_key("_to")) {
            return Err(StoreError::query(
                edge.as_str(),
                format!(
                    "edge {:?} is missing an endpoint reference",
                    bad.get("_key")
                ),
            ));
        }
        let report = self
            .executor()
            .batch_upsert_documents(edge.as_str(), native, txn, true)
            .await?;
        if report.errors > 0 {
            return Err(StoreError::query(
                edge.as_str(),
                format!("{} edge(s) failed to upsert", report.errors),
            ));
        }
        Ok(())
    }

    /// Fetch the edge between two specific endpoints, in logical shape.
    pub async fn get_edge(
        &self,
        edge: EdgeCollection,
        from: (NodeCollection, &str),
        to: (NodeCollection, &str),
        txn: Option<&TransactionId>,
    ) -> Result<Option<Document>, StoreError> {
        let query = Query::fetch(edge.as_str())
            .filter_eq("_from", document_ref(from.0.as_str(), from.1))
            .filter_eq("_to", document_ref(to.0.as_str(), to.1))
            .limit(1);
        let rows = self.executor().execute_query(&query, txn).await?;
        Ok(rows
            .into_iter()
            .next()
            .and_then(into_document)
            .map(translate::from_native_edge))
    }

    pub async fn delete_edge(
        &self,
        edge: EdgeCollection,
        key: &str,
        txn: Option<&TransactionId>,
    ) -> Result<bool, StoreError> {
        let deleted = self
            .executor()
            .batch_delete_documents(edge.as_str(), &[key.to_string()], txn)
            .await?;
        Ok(deleted > 0)
    }

    /// Delete every edge leaving `from`.
    pub async fn delete_edges_from(
        &self,
        edge: EdgeCollection,
        from: (NodeCollection, &str),
        txn: Option<&TransactionId>,
    ) -> Result<usize, StoreError> {
        let query =
            Query::remove(edge.as_str()).filter_eq("_from", document_ref(from.0.as_str(), from.1));
        Ok(self.executor().execute_query(&query, txn).await?.len())
    }

    /// Delete every edge arriving at `to`.
    pub async fn delete_edges_to(
        &self,
        edge: EdgeCollection,
        to: (NodeCollection, &str),
        txn: Option<&TransactionId>,
    ) -> Result<usize, StoreError> {
        let query =
            Query::remove(edge.as_str()).filter_eq("_to", document_ref(to.0.as_str(), to.1));
        Ok(self.executor().execute_query(&query, txn).await?.len())
    }

    /// Delete edges arriving at `to` whose source lives in `from_collection`.
    pub async fn delete_edges_between_collections(
        &self,
        edge: EdgeCollection,
        from_collection: NodeCollection,
        to: (NodeCollection, &str),
        txn: Option<&TransactionId>,
    ) -> Result<usize, StoreError> {
        let query = Query::remove(edge.as_str())
            .filter_eq("_to", document_ref(to.0.as_str(), to.1))
            .filter_prefix("_from", format!("{}/", from_collection.as_str()));
        Ok(self.executor().execute_query(&query, txn).await?.len())
    }

    /// Delete the containment edges from a record to any record group.
    pub async fn delete_edges_to_groups(
        &self,
        record_key: &str,
        txn: Option<&TransactionId>,
    ) -> Result<usize, StoreError> {
        let query = Query::remove(EdgeCollection::BelongsTo.as_str())
            .filter_eq(
                "_from",
                document_ref(NodeCollection::Records.as_str(), record_key),
            )
            .filter_prefix("_to", format!("{}/", NodeCollection::RecordGroups.as_str()));
        Ok(self.executor().execute_query(&query, txn).await?.len())
    }

    /// Fetch nodes matching a conjunction of field filters.
    pub async fn get_nodes_by_filters(
        &self,
        collection: NodeCollection,
        filters: Vec<plexus_store::Filter>,
        txn: Option<&TransactionId>,
    ) -> Result<Vec<Document>, StoreError> {
        let query = Query {
            collection: collection.as_str().to_string(),
            filters,
            action: plexus_store::Action::Fetch,
            limit: None,
        };
        let rows = self.executor().execute_query(&query, txn).await?;
        Ok(rows
            .into_iter()
            .filter_map(into_document)
            .map(translate::from_native_node)
            .collect())
    }

    /// Fetch nodes whose `field` is one of `values`.
    pub async fn get_nodes_by_field_in(
        &self,
        collection: NodeCollection,
        field: &str,
        values: Vec<Value>,
        txn: Option<&TransactionId>,
    ) -> Result<Vec<Document>, StoreError> {
        let query = Query::fetch(collection.as_str()).filter_in(field, values);
        let rows = self.executor().execute_query(&query, txn).await?;
        Ok(rows
            .into_iter()
            .filter_map(into_document)
            .map(translate::from_native_node)
            .collect())
    }

    /// Remove every node whose `field` equals `value`; returns the count.
    pub async fn remove_nodes_by_field(
        &self,
        collection: NodeCollection,
        field: &str,
        value: Value,
        txn: Option<&TransactionId>,
    ) -> Result<usize, StoreError> {
        let query = Query::remove(collection.as_str()).filter_eq(field, value);
        Ok(self.executor().execute_query(&query, txn).await?.len())
    }

    /// Nodes reachable from `node` over one hop of `edge`, in logical shape.
    pub async fn get_related_nodes(
        &self,
        node: (NodeCollection, &str),
        edge: EdgeCollection,
        direction: Direction,
        txn: Option<&TransactionId>,
    ) -> Result<Vec<Document>, StoreError> {
        let refs = self.related_refs(node, edge, direction, txn).await?;
        let mut nodes = Vec::with_capacity(refs.len());
        for composite in refs {
            let Some((collection, key)) = composite.split_once('/') else {
                continue;
            };
            if let Some(doc) = self.executor().get_document(collection, key, txn).await? {
                nodes.push(translate::from_native_node(doc));
            }
        }
        Ok(nodes)
    }

    /// One field of each related node.
    pub async fn get_related_node_field(
        &self,
        node: (NodeCollection, &str),
        edge: EdgeCollection,
        direction: Direction,
        field: &str,
        txn: Option<&TransactionId>,
    ) -> Result<Vec<Value>, StoreError> {
        let nodes = self.get_related_nodes(node, edge, direction, txn).await?;
        Ok(nodes.into_iter().filter_map(|mut n| n.remove(field)).collect())
    }

    /// Composite references of the far endpoints of `edge` around `node`.
    pub(crate) async fn related_refs(
        &self,
        node: (NodeCollection, &str),
        edge: EdgeCollection,
        direction: Direction,
        txn: Option<&TransactionId>,
    ) -> Result<Vec<String>, StoreError> {
        let node_ref = document_ref(node.0.as_str(), node.1);
        let mut refs = Vec::new();
        if matches!(direction, Direction::Out | Direction::Any) {
            let query = Query::fetch(edge.as_str())
                .filter_eq("_from", node_ref.clone())
                .returning_field("_to");
            for row in self.executor().execute_query(&query, txn).await? {
                if let Value::String(s) = row {
                    refs.push(s);
                }
            }
        }
        if matches!(direction, Direction::In | Direction::Any) {
            let query = Query::fetch(edge.as_str())
                .filter_eq("_to", node_ref)
                .returning_field("_from");
            for row in self.executor().execute_query(&query, txn).await? {
                if let Value::String(s) = row {
                    refs.push(s);
                }
            }
        }
        Ok(refs)
    }
}

pub(crate) fn into_document(value: Value) -> Option<Document> {
    match value {
        Value::Object(map) => Some(map),
        _ => None,
    }
}
