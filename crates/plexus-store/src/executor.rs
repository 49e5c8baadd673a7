//! The executor seam: everything the engine asks of a graph store.
//!
//! Implementations wrap a real graph database client; the in-repo
//! [`MemoryExecutor`](crate::memory::MemoryExecutor) implements the same
//! contract in memory. All documents cross this boundary in native shape
//! (`_key`, `_from`, `_to`); translation happens above it.

use async_trait::async_trait;
use plexus_model::Document;
use serde_json::Value;

use crate::collections::EdgeDefinition;
use crate::error::StoreError;
use crate::query::Query;

/// Handle naming a server-side transaction. Operations that accept
/// `Option<&TransactionId>` run inside the transaction when one is given.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TransactionId(pub String);

impl std::fmt::Display for TransactionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Outcome of a batch upsert: how many documents the store rejected.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpsertReport {
    pub errors: usize,
}

#[async_trait]
pub trait GraphQueryExecutor: Send + Sync {
    /// Execute a typed query; rows are documents for `Fetch`/`Remove` and
    /// bare field values for `FetchField`.
    async fn execute_query(
        &self,
        query: &Query,
        txn: Option<&TransactionId>,
    ) -> Result<Vec<Value>, StoreError>;

    async fn get_document(
        &self,
        collection: &str,
        key: &str,
        txn: Option<&TransactionId>,
    ) -> Result<Option<Document>, StoreError>;

    /// Upsert a batch keyed on `_key`. With `overwrite` false, existing
    /// documents are left alone and counted in the report's `errors`.
    async fn batch_upsert_documents(
        &self,
        collection: &str,
        docs: Vec<Document>,
        txn: Option<&TransactionId>,
        overwrite: bool,
    ) -> Result<UpsertReport, StoreError>;

    /// Delete by key, returning how many documents actually existed.
    /// Deleting a missing key is a no-op, not an error.
    async fn batch_delete_documents(
        &self,
        collection: &str,
        keys: &[String],
        txn: Option<&TransactionId>,
    ) -> Result<usize, StoreError>;

    /// Merge `patch` into an existing document; `None` when the key is
    /// absent.
    async fn update_document(
        &self,
        collection: &str,
        key: &str,
        patch: Document,
        txn: Option<&TransactionId>,
    ) -> Result<Option<Document>, StoreError>;

    async fn begin_transaction(
        &self,
        read_collections: &[&str],
        write_collections: &[&str],
    ) -> Result<TransactionId, StoreError>;

    async fn commit_transaction(&self, txn: &TransactionId) -> Result<(), StoreError>;

    async fn abort_transaction(&self, txn: &TransactionId) -> Result<(), StoreError>;

    /// Declared edge definitions of a named graph; `None` when the graph
    /// is unknown (callers fall back to
    /// [`fallback_edge_definitions`](crate::collections::fallback_edge_definitions)).
    async fn get_graph_edge_definitions(
        &self,
        graph_name: &str,
    ) -> Result<Option<Vec<EdgeDefinition>>, StoreError>;
}
