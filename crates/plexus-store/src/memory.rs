//! In-memory reference implementation of the executor contract.
//!
//! Backs the engine's test suite and local demos. Semantics mirror the real
//! store where the engine depends on them: upserts key on `_key`, deletes of
//! missing keys are no-ops, transactions roll back via an undo journal, and
//! every applied mutation bumps a write counter so tests can assert
//! idempotence properties ("replaying the same grant list performs zero
//! writes").

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use dashmap::DashMap;
use parking_lot::{Mutex, RwLock};
use plexus_model::Document;
use serde_json::Value;
use uuid::Uuid;

use crate::collections::{fallback_edge_definitions, EdgeDefinition, GRAPH_NAME};
use crate::error::StoreError;
use crate::executor::{GraphQueryExecutor, TransactionId, UpsertReport};
use crate::query::{Action, Query};

/// One reversible step recorded while a transaction is open.
#[derive(Debug)]
struct UndoOp {
    collection: String,
    key: String,
    /// Document value before the step; `None` means the step inserted it.
    prior: Option<Document>,
}

#[derive(Default)]
pub struct MemoryExecutor {
    collections: DashMap<String, BTreeMap<String, Document>>,
    journals: Mutex<HashMap<String, Vec<UndoOp>>>,
    writes: AtomicU64,
    edge_definitions: RwLock<Option<Vec<EdgeDefinition>>>,
}

impl MemoryExecutor {
    pub fn new() -> Self {
        Self {
            edge_definitions: RwLock::new(Some(fallback_edge_definitions())),
            ..Default::default()
        }
    }

    /// Executor whose graph schema lookup fails, for exercising the
    /// fallback edge list.
    pub fn without_graph_schema() -> Self {
        Self::default()
    }

    /// Total mutations applied so far (inserts, replacements, removals).
    pub fn write_count(&self) -> u64 {
        self.writes.load(Ordering::SeqCst)
    }

    /// Number of documents currently in `collection`.
    pub fn len(&self, collection: &str) -> usize {
        self.collections
            .get(collection)
            .map(|c| c.len())
            .unwrap_or(0)
    }

    pub fn is_empty(&self, collection: &str) -> bool {
        self.len(collection) == 0
    }

    fn record_undo(&self, txn: Option<&TransactionId>, collection: &str, key: &str, prior: Option<Document>) {
        let Some(txn) = txn else { return };
        let mut journals = self.journals.lock();
        if let Some(journal) = journals.get_mut(&txn.0) {
            journal.push(UndoOp {
                collection: collection.to_string(),
                key: key.to_string(),
                prior,
            });
        }
    }

    fn check_txn(&self, txn: Option<&TransactionId>) -> Result<(), StoreError> {
        if let Some(txn) = txn {
            if !self.journals.lock().contains_key(&txn.0) {
                return Err(StoreError::Transaction(format!(
                    "unknown or closed transaction {txn}"
                )));
            }
        }
        Ok(())
    }

    fn doc_key(doc: &Document) -> Option<String> {
        match doc.get("_key") {
            Some(Value::String(key)) => Some(key.clone()),
            _ => None,
        }
    }
}

#[async_trait]
impl GraphQueryExecutor for MemoryExecutor {
    async fn execute_query(
        &self,
        query: &Query,
        txn: Option<&TransactionId>,
    ) -> Result<Vec<Value>, StoreError> {
        self.check_txn(txn)?;
        let mut collection = self
            .collections
            .entry(query.collection.clone())
            .or_default();

        let mut matched: Vec<String> = collection
            .iter()
            .filter(|(_, doc)| query.matches(doc))
            .map(|(key, _)| key.clone())
            .collect();
        if let Some(limit) = query.limit {
            matched.truncate(limit);
        }

        match &query.action {
            Action::Fetch => Ok(matched
                .iter()
                .filter_map(|k| collection.get(k).cloned())
                .map(Value::Object)
                .collect()),
            Action::FetchField(field) => Ok(matched
                .iter()
                .filter_map(|k| collection.get(k).and_then(|d| d.get(field).cloned()))
                .collect()),
            Action::Remove => {
                let mut removed = Vec::with_capacity(matched.len());
                for key in matched {
                    if let Some(doc) = collection.remove(&key) {
                        self.record_undo(txn, &query.collection, &key, Some(doc.clone()));
                        self.writes.fetch_add(1, Ordering::SeqCst);
                        removed.push(Value::Object(doc));
                    }
                }
                Ok(removed)
            }
        }
    }

    async fn get_document(
        &self,
        collection: &str,
        key: &str,
        txn: Option<&TransactionId>,
    ) -> Result<Option<Document>, StoreError> {
        self.check_txn(txn)?;
        Ok(self
            .collections
            .get(collection)
            .and_then(|c| c.get(key).cloned()))
    }

    async fn batch_upsert_documents(
        &self,
        collection: &str,
        docs: Vec<Document>,
        txn: Option<&TransactionId>,
        overwrite: bool,
    ) -> Result<UpsertReport, StoreError> {
        self.check_txn(txn)?;
        let mut report = UpsertReport::default();
        let mut target = self.collections.entry(collection.to_string()).or_default();
        for doc in docs {
            let Some(key) = Self::doc_key(&doc) else {
                report.errors += 1;
                continue;
            };
            let prior = target.get(&key).cloned();
            if prior.is_some() && !overwrite {
                report.errors += 1;
                continue;
            }
            self.record_undo(txn, collection, &key, prior);
            target.insert(key, doc);
            self.writes.fetch_add(1, Ordering::SeqCst);
        }
        Ok(report)
    }

    async fn batch_delete_documents(
        &self,
        collection: &str,
        keys: &[String],
        txn: Option<&TransactionId>,
    ) -> Result<usize, StoreError> {
        self.check_txn(txn)?;
        let Some(mut target) = self.collections.get_mut(collection) else {
            return Ok(0);
        };
        let mut deleted = 0;
        for key in keys {
            if let Some(doc) = target.remove(key) {
                self.record_undo(txn, collection, key, Some(doc));
                self.writes.fetch_add(1, Ordering::SeqCst);
                deleted += 1;
            }
        }
        Ok(deleted)
    }

    async fn update_document(
        &self,
        collection: &str,
        key: &str,
        patch: Document,
        txn: Option<&TransactionId>,
    ) -> Result<Option<Document>, StoreError> {
        self.check_txn(txn)?;
        let Some(mut target) = self.collections.get_mut(collection) else {
            return Ok(None);
        };
        let Some(existing) = target.get(key).cloned() else {
            return Ok(None);
        };
        let mut updated = existing.clone();
        for (field, value) in patch {
            updated.insert(field, value);
        }
        self.record_undo(txn, collection, key, Some(existing));
        target.insert(key.to_string(), updated.clone());
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(Some(updated))
    }

    async fn begin_transaction(
        &self,
        _read_collections: &[&str],
        _write_collections: &[&str],
    ) -> Result<TransactionId, StoreError> {
        let txn = TransactionId(Uuid::new_v4().to_string());
        self.journals.lock().insert(txn.0.clone(), Vec::new());
        Ok(txn)
    }

    async fn commit_transaction(&self, txn: &TransactionId) -> Result<(), StoreError> {
        self.journals
            .lock()
            .remove(&txn.0)
            .map(|_| ())
            .ok_or_else(|| StoreError::Transaction(format!("commit of unknown transaction {txn}")))
    }

    async fn abort_transaction(&self, txn: &TransactionId) -> Result<(), StoreError> {
        let journal = self
            .journals
            .lock()
            .remove(&txn.0)
            .ok_or_else(|| StoreError::Transaction(format!("abort of unknown transaction {txn}")))?;
        for op in journal.into_iter().rev() {
            let mut target = self.collections.entry(op.collection.clone()).or_default();
            match op.prior {
                Some(doc) => {
                    target.insert(op.key, doc);
                }
                None => {
                    target.remove(&op.key);
                }
            }
        }
        Ok(())
    }

    async fn get_graph_edge_definitions(
        &self,
        graph_name: &str,
    ) -> Result<Option<Vec<EdgeDefinition>>, StoreError> {
        if graph_name != GRAPH_NAME {
            return Ok(None);
        }
        Ok(self.edge_definitions.read().clone())
    }
}
