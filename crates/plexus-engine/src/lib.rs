//! Plexus record & permission lifecycle engine
//!
//! The persistence layer of a multi-connector knowledge ingestion platform.
//! Records pulled from external systems (Drive, Mail, tickets, uploads) live
//! in a permissioned graph; this crate reconstructs typed records from the
//! graph, keeps permission edges reconciled against source-system grant
//! lists, and retires records through connector-aware cascading deletes that
//! never leave orphaned edges behind.
//!
//! ```text
//!  ingestion sync ──► batch_upsert_records ──┐
//!                                            │
//!  grant lists ──► process_file_permissions ─┤──► GraphProvider ──► store
//!                                            │
//!  delete events ──► delete_record ──────────┘
//! ```
//!
//! [`GraphProvider`] is the single facade; it owns an
//! [`Arc<dyn GraphQueryExecutor>`](plexus_store::GraphQueryExecutor) and
//! composes every operation from the store's typed query primitives.

pub mod factory;
pub mod graph;
pub mod lifecycle;
pub mod permissions;
pub mod policies;
pub mod records;
pub mod sync_points;

pub use lifecycle::DeleteOutcome;
pub use policies::{policy_for, ConnectorPolicy};

use std::sync::Arc;

use plexus_store::{GraphQueryExecutor, StoreError, GRAPH_NAME};

/// Connection settings for the backing graph store. Credentials are
/// validated at connect time; the wire client itself is injected.
#[derive(Debug, Clone, Default)]
pub struct ProviderConfig {
    pub url: String,
    pub username: String,
    pub password: String,
    pub database: String,
}

impl ProviderConfig {
    fn validate(&self) -> Result<(), StoreError> {
        for (field, value) in [
            ("url", &self.url),
            ("username", &self.username),
            ("password", &self.password),
            ("database", &self.database),
        ] {
            if value.is_empty() {
                return Err(StoreError::Config(format!(
                    "missing graph store credential `{field}`"
                )));
            }
        }
        Ok(())
    }
}

/// Facade over the graph store: node/edge primitives, typed record access,
/// permission reconciliation and the cascading lifecycle manager.
pub struct GraphProvider {
    executor: Arc<dyn GraphQueryExecutor>,
}

impl std::fmt::Debug for GraphProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GraphProvider").finish_non_exhaustive()
    }
}

impl GraphProvider {
    /// Validate config and verify the store answers before handing out a
    /// provider. Missing credentials abort startup.
    pub async fn connect(
        executor: Arc<dyn GraphQueryExecutor>,
        config: &ProviderConfig,
    ) -> Result<Self, StoreError> {
        config.validate()?;
        // Reachability probe; the schema itself is re-read per cascade.
        executor.get_graph_edge_definitions(GRAPH_NAME).await?;
        tracing::info!(database = %config.database, "connected to graph store");
        Ok(Self { executor })
    }

    /// Build a provider around an already-connected executor. Used by tests
    /// and by callers that manage their own connection lifecycle.
    pub fn new(executor: Arc<dyn GraphQueryExecutor>) -> Self {
        Self { executor }
    }

    pub fn executor(&self) -> &Arc<dyn GraphQueryExecutor> {
        &self.executor
    }

    pub async fn disconnect(self) -> Result<(), StoreError> {
        tracing::info!("disconnecting from graph store");
        drop(self.executor);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use plexus_store::MemoryExecutor;

    fn config() -> ProviderConfig {
        ProviderConfig {
            url: "http://localhost:8529".into(),
            username: "root".into(),
            password: "secret".into(),
            database: "plexus".into(),
        }
    }

    #[tokio::test]
    async fn connect_rejects_missing_credentials() {
        let executor = Arc::new(MemoryExecutor::new());
        let mut bad = config();
        bad.password = String::new();
        let err = GraphProvider::connect(executor, &bad).await.unwrap_err();
        assert!(matches!(err, StoreError::Config(_)));
    }

    #[tokio::test]
    async fn connect_succeeds_with_full_config() {
        let executor = Arc::new(MemoryExecutor::new());
        assert!(GraphProvider::connect(executor, &config()).await.is_ok());
    }
}
