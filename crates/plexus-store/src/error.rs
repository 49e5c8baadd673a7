//! Store error taxonomy.

/// Errors surfaced by the executor contract and the operations built on it.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("document {collection}/{key} not found")]
    NotFound { collection: String, key: String },

    #[error("store configuration error: {0}")]
    Config(String),

    /// Begin/commit/abort failure. Always re-raised to the caller, never
    /// swallowed.
    #[error("transaction error: {0}")]
    Transaction(String),

    #[error("query on {collection} failed: {message}")]
    Query { collection: String, message: String },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Model(#[from] plexus_model::ModelError),

    #[error("upstream store error: {0}")]
    Upstream(String),
}

impl StoreError {
    pub fn query(collection: impl Into<String>, message: impl Into<String>) -> Self {
        StoreError::Query {
            collection: collection.into(),
            message: message.into(),
        }
    }

    pub fn not_found(collection: impl Into<String>, key: impl Into<String>) -> Self {
        StoreError::NotFound {
            collection: collection.into(),
            key: key.into(),
        }
    }
}
