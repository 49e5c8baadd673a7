//! Incremental sync checkpoints.

use serde::{Deserialize, Serialize};

use crate::Named;

/// Per-principal, per-resource incremental sync cursor. Upserts key on
/// `sync_point_key`, not on the internal id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncPoint {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub sync_point_key: String,
    pub org_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connector_name: Option<crate::ConnectorKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_email: Option<String>,
    /// Connector-specific cursor state (page token, history id, ...).
    #[serde(default)]
    pub cursor: serde_json::Value,
    #[serde(default)]
    pub created_at_timestamp: i64,
    #[serde(default)]
    pub updated_at_timestamp: i64,
}

impl Named for SyncPoint {
    const NAME: &'static str = "sync point";
}
