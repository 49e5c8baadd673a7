//! Principals and record containers.
//!
//! A principal is anything that can hold a grant: a named user, a named
//! group, a whole domain (represented by the org), or "anyone". Identity is
//! resolved by email across the user and group collections.

use serde::{Deserialize, Serialize};

use crate::Named;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub org_id: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

impl Named for User {
    const NAME: &'static str = "user";
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserGroup {
    pub id: String,
    pub org_id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_group_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mail: Option<String>,
}

impl Named for UserGroup {
    const NAME: &'static str = "user group";
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Org {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub registered_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
}

impl Named for Org {
    const NAME: &'static str = "org";
}

/// Hierarchical container for records: a folder, mailbox or knowledge base.
/// Children attach via BELONGS_TO edges; a group may itself belong to a
/// parent group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordGroup {
    pub id: String,
    pub org_id: String,
    pub group_name: String,
    pub external_group_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connector_name: Option<crate::ConnectorKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_external_group_id: Option<String>,
}

impl Named for RecordGroup {
    const NAME: &'static str = "record group";
}

fn default_true() -> bool {
    true
}
