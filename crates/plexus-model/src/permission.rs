//! Permission grants.
//!
//! A grant is persisted as a directed principal → record edge, except for
//! "anyone" grants, which are mirrored as anonymous-access records keyed by
//! (record, org) rather than edges.

use serde::{Deserialize, Serialize};

use crate::Named;

/// Access role carried by a grant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Owner,
    Organizer,
    FileOrganizer,
    Writer,
    Commenter,
    Reader,
}

/// Kind of principal a grant targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PermissionType {
    User,
    Group,
    Domain,
    Anyone,
}

/// A permission edge, translated to logical shape (principal → record).
///
/// Invariant: at most one live permission edge exists per
/// (principal, record) pair; reconciliation upserts by edge key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Permission {
    pub id: String,
    pub from_id: String,
    pub from_collection: String,
    pub to_id: String,
    pub to_collection: String,
    #[serde(rename = "type")]
    pub permission_type: PermissionType,
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_permission_id: Option<String>,
    #[serde(default)]
    pub created_at_timestamp: i64,
    #[serde(default)]
    pub updated_at_timestamp: i64,
    #[serde(default = "default_true")]
    pub active: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub permission_details: Option<serde_json::Value>,
}

impl Named for Permission {
    const NAME: &'static str = "permission";
}

impl Permission {
    /// Field-level change detection against an incoming grant. An update is
    /// persisted only when role, deep-compared details or active differ.
    pub fn differs_from(&self, incoming: &SourcePermission) -> bool {
        self.role != incoming.role
            || self.active != incoming.active
            || self.permission_details != incoming.details
    }
}

/// A grant as reported by the source system (the authoritative side of
/// reconciliation).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourcePermission {
    pub external_id: String,
    #[serde(rename = "type")]
    pub kind: PermissionType,
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default = "default_true")]
    pub active: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

/// Anonymous "anyone" grant, stored as a record keyed by (record, org).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnyoneAccess {
    pub id: String,
    pub record_id: String,
    pub org_id: String,
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_permission_id: Option<String>,
    #[serde(default)]
    pub created_at_timestamp: i64,
    #[serde(default)]
    pub updated_at_timestamp: i64,
    #[serde(default = "default_true")]
    pub active: bool,
}

impl Named for AnyoneAccess {
    const NAME: &'static str = "anyone access";
}

impl AnyoneAccess {
    /// Deterministic key for the (record, org) uniqueness invariant.
    pub fn key_for(record_id: &str, org_id: &str) -> String {
        format!("{record_id}_{org_id}_anyone")
    }
}

fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn stored() -> Permission {
        Permission {
            id: "p1".into(),
            from_id: "u1".into(),
            from_collection: "users".into(),
            to_id: "r1".into(),
            to_collection: "records".into(),
            permission_type: PermissionType::User,
            role: Role::Writer,
            external_permission_id: Some("ext-p1".into()),
            created_at_timestamp: 1,
            updated_at_timestamp: 1,
            active: true,
            permission_details: Some(json!({"inherited": false})),
        }
    }

    fn incoming() -> SourcePermission {
        SourcePermission {
            external_id: "ext-p1".into(),
            kind: PermissionType::User,
            role: Role::Writer,
            email: Some("a@b.c".into()),
            active: true,
            details: Some(json!({"inherited": false})),
        }
    }

    #[test]
    fn unchanged_grant_is_not_a_diff() {
        assert!(!stored().differs_from(&incoming()));
    }

    #[test]
    fn role_change_is_a_diff() {
        let mut grant = incoming();
        grant.role = Role::Reader;
        assert!(stored().differs_from(&grant));
    }

    #[test]
    fn nested_details_change_is_a_diff() {
        let mut grant = incoming();
        grant.details = Some(json!({"inherited": true}));
        assert!(stored().differs_from(&grant));
    }

    #[test]
    fn anyone_key_is_stable_per_record_and_org() {
        assert_eq!(
            AnyoneAccess::key_for("r1", "org1"),
            AnyoneAccess::key_for("r1", "org1")
        );
        assert_ne!(
            AnyoneAccess::key_for("r1", "org1"),
            AnyoneAccess::key_for("r1", "org2")
        );
    }
}
