//! Translation layer: logical document shape ↔ native store shape.
//!
//! Logical nodes carry `id`; native nodes carry `_key`. Logical edges carry
//! `fromId`/`fromCollection` and `toId`/`toCollection`; native edges carry
//! composite `_from`/`_to` references of the form `"collection/key"`.
//!
//! All functions are pure, idempotent on already-translated input (legacy
//! callers may pass documents that already carry the native field), and
//! never fail: a malformed composite reference leaves the logical fields
//! absent rather than erroring.

use plexus_model::Document;
use serde_json::Value;

const KEY: &str = "_key";
const ID: &str = "id";
const FROM: &str = "_from";
const TO: &str = "_to";
const FROM_ID: &str = "fromId";
const FROM_COLLECTION: &str = "fromCollection";
const TO_ID: &str = "toId";
const TO_COLLECTION: &str = "toCollection";

/// `id` → `_key`. No-op when `_key` is already present.
pub fn to_native_node(mut doc: Document) -> Document {
    if !doc.contains_key(KEY) {
        if let Some(id) = doc.remove(ID) {
            doc.insert(KEY.to_string(), id);
        }
    }
    doc
}

/// `_key` → `id`. Also strips the store's `_id`/`_rev` bookkeeping fields.
pub fn from_native_node(mut doc: Document) -> Document {
    if !doc.contains_key(ID) {
        if let Some(key) = doc.remove(KEY) {
            doc.insert(ID.to_string(), key);
        }
    } else {
        doc.remove(KEY);
    }
    doc.remove("_id");
    doc.remove("_rev");
    doc
}

/// Node translation plus `fromId`/`fromCollection` → `_from` and
/// `toId`/`toCollection` → `_to`.
pub fn to_native_edge(doc: Document) -> Document {
    let mut doc = to_native_node(doc);
    join_ref(&mut doc, FROM, FROM_ID, FROM_COLLECTION);
    join_ref(&mut doc, TO, TO_ID, TO_COLLECTION);
    doc
}

/// Node translation plus `_from`/`_to` → endpoint id/collection pairs.
pub fn from_native_edge(doc: Document) -> Document {
    let mut doc = from_native_node(doc);
    split_ref(&mut doc, FROM, FROM_ID, FROM_COLLECTION);
    split_ref(&mut doc, TO, TO_ID, TO_COLLECTION);
    doc
}

fn join_ref(doc: &mut Document, native: &str, id_field: &str, collection_field: &str) {
    if doc.contains_key(native) {
        doc.remove(id_field);
        doc.remove(collection_field);
        return;
    }
    let (Some(Value::String(id)), Some(Value::String(collection))) =
        (doc.get(id_field).cloned(), doc.get(collection_field).cloned())
    else {
        return;
    };
    doc.remove(id_field);
    doc.remove(collection_field);
    doc.insert(
        native.to_string(),
        Value::String(crate::collections::document_ref(&collection, &id)),
    );
}

fn split_ref(doc: &mut Document, native: &str, id_field: &str, collection_field: &str) {
    if doc.contains_key(id_field) && doc.contains_key(collection_field) {
        doc.remove(native);
        return;
    }
    let Some(Value::String(composite)) = doc.get(native).cloned() else {
        return;
    };
    // Split on the first '/'; a reference without one is malformed and the
    // logical fields stay absent.
    let Some((collection, key)) = composite.split_once('/') else {
        return;
    };
    doc.remove(native);
    doc.insert(id_field.to_string(), Value::String(key.to_string()));
    doc.insert(
        collection_field.to_string(),
        Value::String(collection.to_string()),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(value: serde_json::Value) -> Document {
        value.as_object().unwrap().clone()
    }

    #[test]
    fn node_round_trips() {
        let logical = doc(json!({"id": "r1", "recordName": "a"}));
        let native = to_native_node(logical.clone());
        assert_eq!(native.get("_key"), Some(&json!("r1")));
        assert!(!native.contains_key("id"));
        assert_eq!(from_native_node(native), logical);
    }

    #[test]
    fn node_translation_is_idempotent() {
        let native = doc(json!({"_key": "r1", "recordName": "a"}));
        assert_eq!(to_native_node(native.clone()), native);

        let logical = doc(json!({"id": "r1", "recordName": "a"}));
        assert_eq!(from_native_node(logical.clone()), logical);
    }

    #[test]
    fn edge_round_trips() {
        let logical = doc(json!({
            "id": "e1",
            "fromId": "u1",
            "fromCollection": "users",
            "toId": "r1",
            "toCollection": "records",
            "role": "OWNER"
        }));
        let native = to_native_edge(logical.clone());
        assert_eq!(native.get("_from"), Some(&json!("users/u1")));
        assert_eq!(native.get("_to"), Some(&json!("records/r1")));
        assert_eq!(from_native_edge(native), logical);
    }

    #[test]
    fn edge_key_splits_on_first_slash_only() {
        let native = doc(json!({"_key": "e1", "_from": "files/a/b", "_to": "records/r1"}));
        let logical = from_native_edge(native);
        assert_eq!(logical.get("fromCollection"), Some(&json!("files")));
        assert_eq!(logical.get("fromId"), Some(&json!("a/b")));
    }

    #[test]
    fn malformed_reference_leaves_fields_absent() {
        let native = doc(json!({"_key": "e1", "_from": "no-slash", "_to": "records/r1"}));
        let logical = from_native_edge(native);
        assert!(!logical.contains_key("fromId"));
        assert!(!logical.contains_key("fromCollection"));
        assert_eq!(logical.get("toId"), Some(&json!("r1")));
    }

    #[test]
    fn from_native_strips_store_bookkeeping() {
        let native = doc(json!({"_key": "r1", "_id": "records/r1", "_rev": "abc"}));
        let logical = from_native_node(native);
        assert_eq!(logical, doc(json!({"id": "r1"})));
    }
}
