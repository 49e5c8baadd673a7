//! Typed record factory.
//!
//! Reconstructs the polymorphic [`TypedRecord`] variant from a native base
//! document plus an optional native type document. Type-specific fields are
//! best effort: a malformed type document degrades to the base variant with
//! a warning, never an error. Only a malformed base document fails.

use plexus_model::{
    CommentDocument, Document, Entity, FileDocument, MailDocument, ModelError, Record,
    TicketDocument, TypedRecord, WebpageDocument,
};
use plexus_store::{translate, NodeCollection};

/// Build the typed record for a native base document and, when present, its
/// type document (joined in the graph by the typing edge).
pub fn typed_record_from_documents(
    base_doc: &Document,
    type_doc: Option<&Document>,
) -> Result<TypedRecord, ModelError> {
    let base = translate::from_native_node(base_doc.clone());
    let record = Record::from_native(&base)?;

    let Some(type_collection) = NodeCollection::for_record_type(record.record_type) else {
        return Ok(TypedRecord::Base(record));
    };
    let Some(type_doc) = type_doc else {
        return Ok(TypedRecord::Base(record));
    };

    let type_doc = translate::from_native_node(type_doc.clone());
    match build_variant(record.clone(), type_collection, &type_doc) {
        Ok(typed) => Ok(typed),
        Err(err) => {
            tracing::warn!(
                record = %record.id,
                collection = %type_collection,
                error = %err,
                "type document failed to parse; falling back to base record"
            );
            Ok(TypedRecord::Base(record))
        }
    }
}

fn build_variant(
    record: Record,
    type_collection: NodeCollection,
    type_doc: &Document,
) -> Result<TypedRecord, ModelError> {
    Ok(match type_collection {
        NodeCollection::Files => TypedRecord::File(record, FileDocument::from_native(type_doc)?),
        NodeCollection::Mails => TypedRecord::Mail(record, MailDocument::from_native(type_doc)?),
        NodeCollection::Webpages => {
            TypedRecord::Webpage(record, WebpageDocument::from_native(type_doc)?)
        }
        NodeCollection::Tickets => {
            TypedRecord::Ticket(record, TicketDocument::from_native(type_doc)?)
        }
        NodeCollection::Comments => {
            TypedRecord::Comment(record, CommentDocument::from_native(type_doc)?)
        }
        // for_record_type only ever yields the five type collections.
        _ => TypedRecord::Base(record),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(value: serde_json::Value) -> Document {
        value.as_object().unwrap().clone()
    }

    fn base(record_type: &str) -> Document {
        doc(json!({
            "_key": "r1",
            "orgId": "org1",
            "recordName": "item",
            "recordType": record_type,
            "externalRecordId": "ext-1",
            "origin": "CONNECTOR",
            "connectorName": "GOOGLE_DRIVE"
        }))
    }

    #[test]
    fn file_record_gets_the_file_variant() {
        let typed = typed_record_from_documents(
            &base("FILE"),
            Some(&doc(json!({"_key": "r1", "name": "report.pdf", "extension": "pdf"}))),
        )
        .unwrap();
        let file = typed.file().expect("file variant");
        assert_eq!(file.name, "report.pdf");
        assert_eq!(typed.record().id, "r1");
    }

    #[test]
    fn mail_record_gets_the_mail_variant() {
        let typed = typed_record_from_documents(
            &base("MAIL"),
            Some(&doc(json!({"_key": "r1", "from": "a@b.c", "to": ["d@e.f"]}))),
        )
        .unwrap();
        assert!(typed.mail().is_some());
    }

    #[test]
    fn missing_type_document_falls_back_to_base() {
        let typed = typed_record_from_documents(&base("FILE"), None).unwrap();
        assert!(matches!(typed, TypedRecord::Base(_)));
    }

    #[test]
    fn unmapped_record_type_falls_back_to_base() {
        let typed = typed_record_from_documents(
            &base("OTHERS"),
            Some(&doc(json!({"_key": "r1", "name": "ignored"}))),
        )
        .unwrap();
        assert!(matches!(typed, TypedRecord::Base(_)));
    }

    #[test]
    fn malformed_type_document_degrades_with_base_variant() {
        // MailDocument requires `from`; its absence must not surface.
        let typed = typed_record_from_documents(
            &base("MAIL"),
            Some(&doc(json!({"_key": "r1", "subject": "no sender"}))),
        )
        .unwrap();
        assert!(matches!(typed, TypedRecord::Base(_)));
    }

    #[test]
    fn malformed_base_document_is_an_error() {
        let mut bad = base("FILE");
        bad.remove("externalRecordId");
        assert!(typed_record_from_documents(&bad, None).is_err());
    }
}
