//! Typed query builder.
//!
//! Queries name a collection, a conjunction of filter predicates and an
//! action. Identifiers come from the [`collections`](crate::collections)
//! enums and values stay bound as JSON values, so an unescaped identifier
//! can never reach the store.

use plexus_model::Document;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One filter predicate. Predicates in a query are conjoined.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Filter {
    /// `doc.field == value`
    Eq { field: String, value: Value },
    /// `doc.field IN values`
    In { field: String, values: Vec<Value> },
    /// `any(fields, f -> doc.f == value)`, e.g. `_from` or `_to` equals.
    AnyEq { fields: Vec<String>, value: Value },
    /// `any(fields, f -> doc.f IN values)`
    AnyIn { fields: Vec<String>, values: Vec<Value> },
    /// `doc.field starts with prefix`; matches the collection side of a
    /// composite `_from`/`_to` reference.
    HasPrefix { field: String, prefix: String },
}

impl Filter {
    pub fn matches(&self, doc: &Document) -> bool {
        match self {
            Filter::Eq { field, value } => doc.get(field) == Some(value),
            Filter::In { field, values } => {
                doc.get(field).is_some_and(|v| values.contains(v))
            }
            Filter::AnyEq { fields, value } => {
                fields.iter().any(|f| doc.get(f) == Some(value))
            }
            Filter::AnyIn { fields, values } => fields
                .iter()
                .any(|f| doc.get(f).is_some_and(|v| values.contains(v))),
            Filter::HasPrefix { field, prefix } => doc
                .get(field)
                .and_then(Value::as_str)
                .is_some_and(|v| v.starts_with(prefix.as_str())),
        }
    }
}

/// What the query produces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Action {
    /// Return matching documents.
    Fetch,
    /// Return one field of each matching document.
    FetchField(String),
    /// Remove matching documents, returning the removed ones.
    Remove,
}

/// A parameterized query against one collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Query {
    pub collection: String,
    pub filters: Vec<Filter>,
    pub action: Action,
    pub limit: Option<usize>,
}

impl Query {
    pub fn fetch(collection: impl Into<String>) -> Self {
        Self {
            collection: collection.into(),
            filters: Vec::new(),
            action: Action::Fetch,
            limit: None,
        }
    }

    pub fn remove(collection: impl Into<String>) -> Self {
        Self {
            action: Action::Remove,
            ..Self::fetch(collection)
        }
    }

    pub fn returning_field(mut self, field: impl Into<String>) -> Self {
        self.action = Action::FetchField(field.into());
        self
    }

    pub fn filter_eq(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filters.push(Filter::Eq {
            field: field.into(),
            value: value.into(),
        });
        self
    }

    pub fn filter_in<V: Into<Value>>(
        mut self,
        field: impl Into<String>,
        values: impl IntoIterator<Item = V>,
    ) -> Self {
        self.filters.push(Filter::In {
            field: field.into(),
            values: values.into_iter().map(Into::into).collect(),
        });
        self
    }

    /// Matches documents where any of `fields` equals `value` (edge
    /// endpoint filters use this with `_from`/`_to`).
    pub fn filter_any_eq<F: Into<String>>(
        mut self,
        fields: impl IntoIterator<Item = F>,
        value: impl Into<Value>,
    ) -> Self {
        self.filters.push(Filter::AnyEq {
            fields: fields.into_iter().map(Into::into).collect(),
            value: value.into(),
        });
        self
    }

    pub fn filter_any_in<F: Into<String>, V: Into<Value>>(
        mut self,
        fields: impl IntoIterator<Item = F>,
        values: impl IntoIterator<Item = V>,
    ) -> Self {
        self.filters.push(Filter::AnyIn {
            fields: fields.into_iter().map(Into::into).collect(),
            values: values.into_iter().map(Into::into).collect(),
        });
        self
    }

    /// Matches documents whose `field` starts with `prefix` (collection
    /// side of a composite reference).
    pub fn filter_prefix(mut self, field: impl Into<String>, prefix: impl Into<String>) -> Self {
        self.filters.push(Filter::HasPrefix {
            field: field.into(),
            prefix: prefix.into(),
        });
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn matches(&self, doc: &Document) -> bool {
        self.filters.iter().all(|f| f.matches(doc))
    }
}
