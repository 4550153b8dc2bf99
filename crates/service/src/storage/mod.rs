//! Storage abstractions for service layer
//!
//! `DocumentStore` is the persistence collaborator every resource talks to:
//! find/insert/update/delete of JSON documents by [`Filter`] inside a named
//! collection. Two implementations ship: a JSON-file store for single-node
//! deployments and tests, and a Postgres store on top of SeaORM.

pub mod json_document_store;
pub mod seaorm;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;
use uuid::Uuid;

use crate::filter::{Filter, ID_FIELD};

pub use json_document_store::JsonDocumentStore;
pub use seaorm::SeaOrmDocumentStore;

/// A stored record: a JSON object carrying a string `_id`.
pub type Document = Map<String, Value>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("invalid document id: {0}")]
    InvalidId(String),
    #[error("invalid document: {0}")]
    InvalidDocument(String),
    #[error("storage error: {0}")]
    Backend(String),
}

impl From<models::errors::ModelError> for StoreError {
    fn from(e: models::errors::ModelError) -> Self {
        match e {
            models::errors::ModelError::Validation(msg) => StoreError::InvalidDocument(msg),
            models::errors::ModelError::Db(msg) => StoreError::Backend(msg),
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct FindOptions {
    pub limit: Option<u64>,
}

impl FindOptions {
    pub fn limit(n: u64) -> Self {
        Self { limit: Some(n) }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct UpdateOptions {
    /// Insert a new document when nothing matches.
    pub upsert: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsertOutcome {
    pub acknowledged: bool,
    pub inserted_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOutcome {
    pub acknowledged: bool,
    pub matched_count: u64,
    pub modified_count: u64,
    pub upserted_count: u64,
    pub upserted_id: Option<String>,
}

impl UpdateOutcome {
    pub fn matched(modified: bool) -> Self {
        Self {
            acknowledged: true,
            matched_count: 1,
            modified_count: u64::from(modified),
            upserted_count: 0,
            upserted_id: None,
        }
    }

    pub fn upserted(id: String) -> Self {
        Self { acknowledged: true, matched_count: 0, modified_count: 0, upserted_count: 1, upserted_id: Some(id) }
    }

    pub fn unmatched() -> Self {
        Self { acknowledged: true, matched_count: 0, modified_count: 0, upserted_count: 0, upserted_id: None }
    }

    pub fn matched_existing(&self) -> bool {
        self.matched_count > 0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteOutcome {
    pub acknowledged: bool,
    pub deleted_count: u64,
}

impl DeleteOutcome {
    pub fn deleted(count: u64) -> Self {
        Self { acknowledged: true, deleted_count: count }
    }
}

/// Persistence collaborator shared by every request.
/// Implementations must make `update_one` atomic with respect to other writers
/// of the same store handle.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Documents matching `filter` in store insertion order.
    async fn find(&self, collection: &str, filter: &Filter, options: FindOptions) -> Result<Vec<Document>, StoreError>;
    async fn find_one(&self, collection: &str, filter: &Filter) -> Result<Option<Document>, StoreError>;
    /// Insert as-is; an absent `_id` is generated, a present one must be a UUID string.
    async fn insert_one(&self, collection: &str, document: Document) -> Result<InsertOutcome, StoreError>;
    /// Overwrite the `set` fields of the first match, or insert when `options.upsert` and nothing matches.
    async fn update_one(&self, collection: &str, filter: &Filter, set: Document, options: UpdateOptions) -> Result<UpdateOutcome, StoreError>;
    async fn delete_one(&self, collection: &str, filter: &Filter) -> Result<DeleteOutcome, StoreError>;
    async fn count(&self, collection: &str) -> Result<u64, StoreError>;
}

pub(crate) fn parse_id(raw: &str) -> Result<Uuid, StoreError> {
    Uuid::parse_str(raw.trim()).map_err(|_| StoreError::InvalidId(raw.to_string()))
}

/// Rewrite the `_id` clause (if any) into canonical hyphenated form.
pub(crate) fn canonical_filter(filter: &Filter) -> Result<Filter, StoreError> {
    match filter.id() {
        Some(raw) => {
            let id = parse_id(raw)?;
            Ok(filter.clone().with_clause(ID_FIELD, id.to_string()))
        }
        None => Ok(filter.clone()),
    }
}

/// Ensure `document["_id"]` holds a canonical UUID string, generating one when absent.
pub(crate) fn assign_id(document: &mut Document) -> Result<Uuid, StoreError> {
    let id = match document.get(ID_FIELD) {
        None | Some(Value::Null) => Uuid::new_v4(),
        Some(Value::String(raw)) => parse_id(raw)?,
        Some(other) => return Err(StoreError::InvalidId(other.to_string())),
    };
    document.insert(ID_FIELD.to_string(), Value::String(id.to_string()));
    Ok(id)
}

/// Overwrite `set` fields on `document`; `_id` is immutable. Returns whether anything changed.
pub(crate) fn apply_set(document: &mut Document, set: Document) -> bool {
    let mut changed = false;
    for (key, value) in set {
        if key == ID_FIELD {
            continue;
        }
        if document.get(&key) != Some(&value) {
            document.insert(key, value);
            changed = true;
        }
    }
    changed
}

/// Document inserted by an upsert that matched nothing: the filter's equality
/// clauses first, then the `set` fields on top.
pub(crate) fn upsert_seed(filter: &Filter, set: Document) -> Document {
    let mut document = filter.to_document();
    apply_set(&mut document, set);
    document
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(v: Value) -> Document {
        v.as_object().cloned().unwrap_or_default()
    }

    #[test]
    fn assign_id_generates_and_canonicalizes() -> Result<(), StoreError> {
        let mut fresh = Document::new();
        let id = assign_id(&mut fresh)?;
        assert_eq!(fresh[ID_FIELD], json!(id.to_string()));

        let mut given = doc(json!({"_id": "67E55044-10B1-426F-9247-BB680E5FE0C8"}));
        assign_id(&mut given)?;
        assert_eq!(given[ID_FIELD], json!("67e55044-10b1-426f-9247-bb680e5fe0c8"));
        Ok(())
    }

    #[test]
    fn assign_id_rejects_non_uuid() {
        let mut numeric = doc(json!({"_id": 42}));
        assert!(matches!(assign_id(&mut numeric), Err(StoreError::InvalidId(_))));
        let mut garbage = doc(json!({"_id": "not-an-id"}));
        assert!(matches!(assign_id(&mut garbage), Err(StoreError::InvalidId(_))));
    }

    #[test]
    fn apply_set_keeps_id_and_reports_change() {
        let mut d = doc(json!({"_id": "a", "rating": 5, "name": "Wash"}));
        assert!(!apply_set(&mut d, doc(json!({"rating": 5}))));
        assert!(apply_set(&mut d, doc(json!({"rating": 4, "_id": "b"}))));
        assert_eq!(d["rating"], json!(4));
        assert_eq!(d["_id"], json!("a"));
        assert_eq!(d["name"], json!("Wash"));
    }

    #[test]
    fn upsert_seed_lets_set_override_filter_text() {
        let filter = Filter::eq("user_email", "a@x.com").and("product_id", "42");
        let seeded = upsert_seed(&filter, doc(json!({"product_id": 42, "rating": 5})));
        assert_eq!(seeded["user_email"], json!("a@x.com"));
        assert_eq!(seeded["product_id"], json!(42));
        assert_eq!(seeded["rating"], json!(5));
    }

    #[test]
    fn outcomes_serialize_camel_case() {
        let v = serde_json::to_value(UpdateOutcome::upserted("x".into())).unwrap();
        assert_eq!(v["matchedCount"], json!(0));
        assert_eq!(v["upsertedId"], json!("x"));
        let v = serde_json::to_value(UpdateOutcome::matched(true)).unwrap();
        assert_eq!(v["upsertedId"], Value::Null);
        assert_eq!(v["modifiedCount"], json!(1));
    }
}
