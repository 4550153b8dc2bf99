use std::sync::Arc;

use tracing::{info, instrument, warn};

use crate::errors::ServiceError;
use crate::filter::Filter;
use crate::storage::{Document, DocumentStore, UpdateOptions, UpdateOutcome};

/// Update-or-create against a collection: overwrite the projected fields of the
/// first document matching the filter, or insert filter clauses plus fields.
#[derive(Clone)]
pub struct UpsertResolver {
    store: Arc<dyn DocumentStore>,
    allow_unscoped: bool,
}

impl UpsertResolver {
    /// With `allow_unscoped` false, an empty filter is refused instead of
    /// updating whichever document the store returns first.
    pub fn new(store: Arc<dyn DocumentStore>, allow_unscoped: bool) -> Self {
        Self { store, allow_unscoped }
    }

    /// # Examples
    /// ```
    /// use service::filter::Filter;
    /// use service::storage::JsonDocumentStore;
    /// use service::upsert::UpsertResolver;
    /// use serde_json::json;
    ///
    /// let resolver = UpsertResolver::new(JsonDocumentStore::in_memory(), false);
    /// let filter = Filter::eq("user_email", "a@x.com").and("product_id", "42");
    /// let fields = json!({"rating": 5}).as_object().cloned().unwrap();
    ///
    /// let created = tokio_test::block_on(resolver.upsert("myServices", &filter, fields.clone())).unwrap();
    /// assert!(created.upserted_id.is_some());
    /// let updated = tokio_test::block_on(resolver.upsert("myServices", &filter, fields)).unwrap();
    /// assert_eq!(updated.matched_count, 1);
    /// ```
    #[instrument(skip(self, filter, fields), fields(collection = %collection, clauses = filter.clauses().len()))]
    pub async fn upsert(&self, collection: &str, filter: &Filter, fields: Document) -> Result<UpdateOutcome, ServiceError> {
        if filter.is_unscoped() {
            if !self.allow_unscoped {
                return Err(ServiceError::UnscopedWrite(collection.to_string()));
            }
            warn!(%collection, "unscoped upsert: first stored document will be overwritten");
        }
        let outcome = self
            .store
            .update_one(collection, filter, fields, UpdateOptions { upsert: true })
            .await?;
        info!(
            matched = outcome.matched_count,
            modified = outcome.modified_count,
            upserted_id = outcome.upserted_id.as_deref().unwrap_or(""),
            "upsert_resolved"
        );
        Ok(outcome)
    }
}
