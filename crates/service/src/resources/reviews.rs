use std::sync::Arc;

use serde_json::Value;
use tracing::{info, instrument};

use super::REVIEWS;
use crate::errors::ServiceError;
use crate::filter::{build_filter, Filter, Lookup, LookupParams};
use crate::projection::{project, ResourceKind};
use crate::storage::{DeleteOutcome, Document, DocumentStore, FindOptions, InsertOutcome, UpdateOutcome};
use crate::upsert::UpsertResolver;

/// User reviews of catalog services.
pub struct ReviewService {
    store: Arc<dyn DocumentStore>,
    upsert: UpsertResolver,
}

impl ReviewService {
    pub fn new(store: Arc<dyn DocumentStore>, upsert: UpsertResolver) -> Self {
        Self { store, upsert }
    }

    /// Raw insert: the body is stored as sent, without projection.
    #[instrument(skip(self, body))]
    pub async fn create(&self, body: Value) -> Result<InsertOutcome, ServiceError> {
        let Value::Object(document) = body else {
            return Err(ServiceError::Validation("review body must be a JSON object".into()));
        };
        let outcome = self.store.insert_one(REVIEWS, document).await?;
        info!(inserted_id = %outcome.inserted_id, "review_created");
        Ok(outcome)
    }

    /// Every review, or only those of `user_email` when supplied.
    pub async fn list(&self, params: &LookupParams) -> Result<Vec<Document>, ServiceError> {
        self.find(build_filter(Lookup::UserEmail, params)).await
    }

    pub async fn get(&self, id: &str) -> Result<Option<Document>, ServiceError> {
        Ok(self.store.find_one(REVIEWS, &Filter::by_id(id)).await?)
    }

    pub async fn by_email(&self, params: &LookupParams) -> Result<Vec<Document>, ServiceError> {
        self.find(build_filter(Lookup::UserEmail, params)).await
    }

    pub async fn by_product(&self, params: &LookupParams) -> Result<Vec<Document>, ServiceError> {
        self.find(build_filter(Lookup::ProductId, params)).await
    }

    /// The review a user left on one product, if any.
    pub async fn by_email_and_product(&self, params: &LookupParams) -> Result<Option<Document>, ServiceError> {
        let filter = build_filter(Lookup::UserAndProduct, params);
        Ok(self.store.find_one(REVIEWS, &filter).await?)
    }

    /// Create or update a review keyed by `params.id`, else by the
    /// (`user_email`, `product_id`) pair. Only the review fields are written.
    #[instrument(skip(self, payload))]
    pub async fn upsert(&self, params: &LookupParams, payload: &Value) -> Result<UpdateOutcome, ServiceError> {
        let filter = build_filter(Lookup::UserAndProduct, params);
        self.upsert.upsert(REVIEWS, &filter, project(ResourceKind::Review, payload)).await
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: &str) -> Result<DeleteOutcome, ServiceError> {
        let outcome = self.store.delete_one(REVIEWS, &Filter::by_id(id)).await?;
        info!(deleted = outcome.deleted_count, "review_deleted");
        Ok(outcome)
    }

    async fn find(&self, filter: Filter) -> Result<Vec<Document>, ServiceError> {
        Ok(self.store.find(REVIEWS, &filter, FindOptions::default()).await?)
    }
}
