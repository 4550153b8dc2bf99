use std::sync::Arc;

use serde_json::Value;
use tracing::{info, instrument};

use super::{MY_SERVICES, PREVIEW_LIMIT};
use crate::errors::ServiceError;
use crate::filter::{build_filter, Filter, Lookup, LookupParams};
use crate::projection::{project, ResourceKind};
use crate::storage::{DeleteOutcome, Document, DocumentStore, FindOptions, UpdateOutcome};
use crate::upsert::UpsertResolver;

/// Services a user offers or has bookmarked (`myServices`).
pub struct OfferingService {
    store: Arc<dyn DocumentStore>,
    upsert: UpsertResolver,
}

impl OfferingService {
    pub fn new(store: Arc<dyn DocumentStore>, upsert: UpsertResolver) -> Self {
        Self { store, upsert }
    }

    /// First few offerings, narrowed to `user_email` when supplied.
    pub async fn preview(&self, params: &LookupParams) -> Result<Vec<Document>, ServiceError> {
        let filter = build_filter(Lookup::UserEmail, params);
        Ok(self.store.find(MY_SERVICES, &filter, FindOptions::limit(PREVIEW_LIMIT)).await?)
    }

    pub async fn all(&self) -> Result<Vec<Document>, ServiceError> {
        Ok(self.store.find(MY_SERVICES, &Filter::empty(), FindOptions::default()).await?)
    }

    pub async fn get(&self, id: &str) -> Result<Option<Document>, ServiceError> {
        Ok(self.store.find_one(MY_SERVICES, &Filter::by_id(id)).await?)
    }

    /// Create or update the offering for (`user_email`, `product_id`).
    /// The stored `product_id` is the payload's own `_id`.
    #[instrument(skip(self, payload))]
    pub async fn upsert(&self, params: &LookupParams, payload: &Value) -> Result<UpdateOutcome, ServiceError> {
        let filter = build_filter(Lookup::UserAndProduct, params);
        self.upsert.upsert(MY_SERVICES, &filter, project(ResourceKind::MyService, payload)).await
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: &str) -> Result<DeleteOutcome, ServiceError> {
        let outcome = self.store.delete_one(MY_SERVICES, &Filter::by_id(id)).await?;
        info!(deleted = outcome.deleted_count, "offering_deleted");
        Ok(outcome)
    }
}
