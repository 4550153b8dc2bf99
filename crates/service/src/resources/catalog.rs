use std::sync::Arc;

use tracing::instrument;

use super::{PREVIEW_LIMIT, SERVICES};
use crate::errors::ServiceError;
use crate::filter::Filter;
use crate::storage::{Document, DocumentStore, FindOptions};

/// Read-only access to the seeded service catalog.
pub struct CatalogService {
    store: Arc<dyn DocumentStore>,
}

impl CatalogService {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    pub async fn preview(&self) -> Result<Vec<Document>, ServiceError> {
        Ok(self.store.find(SERVICES, &Filter::empty(), FindOptions::limit(PREVIEW_LIMIT)).await?)
    }

    pub async fn all(&self) -> Result<Vec<Document>, ServiceError> {
        Ok(self.store.find(SERVICES, &Filter::empty(), FindOptions::default()).await?)
    }

    #[instrument(skip(self))]
    pub async fn get(&self, id: &str) -> Result<Option<Document>, ServiceError> {
        Ok(self.store.find_one(SERVICES, &Filter::by_id(id)).await?)
    }
}
