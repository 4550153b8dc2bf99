//! Resource services: one per collection, each a thin layer over
//! [`DocumentStore`](crate::storage::DocumentStore) that wires the filter
//! builder, the record projector and the upsert resolver together.

pub mod catalog;
pub mod offerings;
pub mod reviews;

use std::sync::Arc;

use crate::storage::DocumentStore;
use crate::upsert::UpsertResolver;

pub use catalog::CatalogService;
pub use offerings::OfferingService;
pub use reviews::ReviewService;

pub const SERVICES: &str = "services";
pub const REVIEWS: &str = "reviews";
pub const MY_SERVICES: &str = "myServices";

/// Size of the preview lists (`GET /services`, `GET /my-service`).
pub const PREVIEW_LIMIT: u64 = 3;

/// All resource services sharing one store handle.
#[derive(Clone)]
pub struct Marketplace {
    pub catalog: Arc<CatalogService>,
    pub reviews: Arc<ReviewService>,
    pub offerings: Arc<OfferingService>,
}

impl Marketplace {
    pub fn new(store: Arc<dyn DocumentStore>, allow_unscoped_writes: bool) -> Self {
        let resolver = UpsertResolver::new(Arc::clone(&store), allow_unscoped_writes);
        Self {
            catalog: Arc::new(CatalogService::new(Arc::clone(&store))),
            reviews: Arc::new(ReviewService::new(Arc::clone(&store), resolver.clone())),
            offerings: Arc::new(OfferingService::new(store, resolver)),
        }
    }
}
