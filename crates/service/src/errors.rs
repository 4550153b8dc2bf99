use thiserror::Error;

use crate::storage::StoreError;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("validation error: {0}")]
    Validation(String),
    #[error("refusing unscoped write to `{0}`: supply the lookup parameters or enable store.allow_unscoped_writes")]
    UnscopedWrite(String),
    #[error("seed error: {0}")]
    Seed(String),
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ServiceError {
    /// Whether the caller, rather than the store, is at fault.
    pub fn is_client_error(&self) -> bool {
        matches!(self, ServiceError::Validation(_) | ServiceError::UnscopedWrite(_))
    }
}
