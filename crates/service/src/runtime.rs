//! Runtime environment helpers
//!
//! Thin wrapper around `common::env` so binary crates can call
//! `service::runtime::ensure_env` with the store configuration.

use configs::StoreConfig;

/// Create the data directory; warn when the configured seed file is missing.
pub async fn ensure_env(store: &StoreConfig) -> anyhow::Result<()> {
    common::env::ensure_env(&store.data_dir, store.seed_services_file.as_deref()).await
}
