//! Environment/runtime helpers
//!
//! Sanity checks to ensure expected directories exist at startup.

use tracing::{debug, warn};

/// Ensure the data directory exists; warn when an optional seed file is missing.
pub async fn ensure_env(data_dir: &str, seed_file: Option<&str>) -> anyhow::Result<()> {
    tokio::fs::create_dir_all(data_dir)
        .await
        .map_err(|e| anyhow::anyhow!("cannot create {data_dir}: {e}"))?;
    debug!(%data_dir, "data directory ready");
    if let Some(seed) = seed_file {
        if tokio::fs::metadata(seed).await.is_err() {
            warn!(%seed, "seed file not found; services collection will not be seeded");
        }
    }
    Ok(())
}
