use std::{future::Future, net::SocketAddr, sync::Arc};

use axum::Router;
use configs::AppConfig;
use migration::MigratorTrait;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};

use crate::errors::StartupError;
use crate::routes::{self, auth::ServerState};
use service::{
    auth::{TokenConfig, TokenService},
    resources::Marketplace,
    runtime, seed,
    storage::{DocumentStore, JsonDocumentStore, SeaOrmDocumentStore},
};

fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

/// Postgres when a database URL is configured, otherwise the JSON file store.
pub async fn build_store(cfg: &AppConfig) -> Result<Arc<dyn DocumentStore>, StartupError> {
    if cfg.uses_database() {
        let db = models::db::connect_with_config(&cfg.database)
            .await
            .map_err(|e| StartupError::Store(e.to_string()))?;
        migration::Migrator::up(&db, None)
            .await
            .map_err(|e| StartupError::Store(format!("migrations failed: {e}")))?;
        info!(backend = "postgres", "document store ready");
        let store: Arc<dyn DocumentStore> = Arc::new(SeaOrmDocumentStore::new(db));
        Ok(store)
    } else {
        let store: Arc<dyn DocumentStore> = JsonDocumentStore::new(&cfg.store.documents_file)
            .await
            .map_err(|e| StartupError::Store(e.to_string()))?;
        info!(backend = "file", path = %cfg.store.documents_file, "document store ready");
        Ok(store)
    }
}

/// Wire the resource services and token signer around one store handle.
pub fn build_state(cfg: &AppConfig, store: Arc<dyn DocumentStore>) -> ServerState {
    ServerState {
        market: Marketplace::new(store, cfg.store.allow_unscoped_writes),
        tokens: Arc::new(TokenService::new(TokenConfig::from(&cfg.auth))),
    }
}

pub fn build_app(state: ServerState) -> Router {
    routes::build_router(state, build_cors())
}

/// Open and seed the store described by `cfg`, then serve until `shutdown` resolves.
/// In-flight requests are drained before returning.
pub async fn run_until<F>(cfg: AppConfig, shutdown: F) -> anyhow::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    runtime::ensure_env(&cfg.store)
        .await
        .map_err(|e| StartupError::Runtime(e.to_string()))?;

    let store = build_store(&cfg).await?;
    if let Some(path) = cfg.store.seed_services_file.as_deref() {
        // A bad seed file leaves the catalog empty but the API usable.
        if let Err(e) = seed::seed_services(store.as_ref(), path).await {
            warn!(error = %e, "service catalog not seeded");
        }
    }

    let app = build_app(build_state(&cfg, store));
    let addr: SocketAddr = cfg.server.bind_addr().parse().map_err(|e| {
        StartupError::InvalidConfig(format!("bind address {}: {e}", cfg.server.bind_addr()))
    })?;
    info!(%addr, "starting server crate");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(addr = %listener.local_addr()?, "listening");
    axum::serve(listener, app).with_graceful_shutdown(shutdown).await?;
    info!("server stopped accepting connections");
    Ok(())
}
