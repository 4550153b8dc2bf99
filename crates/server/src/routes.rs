pub mod auth;
pub mod my_services;
pub mod reviews;
pub mod services;

use axum::{
    middleware,
    routing::{get, post},
    Json, Router,
};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;
use utoipa::OpenApi;

use common::{types::Health, LIVENESS_TEXT};

use self::auth::ServerState;
use crate::openapi::ApiDoc;

pub async fn root() -> &'static str {
    LIVENESS_TEXT
}

#[utoipa::path(get, path = "/health", tag = "health",
    responses((status = 200, description = "Service is up", body = crate::openapi::HealthResponse)))]
pub async fn health() -> Json<Health> {
    Json(Health { status: "ok" })
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

/// Build the application router. Only `GET /reviews` sits behind the bearer gate.
pub fn build_router(state: ServerState, cors: CorsLayer) -> Router {
    let public = Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/api-docs/openapi.json", get(openapi_json))
        .route("/jwt", post(auth::issue_token));

    let services = Router::new()
        .route("/services", get(services::preview))
        .route("/service-all", get(services::list_all))
        .route("/service/:id", get(services::get_one));

    // Layers on a method router cover only the handlers added before them.
    let gate = middleware::from_fn_with_state(state.clone(), auth::require_bearer_token);
    let reviews = Router::new()
        .route(
            "/reviews",
            get(reviews::list).route_layer(gate).post(reviews::create).put(reviews::upsert_by_key),
        )
        .route(
            "/reviews/:id",
            get(reviews::get_one).put(reviews::upsert_by_id).delete(reviews::delete),
        )
        .route("/reviews-email", get(reviews::by_email))
        .route("/reviews-id", get(reviews::by_product))
        .route("/reviews-email-id", get(reviews::by_email_and_product));

    let my_services = Router::new()
        .route("/my-service", get(my_services::preview).put(my_services::upsert))
        .route("/my-service-all", get(my_services::list_all))
        .route("/my-service/:id", get(my_services::get_one).delete(my_services::delete));

    public
        .merge(services)
        .merge(reviews)
        .merge(my_services)
        .with_state(state)
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO).include_headers(false))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO).include_headers(false))
                .on_failure(DefaultOnFailure::new().level(Level::ERROR)),
        )
}

