use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde_json::Value;
use service::filter::LookupParams;
use service::storage::{DeleteOutcome, Document, UpdateOutcome};

use super::auth::ServerState;
use crate::errors::ApiError;

#[utoipa::path(get, path = "/my-service", tag = "my-service",
    params(("user_email" = Option<String>, Query, description = "Owner email")),
    responses((status = 200, description = "First three matching offerings")))]
pub async fn preview(
    State(state): State<ServerState>,
    Query(params): Query<LookupParams>,
) -> Result<Json<Vec<Document>>, ApiError> {
    Ok(Json(state.market.offerings.preview(&params).await?))
}

#[utoipa::path(get, path = "/my-service-all", tag = "my-service",
    responses((status = 200, description = "Every offering")))]
pub async fn list_all(State(state): State<ServerState>) -> Result<Json<Vec<Document>>, ApiError> {
    Ok(Json(state.market.offerings.all().await?))
}

#[utoipa::path(get, path = "/my-service/{id}", tag = "my-service",
    params(("id" = String, Path, description = "Offering identifier")),
    responses((status = 200, description = "The offering, or null")))]
pub async fn get_one(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> Result<Json<Option<Document>>, ApiError> {
    Ok(Json(state.market.offerings.get(&id).await?))
}

/// Keyed on (`user_email`, `product_id`); the body's `_id` becomes `product_id`.
#[utoipa::path(put, path = "/my-service", tag = "my-service",
    params(
        ("user_email" = Option<String>, Query, description = "Owner email"),
        ("product_id" = Option<String>, Query, description = "Offered product")
    ),
    request_body = crate::openapi::MyServiceDoc,
    responses(
        (status = 200, description = "Update result", body = crate::openapi::UpdateOutcomeDoc),
        (status = 400, description = "Both keys are required")
    ))]
pub async fn upsert(
    State(state): State<ServerState>,
    Query(params): Query<LookupParams>,
    Json(payload): Json<Value>,
) -> Result<Json<UpdateOutcome>, ApiError> {
    Ok(Json(state.market.offerings.upsert(&params, &payload).await?))
}

#[utoipa::path(delete, path = "/my-service/{id}", tag = "my-service",
    params(("id" = String, Path, description = "Offering identifier")),
    responses((status = 200, description = "Delete result", body = crate::openapi::DeleteOutcomeDoc)))]
pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> Result<Json<DeleteOutcome>, ApiError> {
    Ok(Json(state.market.offerings.delete(&id).await?))
}
