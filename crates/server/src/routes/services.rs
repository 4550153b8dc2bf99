use axum::{
    extract::{Path, State},
    Json,
};
use service::storage::Document;

use super::auth::ServerState;
use crate::errors::ApiError;

#[utoipa::path(get, path = "/services", tag = "services",
    responses((status = 200, description = "First three services")))]
pub async fn preview(State(state): State<ServerState>) -> Result<Json<Vec<Document>>, ApiError> {
    Ok(Json(state.market.catalog.preview().await?))
}

#[utoipa::path(get, path = "/service-all", tag = "services",
    responses((status = 200, description = "Every service")))]
pub async fn list_all(State(state): State<ServerState>) -> Result<Json<Vec<Document>>, ApiError> {
    Ok(Json(state.market.catalog.all().await?))
}

#[utoipa::path(get, path = "/service/{id}", tag = "services",
    params(("id" = String, Path, description = "Service identifier")),
    responses((status = 200, description = "The service, or null")))]
pub async fn get_one(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> Result<Json<Option<Document>>, ApiError> {
    Ok(Json(state.market.catalog.get(&id).await?))
}
