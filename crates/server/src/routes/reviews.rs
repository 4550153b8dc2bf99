use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use serde_json::Value;
use service::auth::domain::AuthClaims;
use service::filter::LookupParams;
use service::storage::{DeleteOutcome, Document, InsertOutcome, UpdateOutcome};
use tracing::info;

use super::auth::ServerState;
use crate::errors::ApiError;

#[utoipa::path(post, path = "/reviews", tag = "reviews",
    request_body = crate::openapi::ReviewDoc,
    responses(
        (status = 200, description = "Insert result", body = crate::openapi::InsertOutcomeDoc),
        (status = 400, description = "Body is not a JSON object")
    ))]
pub async fn create(
    State(state): State<ServerState>,
    Json(body): Json<Value>,
) -> Result<Json<InsertOutcome>, ApiError> {
    Ok(Json(state.market.reviews.create(body).await?))
}

/// Requires a bearer token; narrowed to `user_email` when given.
#[utoipa::path(get, path = "/reviews", tag = "reviews",
    params(("user_email" = Option<String>, Query, description = "Reviewer email")),
    responses(
        (status = 200, description = "Matching reviews"),
        (status = 401, description = "No Authorization header"),
        (status = 403, description = "Invalid or expired token")
    ),
    security(("bearer_auth" = [])))]
pub async fn list(
    State(state): State<ServerState>,
    claims: Option<Extension<AuthClaims>>,
    Query(params): Query<LookupParams>,
) -> Result<Json<Vec<Document>>, ApiError> {
    let subject = claims.as_ref().and_then(|Extension(c)| c.email()).unwrap_or_default();
    info!(%subject, user_email = params.user_email().unwrap_or_default(), "list_reviews");
    Ok(Json(state.market.reviews.list(&params).await?))
}

#[utoipa::path(get, path = "/reviews/{id}", tag = "reviews",
    params(("id" = String, Path, description = "Review identifier")),
    responses((status = 200, description = "The review, or null")))]
pub async fn get_one(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> Result<Json<Option<Document>>, ApiError> {
    Ok(Json(state.market.reviews.get(&id).await?))
}

#[utoipa::path(get, path = "/reviews-email", tag = "reviews",
    params(("user_email" = Option<String>, Query, description = "Reviewer email")),
    responses((status = 200, description = "Reviews by that user")))]
pub async fn by_email(
    State(state): State<ServerState>,
    Query(params): Query<LookupParams>,
) -> Result<Json<Vec<Document>>, ApiError> {
    Ok(Json(state.market.reviews.by_email(&params).await?))
}

#[utoipa::path(get, path = "/reviews-id", tag = "reviews",
    params(("product_id" = Option<String>, Query, description = "Reviewed product")),
    responses((status = 200, description = "Reviews of that product")))]
pub async fn by_product(
    State(state): State<ServerState>,
    Query(params): Query<LookupParams>,
) -> Result<Json<Vec<Document>>, ApiError> {
    Ok(Json(state.market.reviews.by_product(&params).await?))
}

#[utoipa::path(get, path = "/reviews-email-id", tag = "reviews",
    params(
        ("user_email" = Option<String>, Query, description = "Reviewer email"),
        ("product_id" = Option<String>, Query, description = "Reviewed product")
    ),
    responses((status = 200, description = "The review, or null")))]
pub async fn by_email_and_product(
    State(state): State<ServerState>,
    Query(params): Query<LookupParams>,
) -> Result<Json<Option<Document>>, ApiError> {
    Ok(Json(state.market.reviews.by_email_and_product(&params).await?))
}

/// The path identifier takes precedence over any query parameters.
#[utoipa::path(put, path = "/reviews/{id}", tag = "reviews",
    params(("id" = String, Path, description = "Review identifier")),
    request_body = crate::openapi::ReviewDoc,
    responses((status = 200, description = "Update result", body = crate::openapi::UpdateOutcomeDoc)))]
pub async fn upsert_by_id(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Query(params): Query<LookupParams>,
    Json(payload): Json<Value>,
) -> Result<Json<UpdateOutcome>, ApiError> {
    Ok(Json(state.market.reviews.upsert(&params.with_id(id), &payload).await?))
}

#[utoipa::path(put, path = "/reviews", tag = "reviews",
    params(
        ("user_email" = Option<String>, Query, description = "Reviewer email"),
        ("product_id" = Option<String>, Query, description = "Reviewed product")
    ),
    request_body = crate::openapi::ReviewDoc,
    responses(
        (status = 200, description = "Update result", body = crate::openapi::UpdateOutcomeDoc),
        (status = 400, description = "Neither an identifier nor both keys supplied")
    ))]
pub async fn upsert_by_key(
    State(state): State<ServerState>,
    Query(params): Query<LookupParams>,
    Json(payload): Json<Value>,
) -> Result<Json<UpdateOutcome>, ApiError> {
    Ok(Json(state.market.reviews.upsert(&params, &payload).await?))
}

#[utoipa::path(delete, path = "/reviews/{id}", tag = "reviews",
    params(("id" = String, Path, description = "Review identifier")),
    responses((status = 200, description = "Delete result", body = crate::openapi::DeleteOutcomeDoc)))]
pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> Result<Json<DeleteOutcome>, ApiError> {
    Ok(Json(state.market.reviews.delete(&id).await?))
}
