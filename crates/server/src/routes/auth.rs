use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use common::types::{MessageBody, TokenResponse};
use serde_json::Value;
use service::auth::errors::AuthError;
use service::auth::TokenService;
use service::resources::Marketplace;
use tracing::{info, warn};

use crate::errors::ApiError;

/// Shared per-request state: the resource services and the token signer.
#[derive(Clone)]
pub struct ServerState {
    pub market: Marketplace,
    pub tokens: Arc<TokenService>,
}

/// Sign the posted JSON object as token claims.
#[utoipa::path(
    post,
    path = "/jwt",
    tag = "auth",
    request_body = crate::openapi::TokenRequestDoc,
    responses(
        (status = 200, description = "Signed token", body = crate::openapi::TokenResponseDoc),
        (status = 400, description = "Payload is not an object or already carries exp")
    )
)]
pub async fn issue_token(
    State(state): State<ServerState>,
    Json(claims): Json<Value>,
) -> Result<Json<TokenResponse>, ApiError> {
    let token = state.tokens.sign(claims)?;
    info!(event = "token_issued", "bearer token issued");
    Ok(Json(TokenResponse { token }))
}

fn refuse(status: StatusCode, message: &str) -> Response {
    (status, Json(MessageBody { message: message.to_string() })).into_response()
}

/// Gate for routes that need a bearer token.
/// Missing or blank `Authorization` answers 401; any unusable credential answers 403.
/// Accepted claims are stored in request extensions as `AuthClaims`.
pub async fn require_bearer_token(State(state): State<ServerState>, mut req: Request, next: Next) -> Response {
    let verdict = match req.headers().get(AUTHORIZATION).map(|v| v.to_str()) {
        None => state.tokens.authorize(None),
        Some(Ok(header)) => state.tokens.authorize(Some(header)),
        // Present but not valid text.
        Some(Err(_)) => Err(AuthError::Unauthorized("non-ASCII Authorization header".into())),
    };

    match verdict {
        Ok(claims) => {
            req.extensions_mut().insert(claims);
            next.run(req).await
        }
        Err(AuthError::Unauthenticated) => {
            warn!(path = %req.uri().path(), "missing Authorization header");
            refuse(StatusCode::UNAUTHORIZED, "unauthorized access")
        }
        Err(e) => {
            warn!(path = %req.uri().path(), code = e.code(), err = %e, "token validation failed");
            refuse(StatusCode::FORBIDDEN, "Forbidden access")
        }
    }
}
