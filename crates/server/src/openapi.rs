use serde::Serialize;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use utoipa::{Modify, OpenApi, ToSchema};

#[derive(ToSchema)]
pub struct HealthResponse {
    pub status: String,
}

/// Any JSON object; it is signed as the token claims.
#[derive(ToSchema)]
pub struct TokenRequestDoc {
    pub email: Option<String>,
}

#[derive(ToSchema)]
pub struct TokenResponseDoc {
    pub token: String,
}

#[derive(Serialize, ToSchema)]
pub struct ReviewDoc {
    pub product_id: Option<String>,
    pub product_name: Option<String>,
    pub product_img: Option<String>,
    pub product_price: Option<f64>,
    pub product_description: Option<String>,
    pub user_name: Option<String>,
    #[serde(rename = "user_photoURL")]
    pub user_photo_url: Option<String>,
    pub user_email: Option<String>,
    pub review_message: Option<String>,
}

/// `_id` is the catalog service being offered; it is stored as `product_id`.
#[derive(Serialize, ToSchema)]
pub struct MyServiceDoc {
    #[serde(rename = "_id")]
    pub id: Option<String>,
    pub rating: Option<f64>,
    pub name: Option<String>,
    pub img: Option<String>,
    pub price: Option<f64>,
    pub description: Option<String>,
    pub user_email: Option<String>,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InsertOutcomeDoc {
    pub acknowledged: bool,
    pub inserted_id: String,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOutcomeDoc {
    pub acknowledged: bool,
    pub matched_count: u64,
    pub modified_count: u64,
    pub upserted_count: u64,
    pub upserted_id: Option<String>,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeleteOutcomeDoc {
    pub acknowledged: bool,
    pub deleted_count: u64,
}

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme("bearer_auth", SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)));
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    paths(
        crate::routes::health,
        crate::routes::auth::issue_token,
        crate::routes::services::preview,
        crate::routes::services::list_all,
        crate::routes::services::get_one,
        crate::routes::reviews::create,
        crate::routes::reviews::list,
        crate::routes::reviews::get_one,
        crate::routes::reviews::by_email,
        crate::routes::reviews::by_product,
        crate::routes::reviews::by_email_and_product,
        crate::routes::reviews::upsert_by_id,
        crate::routes::reviews::upsert_by_key,
        crate::routes::reviews::delete,
        crate::routes::my_services::preview,
        crate::routes::my_services::list_all,
        crate::routes::my_services::get_one,
        crate::routes::my_services::upsert,
        crate::routes::my_services::delete,
    ),
    components(
        schemas(
            HealthResponse,
            TokenRequestDoc,
            TokenResponseDoc,
            ReviewDoc,
            MyServiceDoc,
            InsertOutcomeDoc,
            UpdateOutcomeDoc,
            DeleteOutcomeDoc,
        )
    ),
    tags(
        (name = "health"),
        (name = "auth"),
        (name = "services"),
        (name = "reviews"),
        (name = "my-service")
    )
)]
pub struct ApiDoc;
