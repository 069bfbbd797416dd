use axum::{
    extract::{Json, State},
    response::IntoResponse,
    routing::post,
    Router,
};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    auth::{CurrentUser, Role},
    entities::{product, ProductType},
    errors::ServiceError,
    handlers::common::created_response,
    AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new().route("/products", post(create_product))
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductRequest {
    pub pvz_id: Uuid,
    #[serde(rename = "type")]
    pub product_type: ProductType,
}

/// Add a product to the pickup point's open reception (employees only)
#[utoipa::path(
    post,
    path = "/products",
    request_body = CreateProductRequest,
    responses(
        (status = 201, description = "Product recorded", body = product::Model),
        (status = 400, description = "No open reception", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "products"
)]
pub async fn create_product(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(payload): Json<CreateProductRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    user.require_role(Role::Employee)?;
    let product = state
        .services
        .products
        .add_product(payload.pvz_id, payload.product_type)
        .await?;
    Ok(created_response(product))
}
