use axum::{
    extract::{Json, Path, Query, State},
    response::IntoResponse,
    routing::post,
    Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::{
    auth::{CurrentUser, Role},
    entities::{pickup_point, product, reception, City},
    errors::ServiceError,
    handlers::common::{created_response, success_response, validate_input},
    services::listing::PickupPointGroup,
    AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/pvz", post(create_pvz).get(list_pvz))
        .route("/pvz/:pvz_id/close_last_reception", post(close_last_reception))
        .route("/pvz/:pvz_id/delete_last_product", post(delete_last_product))
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreatePvzRequest {
    pub city: City,
}

/// Query window and pagination for the listing report.
#[derive(Debug, Deserialize, Validate, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ListPvzQuery {
    /// Window start (inclusive), RFC 3339
    pub start_date: DateTime<Utc>,
    /// Window end (inclusive), RFC 3339
    pub end_date: DateTime<Utc>,
    #[serde(default = "default_page")]
    #[validate(range(min = 1))]
    pub page: u64,
    #[serde(default = "default_limit")]
    #[validate(range(min = 1, max = 30))]
    pub limit: u64,
}

fn default_page() -> u64 {
    1
}

fn default_limit() -> u64 {
    10
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RemoveLastProductResponse {
    /// The removed product, or null when the open reception was already empty
    pub deleted: Option<product::Model>,
}

/// Register a pickup point (moderators only)
#[utoipa::path(
    post,
    path = "/pvz",
    request_body = CreatePvzRequest,
    responses(
        (status = 201, description = "Pickup point created", body = pickup_point::Model),
        (status = 403, description = "Caller is not a moderator", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "pvz"
)]
pub async fn create_pvz(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(payload): Json<CreatePvzRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    user.require_role(Role::Moderator)?;
    let pvz = state
        .services
        .pickup_points
        .create_pickup_point(payload.city)
        .await?;
    Ok(created_response(pvz))
}

/// List in-progress receptions and their products, grouped by pickup point
#[utoipa::path(
    get,
    path = "/pvz",
    params(ListPvzQuery),
    responses(
        (status = 200, description = "Groups for the requested page", body = Vec<PickupPointGroup>),
        (status = 400, description = "Bad date range or pagination", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "pvz"
)]
pub async fn list_pvz(
    State(state): State<AppState>,
    user: CurrentUser,
    Query(query): Query<ListPvzQuery>,
) -> Result<impl IntoResponse, ServiceError> {
    // Both roles may read the report; extraction alone authenticates.
    match user.role {
        Role::Employee | Role::Moderator => {}
    }
    validate_input(&query)?;
    let groups = state
        .services
        .listing
        .list_active_receptions(query.start_date, query.end_date, query.page, query.limit)
        .await?;
    Ok(success_response(groups))
}

/// Close the pickup point's open reception (employees only)
#[utoipa::path(
    post,
    path = "/pvz/{pvz_id}/close_last_reception",
    params(("pvz_id" = Uuid, Path, description = "Pickup point id")),
    responses(
        (status = 200, description = "Reception closed", body = reception::Model),
        (status = 400, description = "No open reception to close", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "pvz"
)]
pub async fn close_last_reception(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(pvz_id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    user.require_role(Role::Employee)?;
    let reception = state.services.receptions.close_reception(pvz_id).await?;
    Ok(success_response(reception))
}

/// Remove the most recently added product from the open reception (employees only)
#[utoipa::path(
    post,
    path = "/pvz/{pvz_id}/delete_last_product",
    params(("pvz_id" = Uuid, Path, description = "Pickup point id")),
    responses(
        (status = 200, description = "Removal outcome", body = RemoveLastProductResponse),
        (status = 400, description = "No open reception", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "pvz"
)]
pub async fn delete_last_product(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(pvz_id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    user.require_role(Role::Employee)?;
    let deleted = state.services.products.remove_last_product(pvz_id).await?;
    Ok(success_response(RemoveLastProductResponse { deleted }))
}
