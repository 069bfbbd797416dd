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
    entities::reception,
    errors::ServiceError,
    handlers::common::created_response,
    AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new().route("/receptions", post(create_reception))
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateReceptionRequest {
    pub pvz_id: Uuid,
}

/// Open a new reception at a pickup point (employees only)
#[utoipa::path(
    post,
    path = "/receptions",
    request_body = CreateReceptionRequest,
    responses(
        (status = 201, description = "Reception opened", body = reception::Model),
        (status = 400, description = "Open reception already exists", body = crate::errors::ErrorResponse),
        (status = 404, description = "Unknown pickup point", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "receptions"
)]
pub async fn create_reception(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(payload): Json<CreateReceptionRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    user.require_role(Role::Employee)?;
    let reception = state
        .services
        .receptions
        .open_reception(payload.pvz_id)
        .await?;
    Ok(created_response(reception))
}
