use axum::{
    extract::{Json, State},
    http::StatusCode,
    response::IntoResponse,
    routing::post,
    Router,
};
use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    auth::{Role, TokenResponse},
    errors::ServiceError,
    handlers::common::validate_input,
    AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/dummyLogin", post(dummy_login))
        .route("/register", post(register))
        .route("/login", post(login))
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RegisterRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 6))]
    pub password: String,
    pub role: Role,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct DummyLoginRequest {
    pub role: Role,
}

/// Issue a test token carrying the requested role
#[utoipa::path(
    post,
    path = "/dummyLogin",
    request_body = DummyLoginRequest,
    responses(
        (status = 200, description = "Token issued", body = TokenResponse)
    ),
    tag = "auth"
)]
pub async fn dummy_login(
    State(state): State<AppState>,
    Json(payload): Json<DummyLoginRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let token = state.auth.dummy_login(payload.role).await?;
    Ok(Json(token))
}

/// Register a new user
#[utoipa::path(
    post,
    path = "/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User registered", body = TokenResponse),
        (status = 400, description = "Email already taken or invalid input", body = crate::errors::ErrorResponse)
    ),
    tag = "auth"
)]
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    validate_input(&payload)?;
    let token = state
        .auth
        .register(&payload.email, &payload.password, payload.role)
        .await?;
    Ok((StatusCode::CREATED, Json(token)))
}

/// Exchange credentials for a token
#[utoipa::path(
    post,
    path = "/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Token issued", body = TokenResponse),
        (status = 401, description = "Invalid credentials", body = crate::errors::ErrorResponse)
    ),
    tag = "auth"
)]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let token = state.auth.login(&payload.email, &payload.password).await?;
    Ok(Json(token))
}
