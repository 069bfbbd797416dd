//! Authentication and authorization.
//!
//! Issues and verifies HS256 JWTs for three login paths: full registration,
//! email/password login, and a role-only dummy login used by test tooling.
//! The domain services never see tokens; handlers extract a [`CurrentUser`]
//! and gate operations on its [`Role`].

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
};
use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use rand::distributions::Alphanumeric;
use rand::{thread_rng, Rng};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::instrument;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::db::DbPool;
use crate::entities::user;
use crate::errors::ServiceError;
use crate::AppState;

pub use crate::entities::user::Role;

const TOKEN_ISSUER: &str = "pvz-api";

/// Claim structure for JWT tokens
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub email: String,
    pub role: Role,
    pub jti: String,
    pub iat: i64,
    pub exp: i64,
    pub iss: String,
}

/// Bearer token issued to a caller.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
}

#[derive(Debug, Clone)]
pub struct AuthConfig {
    secret: String,
    token_lifetime: Duration,
}

impl AuthConfig {
    pub fn new(secret: impl Into<String>, token_lifetime: Duration) -> Self {
        Self {
            secret: secret.into(),
            token_lifetime,
        }
    }
}

/// Issues tokens and resolves credentials against the `users` table.
#[derive(Clone)]
pub struct AuthService {
    config: AuthConfig,
    db: Arc<DbPool>,
}

impl AuthService {
    pub fn new(config: AuthConfig, db: Arc<DbPool>) -> Self {
        Self { config, db }
    }

    /// Registers a new user and returns a token for it.
    #[instrument(skip(self, password))]
    pub async fn register(
        &self,
        email: &str,
        password: &str,
        role: Role,
    ) -> Result<TokenResponse, ServiceError> {
        let existing = user::Entity::find()
            .filter(user::Column::Email.eq(email))
            .one(&*self.db)
            .await?;
        if existing.is_some() {
            return Err(ServiceError::Conflict(
                "user with this email already exists".to_string(),
            ));
        }

        let created = user::ActiveModel {
            id: Set(Uuid::new_v4()),
            email: Set(email.to_string()),
            password_hash: Set(hash_password(password)),
            role: Set(role),
            created_at: Set(Utc::now()),
        }
        .insert(&*self.db)
        .await?;

        self.issue_token(&created)
    }

    /// Verifies credentials and returns a fresh token.
    #[instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &str) -> Result<TokenResponse, ServiceError> {
        let found = user::Entity::find()
            .filter(user::Column::Email.eq(email))
            .one(&*self.db)
            .await?;

        match found {
            Some(user) if verify_password(password, &user.password_hash) => {
                self.issue_token(&user)
            }
            _ => Err(ServiceError::Unauthorized(
                "invalid credentials".to_string(),
            )),
        }
    }

    /// Returns a token for a synthetic per-role account, creating the
    /// account on first use.
    #[instrument(skip(self))]
    pub async fn dummy_login(&self, role: Role) -> Result<TokenResponse, ServiceError> {
        let email = format!("dummy-{}@pvz.local", role.as_str());
        let found = user::Entity::find()
            .filter(user::Column::Email.eq(email.as_str()))
            .one(&*self.db)
            .await?;

        let user = match found {
            Some(user) => user,
            None => {
                let random_password: String = thread_rng()
                    .sample_iter(&Alphanumeric)
                    .take(32)
                    .map(char::from)
                    .collect();
                user::ActiveModel {
                    id: Set(Uuid::new_v4()),
                    email: Set(email),
                    password_hash: Set(hash_password(&random_password)),
                    role: Set(role),
                    created_at: Set(Utc::now()),
                }
                .insert(&*self.db)
                .await?
            }
        };

        self.issue_token(&user)
    }

    /// Decodes and validates a bearer token.
    pub fn verify(&self, token: &str) -> Result<Claims, ServiceError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[TOKEN_ISSUER]);

        decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.config.secret.as_bytes()),
            &validation,
        )
        .map(|data| data.claims)
        .map_err(|_| ServiceError::Unauthorized("invalid or expired token".to_string()))
    }

    fn issue_token(&self, user: &user::Model) -> Result<TokenResponse, ServiceError> {
        let now = Utc::now();
        let claims = Claims {
            sub: user.id.to_string(),
            email: user.email.clone(),
            role: user.role,
            jti: Uuid::new_v4().to_string(),
            iat: now.timestamp(),
            exp: now.timestamp() + self.config.token_lifetime.as_secs() as i64,
            iss: TOKEN_ISSUER.to_string(),
        };

        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.config.secret.as_bytes()),
        )
        .map_err(|e| ServiceError::InternalError(format!("failed to sign token: {}", e)))?;

        Ok(TokenResponse {
            access_token: token,
            token_type: "bearer".to_string(),
        })
    }
}

/// Caller identity extracted from the Authorization header.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub user_id: Uuid,
    pub email: String,
    pub role: Role,
}

impl CurrentUser {
    /// Gate an operation on a single required role.
    pub fn require_role(&self, required: Role) -> Result<(), ServiceError> {
        match (self.role, required) {
            (Role::Employee, Role::Employee) | (Role::Moderator, Role::Moderator) => Ok(()),
            _ => Err(ServiceError::Forbidden("access denied".to_string())),
        }
    }
}

#[axum::async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ServiceError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header_value = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| {
                ServiceError::Unauthorized("missing authorization header".to_string())
            })?;

        let token = header_value.strip_prefix("Bearer ").ok_or_else(|| {
            ServiceError::Unauthorized("authorization header is not a bearer token".to_string())
        })?;

        let claims = state.auth.verify(token)?;
        let user_id = Uuid::parse_str(&claims.sub)
            .map_err(|_| ServiceError::Unauthorized("malformed token subject".to_string()))?;

        Ok(CurrentUser {
            user_id,
            email: claims.email,
            role: claims.role,
        })
    }
}

fn hash_password(password: &str) -> String {
    let salt: String = thread_rng()
        .sample_iter(&Alphanumeric)
        .take(16)
        .map(char::from)
        .collect();
    let digest = Sha256::digest(format!("{}{}", salt, password).as_bytes());
    format!("{}${}", salt, hex::encode(digest))
}

fn verify_password(password: &str, stored: &str) -> bool {
    let Some((salt, digest)) = stored.split_once('$') else {
        return false;
    };
    let computed = Sha256::digest(format!("{}{}", salt, password).as_bytes());
    hex::encode(computed) == digest
}
