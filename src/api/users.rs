//! Account and session endpoints
//! Mission: Registration, login, profile updates and refresh-token rotation

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::Json,
    Extension,
};
use std::time::Duration;
use tracing::{info, warn};

use super::{ApiError, AppState, JsonBody};
use crate::auth::middleware::{bearer_token, AuthenticatedUser};
use crate::auth::models::{
    CredentialsRequest, LoginRequest, LoginResponse, TokenResponse, UserResponse,
};
use crate::error::ChirpyError;
use crate::store::User;

fn require_credentials(payload: &CredentialsRequest) -> Result<(), ApiError> {
    if payload.email.is_empty() {
        return Err(ApiError::BadRequest("Email can not be empty".to_string()));
    }
    if payload.password.is_empty() {
        return Err(ApiError::BadRequest("Password can not be empty".to_string()));
    }
    Ok(())
}

/// Register - POST /api/users
pub async fn create_user(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<CredentialsRequest>,
) -> Result<(StatusCode, Json<UserResponse>), ApiError> {
    require_credentials(&payload)?;

    let password_hash = state.hasher.hash(&payload.password)?;
    let user = state.users.create(&payload.email, &password_hash)?;

    Ok((StatusCode::CREATED, Json(UserResponse::from_user(&user))))
}

/// Login endpoint - POST /api/login
pub async fn login(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let user = match state.users.find_by_email(&payload.email) {
        Ok(user) => user,
        Err(ChirpyError::NotFound(_)) => {
            warn!("❌ Failed login attempt: unknown email");
            return Err(ApiError::Unauthorized);
        }
        Err(e) => return Err(e.into()),
    };

    if !state.hasher.verify(&user.password_hash, &payload.password)? {
        warn!(user_id = user.id, "❌ Failed login attempt: wrong password");
        return Err(ApiError::Unauthorized);
    }

    let ttl = Duration::from_secs(payload.expires_in_seconds.unwrap_or(0));
    let token = state.tokens.issue(user.id, ttl)?;
    let refresh_token = state.refresh.issue(user.id)?;

    info!(user_id = user.id, "🔐 Login successful");

    Ok(Json(LoginResponse {
        user: UserResponse::from_user(&user),
        token,
        refresh_token,
    }))
}

/// Update own email and password - PUT /api/users
pub async fn update_user(
    State(state): State<AppState>,
    Extension(AuthenticatedUser(user_id)): Extension<AuthenticatedUser>,
    JsonBody(payload): JsonBody<CredentialsRequest>,
) -> Result<Json<UserResponse>, ApiError> {
    require_credentials(&payload)?;

    let current = state.users.find_by_id(user_id)?;
    let updated = User {
        email: payload.email,
        password_hash: state.hasher.hash(&payload.password)?,
        ..current
    };
    state.users.update(&updated)?;

    Ok(Json(UserResponse::from_user(&updated)))
}

/// Exchange a refresh token for a new access token - POST /api/refresh
pub async fn refresh(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<TokenResponse>, ApiError> {
    let refresh_token = bearer_token(&headers).ok_or(ApiError::Unauthorized)?;

    let user_id = state.refresh.resolve(refresh_token)?;
    let token = state.tokens.issue(user_id, Duration::ZERO)?;

    info!(user_id, "Issued access token from refresh token");
    Ok(Json(TokenResponse { token }))
}

/// Revoke a refresh token - POST /api/revoke
pub async fn revoke(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<StatusCode, ApiError> {
    let refresh_token = bearer_token(&headers).ok_or(ApiError::Unauthorized)?;

    state.refresh.revoke(refresh_token)?;
    Ok(StatusCode::NO_CONTENT)
}
