//! Authentication Middleware
//! Mission: Protect mutating endpoints with access-token validation

use crate::auth::jwt::TokenIssuer;
use crate::store::UserId;
use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::sync::Arc;
use tracing::debug;

/// Identity proven by a valid access token, stored in request extensions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthenticatedUser(pub UserId);

/// Value of `Authorization: <scheme> <credential>`, if present and non-empty
pub fn authorization_credential<'a>(headers: &'a HeaderMap, scheme: &str) -> Option<&'a str> {
    headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|s| s.strip_prefix(scheme))
        .and_then(|s| s.strip_prefix(' '))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// Bearer token from the Authorization header
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    authorization_credential(headers, "Bearer")
}

/// Auth middleware that validates access tokens
pub async fn auth_middleware(
    State(issuer): State<Arc<TokenIssuer>>,
    mut req: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let token = bearer_token(req.headers()).ok_or(AuthError::MissingToken)?;

    let user_id = issuer.validate(token).map_err(|e| {
        debug!(error = %e, "Access token rejected");
        AuthError::InvalidToken
    })?;

    // Handlers read the identity back through `Extension<AuthenticatedUser>`
    req.extensions_mut().insert(AuthenticatedUser(user_id));

    Ok(next.run(req).await)
}

/// Auth error types
#[derive(Debug)]
pub enum AuthError {
    MissingToken,
    InvalidToken,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let message = match self {
            AuthError::MissingToken => "Missing authorization",
            AuthError::InvalidToken => "Unauthorized",
        };

        (StatusCode::UNAUTHORIZED, Json(json!({ "error": message }))).into_response()
    }
}
