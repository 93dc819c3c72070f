//! Payment provider webhook

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
};
use serde::Deserialize;
use tracing::{info, warn};

use super::{ApiError, AppState, JsonBody};
use crate::auth::middleware::authorization_credential;
use crate::store::UserId;

/// Event name that promotes a user
pub const USER_UPGRADED: &str = "user.upgraded";

#[derive(Debug, Deserialize)]
pub struct PolkaEvent {
    pub event: String,
    /// Only upgrade events are required to carry a payload
    #[serde(default)]
    pub data: Option<PolkaEventData>,
}

#[derive(Debug, Deserialize)]
pub struct PolkaEventData {
    #[serde(default)]
    pub user_id: Option<UserId>,
}

/// Polka webhook - POST /api/polka/webhooks
pub async fn polka_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    JsonBody(payload): JsonBody<PolkaEvent>,
) -> Result<StatusCode, ApiError> {
    match authorization_credential(&headers, "ApiKey") {
        Some(key) if key == state.polka_key.as_ref() => {}
        _ => {
            warn!("Rejected webhook with bad API key");
            return Err(ApiError::Unauthorized);
        }
    }

    if payload.event != USER_UPGRADED {
        return Ok(StatusCode::NO_CONTENT);
    }

    let user_id = payload
        .data
        .and_then(|data| data.user_id)
        .ok_or_else(|| ApiError::BadRequest("Missing user id".to_string()))?;

    state.users.promote(user_id)?;
    info!(user_id, "Webhook upgraded user");

    Ok(StatusCode::NO_CONTENT)
}
