//! Chirp endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    Extension,
};
use serde::Deserialize;
use tracing::debug;

use super::{ApiError, AppState, JsonBody};
use crate::auth::AuthenticatedUser;
use crate::error::ChirpyError;
use crate::moderation::validate_chirp;
use crate::repo::{PostQuery, SortOrder};
use crate::store::{Post, PostId, UserId};

#[derive(Debug, Deserialize)]
pub struct CreateChirpRequest {
    pub body: String,
}

#[derive(Debug, Deserialize)]
pub struct ListChirpsParams {
    pub author_id: Option<String>,
    pub sort: Option<String>,
}

fn parse_chirp_id(raw: &str) -> Result<PostId, ApiError> {
    raw.parse()
        .map_err(|_| ApiError::BadRequest("Invalid chirp id".to_string()))
}

/// Post a chirp - POST /api/chirps
pub async fn create_chirp(
    State(state): State<AppState>,
    Extension(AuthenticatedUser(user_id)): Extension<AuthenticatedUser>,
    JsonBody(payload): JsonBody<CreateChirpRequest>,
) -> Result<(StatusCode, Json<Post>), ApiError> {
    let body = validate_chirp(&payload.body).map_err(|e| {
        debug!(error = %e, "Rejected chirp");
        ApiError::BadRequest(e.to_string())
    })?;

    let post = state.posts.create(&body, user_id)?;
    Ok((StatusCode::CREATED, Json(post)))
}

/// List chirps - GET /api/chirps?author_id=&sort=asc|desc
pub async fn list_chirps(
    State(state): State<AppState>,
    Query(params): Query<ListChirpsParams>,
) -> Result<Response, ApiError> {
    let author_id = match params.author_id.as_deref() {
        None | Some("") => None,
        Some(raw) => {
            let id: UserId = raw
                .parse()
                .map_err(|_| ApiError::BadRequest("Invalid author id".to_string()))?;
            Some(id).filter(|id| *id != 0)
        }
    };

    let query = PostQuery {
        author_id,
        order: SortOrder::from_param(params.sort.as_deref()),
    };
    let posts = state.posts.list(&query)?;

    if posts.is_empty() {
        return Ok(StatusCode::NO_CONTENT.into_response());
    }
    Ok(Json(posts).into_response())
}

/// Get one chirp - GET /api/chirps/:chirp_id
pub async fn get_chirp(
    State(state): State<AppState>,
    Path(chirp_id): Path<String>,
) -> Result<Json<Post>, ApiError> {
    let chirp_id = parse_chirp_id(&chirp_id)?;
    Ok(Json(state.posts.find_by_id(chirp_id)?))
}

/// Delete own chirp - DELETE /api/chirps/:chirp_id
pub async fn delete_chirp(
    State(state): State<AppState>,
    Extension(AuthenticatedUser(user_id)): Extension<AuthenticatedUser>,
    Path(chirp_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let chirp_id = parse_chirp_id(&chirp_id)?;

    match state.posts.delete_by_id(chirp_id, user_id) {
        Ok(()) => Ok(StatusCode::NO_CONTENT),
        // Missing and not-yours look identical so existence does not leak
        Err(ChirpyError::NotFound(_)) | Err(ChirpyError::NotAuthorized) => {
            Err(ApiError::Forbidden)
        }
        Err(e) => Err(e.into()),
    }
}
