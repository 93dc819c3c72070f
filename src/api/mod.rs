//! HTTP API
//! Mission: Thin axum glue over the repositories and the auth layer

pub mod admin;
pub mod chirps;
pub mod error;
pub mod extract;
pub mod users;
pub mod webhooks;

pub use error::ApiError;
pub use extract::JsonBody;

use axum::{
    middleware,
    routing::{delete, get, post, put},
    Router,
};
use std::path::Path;
use std::sync::atomic::AtomicU64;
use std::sync::Arc;
use tower_http::services::ServeDir;

use crate::auth::{auth_middleware, CredentialHasher, RefreshLedger, TokenIssuer};
use crate::middleware::request_logging;
use crate::repo::{PostsRepo, UsersRepo};
use crate::store::DocumentStore;

/// Shared application state, built once at start-up and read-only afterwards
#[derive(Clone)]
pub struct AppState {
    pub users: UsersRepo,
    pub posts: PostsRepo,
    pub refresh: RefreshLedger,
    pub hasher: CredentialHasher,
    pub tokens: Arc<TokenIssuer>,
    pub polka_key: Arc<str>,
    pub hits: Arc<AtomicU64>,
}

impl AppState {
    pub fn new(
        store: Arc<DocumentStore>,
        tokens: TokenIssuer,
        hasher: CredentialHasher,
        refresh_ttl: chrono::Duration,
        polka_key: &str,
    ) -> Self {
        Self {
            users: UsersRepo::new(store.clone()),
            posts: PostsRepo::new(store.clone()),
            refresh: RefreshLedger::new(store).with_ttl(refresh_ttl),
            hasher,
            tokens: Arc::new(tokens),
            polka_key: Arc::from(polka_key),
            hits: Arc::new(AtomicU64::new(0)),
        }
    }
}

/// Create the API router
pub fn create_router(state: AppState, static_dir: &Path) -> Router {
    let public_routes = Router::new()
        .route("/api/healthz", get(admin::readiness))
        .route("/admin/metrics", get(admin::metrics))
        .route("/api/reset", get(admin::reset_metrics))
        .route("/api/users", post(users::create_user))
        .route("/api/login", post(users::login))
        .route("/api/refresh", post(users::refresh))
        .route("/api/revoke", post(users::revoke))
        .route("/api/chirps", get(chirps::list_chirps))
        .route("/api/chirps/:chirp_id", get(chirps::get_chirp))
        .route("/api/polka/webhooks", post(webhooks::polka_webhook));

    // Access token required
    let protected_routes = Router::new()
        .route("/api/users", put(users::update_user))
        .route("/api/chirps", post(chirps::create_chirp))
        .route("/api/chirps/:chirp_id", delete(chirps::delete_chirp))
        .route_layer(middleware::from_fn_with_state(
            state.tokens.clone(),
            auth_middleware,
        ));

    let file_routes = Router::new()
        .nest_service("/app", ServeDir::new(static_dir))
        .route_layer(middleware::from_fn_with_state(
            state.hits.clone(),
            admin::count_hits,
        ));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .merge(file_routes)
        .layer(middleware::from_fn(request_logging))
        .with_state(state)
}
