use axum::{
    body::Body,
    extract::State,
    http::{header::CONTENT_TYPE, Request, StatusCode},
    middleware::Next,
    response::{Html, IntoResponse, Response},
};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, info};

use super::AppState;

/// Readiness probe - GET /api/healthz
pub async fn readiness() -> impl IntoResponse {
    ([(CONTENT_TYPE, "text/plain; charset=utf-8")], "OK")
}

/// File-server hit page - GET /admin/metrics
pub async fn metrics(State(state): State<AppState>) -> Html<String> {
    let hits = state.hits.load(Ordering::Relaxed);
    Html(format!(
        r#"<html>

<body>
    <h1>Welcome, Chirpy Admin</h1>
    <p>Chirpy has been visited {} times!</p>
</body>

</html>"#,
        hits
    ))
}

/// Reset the hit counter - GET /api/reset
pub async fn reset_metrics(State(state): State<AppState>) -> StatusCode {
    state.hits.store(0, Ordering::Relaxed);
    info!("Reset file-server hit counter");
    StatusCode::NO_CONTENT
}

/// Count every request that reaches the static file server.
pub async fn count_hits(
    State(hits): State<Arc<AtomicU64>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let total = hits.fetch_add(1, Ordering::Relaxed) + 1;
    debug!(hits = total, "File-server hit");
    next.run(request).await
}
