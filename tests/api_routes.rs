//! Router-level tests for the HTTP API
//!
//! Requests go through the full axum stack (middleware included) with
//! `tower::ServiceExt::oneshot`, against a scratch document store.

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use chirpy_backend::api::{create_router, AppState};
use chirpy_backend::auth::{CredentialHasher, TokenIssuer};
use chirpy_backend::store::DocumentStore;
use serde_json::{json, Value};
use std::fs;
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;

const POLKA_KEY: &str = "f271c81ff7084ee5b99a5091b42d486e";

fn test_app() -> (Router, TempDir) {
    let dir = TempDir::new().unwrap();
    let store = Arc::new(DocumentStore::initialize(dir.path().join("database.json")).unwrap());
    let state = AppState::new(
        store,
        TokenIssuer::new("router-test-secret"),
        CredentialHasher::with_cost(4),
        chrono::Duration::hours(24),
        POLKA_KEY,
    );
    (create_router(state, dir.path()), dir)
}

fn request(method: Method, uri: &str, body: Option<Value>, auth: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(auth) = auth {
        builder = builder.header(header::AUTHORIZATION, auth);
    }
    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(req).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();

    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
    };
    (status, body)
}

async fn register(app: &Router, email: &str, password: &str) -> Value {
    let (status, body) = send(
        app,
        request(
            Method::POST,
            "/api/users",
            Some(json!({ "email": email, "password": password })),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body
}

async fn login(app: &Router, email: &str, password: &str) -> Value {
    let (status, body) = send(
        app,
        request(
            Method::POST,
            "/api/login",
            Some(json!({ "email": email, "password": password })),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    body
}

fn bearer(token: &Value) -> String {
    format!("Bearer {}", token.as_str().unwrap())
}

async fn post_chirp(app: &Router, token: &Value, body: &str) -> (StatusCode, Value) {
    send(
        app,
        request(
            Method::POST,
            "/api/chirps",
            Some(json!({ "body": body })),
            Some(&bearer(token)),
        ),
    )
    .await
}

#[tokio::test]
async fn test_register_and_login() {
    let (app, _dir) = test_app();

    let user = register(&app, "a@x.com", "pw").await;
    assert_eq!(user, json!({ "id": 1, "email": "a@x.com", "is_chirpy_red": false }));

    let session = login(&app, "a@x.com", "pw").await;
    assert_eq!(session["id"], 1);
    assert!(session["token"].as_str().is_some());
    assert_eq!(session["refresh_token"].as_str().unwrap().len(), 64);
    assert!(session.get("password_hash").is_none());
}

#[tokio::test]
async fn test_registration_validation() {
    let (app, _dir) = test_app();
    register(&app, "a@x.com", "pw").await;

    let (status, _) = send(
        &app,
        request(
            Method::POST,
            "/api/users",
            Some(json!({ "email": "a@x.com", "password": "other" })),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = send(
        &app,
        request(
            Method::POST,
            "/api/users",
            Some(json!({ "email": "b@x.com" })),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Password can not be empty");
}

#[tokio::test]
async fn test_bad_credentials_unauthorized() {
    let (app, _dir) = test_app();
    register(&app, "a@x.com", "pw").await;

    for (email, password) in [("a@x.com", "wrong"), ("nobody@x.com", "pw")] {
        let (status, _) = send(
            &app,
            request(
                Method::POST,
                "/api/login",
                Some(json!({ "email": email, "password": password })),
                None,
            ),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }
}

#[tokio::test]
async fn test_chirp_lifecycle() {
    let (app, _dir) = test_app();
    register(&app, "a@x.com", "pw").await;
    register(&app, "b@x.com", "pw").await;
    let author = login(&app, "a@x.com", "pw").await;
    let other = login(&app, "b@x.com", "pw").await;

    let (status, chirp) = post_chirp(&app, &author["token"], "hi").await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(chirp, json!({ "id": 1, "body": "hi", "author_id": 1 }));

    let (status, fetched) = send(&app, request(Method::GET, "/api/chirps/1", None, None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, chirp);

    let (status, _) = send(
        &app,
        request(Method::DELETE, "/api/chirps/1", None, Some(&bearer(&other["token"]))),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(
        &app,
        request(Method::DELETE, "/api/chirps/1", None, Some(&bearer(&author["token"]))),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(&app, request(Method::GET, "/api/chirps/1", None, None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // Deleting a missing chirp looks the same as deleting someone else's
    let (status, _) = send(
        &app,
        request(Method::DELETE, "/api/chirps/1", None, Some(&bearer(&author["token"]))),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_chirp_requires_access_token() {
    let (app, _dir) = test_app();

    let (status, _) = send(
        &app,
        request(Method::POST, "/api/chirps", Some(json!({ "body": "hi" })), None),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(
        &app,
        request(
            Method::POST,
            "/api/chirps",
            Some(json!({ "body": "hi" })),
            Some("Bearer not-a-jwt"),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_chirp_moderation() {
    let (app, _dir) = test_app();
    register(&app, "a@x.com", "pw").await;
    let session = login(&app, "a@x.com", "pw").await;

    let (status, chirp) = post_chirp(&app, &session["token"], "what a kerfuffle").await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(chirp["body"], "what a ****");

    let (status, body) = post_chirp(&app, &session["token"], &"x".repeat(141)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Chirp is too long");
}

#[tokio::test]
async fn test_list_chirps_filter_and_sort() {
    let (app, _dir) = test_app();

    let (status, _) = send(&app, request(Method::GET, "/api/chirps", None, None)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    register(&app, "a@x.com", "pw").await;
    register(&app, "b@x.com", "pw").await;
    let a = login(&app, "a@x.com", "pw").await;
    let b = login(&app, "b@x.com", "pw").await;
    post_chirp(&app, &a["token"], "a1").await;
    post_chirp(&app, &b["token"], "b1").await;
    post_chirp(&app, &a["token"], "a2").await;

    let (status, all) = send(&app, request(Method::GET, "/api/chirps", None, None)).await;
    assert_eq!(status, StatusCode::OK);
    let ids: Vec<u64> = all
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["id"].as_u64().unwrap())
        .collect();
    assert_eq!(ids, vec![1, 2, 3]);

    let (_, by_a) = send(
        &app,
        request(Method::GET, "/api/chirps?author_id=1&sort=desc", None, None),
    )
    .await;
    let bodies: Vec<&str> = by_a
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["body"].as_str().unwrap())
        .collect();
    assert_eq!(bodies, vec!["a2", "a1"]);

    let (status, _) = send(
        &app,
        request(Method::GET, "/api/chirps?author_id=abc", None, None),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_update_user() {
    let (app, _dir) = test_app();
    register(&app, "a@x.com", "pw").await;
    let session = login(&app, "a@x.com", "pw").await;

    let (status, body) = send(
        &app,
        request(
            Method::PUT,
            "/api/users",
            Some(json!({ "email": "new@x.com", "password": "pw2" })),
            Some(&bearer(&session["token"])),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "id": 1, "email": "new@x.com", "is_chirpy_red": false }));

    let relogged = login(&app, "new@x.com", "pw2").await;
    assert_eq!(relogged["id"], 1);

    let (status, _) = send(
        &app,
        request(
            Method::PUT,
            "/api/users",
            Some(json!({ "email": "x@x.com", "password": "pw" })),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_refresh_and_revoke() {
    let (app, _dir) = test_app();
    register(&app, "a@x.com", "pw").await;
    let session = login(&app, "a@x.com", "pw").await;
    let refresh = bearer(&session["refresh_token"]);

    let (status, renewed) = send(
        &app,
        request(Method::POST, "/api/refresh", None, Some(&refresh)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = post_chirp(&app, &renewed["token"], "via refreshed token").await;
    assert_eq!(status, StatusCode::CREATED);

    // An access token is not a refresh token
    let (status, _) = send(
        &app,
        request(Method::POST, "/api/refresh", None, Some(&bearer(&session["token"]))),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(&app, request(Method::POST, "/api/revoke", None, Some(&refresh))).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(
        &app,
        request(Method::POST, "/api/refresh", None, Some(&refresh)),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_polka_webhook_promotes_user() {
    let (app, _dir) = test_app();
    register(&app, "a@x.com", "pw").await;
    let upgrade = json!({ "event": "user.upgraded", "data": { "user_id": 1 } });
    let api_key = format!("ApiKey {}", POLKA_KEY);

    let (status, _) = send(
        &app,
        request(
            Method::POST,
            "/api/polka/webhooks",
            Some(upgrade.clone()),
            Some("ApiKey wrong"),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(
        &app,
        request(
            Method::POST,
            "/api/polka/webhooks",
            Some(json!({ "event": "user.payment_failed", "data": { "user_id": 1 } })),
            Some(&api_key),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(login(&app, "a@x.com", "pw").await["is_chirpy_red"], false);

    let (status, _) = send(
        &app,
        request(Method::POST, "/api/polka/webhooks", Some(upgrade), Some(&api_key)),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(login(&app, "a@x.com", "pw").await["is_chirpy_red"], true);

    let (status, _) = send(
        &app,
        request(
            Method::POST,
            "/api/polka/webhooks",
            Some(json!({ "event": "user.upgraded", "data": { "user_id": 99 } })),
            Some(&api_key),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_polka_webhook_acknowledges_events_without_data() {
    let (app, _dir) = test_app();
    let api_key = format!("ApiKey {}", POLKA_KEY);

    let (status, _) = send(
        &app,
        request(
            Method::POST,
            "/api/polka/webhooks",
            Some(json!({ "event": "user.payment_failed" })),
            Some(&api_key),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = send(
        &app,
        request(
            Method::POST,
            "/api/polka/webhooks",
            Some(json!({ "event": "user.upgraded", "data": {} })),
            Some(&api_key),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Missing user id");
}

#[tokio::test]
async fn test_malformed_bodies_get_json_errors() {
    let (app, _dir) = test_app();
    register(&app, "a@x.com", "pw").await;
    let session = login(&app, "a@x.com", "pw").await;

    let raw = |uri: &str, body: &str, auth: Option<String>| {
        let mut builder = Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(auth) = auth {
            builder = builder.header(header::AUTHORIZATION, auth);
        }
        builder.body(Body::from(body.to_string())).unwrap()
    };

    let cases = [
        raw("/api/users", "{not json", None),
        raw("/api/login", r#"{"email": 5}"#, None),
        raw("/api/chirps", r#"{"text": "hi"}"#, Some(bearer(&session["token"]))),
        raw(
            "/api/polka/webhooks",
            "[]",
            Some(format!("ApiKey {}", POLKA_KEY)),
        ),
    ];

    for req in cases {
        let uri = req.uri().to_string();
        let (status, body) = send(&app, req).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{}", uri);
        assert!(body["error"].as_str().is_some(), "{}: {:?}", uri, body);
    }
}

#[tokio::test]
async fn test_static_files_and_hit_metrics() {
    let (app, dir) = test_app();
    fs::write(dir.path().join("index.html"), "<h1>Welcome to Chirpy</h1>").unwrap();

    let (status, body) = send(&app, request(Method::GET, "/api/healthz", None, None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, Value::String("OK".to_string()));

    for _ in 0..2 {
        let (status, _) = send(&app, request(Method::GET, "/app/index.html", None, None)).await;
        assert_eq!(status, StatusCode::OK);
    }

    let (_, page) = send(&app, request(Method::GET, "/admin/metrics", None, None)).await;
    assert!(page.as_str().unwrap().contains("visited 2 times"));

    let (status, _) = send(&app, request(Method::GET, "/api/reset", None, None)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, page) = send(&app, request(Method::GET, "/admin/metrics", None, None)).await;
    assert!(page.as_str().unwrap().contains("visited 0 times"));
}
