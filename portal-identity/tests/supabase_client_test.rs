//! Supabase client tests against a fake GoTrue/PostgREST server

use axum::{
    extract::Query,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use portal_core::{AuthError, CookieStore, IdentityProvider, ProfileStore, Session};
use portal_identity::{storage, SupabaseClient, SupabaseConfig};
use serde_json::{json, Value};
use std::collections::HashMap;
use tokio::net::TcpListener;

fn bearer(headers: &HeaderMap) -> String {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .unwrap_or_default()
        .to_string()
}

async fn user_handler(headers: HeaderMap) -> impl IntoResponse {
    if headers.get("apikey").and_then(|v| v.to_str().ok()) != Some("anon-key") {
        return (StatusCode::UNAUTHORIZED, Json(json!({ "message": "no apikey" })));
    }
    match bearer(&headers).as_str() {
        "good" => (
            StatusCode::OK,
            Json(json!({ "id": "user-1", "email": "sara@mngdp.com", "role": "authenticated" })),
        ),
        "boom" => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "msg": "database down" })),
        ),
        _ => (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "msg": "invalid JWT" })),
        ),
    }
}

async fn token_handler(
    Query(params): Query<HashMap<String, String>>,
    Json(body): Json<Value>,
) -> impl IntoResponse {
    if params.get("grant_type").map(String::as_str) != Some("refresh_token") {
        return (StatusCode::BAD_REQUEST, Json(json!({ "msg": "bad grant" })));
    }
    match body["refresh_token"].as_str() {
        Some("r-good") => (
            StatusCode::OK,
            Json(json!({
                "access_token": "good",
                "refresh_token": "r-new",
                "expires_in": 3600,
                "token_type": "bearer",
                "user": { "id": "user-1" }
            })),
        ),
        _ => (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error_description": "Invalid Refresh Token" })),
        ),
    }
}

async fn profiles_handler(Query(params): Query<HashMap<String, String>>) -> Json<Value> {
    match params.get("id").map(String::as_str) {
        Some("eq.user-1") => Json(json!([
            { "id": "user-1", "name": "Sara", "role": "Admin", "department": "IT" }
        ])),
        _ => Json(json!([])),
    }
}

async fn spawn_fake_supabase() -> String {
    let app = Router::new()
        .route("/auth/v1/user", get(user_handler))
        .route("/auth/v1/token", post(token_handler))
        .route("/auth/v1/logout", post(|| async { StatusCode::NO_CONTENT }))
        .route("/rest/v1/users", get(profiles_handler));

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://{}", address)
}

fn client_for(base_url: &str) -> SupabaseClient {
    SupabaseClient::new(SupabaseConfig::new(base_url, "anon-key")).unwrap()
}

fn session(access_token: &str, refresh_token: &str, expires_at: i64) -> Session {
    Session {
        access_token: access_token.to_string(),
        refresh_token: refresh_token.to_string(),
        expires_at: Some(expires_at),
        expires_in: Some(3600),
        token_type: "bearer".to_string(),
        user: None,
    }
}

fn cookie_store(client: &SupabaseClient, session: &Session) -> CookieStore {
    let json = serde_json::to_string(session).unwrap();
    let value = format!("base64-{}", URL_SAFE_NO_PAD.encode(json));
    CookieStore::new(vec![
        (client.storage_key().to_string(), value),
        ("theme".to_string(), "dark".to_string()),
    ])
}

fn far_future() -> i64 {
    chrono::Utc::now().timestamp() + 3600
}

fn expired() -> i64 {
    chrono::Utc::now().timestamp() - 60
}

#[tokio::test]
async fn test_valid_session_resolves_user() {
    let client = client_for(&spawn_fake_supabase().await);
    let store = cookie_store(&client, &session("good", "r-good", far_future()));

    let user = client.get_user(&store).await.unwrap().unwrap();

    assert_eq!(user.id, "user-1");
    assert_eq!(user.email.as_deref(), Some("sara@mngdp.com"));
    assert!(store.take_pending().is_empty());
}

#[tokio::test]
async fn test_missing_session_is_not_an_error() {
    let client = client_for(&spawn_fake_supabase().await);
    let store = CookieStore::new(vec![("theme".to_string(), "dark".to_string())]);

    assert_eq!(client.get_user(&store).await.unwrap(), None);
}

#[tokio::test]
async fn test_expired_session_is_refreshed_into_cookies() {
    let client = client_for(&spawn_fake_supabase().await);
    let store = cookie_store(&client, &session("stale", "r-good", expired()));

    let user = client.get_user(&store).await.unwrap().unwrap();
    assert_eq!(user.id, "user-1");

    let pending = store.take_pending();
    let refreshed = pending
        .iter()
        .find(|c| c.name == client.storage_key())
        .expect("refreshed session cookie");
    assert_eq!(refreshed.options.domain.as_deref(), Some(".localhost.mngdp.com"));
    assert_eq!(refreshed.options.path.as_deref(), Some("/"));

    let cookies = vec![(refreshed.name.clone(), refreshed.value.clone())];
    let stored = storage::read_session(&cookies, client.storage_key())
        .unwrap()
        .unwrap();
    assert_eq!(stored.access_token, "good");
    assert_eq!(stored.refresh_token, "r-new");
    assert!(stored.expires_at.unwrap() > chrono::Utc::now().timestamp());
}

#[tokio::test]
async fn test_invalid_refresh_token_is_rejected() {
    let client = client_for(&spawn_fake_supabase().await);
    let store = cookie_store(&client, &session("stale", "r-revoked", expired()));

    match client.get_user(&store).await {
        Err(AuthError::Rejected { status, message }) => {
            assert_eq!(status, 400);
            assert_eq!(message, "Invalid Refresh Token");
        }
        other => panic!("unexpected: {other:?}"),
    }
}

#[tokio::test]
async fn test_rejected_and_failing_provider() {
    let client = client_for(&spawn_fake_supabase().await);

    let store = cookie_store(&client, &session("forged", "r", far_future()));
    assert!(matches!(
        client.get_user(&store).await,
        Err(AuthError::Rejected { status: 401, .. })
    ));

    let store = cookie_store(&client, &session("boom", "r", far_future()));
    assert!(matches!(
        client.get_user(&store).await,
        Err(AuthError::Unavailable(_))
    ));
}

#[tokio::test]
async fn test_malformed_cookie_fails_before_any_request() {
    // Nothing listens here: a request would surface as Unavailable.
    let client = client_for("http://127.0.0.1:9");
    let store = CookieStore::new(vec![(
        client.storage_key().to_string(),
        "base64-%%%".to_string(),
    )]);

    assert!(matches!(
        client.get_user(&store).await,
        Err(AuthError::MalformedSession(_))
    ));
}

#[tokio::test]
async fn test_unreachable_provider_is_unavailable() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap();
    drop(listener);

    let client = client_for(&format!("http://{}", address));
    let store = cookie_store(&client, &session("good", "r", far_future()));

    assert!(matches!(
        client.get_user(&store).await,
        Err(AuthError::Unavailable(_))
    ));
}

#[tokio::test]
async fn test_sign_out_queues_session_removal() {
    let client = client_for(&spawn_fake_supabase().await);
    let store = cookie_store(&client, &session("good", "r-good", far_future()));

    client.sign_out(&store).await.unwrap();

    let pending = store.take_pending();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].name, client.storage_key());
    assert!(pending[0].is_removal());
}

#[tokio::test]
async fn test_fetch_profile() {
    let client = client_for(&spawn_fake_supabase().await);

    let profile = client.fetch_profile("good", "user-1").await.unwrap().unwrap();
    assert_eq!(profile.display_name(), Some("Sara"));
    assert!(profile.is_admin());

    assert_eq!(client.fetch_profile("good", "nobody").await.unwrap(), None);
}
