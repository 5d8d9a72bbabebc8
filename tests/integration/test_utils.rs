//! Test utilities for integration tests.
//!
//! Provides router builders and request/response helpers shared by the
//! endpoint test modules.

use std::time::Duration;

use axum::body::Body;
use axum::http::{header, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::json;
use tower::ServiceExt;

use bibrec::server::{create_router, ApiTokenAuth, RouterConfig};
use bibrec::service::RecordService;
use bibrec::store::MemoryStore;

/// Secret used by routers with authentication enabled.
pub const AUTH_SECRET: &str = "integration-test-auth-secret";

/// Secret used to derive secret-link tokens.
pub const LINK_SECRET: &str = "integration-test-link-secret";

// =============================================================================
// Router Builders
// =============================================================================

/// Router with authentication disabled; every request runs as user "dev".
pub fn dev_router() -> Router {
    let service = RecordService::new(MemoryStore::new(), LINK_SECRET);
    create_router(service, RouterConfig::without_auth().with_tracing(false))
}

/// Router with bearer-token authentication, plus a matching token minter.
pub fn auth_router() -> (Router, ApiTokenAuth) {
    let service = RecordService::new(MemoryStore::new(), LINK_SECRET);
    let router = create_router(service, RouterConfig::new(AUTH_SECRET).with_tracing(false));
    (router, ApiTokenAuth::new(AUTH_SECRET))
}

/// Mint a one-hour token for a user.
pub fn token_for(auth: &ApiTokenAuth, user: &str) -> String {
    auth.issue(user, Duration::from_secs(3600)).0
}

// =============================================================================
// Request Helpers
// =============================================================================

/// Build a request without a body.
pub fn request(method: &str, uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::empty()).unwrap()
}

/// Build a request carrying a JSON body.
pub fn json_request(
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: serde_json::Value,
) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

/// Collect a response body into a JSON value.
pub async fn json_body(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

// =============================================================================
// Fixtures
// =============================================================================

/// Create a draft through the API and return its JSON representation.
pub async fn create_draft(
    router: &Router,
    token: Option<&str>,
    title: &str,
    access: &str,
) -> serde_json::Value {
    let request = json_request(
        "POST",
        "/records",
        token,
        json!({
            "metadata": { "title": title },
            "access": access,
        }),
    );
    let response = router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status().as_u16(), 201, "draft creation failed");
    json_body(response).await
}

/// Register image files on a draft through the API.
pub async fn add_image_files(router: &Router, token: Option<&str>, record_id: &str) {
    let request = json_request(
        "POST",
        &format!("/records/{record_id}/draft/files"),
        token,
        json!([
            { "key": "page-001.png", "width": 1200, "height": 1800 },
            { "key": "page-002.jpg", "width": 1200, "height": 1800 },
            { "key": "data.csv" },
        ]),
    );
    let response = router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status().as_u16(), 201, "file registration failed");
}
