//! Authentication tests: bearer tokens, expiry, tampering, public routes.

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use serde_json::json;
use tower::ServiceExt;

use super::test_utils::{auth_router, json_body, json_request, request, token_for};

// =============================================================================
// Missing and Malformed Credentials
// =============================================================================

#[tokio::test]
async fn test_mutation_without_token_rejected() {
    let (router, _auth) = auth_router();

    let response = router
        .oneshot(json_request(
            "POST",
            "/records",
            None,
            json!({ "metadata": { "title": "T" } }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let error = json_body(response).await;
    assert_eq!(error["error"], "missing_token");
}

#[tokio::test]
async fn test_non_bearer_authorization_rejected() {
    let (router, _auth) = auth_router();

    let request = Request::builder()
        .method("POST")
        .uri("/records")
        .header(header::AUTHORIZATION, "Basic YWxpY2U6cHc=")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(json!({ "metadata": { "title": "T" } }).to_string()))
        .unwrap();

    let response = router.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let error = json_body(response).await;
    assert_eq!(error["error"], "malformed_token");
}

// =============================================================================
// Invalid Tokens
// =============================================================================

#[tokio::test]
async fn test_expired_token_rejected() {
    let (router, auth) = auth_router();
    let expired = auth.issue_with_expiry("alice", 1);

    let response = router
        .oneshot(json_request(
            "POST",
            "/records",
            Some(&expired),
            json!({ "metadata": { "title": "T" } }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let error = json_body(response).await;
    assert_eq!(error["error"], "token_expired");
}

#[tokio::test]
async fn test_tampered_token_rejected() {
    let (router, auth) = auth_router();
    let token = token_for(&auth, "alice").replacen("alice", "admin", 1);

    let response = router
        .oneshot(json_request(
            "POST",
            "/records",
            Some(&token),
            json!({ "metadata": { "title": "T" } }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let error = json_body(response).await;
    assert_eq!(error["error"], "invalid_signature");
}

#[tokio::test]
async fn test_bad_token_rejected_even_on_read() {
    let (router, _auth) = auth_router();

    // Reads allow anonymous callers, but a presented token must verify.
    let response = router
        .oneshot(request("GET", "/records/some-id", Some("garbage")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// =============================================================================
// Valid Tokens and Public Routes
// =============================================================================

#[tokio::test]
async fn test_valid_token_accepted() {
    let (router, auth) = auth_router();
    let alice = token_for(&auth, "alice");

    let response = router
        .oneshot(json_request(
            "POST",
            "/records",
            Some(&alice),
            json!({ "metadata": { "title": "T" } }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let draft = json_body(response).await;
    assert_eq!(draft["owner"], "alice");
}

#[tokio::test]
async fn test_health_is_public() {
    let (router, _auth) = auth_router();

    let response = router
        .oneshot(request("GET", "/health", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let health = json_body(response).await;
    assert_eq!(health["status"], "healthy");
    assert!(health["version"].is_string());
}
