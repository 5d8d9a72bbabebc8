//! Secret link tests: CRUD, the disabled full update and token access.

use axum::http::StatusCode;
use serde_json::json;
use tower::ServiceExt;

use super::test_utils::{
    auth_router, create_draft, dev_router, json_body, json_request, request, token_for,
};

async fn draft_id(router: &axum::Router) -> String {
    let draft = create_draft(router, None, "T", "public").await;
    draft["id"].as_str().unwrap().to_string()
}

async fn create_link(router: &axum::Router, record_id: &str) -> serde_json::Value {
    let response = router
        .clone()
        .oneshot(json_request(
            "POST",
            &format!("/records/{record_id}/access/links"),
            None,
            json!({}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    json_body(response).await
}

// =============================================================================
// CRUD
// =============================================================================

#[tokio::test]
async fn test_create_link_defaults() {
    let router = dev_router();
    let id = draft_id(&router).await;

    let link = create_link(&router, &id).await;
    assert_eq!(link["permission"], "view");
    assert_eq!(link["record_id"], id);
    assert_eq!(link["token"].as_str().unwrap().len(), 64);
    assert!(link["expires_at"].is_null());
}

#[tokio::test]
async fn test_list_links() {
    let router = dev_router();
    let id = draft_id(&router).await;

    let first = create_link(&router, &id).await;
    let second = create_link(&router, &id).await;

    let response = router
        .oneshot(request("GET", &format!("/records/{id}/access/links"), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    assert_eq!(body["total"], 2);
    assert_eq!(body["hits"][0]["id"], first["id"]);
    assert_eq!(body["hits"][1]["id"], second["id"]);
}

#[tokio::test]
async fn test_read_link() {
    let router = dev_router();
    let id = draft_id(&router).await;
    let link = create_link(&router, &id).await;
    let link_id = link["id"].as_str().unwrap();

    let response = router
        .oneshot(request(
            "GET",
            &format!("/records/{id}/access/links/{link_id}"),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["id"], link["id"]);
}

#[tokio::test]
async fn test_full_update_disabled() {
    let router = dev_router();
    let id = draft_id(&router).await;
    let link = create_link(&router, &id).await;
    let link_id = link["id"].as_str().unwrap();

    let response = router
        .oneshot(json_request(
            "PUT",
            &format!("/records/{id}/access/links/{link_id}"),
            None,
            json!({ "permission": "edit" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);

    let error = json_body(response).await;
    assert_eq!(error["error"], "method_not_allowed");
}

#[tokio::test]
async fn test_partial_update() {
    let router = dev_router();
    let id = draft_id(&router).await;
    let link = create_link(&router, &id).await;
    let link_id = link["id"].as_str().unwrap();

    let response = router
        .oneshot(json_request(
            "PATCH",
            &format!("/records/{id}/access/links/{link_id}"),
            None,
            json!({ "permission": "edit" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let updated = json_body(response).await;
    assert_eq!(updated["permission"], "edit");
    // Token and id are immutable.
    assert_eq!(updated["token"], link["token"]);
    assert_eq!(updated["id"], link["id"]);
}

#[tokio::test]
async fn test_delete_link() {
    let router = dev_router();
    let id = draft_id(&router).await;
    let link = create_link(&router, &id).await;
    let link_id = link["id"].as_str().unwrap();

    let uri = format!("/records/{id}/access/links/{link_id}");
    let response = router
        .clone()
        .oneshot(request("DELETE", &uri, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = router.oneshot(request("GET", &uri, None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// =============================================================================
// Token Access
// =============================================================================

#[tokio::test]
async fn test_view_token_grants_restricted_read() {
    let (router, auth) = auth_router();
    let alice = token_for(&auth, "alice");

    let draft = create_draft(&router, Some(&alice), "T", "restricted").await;
    let id = draft["id"].as_str().unwrap();

    let response = router
        .clone()
        .oneshot(json_request(
            "POST",
            &format!("/records/{id}/access/links"),
            Some(&alice),
            json!({}),
        ))
        .await
        .unwrap();
    let link = json_body(response).await;
    let link_token = link["token"].as_str().unwrap();

    router
        .clone()
        .oneshot(request(
            "POST",
            &format!("/records/{id}/draft/actions/publish"),
            Some(&alice),
        ))
        .await
        .unwrap();

    // Anonymous read with the capability token succeeds.
    let response = router
        .clone()
        .oneshot(request(
            "GET",
            &format!("/records/{id}?token={link_token}"),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // A bogus token does not.
    let response = router
        .oneshot(request("GET", &format!("/records/{id}?token=bogus"), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_view_token_does_not_grant_draft_read() {
    let (router, auth) = auth_router();
    let alice = token_for(&auth, "alice");

    let draft = create_draft(&router, Some(&alice), "T", "restricted").await;
    let id = draft["id"].as_str().unwrap();

    let response = router
        .clone()
        .oneshot(json_request(
            "POST",
            &format!("/records/{id}/access/links"),
            Some(&alice),
            json!({ "permission": "view" }),
        ))
        .await
        .unwrap();
    let view_token = json_body(response).await["token"]
        .as_str()
        .unwrap()
        .to_string();

    let response = router
        .clone()
        .oneshot(request(
            "GET",
            &format!("/records/{id}/draft?token={view_token}"),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // An edit link does grant draft access.
    let response = router
        .clone()
        .oneshot(json_request(
            "POST",
            &format!("/records/{id}/access/links"),
            Some(&alice),
            json!({ "permission": "edit" }),
        ))
        .await
        .unwrap();
    let edit_token = json_body(response).await["token"]
        .as_str()
        .unwrap()
        .to_string();

    let response = router
        .oneshot(request(
            "GET",
            &format!("/records/{id}/draft?token={edit_token}"),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_expired_link_rejected() {
    let router = dev_router();
    let id = draft_id(&router).await;

    // Expiry in the past is rejected at creation time.
    let response = router
        .oneshot(json_request(
            "POST",
            &format!("/records/{id}/access/links"),
            None,
            json!({ "expires_at": 1 }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_links_require_ownership() {
    let (router, auth) = auth_router();
    let alice = token_for(&auth, "alice");
    let bob = token_for(&auth, "bob");

    let draft = create_draft(&router, Some(&alice), "T", "public").await;
    let id = draft["id"].as_str().unwrap();

    let response = router
        .clone()
        .oneshot(json_request(
            "POST",
            &format!("/records/{id}/access/links"),
            Some(&bob),
            json!({}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = router
        .oneshot(request(
            "GET",
            &format!("/records/{id}/access/links"),
            Some(&bob),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}
