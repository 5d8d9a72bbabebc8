//! Review workflow tests: upsert, read, submit, delete, revision checks.

use axum::http::StatusCode;
use serde_json::json;
use tower::ServiceExt;

use super::test_utils::{create_draft, dev_router, json_body, json_request, request};

async fn draft_id(router: &axum::Router) -> String {
    let draft = create_draft(router, None, "T", "public").await;
    draft["id"].as_str().unwrap().to_string()
}

// =============================================================================
// Upsert and Read
// =============================================================================

#[tokio::test]
async fn test_put_creates_review() {
    let router = dev_router();
    let id = draft_id(&router).await;

    let response = router
        .clone()
        .oneshot(json_request(
            "PUT",
            &format!("/records/{id}/draft/review"),
            None,
            json!({ "receiver": "community-a" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let review = json_body(response).await;
    assert_eq!(review["state"], "created");
    assert_eq!(review["receiver"], "community-a");
    assert_eq!(review["revision_id"], 1);

    let response = router
        .oneshot(request("GET", &format!("/records/{id}/draft/review"), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["state"], "created");
}

#[tokio::test]
async fn test_get_review_before_creation() {
    let router = dev_router();
    let id = draft_id(&router).await;

    let response = router
        .oneshot(request("GET", &format!("/records/{id}/draft/review"), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_put_updates_existing_review() {
    let router = dev_router();
    let id = draft_id(&router).await;

    router
        .clone()
        .oneshot(json_request(
            "PUT",
            &format!("/records/{id}/draft/review"),
            None,
            json!({}),
        ))
        .await
        .unwrap();

    let response = router
        .oneshot(json_request(
            "PUT",
            &format!("/records/{id}/draft/review"),
            None,
            json!({ "receiver": "community-b" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let review = json_body(response).await;
    assert_eq!(review["receiver"], "community-b");
    assert_eq!(review["revision_id"], 2);
}

// =============================================================================
// Revision Checks
// =============================================================================

#[tokio::test]
async fn test_if_match_mismatch_rejected() {
    let router = dev_router();
    let id = draft_id(&router).await;

    router
        .clone()
        .oneshot(json_request(
            "PUT",
            &format!("/records/{id}/draft/review"),
            None,
            json!({}),
        ))
        .await
        .unwrap();

    let mut request = json_request(
        "PUT",
        &format!("/records/{id}/draft/review"),
        None,
        json!({ "receiver": "x" }),
    );
    request
        .headers_mut()
        .insert("if-match", "99".parse().unwrap());

    let response = router.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::PRECONDITION_FAILED);

    let error = json_body(response).await;
    assert_eq!(error["error"], "revision_mismatch");
}

#[tokio::test]
async fn test_if_match_garbage_rejected() {
    let router = dev_router();
    let id = draft_id(&router).await;

    router
        .clone()
        .oneshot(json_request(
            "PUT",
            &format!("/records/{id}/draft/review"),
            None,
            json!({}),
        ))
        .await
        .unwrap();

    let mut request = json_request(
        "PUT",
        &format!("/records/{id}/draft/review"),
        None,
        json!({}),
    );
    request
        .headers_mut()
        .insert("if-match", "not-a-number".parse().unwrap());

    let response = router.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_if_match_correct_revision_accepted() {
    let router = dev_router();
    let id = draft_id(&router).await;

    router
        .clone()
        .oneshot(json_request(
            "PUT",
            &format!("/records/{id}/draft/review"),
            None,
            json!({}),
        ))
        .await
        .unwrap();

    let mut request = json_request(
        "PUT",
        &format!("/records/{id}/draft/review"),
        None,
        json!({ "receiver": "x" }),
    );
    request
        .headers_mut()
        .insert("if-match", "\"1\"".parse().unwrap());

    let response = router.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

// =============================================================================
// Submit
// =============================================================================

#[tokio::test]
async fn test_submit_review() {
    let router = dev_router();
    let id = draft_id(&router).await;

    router
        .clone()
        .oneshot(json_request(
            "PUT",
            &format!("/records/{id}/draft/review"),
            None,
            json!({ "receiver": "community-a" }),
        ))
        .await
        .unwrap();

    let response = router
        .clone()
        .oneshot(json_request(
            "POST",
            &format!("/records/{id}/draft/actions/submit-review"),
            None,
            json!({ "message": "please review" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::ACCEPTED);

    let review = json_body(response).await;
    assert_eq!(review["state"], "submitted");
    assert_eq!(review["message"], "please review");

    // A submitted request is frozen.
    let response = router
        .clone()
        .oneshot(json_request(
            "POST",
            &format!("/records/{id}/draft/actions/submit-review"),
            None,
            json!({}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let response = router
        .clone()
        .oneshot(json_request(
            "PUT",
            &format!("/records/{id}/draft/review"),
            None,
            json!({}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let response = router
        .oneshot(request(
            "DELETE",
            &format!("/records/{id}/draft/review"),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_submit_without_review() {
    let router = dev_router();
    let id = draft_id(&router).await;

    let response = router
        .oneshot(json_request(
            "POST",
            &format!("/records/{id}/draft/actions/submit-review"),
            None,
            json!({}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// =============================================================================
// Delete
// =============================================================================

#[tokio::test]
async fn test_delete_open_review() {
    let router = dev_router();
    let id = draft_id(&router).await;

    router
        .clone()
        .oneshot(json_request(
            "PUT",
            &format!("/records/{id}/draft/review"),
            None,
            json!({}),
        ))
        .await
        .unwrap();

    let response = router
        .clone()
        .oneshot(request(
            "DELETE",
            &format!("/records/{id}/draft/review"),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = router
        .oneshot(request("GET", &format!("/records/{id}/draft/review"), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
