//! HTTP request handlers for the record API.
//!
//! Handlers are thin controllers: they extract path/query/body parameters,
//! resolve the caller into an [`Accessor`], call exactly one service method
//! and pick the status code. All domain errors come out of the service layer
//! and are mapped to HTTP responses here.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, warn};

use crate::error::ServiceError;
use crate::iiif::{manifest_for_record, MANIFEST_CONTENT_TYPE};
use crate::model::{FileEntry, Record, SecretLink};
use crate::service::{
    Accessor, CreateLinkPayload, DraftPayload, Identity, RecordService, ReviewPayload,
    SubmitPayload, UpdateLinkPayload,
};
use crate::store::RecordStore;

use super::auth::OptionalIdentity;

// =============================================================================
// Application State
// =============================================================================

/// Shared application state passed to all handlers via Axum's State extractor.
pub struct AppState<S: RecordStore> {
    /// The record service backing all operations
    pub service: Arc<RecordService<S>>,

    /// Externally visible server root, used for manifest URLs
    pub base_url: String,

    /// Cache-Control max-age for manifest responses, in seconds
    pub cache_max_age: u32,
}

impl<S: RecordStore> AppState<S> {
    /// Create application state with the given service.
    pub fn new(service: RecordService<S>, base_url: impl Into<String>, cache_max_age: u32) -> Self {
        Self {
            service: Arc::new(service),
            base_url: base_url.into(),
            cache_max_age,
        }
    }
}

impl<S: RecordStore> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            service: Arc::clone(&self.service),
            base_url: self.base_url.clone(),
            cache_max_age: self.cache_max_age,
        }
    }
}

// =============================================================================
// Request Parameters
// =============================================================================

/// Query parameters for read endpoints that accept secret-link tokens.
#[derive(Debug, Deserialize)]
pub struct AccessQuery {
    /// Secret-link capability token
    #[serde(default)]
    pub token: Option<String>,
}

/// Resolve the caller into an accessor.
///
/// A presented link token takes precedence over a bearer identity; callers
/// following a share link expect capability-based access.
fn accessor(identity: Option<Identity>, token: Option<String>) -> Accessor {
    match (token, identity) {
        (Some(token), _) => Accessor::LinkToken(token),
        (None, Some(identity)) => Accessor::User(identity),
        (None, None) => Accessor::Anonymous,
    }
}

/// Extract the revision id from an `If-Match` header, if present.
///
/// The value is passed through to the service as an opaque optimistic
/// concurrency token; only its shape (an integer, optionally ETag-quoted)
/// is validated here.
fn revision_from_headers(headers: &HeaderMap) -> Result<Option<u64>, ServiceError> {
    let Some(value) = headers.get(header::IF_MATCH) else {
        return Ok(None);
    };
    let value = value
        .to_str()
        .map_err(|_| ServiceError::Validation("invalid If-Match header".to_string()))?;
    let trimmed = value.trim().trim_matches('"');
    trimmed
        .parse::<u64>()
        .map(Some)
        .map_err(|_| ServiceError::Validation(format!("invalid If-Match revision: {trimmed}")))
}

// =============================================================================
// Response Types
// =============================================================================

/// JSON error response returned for all error conditions.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error type identifier (e.g. "not_found", "permission_denied")
    pub error: String,

    /// Human-readable error message
    pub message: String,

    /// HTTP status code (included for convenience)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
}

impl ErrorResponse {
    /// Create a new error response.
    pub fn new(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
            status: None,
        }
    }

    /// Create a new error response with status code.
    pub fn with_status(
        error: impl Into<String>,
        message: impl Into<String>,
        status: StatusCode,
    ) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
            status: Some(status.as_u16()),
        }
    }
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Service status
    pub status: String,

    /// Service version
    pub version: String,
}

/// Response from the secret-links list endpoint.
#[derive(Debug, Serialize)]
pub struct LinkListResponse {
    /// Links of the record, in creation order
    pub hits: Vec<SecretLink>,

    /// Total number of links
    pub total: usize,
}

// =============================================================================
// Error Mapping
// =============================================================================

/// Convert ServiceError to an HTTP response.
///
/// 4xx errors are logged at DEBUG/WARN, 5xx at ERROR.
impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let (status, error_type) = match &self {
            ServiceError::RecordNotFound(_)
            | ServiceError::DraftNotFound(_)
            | ServiceError::ReviewNotFound(_)
            | ServiceError::PidNotFound { .. }
            | ServiceError::LinkNotFound { .. } => (StatusCode::NOT_FOUND, "not_found"),

            ServiceError::PermissionDenied(_) => (StatusCode::FORBIDDEN, "permission_denied"),

            ServiceError::Validation(_) => (StatusCode::BAD_REQUEST, "validation_error"),

            ServiceError::Conflict(_) => (StatusCode::CONFLICT, "conflict"),

            ServiceError::RevisionMismatch { .. } => {
                (StatusCode::PRECONDITION_FAILED, "revision_mismatch")
            }

            ServiceError::Store(_) => (StatusCode::INTERNAL_SERVER_ERROR, "storage_error"),
        };
        let message = self.to_string();

        if status.is_server_error() {
            error!(
                error_type = error_type,
                status = status.as_u16(),
                "Server error: {}",
                message
            );
        } else if status == StatusCode::NOT_FOUND {
            // Common and expected
            debug!(
                error_type = error_type,
                status = status.as_u16(),
                "Resource not found: {}",
                message
            );
        } else {
            warn!(
                error_type = error_type,
                status = status.as_u16(),
                "Client error: {}",
                message
            );
        }

        let error_response = ErrorResponse::with_status(error_type, message, status);
        (status, Json(error_response)).into_response()
    }
}

// =============================================================================
// Record Handlers
// =============================================================================

/// `POST /records` - create a draft.
pub async fn create_record<S: RecordStore>(
    State(state): State<AppState<S>>,
    identity: Identity,
    Json(payload): Json<DraftPayload>,
) -> Result<impl IntoResponse, ServiceError> {
    let record = state.service.create(&identity, payload).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

/// `GET /records/{id}` - read a published record.
pub async fn read_record<S: RecordStore>(
    State(state): State<AppState<S>>,
    OptionalIdentity(identity): OptionalIdentity,
    Path(id): Path<String>,
    Query(query): Query<AccessQuery>,
) -> Result<Json<Record>, ServiceError> {
    let record = state
        .service
        .read(&id, &accessor(identity, query.token))
        .await?;
    Ok(Json(record))
}

/// `GET /records/{id}/draft` - read a draft.
pub async fn read_draft<S: RecordStore>(
    State(state): State<AppState<S>>,
    OptionalIdentity(identity): OptionalIdentity,
    Path(id): Path<String>,
    Query(query): Query<AccessQuery>,
) -> Result<Json<Record>, ServiceError> {
    let record = state
        .service
        .read_draft(&id, &accessor(identity, query.token))
        .await?;
    Ok(Json(record))
}

/// `PUT /records/{id}/draft` - update draft metadata.
pub async fn update_draft<S: RecordStore>(
    State(state): State<AppState<S>>,
    identity: Identity,
    Path(id): Path<String>,
    Json(payload): Json<DraftPayload>,
) -> Result<Json<Record>, ServiceError> {
    let record = state.service.update_draft(&id, &identity, payload).await?;
    Ok(Json(record))
}

/// `DELETE /records/{id}/draft` - discard a draft.
pub async fn delete_draft<S: RecordStore>(
    State(state): State<AppState<S>>,
    identity: Identity,
    Path(id): Path<String>,
) -> Result<StatusCode, ServiceError> {
    state.service.delete_draft(&id, &identity).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `POST /records/{id}/draft/files` - register file entries on a draft.
pub async fn add_draft_files<S: RecordStore>(
    State(state): State<AppState<S>>,
    identity: Identity,
    Path(id): Path<String>,
    Json(files): Json<Vec<FileEntry>>,
) -> Result<impl IntoResponse, ServiceError> {
    let record = state.service.add_files(&id, &identity, files).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

/// `POST /records/{id}/draft/actions/publish` - publish a draft.
///
/// Reported as 202 Accepted: downstream effects (indexing, notifications)
/// complete asynchronously.
pub async fn publish_draft<S: RecordStore>(
    State(state): State<AppState<S>>,
    identity: Identity,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ServiceError> {
    let record = state.service.publish(&id, &identity).await?;
    Ok((StatusCode::ACCEPTED, Json(record)))
}

// =============================================================================
// Review Handlers
// =============================================================================

/// `GET /records/{id}/draft/review` - read the related review request.
pub async fn review_read<S: RecordStore>(
    State(state): State<AppState<S>>,
    identity: Identity,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ServiceError> {
    let review = state.service.review().read(&id, &identity).await?;
    Ok(Json(review))
}

/// `PUT /records/{id}/draft/review` - create or update the review request.
pub async fn review_update<S: RecordStore>(
    State(state): State<AppState<S>>,
    identity: Identity,
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(payload): Json<ReviewPayload>,
) -> Result<impl IntoResponse, ServiceError> {
    let revision_id = revision_from_headers(&headers)?;
    let review = state
        .service
        .review()
        .update(&id, &identity, payload, revision_id)
        .await?;
    Ok(Json(review))
}

/// `DELETE /records/{id}/draft/review` - delete the review request.
pub async fn review_delete<S: RecordStore>(
    State(state): State<AppState<S>>,
    identity: Identity,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Result<StatusCode, ServiceError> {
    let revision_id = revision_from_headers(&headers)?;
    state
        .service
        .review()
        .delete(&id, &identity, revision_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `POST /records/{id}/draft/actions/submit-review` - submit for review.
///
/// 202 Accepted: the review itself runs out-of-band.
pub async fn review_submit<S: RecordStore>(
    State(state): State<AppState<S>>,
    identity: Identity,
    Path(id): Path<String>,
    Json(payload): Json<SubmitPayload>,
) -> Result<impl IntoResponse, ServiceError> {
    let review = state
        .service
        .review()
        .submit(&id, &identity, payload)
        .await?;
    Ok((StatusCode::ACCEPTED, Json(review)))
}

// =============================================================================
// PID Handlers
// =============================================================================

/// `POST /records/{id}/draft/pids/{scheme}` - reserve a PID.
pub async fn pids_reserve<S: RecordStore>(
    State(state): State<AppState<S>>,
    identity: Identity,
    Path((id, scheme)): Path<(String, String)>,
) -> Result<impl IntoResponse, ServiceError> {
    let pid = state
        .service
        .pids()
        .reserve(&id, &scheme, &identity)
        .await?;
    Ok((StatusCode::CREATED, Json(pid)))
}

/// `DELETE /records/{id}/draft/pids/{scheme}` - discard a reserved PID.
pub async fn pids_discard<S: RecordStore>(
    State(state): State<AppState<S>>,
    identity: Identity,
    Path((id, scheme)): Path<(String, String)>,
) -> Result<impl IntoResponse, ServiceError> {
    let pid = state
        .service
        .pids()
        .discard(&id, &scheme, &identity)
        .await?;
    Ok((StatusCode::OK, Json(pid)))
}

// =============================================================================
// Secret Link Handlers
// =============================================================================

/// `GET /records/{id}/access/links` - list secret links.
pub async fn links_search<S: RecordStore>(
    State(state): State<AppState<S>>,
    identity: Identity,
    Path(id): Path<String>,
) -> Result<Json<LinkListResponse>, ServiceError> {
    let hits = state.service.secret_links().read_all(&id, &identity).await?;
    let total = hits.len();
    Ok(Json(LinkListResponse { hits, total }))
}

/// `POST /records/{id}/access/links` - create a secret link.
pub async fn links_create<S: RecordStore>(
    State(state): State<AppState<S>>,
    identity: Identity,
    Path(id): Path<String>,
    Json(payload): Json<CreateLinkPayload>,
) -> Result<impl IntoResponse, ServiceError> {
    let link = state
        .service
        .secret_links()
        .create(&id, &identity, payload)
        .await?;
    Ok((StatusCode::CREATED, Json(link)))
}

/// `GET /records/{id}/access/links/{link_id}` - read a secret link.
pub async fn links_read<S: RecordStore>(
    State(state): State<AppState<S>>,
    identity: Identity,
    Path((id, link_id)): Path<(String, String)>,
) -> Result<Json<SecretLink>, ServiceError> {
    let link = state
        .service
        .secret_links()
        .read(&id, &identity, &link_id)
        .await?;
    Ok(Json(link))
}

/// `PUT /records/{id}/access/links/{link_id}` - always 405.
///
/// Full update of a secret link is explicitly disabled; only partial update
/// via PATCH is permitted.
pub async fn links_update_not_allowed() -> impl IntoResponse {
    let status = StatusCode::METHOD_NOT_ALLOWED;
    let body = ErrorResponse::with_status(
        "method_not_allowed",
        "secret links cannot be replaced; use PATCH for partial update",
        status,
    );
    (status, Json(body))
}

/// `PATCH /records/{id}/access/links/{link_id}` - partially update a link.
pub async fn links_partial_update<S: RecordStore>(
    State(state): State<AppState<S>>,
    identity: Identity,
    Path((id, link_id)): Path<(String, String)>,
    Json(payload): Json<UpdateLinkPayload>,
) -> Result<Json<SecretLink>, ServiceError> {
    let link = state
        .service
        .secret_links()
        .update(&id, &identity, &link_id, payload)
        .await?;
    Ok(Json(link))
}

/// `DELETE /records/{id}/access/links/{link_id}` - delete a secret link.
pub async fn links_delete<S: RecordStore>(
    State(state): State<AppState<S>>,
    identity: Identity,
    Path((id, link_id)): Path<(String, String)>,
) -> Result<StatusCode, ServiceError> {
    state
        .service
        .secret_links()
        .delete(&id, &identity, &link_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
// IIIF Manifest Handlers
// =============================================================================

/// `GET /records/{id}/manifest` - IIIF manifest of a published record.
pub async fn record_manifest<S: RecordStore>(
    State(state): State<AppState<S>>,
    OptionalIdentity(identity): OptionalIdentity,
    Path(id): Path<String>,
    Query(query): Query<AccessQuery>,
) -> Result<Response, ServiceError> {
    let record = state
        .service
        .read(&id, &accessor(identity, query.token))
        .await?;
    Ok(manifest_response(&state, &record, false))
}

/// `GET /records/{id}/draft/manifest` - IIIF manifest of a draft.
pub async fn draft_manifest<S: RecordStore>(
    State(state): State<AppState<S>>,
    OptionalIdentity(identity): OptionalIdentity,
    Path(id): Path<String>,
    Query(query): Query<AccessQuery>,
) -> Result<Response, ServiceError> {
    let record = state
        .service
        .read_draft(&id, &accessor(identity, query.token))
        .await?;
    Ok(manifest_response(&state, &record, true))
}

/// Serialize a manifest with JSON-LD content type and cache headers.
fn manifest_response<S: RecordStore>(state: &AppState<S>, record: &Record, draft: bool) -> Response {
    let manifest = manifest_for_record(record, &state.base_url, draft);
    let headers = [
        (header::CONTENT_TYPE, MANIFEST_CONTENT_TYPE.to_string()),
        (
            header::CACHE_CONTROL,
            format!("public, max-age={}", state.cache_max_age),
        ),
    ];
    (headers, Json(manifest)).into_response()
}

// =============================================================================
// Health
// =============================================================================

/// `GET /health` - health check.
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

// =============================================================================
// Tests
// =============================================================================
