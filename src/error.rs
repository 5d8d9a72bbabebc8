use thiserror::Error;

/// Errors raised by the storage backend.
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    /// The requested entity does not exist
    #[error("not found: {0}")]
    NotFound(String),

    /// Backend failure (connectivity, corruption, ...)
    #[error("backend error: {0}")]
    Backend(String),
}

/// Errors raised by the record services.
///
/// Handlers never recover from these; the server layer maps them to HTTP
/// status codes (404/403/400/409/412/500).
#[derive(Debug, Clone, Error)]
pub enum ServiceError {
    /// No published record with this identifier
    #[error("record not found: {0}")]
    RecordNotFound(String),

    /// No draft with this identifier
    #[error("draft not found: {0}")]
    DraftNotFound(String),

    /// The draft has no associated review request
    #[error("no review request for record {0}")]
    ReviewNotFound(String),

    /// No PID reserved for this (record, scheme) pair
    #[error("no {scheme} PID reserved for record {record_id}")]
    PidNotFound { record_id: String, scheme: String },

    /// No secret link with this identifier on the record
    #[error("secret link {link_id} not found on record {record_id}")]
    LinkNotFound { record_id: String, link_id: String },

    /// The caller is not allowed to perform the operation
    #[error("permission denied: {0}")]
    PermissionDenied(String),

    /// The request payload or parameters are invalid
    #[error("validation error: {0}")]
    Validation(String),

    /// The operation conflicts with the current entity state
    /// (PID already reserved, review already submitted, ...)
    #[error("{0}")]
    Conflict(String),

    /// Optimistic concurrency check failed (If-Match revision mismatch)
    #[error("revision mismatch: expected {expected}, got {provided}")]
    RevisionMismatch { expected: u64, provided: u64 },

    /// Storage backend failure
    #[error("storage error: {0}")]
    Store(#[from] StoreError),
}
