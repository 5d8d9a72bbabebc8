//! Service layer for the record API.
//!
//! Handlers delegate every operation to exactly one method here. The service
//! owns the state-transition rules (review lifecycle, PID reservation, link
//! issuance, access checks) and talks to the backend through [`RecordStore`].
//!
//! [`RecordService`] is the entry point; the review, PID and secret-link
//! sub-services are reachable through it, mirroring the shape of the HTTP
//! surface (`service.review().submit(...)` backs `POST .../actions/submit-review`).

pub mod links;
pub mod pids;
pub mod records;
pub mod review;

use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::{ServiceError, StoreError};
use crate::model::Record;
use crate::store::RecordStore;

pub use links::{CreateLinkPayload, SecretLinkService, UpdateLinkPayload};
pub use pids::PidService;
pub use records::DraftPayload;
pub use review::{ReviewPayload, ReviewService, SubmitPayload};

/// The authenticated caller on whose behalf a service call runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    /// User name, unique across the deployment
    pub user: String,
}

impl Identity {
    /// Create an identity for the given user.
    pub fn new(user: impl Into<String>) -> Self {
        Self { user: user.into() }
    }
}

/// How a read request identifies itself.
///
/// Mutating operations always require an [`Identity`]; reads additionally
/// accept secret-link tokens and anonymous access to public records.
#[derive(Debug, Clone)]
pub enum Accessor {
    /// No credentials presented
    Anonymous,

    /// Authenticated user
    User(Identity),

    /// Secret-link capability token from `?token=`
    LinkToken(String),
}

/// Current unix time in seconds.
pub(crate) fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// Fetch a draft, translating a store miss into a domain error.
pub(crate) async fn fetch_draft<S: RecordStore>(
    store: &S,
    id: &str,
) -> Result<Record, ServiceError> {
    store.get_draft(id).await.map_err(|e| match e {
        StoreError::NotFound(_) => ServiceError::DraftNotFound(id.to_string()),
        other => other.into(),
    })
}

/// Fetch a published record, translating a store miss into a domain error.
pub(crate) async fn fetch_record<S: RecordStore>(
    store: &S,
    id: &str,
) -> Result<Record, ServiceError> {
    store.get_record(id).await.map_err(|e| match e {
        StoreError::NotFound(_) => ServiceError::RecordNotFound(id.to_string()),
        other => other.into(),
    })
}

/// Fetch the published record if it exists, otherwise the draft.
///
/// Secret links and their tokens are attached to the record as a whole, so
/// operations on them must work for unpublished records too.
pub(crate) async fn fetch_any<S: RecordStore>(
    store: &S,
    id: &str,
) -> Result<Record, ServiceError> {
    match fetch_record(store, id).await {
        Ok(record) => Ok(record),
        Err(ServiceError::RecordNotFound(_)) => fetch_draft(store, id).await,
        Err(other) => Err(other),
    }
}

/// Reject callers that do not own the record.
pub(crate) fn ensure_owner(record: &Record, identity: &Identity) -> Result<(), ServiceError> {
    if record.owner == identity.user {
        Ok(())
    } else {
        Err(ServiceError::PermissionDenied(format!(
            "user {} does not own record {}",
            identity.user, record.id
        )))
    }
}

/// Entry point to all record operations.
pub struct RecordService<S: RecordStore> {
    store: Arc<S>,
    review: ReviewService<S>,
    pids: PidService<S>,
    secret_links: SecretLinkService<S>,
}

impl<S: RecordStore> RecordService<S> {
    /// Create a service over the given store.
    ///
    /// `link_secret` is the HMAC key used to derive secret-link tokens.
    pub fn new(store: S, link_secret: impl AsRef<[u8]>) -> Self {
        let store = Arc::new(store);
        Self {
            review: ReviewService::new(Arc::clone(&store)),
            pids: PidService::new(Arc::clone(&store)),
            secret_links: SecretLinkService::new(Arc::clone(&store), link_secret),
            store,
        }
    }

    /// Restrict PID reservation to the given schemes.
    pub fn with_pid_schemes(mut self, schemes: Vec<String>) -> Self {
        self.pids = self.pids.with_schemes(schemes);
        self
    }

    /// The review sub-service.
    pub fn review(&self) -> &ReviewService<S> {
        &self.review
    }

    /// The PID sub-service.
    pub fn pids(&self) -> &PidService<S> {
        &self.pids
    }

    /// The secret-links sub-service.
    pub fn secret_links(&self) -> &SecretLinkService<S> {
        &self.secret_links
    }

    pub(crate) fn store(&self) -> &S {
        &self.store
    }
}
