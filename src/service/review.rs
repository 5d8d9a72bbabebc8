//! Review request operations.
//!
//! A draft carries at most one review request. The request is created or
//! updated via `update`, frozen by `submit` and removable while still open.
//! `If-Match` revision ids are checked here, not in the handlers.

use std::sync::Arc;

use serde::Deserialize;

use crate::error::{ServiceError, StoreError};
use crate::model::{ReviewRequest, ReviewState};
use crate::store::RecordStore;

use super::{ensure_owner, fetch_draft, Identity};

/// Payload for creating or updating a review request.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReviewPayload {
    /// Receiver of the request (community or curator)
    #[serde(default)]
    pub receiver: Option<String>,
}

/// Payload for submitting a draft for review.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SubmitPayload {
    /// Message to the reviewer
    #[serde(default)]
    pub message: Option<String>,
}

/// Service managing review requests.
pub struct ReviewService<S> {
    store: Arc<S>,
}

impl<S: RecordStore> ReviewService<S> {
    pub(crate) fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Read the review request of a draft.
    pub async fn read(
        &self,
        record_id: &str,
        identity: &Identity,
    ) -> Result<ReviewRequest, ServiceError> {
        let draft = fetch_draft(self.store.as_ref(), record_id).await?;
        ensure_owner(&draft, identity)?;
        self.fetch(record_id).await
    }

    /// Create or update the review request of a draft.
    ///
    /// Creates the request if none exists yet. An already submitted request
    /// cannot be changed.
    pub async fn update(
        &self,
        record_id: &str,
        identity: &Identity,
        payload: ReviewPayload,
        revision_id: Option<u64>,
    ) -> Result<ReviewRequest, ServiceError> {
        let draft = fetch_draft(self.store.as_ref(), record_id).await?;
        ensure_owner(&draft, identity)?;

        let review = match self.store.get_review(record_id).await {
            Ok(mut review) => {
                if review.is_submitted() {
                    return Err(ServiceError::Conflict(
                        "review request already submitted".to_string(),
                    ));
                }
                check_revision(&review, revision_id)?;
                review.receiver = payload.receiver;
                review.revision_id += 1;
                review
            }
            Err(StoreError::NotFound(_)) => ReviewRequest::new(record_id, payload.receiver),
            Err(other) => return Err(other.into()),
        };

        self.store.put_review(review.clone()).await?;
        Ok(review)
    }

    /// Delete the review request of a draft.
    pub async fn delete(
        &self,
        record_id: &str,
        identity: &Identity,
        revision_id: Option<u64>,
    ) -> Result<(), ServiceError> {
        let draft = fetch_draft(self.store.as_ref(), record_id).await?;
        ensure_owner(&draft, identity)?;

        let review = self.fetch(record_id).await?;
        if review.is_submitted() {
            return Err(ServiceError::Conflict(
                "submitted review request cannot be deleted".to_string(),
            ));
        }
        check_revision(&review, revision_id)?;

        self.store
            .delete_review(record_id)
            .await
            .map_err(|e| match e {
                StoreError::NotFound(_) => ServiceError::ReviewNotFound(record_id.to_string()),
                other => other.into(),
            })
    }

    /// Submit the draft for review.
    ///
    /// Transitions the request into the `submitted` state; completion of the
    /// review itself is deferred and reported as such (202).
    pub async fn submit(
        &self,
        record_id: &str,
        identity: &Identity,
        payload: SubmitPayload,
    ) -> Result<ReviewRequest, ServiceError> {
        let draft = fetch_draft(self.store.as_ref(), record_id).await?;
        ensure_owner(&draft, identity)?;

        let mut review = self.fetch(record_id).await?;
        if review.is_submitted() {
            return Err(ServiceError::Conflict(
                "review request already submitted".to_string(),
            ));
        }

        review.state = ReviewState::Submitted;
        review.message = payload.message;
        review.revision_id += 1;
        self.store.put_review(review.clone()).await?;
        Ok(review)
    }

    async fn fetch(&self, record_id: &str) -> Result<ReviewRequest, ServiceError> {
        self.store.get_review(record_id).await.map_err(|e| match e {
            StoreError::NotFound(_) => ServiceError::ReviewNotFound(record_id.to_string()),
            other => other.into(),
        })
    }
}

/// Optimistic concurrency check for pass-through `If-Match` revisions.
fn check_revision(review: &ReviewRequest, provided: Option<u64>) -> Result<(), ServiceError> {
    match provided {
        Some(provided) if provided != review.revision_id => Err(ServiceError::RevisionMismatch {
            expected: review.revision_id,
            provided,
        }),
        _ => Ok(()),
    }
}
