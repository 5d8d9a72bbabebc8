//! Review request types.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// State of a review request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewState {
    /// Request exists but has not been handed to a reviewer
    Created,

    /// Request has been submitted; the draft is frozen for review
    Submitted,
}

/// A request to publish a draft record.
///
/// One review request exists per draft at most. Once submitted, the request
/// can no longer be updated or deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewRequest {
    /// Request identifier
    pub id: String,

    /// Identifier of the draft under review
    pub record_id: String,

    /// Receiver of the request (community or curator), if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub receiver: Option<String>,

    /// Message attached on submission
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    /// Current state
    pub state: ReviewState,

    /// Monotonic revision counter
    pub revision_id: u64,
}

impl ReviewRequest {
    /// Create a review request in the `created` state.
    pub fn new(record_id: impl Into<String>, receiver: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4().simple().to_string(),
            record_id: record_id.into(),
            receiver,
            message: None,
            state: ReviewState::Created,
            revision_id: 1,
        }
    }

    /// Whether the request has already been submitted.
    pub fn is_submitted(&self) -> bool {
        self.state == ReviewState::Submitted
    }
}
