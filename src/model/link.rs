//! Secret link types.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Permission level granted by a secret link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkPermission {
    /// Read access to the published record and its manifest
    #[default]
    View,

    /// View access plus read access to the draft
    Edit,
}

/// A capability token granting scoped access to an otherwise private record.
///
/// The token is an HMAC over `(record_id, link_id)` issued by the secret-links
/// service; `link_id` and `token` are immutable, while `permission` and
/// `expires_at` may change via partial update.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecretLink {
    /// Link identifier
    pub id: String,

    /// Record the link grants access to
    pub record_id: String,

    /// Granted permission level
    pub permission: LinkPermission,

    /// Creation time (unix seconds)
    pub created_at: u64,

    /// Expiry time (unix seconds), never expires if absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<u64>,

    /// Capability token presented by clients via `?token=`
    pub token: String,
}

impl SecretLink {
    /// Create a link with a fresh identifier and an empty token.
    ///
    /// The token is filled in by the secret-links service, which owns the
    /// signing key.
    pub fn new(
        record_id: impl Into<String>,
        permission: LinkPermission,
        created_at: u64,
        expires_at: Option<u64>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().simple().to_string(),
            record_id: record_id.into(),
            permission,
            created_at,
            expires_at,
            token: String::new(),
        }
    }

    /// Whether the link has expired at `now` (unix seconds).
    pub fn is_expired(&self, now: u64) -> bool {
        match self.expires_at {
            Some(expiry) => now >= expiry,
            None => false,
        }
    }
}
