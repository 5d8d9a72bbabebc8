//! Secret link operations.
//!
//! A secret link is a capability: presenting its token (usually via a
//! `?token=` query parameter) grants the link's permission on the record
//! without any other credentials. Tokens are HMAC-SHA256 over
//! `"{record_id}:{link_id}"`, hex encoded, and verified with a constant-time
//! comparison.

use std::sync::Arc;

use hmac::{Hmac, Mac};
use serde::Deserialize;
use sha2::Sha256;
use subtle::ConstantTimeEq;

use crate::error::{ServiceError, StoreError};
use crate::model::{LinkPermission, SecretLink};
use crate::store::RecordStore;

use super::{ensure_owner, fetch_any, unix_now, Identity};

type HmacSha256 = Hmac<Sha256>;

/// Payload for creating a secret link.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateLinkPayload {
    /// Permission level, defaults to view
    #[serde(default)]
    pub permission: LinkPermission,

    /// Expiry time (unix seconds), never expires if absent
    #[serde(default)]
    pub expires_at: Option<u64>,
}

/// Payload for partially updating a secret link.
///
/// Absent fields are left unchanged; the token and ids are immutable.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateLinkPayload {
    /// New permission level
    #[serde(default)]
    pub permission: Option<LinkPermission>,

    /// New expiry time (unix seconds)
    #[serde(default)]
    pub expires_at: Option<u64>,
}

/// Service managing secret links on records.
pub struct SecretLinkService<S> {
    store: Arc<S>,
    secret_key: Vec<u8>,
}

impl<S: RecordStore> SecretLinkService<S> {
    pub(crate) fn new(store: Arc<S>, secret_key: impl AsRef<[u8]>) -> Self {
        Self {
            store,
            secret_key: secret_key.as_ref().to_vec(),
        }
    }

    /// Create a secret link for a record.
    pub async fn create(
        &self,
        record_id: &str,
        identity: &Identity,
        payload: CreateLinkPayload,
    ) -> Result<SecretLink, ServiceError> {
        let record = fetch_any(self.store.as_ref(), record_id).await?;
        ensure_owner(&record, identity)?;

        let now = unix_now();
        if let Some(expiry) = payload.expires_at {
            if expiry <= now {
                return Err(ServiceError::Validation(
                    "expires_at must be in the future".to_string(),
                ));
            }
        }

        let mut link = SecretLink::new(record_id, payload.permission, now, payload.expires_at);
        link.token = self.token_for(record_id, &link.id);
        self.store.put_link(link.clone()).await?;
        Ok(link)
    }

    /// Read a secret link.
    pub async fn read(
        &self,
        record_id: &str,
        identity: &Identity,
        link_id: &str,
    ) -> Result<SecretLink, ServiceError> {
        let record = fetch_any(self.store.as_ref(), record_id).await?;
        ensure_owner(&record, identity)?;
        self.fetch(record_id, link_id).await
    }

    /// Partially update a secret link.
    pub async fn update(
        &self,
        record_id: &str,
        identity: &Identity,
        link_id: &str,
        payload: UpdateLinkPayload,
    ) -> Result<SecretLink, ServiceError> {
        let record = fetch_any(self.store.as_ref(), record_id).await?;
        ensure_owner(&record, identity)?;

        let mut link = self.fetch(record_id, link_id).await?;
        if let Some(permission) = payload.permission {
            link.permission = permission;
        }
        if let Some(expiry) = payload.expires_at {
            if expiry <= unix_now() {
                return Err(ServiceError::Validation(
                    "expires_at must be in the future".to_string(),
                ));
            }
            link.expires_at = Some(expiry);
        }
        self.store.put_link(link.clone()).await?;
        Ok(link)
    }

    /// Delete a secret link.
    pub async fn delete(
        &self,
        record_id: &str,
        identity: &Identity,
        link_id: &str,
    ) -> Result<(), ServiceError> {
        let record = fetch_any(self.store.as_ref(), record_id).await?;
        ensure_owner(&record, identity)?;

        self.store
            .delete_link(record_id, link_id)
            .await
            .map_err(|e| match e {
                StoreError::NotFound(_) => ServiceError::LinkNotFound {
                    record_id: record_id.to_string(),
                    link_id: link_id.to_string(),
                },
                other => other.into(),
            })
    }

    /// List all secret links of a record.
    pub async fn read_all(
        &self,
        record_id: &str,
        identity: &Identity,
    ) -> Result<Vec<SecretLink>, ServiceError> {
        let record = fetch_any(self.store.as_ref(), record_id).await?;
        ensure_owner(&record, identity)?;
        Ok(self.store.list_links(record_id).await?)
    }

    /// Verify a capability token presented for a record.
    ///
    /// Returns the matching link if the token is valid and not expired.
    /// Deliberately does not distinguish unknown from expired tokens.
    pub async fn verify_token(
        &self,
        record_id: &str,
        token: &str,
    ) -> Result<SecretLink, ServiceError> {
        let now = unix_now();
        let links = self.store.list_links(record_id).await?;

        for link in links {
            let matches: bool = link.token.as_bytes().ct_eq(token.as_bytes()).into();
            if matches {
                if link.is_expired(now) {
                    break;
                }
                return Ok(link);
            }
        }

        Err(ServiceError::PermissionDenied(
            "invalid or expired link token".to_string(),
        ))
    }

    /// Fetch a link, translating a store miss into a domain error.
    async fn fetch(&self, record_id: &str, link_id: &str) -> Result<SecretLink, ServiceError> {
        self.store
            .get_link(record_id, link_id)
            .await
            .map_err(|e| match e {
                StoreError::NotFound(_) => ServiceError::LinkNotFound {
                    record_id: record_id.to_string(),
                    link_id: link_id.to_string(),
                },
                other => other.into(),
            })
    }

    /// Derive the token of a link.
    fn token_for(&self, record_id: &str, link_id: &str) -> String {
        let mut mac = HmacSha256::new_from_slice(&self.secret_key)
            .expect("HMAC can take key of any size");
        mac.update(record_id.as_bytes());
        mac.update(b":");
        mac.update(link_id.as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }
}
