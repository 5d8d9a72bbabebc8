//! PID reservation operations.
//!
//! Identifier values are minted locally; registration against an external
//! registrar (DataCite etc.) is out of scope. A reservation is one row per
//! (record, scheme) pair, created by `reserve` and removed by `discard`.

use std::sync::Arc;

use crate::error::{ServiceError, StoreError};
use crate::model::Pid;
use crate::store::RecordStore;

use super::{ensure_owner, fetch_draft, Identity};

/// Schemes accepted when none are configured explicitly.
pub const DEFAULT_PID_SCHEMES: &[&str] = &["doi", "oai"];

/// Service managing PID reservations on drafts.
pub struct PidService<S> {
    store: Arc<S>,
    schemes: Vec<String>,
}

impl<S: RecordStore> PidService<S> {
    pub(crate) fn new(store: Arc<S>) -> Self {
        Self {
            store,
            schemes: DEFAULT_PID_SCHEMES.iter().map(|s| s.to_string()).collect(),
        }
    }

    pub(crate) fn with_schemes(mut self, schemes: Vec<String>) -> Self {
        self.schemes = schemes;
        self
    }

    /// Reserve a PID of the given scheme for a draft.
    pub async fn reserve(
        &self,
        record_id: &str,
        scheme: &str,
        identity: &Identity,
    ) -> Result<Pid, ServiceError> {
        let draft = fetch_draft(self.store.as_ref(), record_id).await?;
        ensure_owner(&draft, identity)?;
        self.check_scheme(scheme)?;

        match self.store.get_pid(record_id, scheme).await {
            Ok(_) => {
                return Err(ServiceError::Conflict(format!(
                    "a {scheme} PID is already reserved for record {record_id}"
                )))
            }
            Err(StoreError::NotFound(_)) => {}
            Err(other) => return Err(other.into()),
        }

        let pid = Pid::reserved(scheme, mint_identifier(scheme, record_id));
        self.store.put_pid(record_id, pid.clone()).await?;
        Ok(pid)
    }

    /// Discard a previously reserved PID.
    ///
    /// Returns the discarded reservation.
    pub async fn discard(
        &self,
        record_id: &str,
        scheme: &str,
        identity: &Identity,
    ) -> Result<Pid, ServiceError> {
        let draft = fetch_draft(self.store.as_ref(), record_id).await?;
        ensure_owner(&draft, identity)?;
        self.check_scheme(scheme)?;

        let pid = self
            .store
            .get_pid(record_id, scheme)
            .await
            .map_err(|e| match e {
                StoreError::NotFound(_) => ServiceError::PidNotFound {
                    record_id: record_id.to_string(),
                    scheme: scheme.to_string(),
                },
                other => other.into(),
            })?;

        self.store.delete_pid(record_id, scheme).await?;
        Ok(pid)
    }

    fn check_scheme(&self, scheme: &str) -> Result<(), ServiceError> {
        if self.schemes.iter().any(|s| s == scheme) {
            Ok(())
        } else {
            Err(ServiceError::Validation(format!(
                "unknown PID scheme: {scheme}"
            )))
        }
    }
}

/// Mint an identifier value for a scheme.
fn mint_identifier(scheme: &str, record_id: &str) -> String {
    let suffix: String = record_id.chars().take(8).collect();
    match scheme {
        "doi" => format!("10.1234/bibrec.{suffix}"),
        other => format!("{other}:bibrec:{suffix}"),
    }
}
