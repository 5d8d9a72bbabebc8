//! Storage layer for records, reviews, PIDs and secret links.
//!
//! The [`RecordStore`] trait is the seam between the services and the
//! persistence backend. The services contain all state-transition logic; a
//! store only gets, puts and deletes entities. Ships with an in-memory
//! backend ([`MemoryStore`]) used by the server binary and the tests.

pub mod memory;

use async_trait::async_trait;

use crate::error::StoreError;
use crate::model::{Pid, Record, ReviewRequest, SecretLink};

pub use memory::MemoryStore;

/// Persistence backend for the record services.
///
/// Drafts and published records are stored independently under the same
/// record id. All lookups return [`StoreError::NotFound`] for missing
/// entities; the services translate that into domain-specific errors.
#[async_trait]
pub trait RecordStore: Send + Sync + 'static {
    /// Fetch a draft by record id.
    async fn get_draft(&self, id: &str) -> Result<Record, StoreError>;

    /// Insert or replace a draft.
    async fn put_draft(&self, record: Record) -> Result<(), StoreError>;

    /// Remove a draft.
    async fn delete_draft(&self, id: &str) -> Result<(), StoreError>;

    /// Fetch a published record by id.
    async fn get_record(&self, id: &str) -> Result<Record, StoreError>;

    /// Insert or replace a published record.
    async fn put_record(&self, record: Record) -> Result<(), StoreError>;

    /// Fetch the review request of a draft.
    async fn get_review(&self, record_id: &str) -> Result<ReviewRequest, StoreError>;

    /// Insert or replace a review request.
    async fn put_review(&self, review: ReviewRequest) -> Result<(), StoreError>;

    /// Remove the review request of a draft.
    async fn delete_review(&self, record_id: &str) -> Result<(), StoreError>;

    /// Fetch the PID reserved for a (record, scheme) pair.
    async fn get_pid(&self, record_id: &str, scheme: &str) -> Result<Pid, StoreError>;

    /// Insert or replace a PID reservation.
    async fn put_pid(&self, record_id: &str, pid: Pid) -> Result<(), StoreError>;

    /// Remove a PID reservation.
    async fn delete_pid(&self, record_id: &str, scheme: &str) -> Result<(), StoreError>;

    /// Fetch a secret link by (record, link) ids.
    async fn get_link(&self, record_id: &str, link_id: &str) -> Result<SecretLink, StoreError>;

    /// Insert or replace a secret link.
    async fn put_link(&self, link: SecretLink) -> Result<(), StoreError>;

    /// Remove a secret link.
    async fn delete_link(&self, record_id: &str, link_id: &str) -> Result<(), StoreError>;

    /// List all secret links of a record, in creation order.
    async fn list_links(&self, record_id: &str) -> Result<Vec<SecretLink>, StoreError>;
}
