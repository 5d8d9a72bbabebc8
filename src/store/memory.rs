//! In-memory storage backend.
//!
//! Backs the server binary and the integration tests. All entities live in
//! `HashMap`s behind a single `RwLock`; per-request isolation comes from the
//! lock, there is no other shared mutable state.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::StoreError;
use crate::model::{Pid, Record, ReviewRequest, SecretLink};

use super::RecordStore;

#[derive(Default)]
struct Inner {
    drafts: HashMap<String, Record>,
    records: HashMap<String, Record>,
    reviews: HashMap<String, ReviewRequest>,
    // keyed by (record_id, scheme)
    pids: HashMap<(String, String), Pid>,
    // keyed by (record_id, link_id); insertion order kept separately
    links: HashMap<(String, String), SecretLink>,
    link_order: Vec<(String, String)>,
}

/// In-memory implementation of [`RecordStore`].
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn get_draft(&self, id: &str) -> Result<Record, StoreError> {
        self.inner
            .read()
            .await
            .drafts
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("draft {id}")))
    }

    async fn put_draft(&self, record: Record) -> Result<(), StoreError> {
        self.inner
            .write()
            .await
            .drafts
            .insert(record.id.clone(), record);
        Ok(())
    }

    async fn delete_draft(&self, id: &str) -> Result<(), StoreError> {
        self.inner
            .write()
            .await
            .drafts
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| StoreError::NotFound(format!("draft {id}")))
    }

    async fn get_record(&self, id: &str) -> Result<Record, StoreError> {
        self.inner
            .read()
            .await
            .records
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("record {id}")))
    }

    async fn put_record(&self, record: Record) -> Result<(), StoreError> {
        self.inner
            .write()
            .await
            .records
            .insert(record.id.clone(), record);
        Ok(())
    }

    async fn get_review(&self, record_id: &str) -> Result<ReviewRequest, StoreError> {
        self.inner
            .read()
            .await
            .reviews
            .get(record_id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("review for {record_id}")))
    }

    async fn put_review(&self, review: ReviewRequest) -> Result<(), StoreError> {
        self.inner
            .write()
            .await
            .reviews
            .insert(review.record_id.clone(), review);
        Ok(())
    }

    async fn delete_review(&self, record_id: &str) -> Result<(), StoreError> {
        self.inner
            .write()
            .await
            .reviews
            .remove(record_id)
            .map(|_| ())
            .ok_or_else(|| StoreError::NotFound(format!("review for {record_id}")))
    }

    async fn get_pid(&self, record_id: &str, scheme: &str) -> Result<Pid, StoreError> {
        self.inner
            .read()
            .await
            .pids
            .get(&(record_id.to_string(), scheme.to_string()))
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("pid {scheme} for {record_id}")))
    }

    async fn put_pid(&self, record_id: &str, pid: Pid) -> Result<(), StoreError> {
        self.inner
            .write()
            .await
            .pids
            .insert((record_id.to_string(), pid.scheme.clone()), pid);
        Ok(())
    }

    async fn delete_pid(&self, record_id: &str, scheme: &str) -> Result<(), StoreError> {
        self.inner
            .write()
            .await
            .pids
            .remove(&(record_id.to_string(), scheme.to_string()))
            .map(|_| ())
            .ok_or_else(|| StoreError::NotFound(format!("pid {scheme} for {record_id}")))
    }

    async fn get_link(&self, record_id: &str, link_id: &str) -> Result<SecretLink, StoreError> {
        self.inner
            .read()
            .await
            .links
            .get(&(record_id.to_string(), link_id.to_string()))
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("link {link_id} on {record_id}")))
    }

    async fn put_link(&self, link: SecretLink) -> Result<(), StoreError> {
        let key = (link.record_id.clone(), link.id.clone());
        let mut inner = self.inner.write().await;
        if inner.links.insert(key.clone(), link).is_none() {
            inner.link_order.push(key);
        }
        Ok(())
    }

    async fn delete_link(&self, record_id: &str, link_id: &str) -> Result<(), StoreError> {
        let key = (record_id.to_string(), link_id.to_string());
        let mut inner = self.inner.write().await;
        match inner.links.remove(&key) {
            Some(_) => {
                inner.link_order.retain(|k| k != &key);
                Ok(())
            }
            None => Err(StoreError::NotFound(format!(
                "link {link_id} on {record_id}"
            ))),
        }
    }

    async fn list_links(&self, record_id: &str) -> Result<Vec<SecretLink>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner
            .link_order
            .iter()
            .filter(|(rid, _)| rid == record_id)
            .filter_map(|key| inner.links.get(key).cloned())
            .collect())
    }
}
