//! Record and draft operations.

use serde::Deserialize;

use crate::error::{ServiceError, StoreError};
use crate::model::{AccessLevel, FileEntry, LinkPermission, Metadata, Record};
use crate::store::RecordStore;

use super::{ensure_owner, fetch_draft, fetch_record, Accessor, Identity, RecordService};

/// Payload for creating or updating a draft.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DraftPayload {
    /// Descriptive metadata
    #[serde(default)]
    pub metadata: Metadata,

    /// Visibility, defaults to public
    #[serde(default)]
    pub access: AccessLevel,
}

impl<S: RecordStore> RecordService<S> {
    /// Create a new draft owned by the caller.
    pub async fn create(
        &self,
        identity: &Identity,
        payload: DraftPayload,
    ) -> Result<Record, ServiceError> {
        if payload.metadata.title.trim().is_empty() {
            return Err(ServiceError::Validation(
                "metadata.title must not be empty".to_string(),
            ));
        }

        let record = Record::new_draft(&identity.user, payload.metadata, payload.access);
        self.store().put_draft(record.clone()).await?;
        Ok(record)
    }

    /// Read a published record.
    pub async fn read(&self, id: &str, accessor: &Accessor) -> Result<Record, ServiceError> {
        let record = fetch_record(self.store(), id).await?;
        self.check_read(&record, accessor).await?;
        Ok(record)
    }

    /// Read a draft.
    pub async fn read_draft(&self, id: &str, accessor: &Accessor) -> Result<Record, ServiceError> {
        let record = fetch_draft(self.store(), id).await?;
        self.check_read(&record, accessor).await?;
        Ok(record)
    }

    /// Replace the metadata and access settings of a draft.
    pub async fn update_draft(
        &self,
        id: &str,
        identity: &Identity,
        payload: DraftPayload,
    ) -> Result<Record, ServiceError> {
        if payload.metadata.title.trim().is_empty() {
            return Err(ServiceError::Validation(
                "metadata.title must not be empty".to_string(),
            ));
        }

        let mut record = fetch_draft(self.store(), id).await?;
        ensure_owner(&record, identity)?;

        record.metadata = payload.metadata;
        record.access = payload.access;
        record.bump_revision();
        self.store().put_draft(record.clone()).await?;
        Ok(record)
    }

    /// Discard a draft.
    pub async fn delete_draft(&self, id: &str, identity: &Identity) -> Result<(), ServiceError> {
        let record = fetch_draft(self.store(), id).await?;
        ensure_owner(&record, identity)?;

        self.store().delete_draft(id).await.map_err(|e| match e {
            StoreError::NotFound(_) => ServiceError::DraftNotFound(id.to_string()),
            other => other.into(),
        })
    }

    /// Register file entries on a draft.
    ///
    /// Keys must be unique within the record; a duplicate rejects the whole
    /// request.
    pub async fn add_files(
        &self,
        id: &str,
        identity: &Identity,
        files: Vec<FileEntry>,
    ) -> Result<Record, ServiceError> {
        let mut record = fetch_draft(self.store(), id).await?;
        ensure_owner(&record, identity)?;

        for file in &files {
            if file.key.is_empty() {
                return Err(ServiceError::Validation(
                    "file key must not be empty".to_string(),
                ));
            }
            let duplicate = record.files.iter().any(|f| f.key == file.key)
                || files.iter().filter(|f| f.key == file.key).count() > 1;
            if duplicate {
                return Err(ServiceError::Validation(format!(
                    "duplicate file key: {}",
                    file.key
                )));
            }
        }

        record.files.extend(files);
        record.bump_revision();
        self.store().put_draft(record.clone()).await?;
        Ok(record)
    }

    /// Publish a draft.
    ///
    /// The draft becomes the published version and is removed from the draft
    /// store. Reported as deferred completion (202) by the HTTP layer.
    pub async fn publish(&self, id: &str, identity: &Identity) -> Result<Record, ServiceError> {
        let mut record = fetch_draft(self.store(), id).await?;
        ensure_owner(&record, identity)?;

        record.published = true;
        record.bump_revision();
        self.store().put_record(record.clone()).await?;
        self.store().delete_draft(id).await?;
        Ok(record)
    }

    /// Access check shared by record, draft and manifest reads.
    async fn check_read(&self, record: &Record, accessor: &Accessor) -> Result<(), ServiceError> {
        // Drafts are only visible to the owner or through an edit link.
        if !record.published {
            return match accessor {
                Accessor::User(identity) => ensure_owner(record, identity),
                Accessor::LinkToken(token) => {
                    let link = self.secret_links().verify_token(&record.id, token).await?;
                    if link.permission == LinkPermission::Edit {
                        Ok(())
                    } else {
                        Err(ServiceError::PermissionDenied(
                            "link does not grant draft access".to_string(),
                        ))
                    }
                }
                Accessor::Anonymous => Err(ServiceError::PermissionDenied(
                    "draft access requires authentication".to_string(),
                )),
            };
        }

        match record.access {
            AccessLevel::Public => Ok(()),
            AccessLevel::Restricted => match accessor {
                Accessor::User(identity) => ensure_owner(record, identity),
                Accessor::LinkToken(token) => {
                    self.secret_links().verify_token(&record.id, token).await?;
                    Ok(())
                }
                Accessor::Anonymous => Err(ServiceError::PermissionDenied(
                    "record is restricted".to_string(),
                )),
            },
        }
    }
}
