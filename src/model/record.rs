//! Bibliographic record and draft types.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// File extensions that are rendered onto IIIF canvases.
const IMAGE_EXTENSIONS: &[&str] = &[".png", ".jpg", ".jpeg", ".tif", ".tiff"];

/// Visibility of a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessLevel {
    /// Readable by anyone
    #[default]
    Public,

    /// Readable only by the owner or via a secret link
    Restricted,
}

/// Descriptive metadata of a record.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Metadata {
    /// Record title
    pub title: String,

    /// Free-text description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Creator names
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub creators: Vec<String>,

    /// Publication date (ISO 8601 string, uninterpreted)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publication_date: Option<String>,

    /// License identifier or URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub license: Option<String>,
}

/// A file registered on a record.
///
/// Only the attributes needed for manifest generation are kept; the file
/// content itself lives in an external object store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileEntry {
    /// File key, unique within the record (e.g. "scan-001.png")
    pub key: String,

    /// Pixel width, 0 if unknown
    #[serde(default)]
    pub width: u32,

    /// Pixel height, 0 if unknown
    #[serde(default)]
    pub height: u32,
}

impl FileEntry {
    /// Whether this file should appear as a canvas in IIIF manifests.
    pub fn is_image(&self) -> bool {
        let key = self.key.to_lowercase();
        IMAGE_EXTENSIONS.iter().any(|ext| key.ends_with(ext))
    }
}

/// A bibliographic record.
///
/// The same shape backs both drafts and published records; `published`
/// distinguishes them. Every mutation bumps `revision_id`, which callers may
/// pass back via `If-Match` for optimistic concurrency.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Record {
    /// Persistent identifier value of the record
    pub id: String,

    /// Descriptive metadata
    pub metadata: Metadata,

    /// Visibility
    pub access: AccessLevel,

    /// Registered files
    #[serde(default)]
    pub files: Vec<FileEntry>,

    /// User that created the record
    pub owner: String,

    /// Monotonic revision counter
    pub revision_id: u64,

    /// Whether this is the published version
    pub published: bool,
}

impl Record {
    /// Create a new draft with a freshly minted identifier.
    pub fn new_draft(owner: impl Into<String>, metadata: Metadata, access: AccessLevel) -> Self {
        Self {
            id: Uuid::new_v4().simple().to_string(),
            metadata,
            access,
            files: Vec::new(),
            owner: owner.into(),
            revision_id: 1,
            published: false,
        }
    }

    /// Bump the revision counter after a mutation.
    pub fn bump_revision(&mut self) {
        self.revision_id += 1;
    }

    /// Files that are rendered onto IIIF canvases.
    pub fn image_files(&self) -> impl Iterator<Item = &FileEntry> {
        self.files.iter().filter(|f| f.is_image())
    }
}
