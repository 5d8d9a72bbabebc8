//! # Bibrec
//!
//! A REST server for managing bibliographic records and their digitized files.
//!
//! This library provides the resource layer of a record-management service:
//! draft and record lifecycle, review requests, persistent identifier (PID)
//! reservation, secret capability links and IIIF Presentation manifests for
//! records carrying image files.
//!
//! ## Features
//!
//! - **Draft lifecycle**: create, update, publish and discard record drafts
//! - **Review workflow**: attach a review request to a draft and submit it
//! - **PID reservation**: reserve and discard persistent identifiers per scheme
//! - **Secret links**: HMAC-derived capability tokens granting scoped access
//! - **IIIF manifests**: Presentation v2 JSON-LD documents for image files
//! - **Authentication**: HMAC-SHA256 bearer API tokens
//!
//! ## Architecture
//!
//! The library is organized into several modules:
//!
//! - [`model`] - Record, review, PID and secret-link types
//! - [`store`] - Storage trait and the in-memory backend
//! - [`service`] - State-transition rules and access checks
//! - [`iiif`] - IIIF Presentation v2 manifest serialization
//! - [`server`] - Axum-based HTTP server and routes
//! - [`config`] - CLI and configuration types
//!
//! ## Example
//!
//! ```rust,no_run
//! use bibrec::server::{create_router, RouterConfig};
//! use bibrec::service::RecordService;
//! use bibrec::store::MemoryStore;
//!
//! #[tokio::main]
//! async fn main() {
//!     let service = RecordService::new(MemoryStore::new(), "link-secret");
//!     let config = RouterConfig::new("api-secret")
//!         .with_base_url("https://records.example.org");
//!     let router = create_router(service, config);
//!
//!     // Start the server...
//! }
//! ```

pub mod config;
pub mod error;
pub mod iiif;
pub mod model;
pub mod server;
pub mod service;
pub mod store;

// Re-export commonly used types
pub use config::{Cli, Command, ServeConfig, TokenConfig, TokenOutputFormat};
pub use error::{ServiceError, StoreError};
pub use iiif::{manifest_for_record, Manifest, MANIFEST_CONTENT_TYPE};
pub use model::{
    AccessLevel, FileEntry, LinkPermission, Metadata, Pid, PidStatus, Record, ReviewRequest,
    ReviewState, SecretLink,
};
pub use server::{
    create_dev_router, create_production_router, create_router, ApiTokenAuth, AppState, AuthError,
    ErrorResponse, HealthResponse, LinkListResponse, RouterConfig,
};
pub use service::{
    Accessor, CreateLinkPayload, DraftPayload, Identity, PidService, RecordService, ReviewPayload,
    ReviewService, SecretLinkService, SubmitPayload, UpdateLinkPayload,
};
pub use store::{MemoryStore, RecordStore};
