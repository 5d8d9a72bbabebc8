//! Domain entities for the record API.
//!
//! These are plain data types shared between the store, the services and the
//! HTTP layer:
//!
//! - [`Record`] - a bibliographic record or draft with metadata and files
//! - [`ReviewRequest`] - a request to publish a draft
//! - [`Pid`] - a persistent-identifier reservation for one (record, scheme)
//! - [`SecretLink`] - a capability token granting scoped access to a record

pub mod link;
pub mod pid;
pub mod record;
pub mod review;

pub use link::{LinkPermission, SecretLink};
pub use pid::{Pid, PidStatus};
pub use record::{AccessLevel, FileEntry, Metadata, Record};
pub use review::{ReviewRequest, ReviewState};
