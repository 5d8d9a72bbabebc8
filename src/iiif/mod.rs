//! IIIF Presentation API v2 serialization.
//!
//! Maps a record's metadata and file list into a JSON-LD manifest document.
//! This is a declarative schema mapping, no image processing happens here;
//! the image service URLs point at an external IIIF Image API endpoint.

pub mod manifest;

pub use manifest::{manifest_for_record, Annotation, Canvas, Manifest, Sequence};

/// Content type of serialized manifests.
pub const MANIFEST_CONTENT_TYPE: &str = "application/ld+json";
