//! IIIF Presentation v2 manifest document types.
//!
//! Follows the Presentation API 2.1 structure: one manifest, one sequence,
//! one canvas per image file, each canvas painted by a single image
//! annotation carrying a level-1 Image API service block.

use serde::Serialize;

use crate::model::Record;

const PRESENTATION_CONTEXT: &str = "http://iiif.io/api/presentation/2/context.json";
const IMAGE_CONTEXT: &str = "http://iiif.io/api/image/2/context.json";
const IMAGE_LEVEL1_PROFILE: &str = "http://iiif.io/api/image/2/level1.json";

/// A metadata label/value pair displayed by IIIF viewers.
#[derive(Debug, Clone, Serialize)]
pub struct LabelValue {
    pub label: String,
    pub value: String,
}

/// IIIF Image API service description attached to an image resource.
#[derive(Debug, Clone, Serialize)]
pub struct ImageService {
    #[serde(rename = "@context")]
    pub context: &'static str,

    #[serde(rename = "@id")]
    pub id: String,

    pub profile: &'static str,
}

/// The image resource painted onto a canvas.
#[derive(Debug, Clone, Serialize)]
pub struct ImageResource {
    #[serde(rename = "@id")]
    pub id: String,

    #[serde(rename = "@type")]
    pub resource_type: &'static str,

    pub format: &'static str,

    pub width: u32,

    pub height: u32,

    pub service: ImageService,
}

/// A painting annotation linking an image resource to its canvas.
#[derive(Debug, Clone, Serialize)]
pub struct Annotation {
    #[serde(rename = "@type")]
    pub annotation_type: &'static str,

    pub motivation: &'static str,

    /// Canvas this annotation targets
    pub on: String,

    pub resource: ImageResource,
}

/// One canvas per image file of the record.
#[derive(Debug, Clone, Serialize)]
pub struct Canvas {
    #[serde(rename = "@id")]
    pub id: String,

    #[serde(rename = "@type")]
    pub canvas_type: &'static str,

    pub label: String,

    pub width: u32,

    pub height: u32,

    pub images: Vec<Annotation>,
}

/// The single sequence of a manifest.
#[derive(Debug, Clone, Serialize)]
pub struct Sequence {
    #[serde(rename = "@id")]
    pub id: String,

    #[serde(rename = "@type")]
    pub sequence_type: &'static str,

    pub canvases: Vec<Canvas>,
}

/// An IIIF Presentation v2 manifest document.
#[derive(Debug, Clone, Serialize)]
pub struct Manifest {
    #[serde(rename = "@context")]
    pub context: &'static str,

    #[serde(rename = "@id")]
    pub id: String,

    #[serde(rename = "@type")]
    pub manifest_type: &'static str,

    pub label: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub license: Option<String>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub metadata: Vec<LabelValue>,

    pub sequences: Vec<Sequence>,
}

/// Build the manifest for a record or draft.
///
/// `base_url` is the externally visible server root (no trailing slash).
/// Non-image files are skipped; a record without image files yields one
/// empty sequence.
pub fn manifest_for_record(record: &Record, base_url: &str, draft: bool) -> Manifest {
    let record_url = if draft {
        format!("{}/records/{}/draft", base_url, record.id)
    } else {
        format!("{}/records/{}", base_url, record.id)
    };
    let manifest_id = format!("{record_url}/manifest");

    let canvases = record
        .image_files()
        .map(|file| {
            let canvas_id = format!("{}/canvas/{}", record_url, file.key);
            let service_id = format!("{}/iiif/{}/{}", base_url, record.id, file.key);
            Canvas {
                id: canvas_id.clone(),
                canvas_type: "sc:Canvas",
                label: file.key.clone(),
                width: file.width,
                height: file.height,
                images: vec![Annotation {
                    annotation_type: "oa:Annotation",
                    motivation: "sc:painting",
                    on: canvas_id,
                    resource: ImageResource {
                        id: format!("{service_id}/full/full/0/default.jpg"),
                        resource_type: "dctypes:Image",
                        format: "image/jpeg",
                        width: file.width,
                        height: file.height,
                        service: ImageService {
                            context: IMAGE_CONTEXT,
                            id: service_id,
                            profile: IMAGE_LEVEL1_PROFILE,
                        },
                    },
                }],
            }
        })
        .collect();

    let mut metadata = Vec::new();
    if !record.metadata.creators.is_empty() {
        metadata.push(LabelValue {
            label: "Creators".to_string(),
            value: record.metadata.creators.join("; "),
        });
    }
    if let Some(date) = &record.metadata.publication_date {
        metadata.push(LabelValue {
            label: "Publication date".to_string(),
            value: date.clone(),
        });
    }

    Manifest {
        context: PRESENTATION_CONTEXT,
        id: manifest_id,
        manifest_type: "sc:Manifest",
        label: record.metadata.title.clone(),
        description: record.metadata.description.clone(),
        license: record.metadata.license.clone(),
        metadata,
        sequences: vec![Sequence {
            id: format!("{record_url}/sequence/default"),
            sequence_type: "sc:Sequence",
            canvases,
        }],
    }
}
