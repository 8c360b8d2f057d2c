//! Typed IIIF curation document returned by a trace.
//!
//! # Responsibility
//! - Describe the exact nesting `Curation -> Selection -> CanvasMember ->
//!   MetadataEntry -> Annotation`.
//! - Fix JSON key order through field declaration order.
//!
//! # Invariants
//! - Every record is built once per response and moved into its parent.
//! - Constant labels and types are not configurable.

use serde::Serialize;
use serde_json::{Map, Value};

pub const IIIF_PRESENTATION_CONTEXT: &str = "http://iiif.io/api/presentation/2/context.json";
pub const CODH_CURATION_CONTEXT: &str = "http://codh.rois.ac.jp/iiif/curation/1/context.json";

/// Top-level curation wrapping a single selection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CurationDocument {
    #[serde(rename = "@context")]
    pub context: [&'static str; 2],
    #[serde(rename = "@type")]
    pub kind: &'static str,
    #[serde(rename = "@id")]
    pub id: String,
    #[serde(rename = "viewingHint")]
    pub viewing_hint: &'static str,
    pub label: String,
    pub selections: Vec<Selection>,
}

impl CurationDocument {
    pub fn new(id: String, canvas_uri: &str, selection: Selection) -> Self {
        Self {
            context: [IIIF_PRESENTATION_CONTEXT, CODH_CURATION_CONTEXT],
            kind: "cr:Curation",
            id,
            viewing_hint: "annotation",
            label: format!("Tracing Curations for {canvas_uri}"),
            selections: vec![selection],
        }
    }

    /// Total number of annotations across all members.
    pub fn annotation_count(&self) -> usize {
        self.selections
            .iter()
            .flat_map(|selection| &selection.members)
            .map(|member| member.metadata.len())
            .sum()
    }
}

/// Temporary range holding the traced canvas.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Selection {
    #[serde(rename = "@id")]
    pub id: String,
    #[serde(rename = "@type")]
    pub kind: &'static str,
    pub label: &'static str,
    pub members: Vec<CanvasMember>,
    pub within: ManifestRef,
}

impl Selection {
    pub fn new(id: String, member: CanvasMember, within: ManifestRef) -> Self {
        Self {
            id,
            kind: "sc:Range",
            label: "Temporary range for displaying a canvas",
            members: vec![member],
            within,
        }
    }
}

/// Back-reference to the manifest containing the traced canvas.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ManifestRef {
    #[serde(rename = "@id")]
    pub id: String,
    #[serde(rename = "@type")]
    pub kind: &'static str,
    pub label: &'static str,
}

impl ManifestRef {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind: "sc:Manifest",
            label: "Temporary manifest for displaying a canvas",
        }
    }
}

/// The traced canvas with one metadata entry per backlink rectangle.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CanvasMember {
    #[serde(rename = "@id")]
    pub id: String,
    #[serde(rename = "@type")]
    pub kind: &'static str,
    pub label: &'static str,
    pub metadata: Vec<MetadataEntry>,
}

impl CanvasMember {
    pub fn new(id: impl Into<String>, metadata: Vec<MetadataEntry>) -> Self {
        Self {
            id: id.into(),
            kind: "sc:Canvas",
            label: "Temporary canvas for displaying annotations",
            metadata,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetadataEntry {
    pub label: &'static str,
    pub value: Vec<Annotation>,
}

impl MetadataEntry {
    pub fn wrapping(annotation: Annotation) -> Self {
        Self {
            label: "Annotation",
            value: vec![annotation],
        }
    }
}

/// Painting annotation targeting one rectangle of the canvas.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Annotation {
    #[serde(rename = "@id")]
    pub id: String,
    #[serde(rename = "@type")]
    pub kind: &'static str,
    pub motivation: &'static str,
    pub on: String,
    pub resource: AnnotationBody,
}

impl Annotation {
    pub fn new(id: String, on: String, resource: AnnotationBody) -> Self {
        Self {
            id,
            kind: "oa:Annotation",
            motivation: "sc:painting",
            on,
            resource,
        }
    }
}

/// HTML body listing backlinks plus the configured marker styling.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnnotationBody {
    #[serde(rename = "@type")]
    pub kind: &'static str,
    pub format: &'static str,
    pub chars: String,
    pub marker: Map<String, Value>,
}

impl AnnotationBody {
    pub fn html(chars: String, marker: Map<String, Value>) -> Self {
        Self {
            kind: "cnt:ContentAsText",
            format: "text/html",
            chars,
            marker,
        }
    }
}
