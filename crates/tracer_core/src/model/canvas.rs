//! Stored canvas and curation region records.
//!
//! # Invariants
//! - Records mirror rows of the store and are never written by the
//!   request path.

use crate::model::geometry::Polygon;

/// Internal store key of a canvas row.
pub type CanvasKey = i64;

/// One `canvases` row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanvasRecord {
    /// Internal key referenced by curation elements.
    pub id: CanvasKey,
    /// External canvas URI.
    pub jsonld_id: String,
    /// URI of the manifest that contains this canvas.
    pub manifest_jsonld_id: String,
}

/// One annotated area on a canvas together with its owning curation.
#[derive(Debug, Clone, PartialEq)]
pub struct CurationRegion {
    pub curation_uri: String,
    pub area: Polygon,
}
