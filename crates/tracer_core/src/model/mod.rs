//! Domain model for canvas tracing.
//!
//! # Responsibility
//! - Define stored records read from the canvas/curation store.
//! - Define pixel geometry (query rectangles, region polygons).
//! - Define the typed output document returned to trace callers.
//!
//! # Invariants
//! - Stored records are read-only from the request path.
//! - Document records serialize in field declaration order.

pub mod canvas;
pub mod document;
pub mod geometry;
