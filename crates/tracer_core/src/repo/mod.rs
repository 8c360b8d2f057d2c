//! Read-only repository layer over the canvas/curation store.
//!
//! # Responsibility
//! - Define the lookup contracts needed to trace a canvas.
//! - Isolate SQLite query details from the tracing pipeline.
//!
//! # Invariants
//! - Repositories never mutate stored curation data.
//! - Rows that cannot be decoded surface as `RepoError::InvalidData`
//!   instead of being masked.

pub mod canvas_repo;
