//! Core of the curation tracer.
//! Resolves a canvas query against the curation store and assembles the
//! backlink curation document.

pub mod config;
pub mod context;
pub mod db;
pub mod logging;
pub mod model;
pub mod refresh;
pub mod repo;
pub mod service;

pub use config::{ConfigError, TracerConfig};
pub use context::AppContext;
pub use logging::{default_log_level, init_logging, logging_status, LogTarget};
pub use model::canvas::{CanvasKey, CanvasRecord, CurationRegion};
pub use model::document::CurationDocument;
pub use model::geometry::{NormalizedRect, Point, Polygon, Rect, RectParseError};
pub use refresh::{CommandRefresher, RefreshError, StoreRefresher, DB_PATH_ENV};
pub use repo::canvas_repo::{CanvasRepository, RepoError, RepoResult, SqliteCanvasRepository};
pub use service::backlink_aggregator::{aggregate_backlinks, BacklinkGroup};
pub use service::document_builder::{build_document, DocumentInput, DocumentSettings};
pub use service::identifier::QueryTokenGenerator;
pub use service::trace_service::{TraceError, TraceRequest, TraceResult, TraceService};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
