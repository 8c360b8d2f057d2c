//! Canvas resolution and region matching.
//!
//! # Responsibility
//! - Resolve an external canvas URI to exactly one stored canvas.
//! - Fetch the curation regions on that canvas, limited to a query rectangle
//!   when one is given.
//!
//! # Invariants
//! - Duplicate canvas rows never fail a request; the lowest key wins.
//! - Region order is the repository's order.

use crate::model::canvas::{CanvasRecord, CurationRegion};
use crate::model::geometry::Rect;
use crate::repo::canvas_repo::CanvasRepository;
use crate::service::trace_service::{TraceError, TraceResult};
use log::{debug, warn};

/// Resolves `canvas_uri` to its stored canvas row.
///
/// # Errors
/// - `TraceError::CanvasNotFound` when no row is registered.
/// - `TraceError::Repo` on store failure.
pub fn resolve_canvas<R: CanvasRepository>(
    repo: &R,
    canvas_uri: &str,
) -> TraceResult<CanvasRecord> {
    let mut canvases = repo.find_canvases(canvas_uri)?.into_iter();
    let Some(first) = canvases.next() else {
        return Err(TraceError::CanvasNotFound(canvas_uri.to_string()));
    };

    let ignored = canvases.map(|canvas| canvas.id).collect::<Vec<_>>();
    if !ignored.is_empty() {
        warn!(
            "event=canvas_lookup module=matcher status=anomaly reason=duplicate_canvas canvas={} used_id={} ignored_ids={:?}",
            canvas_uri, first.id, ignored
        );
    }

    Ok(first)
}

/// Lists regions on `canvas`, keeping only those fully inside `area`.
pub fn match_regions<R: CanvasRepository>(
    repo: &R,
    canvas: &CanvasRecord,
    area: Option<&Rect>,
) -> TraceResult<Vec<CurationRegion>> {
    let regions = repo.list_regions(canvas.id, area)?;
    debug!(
        "event=region_match module=matcher status=ok canvas_id={} filtered={} regions={}",
        canvas.id,
        area.is_some(),
        regions.len()
    );
    Ok(regions)
}
