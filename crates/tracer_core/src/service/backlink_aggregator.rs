//! Grouping of matched regions by normalized rectangle.
//!
//! # Invariants
//! - Groups appear in first-seen order of their rectangle.
//! - URIs inside a group keep region order; duplicates are kept.
//! - Regions whose ring is not 5 points are skipped with a `warn` event.

use crate::model::canvas::CurationRegion;
use crate::model::geometry::{NormalizedRect, RECT_RING_POINTS};
use log::warn;
use std::collections::HashMap;

/// Curations whose regions share one normalized rectangle.
#[derive(Debug, Clone, PartialEq)]
pub struct BacklinkGroup {
    pub rect: NormalizedRect,
    /// Canonical `x,y,w,h` key of `rect`.
    pub key: String,
    pub curation_uris: Vec<String>,
}

/// Groups `regions` by rectangle key, consuming them.
pub fn aggregate_backlinks(regions: Vec<CurationRegion>) -> Vec<BacklinkGroup> {
    let mut groups: Vec<BacklinkGroup> = Vec::new();
    let mut slot_by_key: HashMap<String, usize> = HashMap::new();

    for region in regions {
        let Some(rect) = region.area.bounding_rect() else {
            warn!(
                "event=region_anomaly module=aggregator status=skipped reason=unexpected_polygon_shape curation={} points={} expected={}",
                region.curation_uri,
                region.area.points().len(),
                RECT_RING_POINTS
            );
            continue;
        };

        let key = rect.key();
        match slot_by_key.get(&key) {
            Some(&slot) => groups[slot].curation_uris.push(region.curation_uri),
            None => {
                slot_by_key.insert(key.clone(), groups.len());
                groups.push(BacklinkGroup {
                    rect,
                    key,
                    curation_uris: vec![region.curation_uri],
                });
            }
        }
    }

    groups
}
