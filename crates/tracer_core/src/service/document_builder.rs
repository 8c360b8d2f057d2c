//! Assembly of the curation document for one trace.
//!
//! # Responsibility
//! - Mint the range/annotation identifiers of one response.
//! - Render the backlink HTML body of each annotation.
//!
//! # Invariants
//! - All minted identifiers embed the same query token.
//! - Every range and annotation gets its own fresh UUID.
//! - Metadata entries and links follow group order exactly.

use crate::model::document::{
    Annotation, AnnotationBody, CanvasMember, CurationDocument, ManifestRef, MetadataEntry,
    Selection,
};
use crate::service::backlink_aggregator::BacklinkGroup;
use serde_json::{Map, Value};
use uuid::Uuid;

const LINK_SEPARATOR: &str = ",<br>";

/// Per-deployment rendering settings.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocumentSettings {
    /// Prepended to every curation URI in links; empty disables it.
    pub curation_link_prefix: String,
    /// Copied verbatim into every annotation body.
    pub marker_settings: Map<String, Value>,
}

/// Inputs of one document build.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentInput<'a> {
    pub canvas_uri: &'a str,
    pub manifest_uri: &'a str,
    /// Canonical URL of the request; becomes the curation `@id`.
    pub request_url: &'a str,
    /// Request base URL; a trailing slash is ignored.
    pub base_url: &'a str,
    /// Query token shared by every minted identifier.
    pub token: &'a str,
}

/// Builds the curation document from aggregated backlink groups.
pub fn build_document(
    input: &DocumentInput<'_>,
    groups: Vec<BacklinkGroup>,
    settings: &DocumentSettings,
) -> CurationDocument {
    let base = input.base_url.strip_suffix('/').unwrap_or(input.base_url);
    let trace_root = format!("{base}/trace/{}", input.token);

    let metadata = groups
        .into_iter()
        .map(|group| {
            let annotation = Annotation::new(
                format!("{trace_root}/annotation/{}", Uuid::new_v4()),
                format!("{}#xywh={}", input.canvas_uri, group.key),
                AnnotationBody::html(
                    render_backlinks(&group.curation_uris, &settings.curation_link_prefix),
                    settings.marker_settings.clone(),
                ),
            );
            MetadataEntry::wrapping(annotation)
        })
        .collect();

    let selection = Selection::new(
        format!("{trace_root}/range/{}", Uuid::new_v4()),
        CanvasMember::new(input.canvas_uri, metadata),
        ManifestRef::new(input.manifest_uri),
    );

    CurationDocument::new(input.request_url.to_string(), input.canvas_uri, selection)
}

/// Renders `<a href="...">Curation n</a>` links joined by `,<br>`.
pub fn render_backlinks(curation_uris: &[String], link_prefix: &str) -> String {
    curation_uris
        .iter()
        .enumerate()
        .map(|(index, uri)| {
            format!(
                "<a href=\"{link_prefix}{uri}\">Curation {}</a>",
                index + 1
            )
        })
        .collect::<Vec<_>>()
        .join(LINK_SEPARATOR)
}

#[cfg(test)]
mod tests {
    use super::{build_document, render_backlinks, DocumentInput, DocumentSettings};
    use crate::model::geometry::Rect;
    use crate::service::backlink_aggregator::BacklinkGroup;
    use serde_json::{json, Map, Value};

    fn group(rect: Rect, uris: &[&str]) -> BacklinkGroup {
        let normalized = rect.to_ring().bounding_rect().expect("5-point ring");
        BacklinkGroup {
            rect: normalized,
            key: normalized.key(),
            curation_uris: uris.iter().map(|uri| uri.to_string()).collect(),
        }
    }

    fn input() -> DocumentInput<'static> {
        DocumentInput {
            canvas_uri: "http://example.org/canvas/1",
            manifest_uri: "http://example.org/manifest",
            request_url: "http://tracer.test/?canvas=x",
            base_url: "http://tracer.test/",
            token: "abc123",
        }
    }

    #[test]
    fn backlinks_render_in_contributor_order_with_prefix() {
        let uris = vec!["A".to_string(), "B".to_string()];
        assert_eq!(
            render_backlinks(&uris, ""),
            "<a href=\"A\">Curation 1</a>,<br><a href=\"B\">Curation 2</a>"
        );
        assert_eq!(
            render_backlinks(&uris[..1], "http://viewer/?curation="),
            "<a href=\"http://viewer/?curation=A\">Curation 1</a>"
        );
    }

    #[test]
    fn document_shape_and_key_order_are_fixed() {
        let mut marker = Map::new();
        marker.insert("border-color".to_string(), json!("red"));
        marker.insert("border-width".to_string(), json!(2));
        let settings = DocumentSettings {
            curation_link_prefix: String::new(),
            marker_settings: marker,
        };

        let document = build_document(
            &input(),
            vec![group(Rect::new(10, 20, 30, 40), &["A", "B"])],
            &settings,
        );
        let value = serde_json::to_value(&document).expect("serializable");

        let top_keys = value
            .as_object()
            .expect("object")
            .keys()
            .cloned()
            .collect::<Vec<_>>();
        assert_eq!(
            top_keys,
            vec!["@context", "@type", "@id", "viewingHint", "label", "selections"]
        );

        let selection = &value["selections"][0];
        assert!(selection["@id"]
            .as_str()
            .expect("range id")
            .starts_with("http://tracer.test/trace/abc123/range/"));
        assert_eq!(selection["within"]["@id"], "http://example.org/manifest");

        let annotation = &selection["members"][0]["metadata"][0]["value"][0];
        assert!(annotation["@id"]
            .as_str()
            .expect("annotation id")
            .starts_with("http://tracer.test/trace/abc123/annotation/"));
        assert_eq!(annotation["on"], "http://example.org/canvas/1#xywh=10,20,30,40");
        assert_eq!(
            annotation["resource"]["chars"],
            "<a href=\"A\">Curation 1</a>,<br><a href=\"B\">Curation 2</a>"
        );

        let marker_keys = annotation["resource"]["marker"]
            .as_object()
            .expect("marker object")
            .keys()
            .cloned()
            .collect::<Vec<_>>();
        assert_eq!(marker_keys, vec!["border-color", "border-width"]);
    }

    #[test]
    fn each_annotation_gets_a_fresh_id() {
        let document = build_document(
            &input(),
            vec![
                group(Rect::new(0, 0, 1, 1), &["A"]),
                group(Rect::new(2, 2, 1, 1), &["B"]),
            ],
            &DocumentSettings::default(),
        );

        let metadata = &document.selections[0].members[0].metadata;
        assert_eq!(metadata.len(), 2);
        assert_ne!(metadata[0].value[0].id, metadata[1].value[0].id);
        assert_eq!(document.annotation_count(), 2);
        assert_eq!(metadata[0].value[0].resource.marker, Map::<String, Value>::new());
    }

    #[test]
    fn empty_groups_still_build_one_selection() {
        let document = build_document(&input(), Vec::new(), &DocumentSettings::default());
        assert_eq!(document.selections.len(), 1);
        assert_eq!(document.selections[0].members.len(), 1);
        assert!(document.selections[0].members[0].metadata.is_empty());
        assert_eq!(document.label, "Tracing Curations for http://example.org/canvas/1");
    }
}
