use axum::body::Body;
use http::{Request, StatusCode};
use http_body_util::BodyExt;
use rusqlite::params;
use serde_json::Value as JsonValue;
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;
use tracer_core::db::open_db;
use tracer_core::{AppContext, Rect, TracerConfig};
use tracer_server::build_router;

const CANVAS: &str = "http://example.org/iiif/canvas/1";
const CANVAS_ENCODED: &str = "http%3A%2F%2Fexample.org%2Fiiif%2Fcanvas%2F1";
const MANIFEST: &str = "http://example.org/iiif/manifest";

fn seeded_context() -> (TempDir, Arc<AppContext>) {
    let tmp = tempfile::tempdir().expect("tempdir");
    let db_path = tmp.path().join("tracer.sqlite3");

    let conn = open_db(&db_path).expect("open store");
    conn.execute(
        "INSERT INTO canvases (jsonld_id, manifest_jsonld_id) VALUES (?1, ?2);",
        params![CANVAS, MANIFEST],
    )
    .unwrap();
    let canvas_id = conn.last_insert_rowid();
    for (uri, rect) in [
        ("http://c/A", Rect::new(10, 20, 30, 40)),
        ("http://c/B", Rect::new(10, 20, 30, 40)),
        ("http://c/far", Rect::new(500, 500, 10, 10)),
    ] {
        conn.execute(
            "INSERT OR IGNORE INTO curations (jsonld_id) VALUES (?1);",
            params![uri],
        )
        .unwrap();
        conn.execute(
            "INSERT INTO curation_elements (curation_id, canvas_id, area)
             SELECT id, ?2, ?3 FROM curations WHERE jsonld_id = ?1;",
            params![uri, canvas_id, rect.to_ring().to_geojson()],
        )
        .unwrap();
    }
    drop(conn);

    let mut config = TracerConfig::with_db_path(&db_path);
    config.curation_link_prefix = "http://viewer.test/?curation=".to_string();
    let context = Arc::new(AppContext::new(&config));
    (tmp, context)
}

async fn get(context: Arc<AppContext>, uri: &str) -> (StatusCode, JsonValue) {
    let resp = build_router(context)
        .oneshot(
            Request::builder()
                .method("GET")
                .uri(uri)
                .header("host", "tracer.test")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    let status = resp.status();
    let bytes = resp
        .into_body()
        .collect()
        .await
        .expect("collect body")
        .to_bytes();
    let json: JsonValue = serde_json::from_slice(&bytes).expect("valid JSON response");
    (status, json)
}

#[tokio::test]
async fn health_check_ok() {
    let (_tmp, context) = seeded_context();
    let (status, json) = get(context, "/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ok");
}

#[tokio::test]
async fn trace_whole_canvas_returns_document() {
    let (_tmp, context) = seeded_context();
    let (status, json) = get(context, &format!("/?canvas={CANVAS_ENCODED}")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["@type"], "cr:Curation");
    assert_eq!(json["@id"], format!("http://tracer.test/?canvas={CANVAS_ENCODED}"));

    let metadata = json["selections"][0]["members"][0]["metadata"]
        .as_array()
        .unwrap();
    assert_eq!(metadata.len(), 2);
    assert_eq!(
        metadata[0]["value"][0]["resource"]["chars"],
        "<a href=\"http://viewer.test/?curation=http://c/A\">Curation 1</a>,<br>\
         <a href=\"http://viewer.test/?curation=http://c/B\">Curation 2</a>"
    );
    assert!(json["selections"][0]["@id"]
        .as_str()
        .unwrap()
        .starts_with("http://tracer.test/trace/"));
}

#[tokio::test]
async fn trace_with_area_filters_regions() {
    let (_tmp, context) = seeded_context();
    let (status, json) = get(context, &format!("/?canvas={CANVAS_ENCODED}&xywh=0,0,100,100")).await;

    assert_eq!(status, StatusCode::OK);
    let metadata = json["selections"][0]["members"][0]["metadata"]
        .as_array()
        .unwrap();
    assert_eq!(metadata.len(), 1);
    assert_eq!(
        metadata[0]["value"][0]["on"],
        format!("{CANVAS}#xywh=10,20,30,40")
    );
}

#[tokio::test]
async fn double_encoded_canvas_is_resolved() {
    let (_tmp, context) = seeded_context();
    let twice = CANVAS_ENCODED.replace('%', "%25");
    let (status, _json) = get(context, &format!("/?canvas={twice}")).await;

    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn missing_canvas_is_bad_request() {
    let (_tmp, context) = seeded_context();
    let (status, json) = get(context, "/?xywh=0,0,1,1").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["status"], 400);
}

#[tokio::test]
async fn malformed_area_is_bad_request() {
    let (_tmp, context) = seeded_context();
    let (status, _json) = get(context, &format!("/?canvas={CANVAS_ENCODED}&xywh=1,2,3")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn unknown_canvas_is_not_found() {
    let (_tmp, context) = seeded_context();
    let (status, json) = get(context, "/?canvas=http%3A%2F%2Fnowhere%2Fcanvas").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(json["error"].as_str().unwrap().contains("http://nowhere/canvas"));
}

#[tokio::test]
async fn rectangle_past_pixel_range_is_bad_request() {
    let (_tmp, context) = seeded_context();
    let (status, json) = get(
        context,
        &format!("/?canvas={CANVAS_ENCODED}&xywh=9223372036854775807,0,1,1"),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["status"], 400);
}

#[tokio::test]
async fn undecodable_stored_area_is_internal_error_without_details() {
    let (_tmp, context) = seeded_context();
    {
        let conn = open_db(context.db_path()).expect("open store");
        conn.execute(
            "INSERT INTO curation_elements (curation_id, canvas_id, area)
             SELECT cu.id, ca.id, 'not json'
             FROM curations cu, canvases ca
             WHERE cu.jsonld_id = 'http://c/A' AND ca.jsonld_id = ?1;",
            params![CANVAS],
        )
        .unwrap();
    }

    for uri in [
        format!("/?canvas={CANVAS_ENCODED}"),
        format!("/?canvas={CANVAS_ENCODED}&xywh=0,0,100,100"),
    ] {
        let (status, json) = get(Arc::clone(&context), &uri).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR, "{uri}");
        assert_eq!(json["status"], 500);
        assert_eq!(json["error"], "internal server error");
    }
}

#[tokio::test]
async fn missing_store_is_internal_error_and_stays_missing() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let db_path = tmp.path().join("absent.sqlite3");
    let context = Arc::new(AppContext::new(&TracerConfig::with_db_path(&db_path)));

    let (status, json) = get(context, &format!("/?canvas={CANVAS_ENCODED}")).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["error"], "internal server error");
    assert!(!db_path.exists());
}
