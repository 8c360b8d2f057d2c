#![allow(dead_code)]

use rusqlite::{params, Connection};
use tracer_core::{Point, Polygon, Rect};

pub const CANVAS: &str = "http://example.org/iiif/book1/canvas/p1";
pub const MANIFEST: &str = "http://example.org/iiif/book1/manifest";

pub fn insert_canvas(conn: &Connection, uri: &str, manifest: &str) -> i64 {
    conn.execute(
        "INSERT INTO canvases (jsonld_id, manifest_jsonld_id) VALUES (?1, ?2);",
        params![uri, manifest],
    )
    .unwrap();
    conn.last_insert_rowid()
}

pub fn curation_id(conn: &Connection, uri: &str) -> i64 {
    conn.execute(
        "INSERT OR IGNORE INTO curations (jsonld_id) VALUES (?1);",
        params![uri],
    )
    .unwrap();
    conn.query_row(
        "SELECT id FROM curations WHERE jsonld_id = ?1;",
        params![uri],
        |row| row.get(0),
    )
    .unwrap()
}

pub fn insert_area(conn: &Connection, canvas_id: i64, curation_uri: &str, area: &Polygon) {
    let curation_id = curation_id(conn, curation_uri);
    conn.execute(
        "INSERT INTO curation_elements (curation_id, canvas_id, area) VALUES (?1, ?2, ?3);",
        params![curation_id, canvas_id, area.to_geojson()],
    )
    .unwrap();
}

pub fn insert_region(conn: &Connection, canvas_id: i64, curation_uri: &str, rect: Rect) {
    insert_area(conn, canvas_id, curation_uri, &rect.to_ring());
}

/// Open ring with 4 points; not a closed rectangle.
pub fn four_point_ring() -> Polygon {
    Polygon::new(vec![
        Point::new(0.0, 0.0),
        Point::new(10.0, 0.0),
        Point::new(10.0, 10.0),
        Point::new(0.0, 0.0),
    ])
}
