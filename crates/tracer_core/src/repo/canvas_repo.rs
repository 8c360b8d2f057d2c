//! Canvas and curation-region lookups.
//!
//! # Responsibility
//! - Resolve external canvas URIs to stored canvas rows.
//! - List curation regions on a canvas, optionally limited to a rectangle.
//!
//! # Invariants
//! - Region rows come back in store order (`curation_elements.id ASC`).
//! - Rectangle filtering is containment, evaluated by `area_within`.

use crate::db::DbError;
use crate::model::canvas::{CanvasKey, CanvasRecord, CurationRegion};
use crate::model::geometry::{Polygon, Rect};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};

const CANVAS_SELECT_SQL: &str = "SELECT
    id,
    jsonld_id,
    manifest_jsonld_id
FROM canvases
WHERE jsonld_id = ?1
ORDER BY id ASC";

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for store reads.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted store data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::InvalidData(_) => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Read contract used by the tracing pipeline.
pub trait CanvasRepository {
    /// Returns every canvas row registered under `jsonld_id`, lowest key first.
    ///
    /// More than one row is a data anomaly the caller resolves.
    fn find_canvases(&self, jsonld_id: &str) -> RepoResult<Vec<CanvasRecord>>;

    /// Lists regions on `canvas_id`; with `within`, only regions fully inside it.
    fn list_regions(
        &self,
        canvas_id: CanvasKey,
        within: Option<&Rect>,
    ) -> RepoResult<Vec<CurationRegion>>;
}

/// SQLite-backed canvas repository.
pub struct SqliteCanvasRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteCanvasRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl CanvasRepository for SqliteCanvasRepository<'_> {
    fn find_canvases(&self, jsonld_id: &str) -> RepoResult<Vec<CanvasRecord>> {
        let mut stmt = self.conn.prepare(CANVAS_SELECT_SQL)?;
        let mut rows = stmt.query(params![jsonld_id])?;
        let mut canvases = Vec::new();

        while let Some(row) = rows.next()? {
            canvases.push(CanvasRecord {
                id: row.get("id")?,
                jsonld_id: row.get("jsonld_id")?,
                manifest_jsonld_id: row.get("manifest_jsonld_id")?,
            });
        }

        Ok(canvases)
    }

    fn list_regions(
        &self,
        canvas_id: CanvasKey,
        within: Option<&Rect>,
    ) -> RepoResult<Vec<CurationRegion>> {
        let mut filter = String::from("canvas_id = ?");
        let mut bind_values: Vec<Value> = vec![Value::Integer(canvas_id)];

        if let Some(rect) = within {
            filter.push_str(" AND area_within(area, ?, ?, ?, ?)");
            bind_values.extend([rect.x, rect.y, rect.w, rect.h].map(Value::Integer));
        }

        let sql = format!(
            "SELECT curations.jsonld_id AS uri, cue.area AS area
             FROM curations
             JOIN (
                SELECT id, curation_id, area
                FROM curation_elements
                WHERE {filter}
             ) AS cue ON curations.id = cue.curation_id
             ORDER BY cue.id ASC;"
        );

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut regions = Vec::new();

        while let Some(row) = rows.next()? {
            regions.push(parse_region_row(row)?);
        }

        Ok(regions)
    }
}

fn parse_region_row(row: &Row<'_>) -> RepoResult<CurationRegion> {
    let curation_uri: String = row.get("uri")?;
    let area_text: String = row.get("area")?;
    let area = Polygon::from_geojson(&area_text).map_err(|err| {
        RepoError::InvalidData(format!(
            "undecodable area for curation `{curation_uri}` in curation_elements.area: {err}"
        ))
    })?;

    Ok(CurationRegion { curation_uri, area })
}
