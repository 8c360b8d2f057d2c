//! Scalar SQL functions backing geometric region filters.

use crate::model::geometry::{Polygon, Rect};
use rusqlite::functions::{Context, FunctionFlags};
use rusqlite::Connection;

/// `area_within(area, x, y, w, h)`: 1 when the GeoJSON polygon `area` lies
/// fully inside the rectangle, else 0. Undecodable areas raise an error.
pub const AREA_WITHIN_FN: &str = "area_within";

pub(super) fn register_geometry_functions(conn: &Connection) -> rusqlite::Result<()> {
    conn.create_scalar_function(
        AREA_WITHIN_FN,
        5,
        FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
        area_within,
    )
}

fn area_within(ctx: &Context<'_>) -> rusqlite::Result<bool> {
    let area = ctx.get::<String>(0)?;
    let rect = Rect::new(
        ctx.get::<i64>(1)?,
        ctx.get::<i64>(2)?,
        ctx.get::<i64>(3)?,
        ctx.get::<i64>(4)?,
    );
    let polygon = Polygon::from_geojson(&area)
        .map_err(|err| rusqlite::Error::UserFunctionError(err.into()))?;
    Ok(polygon.is_within(&rect))
}
