//! Pixel geometry for canvas regions.
//!
//! # Responsibility
//! - Parse `xywh` query rectangles.
//! - Decode stored GeoJSON polygons and test containment against a rectangle.
//! - Normalize a closed rectangular ring back into its `x,y,w,h` key.
//!
//! # Invariants
//! - A rectangle ring has exactly 5 points and is closed (first == last).
//! - Normalization reads the ring as (x,y) -> (x+w,y) -> (x+w,y+h) -> ...;
//!   rings wound differently produce a wrong width/height, not an error.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Point count of a closed axis-aligned rectangle ring.
pub const RECT_RING_POINTS: usize = 5;

/// Errors raised when a query rectangle cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RectParseError {
    /// Input does not split into exactly four comma-separated parts.
    WrongArity { input: String, parts: usize },
    /// One component is not an integer.
    NotAnInteger { input: String, component: String },
    /// One component is negative.
    Negative { input: String, component: String },
    /// `x + w` or `y + h` does not fit in an `i64`.
    OutOfRange { input: String },
}

impl Display for RectParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::WrongArity { input, parts } => write!(
                f,
                "xywh `{input}` must have 4 comma-separated integers, found {parts}"
            ),
            Self::NotAnInteger { input, component } => {
                write!(f, "xywh `{input}` has non-integer component `{component}`")
            }
            Self::Negative { input, component } => {
                write!(f, "xywh `{input}` has negative component `{component}`")
            }
            Self::OutOfRange { input } => {
                write!(f, "xywh `{input}` extends past the largest pixel coordinate")
            }
        }
    }
}

impl Error for RectParseError {}

/// Errors raised when a stored area cannot be decoded as a polygon.
#[derive(Debug)]
pub enum AreaDecodeError {
    Json(serde_json::Error),
    NotAPolygon(String),
    EmptyRing,
}

impl Display for AreaDecodeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Json(err) => write!(f, "area is not valid GeoJSON: {err}"),
            Self::NotAPolygon(kind) => write!(f, "area geometry `{kind}` is not a Polygon"),
            Self::EmptyRing => write!(f, "area polygon has no exterior ring"),
        }
    }
}

impl Error for AreaDecodeError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Json(err) => Some(err),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for AreaDecodeError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

/// Axis-aligned query rectangle in canvas pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub x: i64,
    pub y: i64,
    pub w: i64,
    pub h: i64,
}

impl Rect {
    pub fn new(x: i64, y: i64, w: i64, h: i64) -> Self {
        Self { x, y, w, h }
    }

    /// Parses `x,y,w,h` into a rectangle of four non-negative integers.
    ///
    /// Surrounding whitespace around each component is ignored.
    pub fn parse_xywh(input: &str) -> Result<Self, RectParseError> {
        let parts = input.split(',').collect::<Vec<_>>();
        if parts.len() != 4 {
            return Err(RectParseError::WrongArity {
                input: input.to_string(),
                parts: parts.len(),
            });
        }

        let mut values = [0_i64; 4];
        for (slot, raw) in values.iter_mut().zip(parts) {
            let component = raw.trim();
            let value = component
                .parse::<i64>()
                .map_err(|_| RectParseError::NotAnInteger {
                    input: input.to_string(),
                    component: component.to_string(),
                })?;
            if value < 0 {
                return Err(RectParseError::Negative {
                    input: input.to_string(),
                    component: component.to_string(),
                });
            }
            *slot = value;
        }

        let [x, y, w, h] = values;
        if x.checked_add(w).is_none() || y.checked_add(h).is_none() {
            return Err(RectParseError::OutOfRange {
                input: input.to_string(),
            });
        }
        Ok(Self::new(x, y, w, h))
    }

    // Far edges in f64 so rectangles handed in from SQL never overflow.
    fn edges(&self) -> (f64, f64, f64, f64) {
        let (x0, y0) = (self.x as f64, self.y as f64);
        (x0, y0, x0 + self.w as f64, y0 + self.h as f64)
    }

    /// Builds the closed 5-point ring of this rectangle.
    pub fn to_ring(&self) -> Polygon {
        let (x0, y0, x1, y1) = self.edges();
        Polygon::new(vec![
            Point::new(x0, y0),
            Point::new(x1, y0),
            Point::new(x1, y1),
            Point::new(x0, y1),
            Point::new(x0, y0),
        ])
    }

    fn contains_point(&self, point: &Point) -> bool {
        let (x0, y0, x1, y1) = self.edges();
        point.x >= x0 && point.x <= x1 && point.y >= y0 && point.y <= y1
    }
}

/// One polygon vertex.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Exterior ring of a stored region.
#[derive(Debug, Clone, PartialEq)]
pub struct Polygon {
    points: Vec<Point>,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeoJsonPolygon {
    #[serde(rename = "type")]
    kind: String,
    coordinates: Vec<Vec<[f64; 2]>>,
}

impl Polygon {
    pub fn new(points: Vec<Point>) -> Self {
        Self { points }
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// Decodes a GeoJSON `Polygon` and keeps its exterior ring.
    pub fn from_geojson(text: &str) -> Result<Self, AreaDecodeError> {
        let decoded: GeoJsonPolygon = serde_json::from_str(text)?;
        if decoded.kind != "Polygon" {
            return Err(AreaDecodeError::NotAPolygon(decoded.kind));
        }
        let exterior = decoded
            .coordinates
            .into_iter()
            .next()
            .ok_or(AreaDecodeError::EmptyRing)?;
        Ok(Self::new(
            exterior
                .into_iter()
                .map(|[x, y]| Point::new(x, y))
                .collect(),
        ))
    }

    /// Encodes this ring as a GeoJSON `Polygon` with a single exterior ring.
    pub fn to_geojson(&self) -> String {
        let encoded = GeoJsonPolygon {
            kind: "Polygon".to_string(),
            coordinates: vec![self.points.iter().map(|p| [p.x, p.y]).collect()],
        };
        serde_json::to_string(&encoded).unwrap_or_default()
    }

    /// Returns whether every vertex lies inside `rect` (edges included).
    ///
    /// The container is convex, so vertex containment implies the whole
    /// polygon is contained. A polygon that only partly overlaps is rejected.
    pub fn is_within(&self, rect: &Rect) -> bool {
        !self.points.is_empty() && self.points.iter().all(|p| rect.contains_point(p))
    }

    /// Derives the normalized rectangle of a 5-point ring.
    ///
    /// Returns `None` when the ring does not have exactly 5 points.
    pub fn bounding_rect(&self) -> Option<NormalizedRect> {
        let [p1, p2, p3, _, _] = self.points.as_slice() else {
            return None;
        };
        Some(NormalizedRect {
            x: p1.x,
            y: p1.y,
            w: p2.x - p1.x,
            h: p3.y - p1.y,
        })
    }
}

/// Rectangle recovered from a stored ring; used as the grouping key.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NormalizedRect {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl NormalizedRect {
    /// Canonical `x,y,w,h` string used as group key and fragment selector.
    pub fn key(&self) -> String {
        self.to_string()
    }
}

impl Display for NormalizedRect {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{},{},{},{}",
            format_coord(self.x),
            format_coord(self.y),
            format_coord(self.w),
            format_coord(self.h)
        )
    }
}

// Integral values print without a fractional part: 10.0 -> "10".
fn format_coord(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 9.0e15 {
        format!("{}", value as i64)
    } else {
        format!("{value}")
    }
}

#[cfg(test)]
mod tests {
    use super::{Point, Polygon, Rect, RectParseError};

    #[test]
    fn rect_ring_normalizes_back_to_same_key() {
        let ring = Rect::new(10, 20, 30, 40).to_ring();
        assert_eq!(ring.points().len(), 5);
        assert_eq!(ring.points()[0], ring.points()[4]);

        let key = ring.bounding_rect().expect("ring has 5 points").key();
        assert_eq!(key, "10,20,30,40");
    }

    #[test]
    fn parse_xywh_accepts_padded_integers() {
        let rect = Rect::parse_xywh(" 1, 2,3 ,4").expect("should parse");
        assert_eq!(rect, Rect::new(1, 2, 3, 4));
    }

    #[test]
    fn parse_xywh_rejects_malformed_input() {
        assert!(matches!(
            Rect::parse_xywh("1,2,3"),
            Err(RectParseError::WrongArity { parts: 3, .. })
        ));
        assert!(matches!(
            Rect::parse_xywh("1,2,x,4"),
            Err(RectParseError::NotAnInteger { .. })
        ));
        assert!(matches!(
            Rect::parse_xywh("1.5,2,3,4"),
            Err(RectParseError::NotAnInteger { .. })
        ));
        assert!(matches!(
            Rect::parse_xywh("1,-2,3,4"),
            Err(RectParseError::Negative { .. })
        ));
    }

    #[test]
    fn parse_xywh_rejects_edges_past_i64() {
        assert!(matches!(
            Rect::parse_xywh("9223372036854775807,0,1,1"),
            Err(RectParseError::OutOfRange { .. })
        ));
        assert!(matches!(
            Rect::parse_xywh("0,9223372036854775800,0,8"),
            Err(RectParseError::OutOfRange { .. })
        ));
        let widest = Rect::parse_xywh("0,0,9223372036854775807,9223372036854775807");
        assert!(widest.is_ok());
    }

    #[test]
    fn containment_does_not_overflow_on_huge_rect() {
        let huge = Rect::new(i64::MAX, 0, i64::MAX, 1);
        assert!(!Rect::new(0, 0, 1, 1).to_ring().is_within(&huge));

        let everything = Rect::new(0, 0, i64::MAX, i64::MAX);
        assert!(Rect::new(10, 10, 1, 1).to_ring().is_within(&everything));
    }

    #[test]
    fn containment_is_strict_not_intersection() {
        let query = Rect::new(0, 0, 100, 100);
        let inside = Rect::new(10, 10, 20, 20).to_ring();
        let touching_edge = Rect::new(0, 0, 100, 100).to_ring();
        let overlapping = Rect::new(90, 90, 20, 20).to_ring();

        assert!(inside.is_within(&query));
        assert!(touching_edge.is_within(&query));
        assert!(!overlapping.is_within(&query));
        assert!(!Polygon::new(Vec::new()).is_within(&query));
    }

    #[test]
    fn bounding_rect_rejects_unexpected_point_count() {
        let quad = Polygon::new(vec![
            Point::new(0.0, 0.0),
            Point::new(5.0, 0.0),
            Point::new(5.0, 5.0),
            Point::new(0.0, 0.0),
        ]);
        assert!(quad.bounding_rect().is_none());
    }

    #[test]
    fn geojson_roundtrip_keeps_exterior_ring() {
        let ring = Rect::new(3, 4, 5, 6).to_ring();
        let decoded = Polygon::from_geojson(&ring.to_geojson()).expect("valid geojson");
        assert_eq!(decoded, ring);
    }

    #[test]
    fn fractional_coordinates_keep_their_fraction_in_key() {
        let ring = Polygon::new(vec![
            Point::new(1.5, 2.0),
            Point::new(4.0, 2.0),
            Point::new(4.0, 6.25),
            Point::new(1.5, 6.25),
            Point::new(1.5, 2.0),
        ]);
        let key = ring.bounding_rect().expect("5 points").key();
        assert_eq!(key, "1.5,2,2.5,4.25");
    }

    #[test]
    fn non_polygon_geojson_is_rejected() {
        let err = Polygon::from_geojson(r#"{"type":"Point","coordinates":[]}"#);
        assert!(err.is_err());
    }
}
