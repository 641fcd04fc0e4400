//! Geographic coordinates and the textual shape encoding stored in remote rows.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// A (longitude, latitude) pair in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct LngLat {
    pub lng: f64,
    pub lat: f64,
}

impl LngLat {
    /// The zero coordinate, used as the "no position" value for drafts.
    pub const ZERO: LngLat = LngLat { lng: 0.0, lat: 0.0 };

    pub const fn new(lng: f64, lat: f64) -> Self {
        Self { lng, lat }
    }
}

/// Axis-aligned geographic bounding box declared by a map project.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub north: f64,
    pub east: f64,
    pub south: f64,
    pub west: f64,
}

impl Bounds {
    /// South-west corner.
    pub fn south_west(&self) -> LngLat {
        LngLat::new(self.west, self.south)
    }

    /// North-east corner.
    pub fn north_east(&self) -> LngLat {
        LngLat::new(self.east, self.north)
    }
}

/// Shape parse errors.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ShapeParseError {
    #[error("Unknown geometry type: {0}")]
    UnknownType(String),
    #[error("Missing parentheses in {0}")]
    MissingParens(String),
    #[error("Invalid coordinate: {0}")]
    InvalidCoordinate(String),
    #[error("Geometry has no coordinates")]
    Empty,
}

/// A committed geometry value, encoded as `POINT(x y)` or `LINESTRING(x1 y1,x2 y2,...)`.
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Point(LngLat),
    LineString(Vec<LngLat>),
}

impl Shape {
    /// Number of coordinates in the shape.
    pub fn len(&self) -> usize {
        match self {
            Shape::Point(_) => 1,
            Shape::LineString(coords) => coords.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn write_coord(f: &mut fmt::Formatter<'_>, coord: &LngLat) -> fmt::Result {
    write!(f, "{} {}", coord.lng, coord.lat)
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Shape::Point(coord) => {
                f.write_str("POINT(")?;
                write_coord(f, coord)?;
                f.write_str(")")
            }
            Shape::LineString(coords) => {
                f.write_str("LINESTRING(")?;
                for (i, coord) in coords.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write_coord(f, coord)?;
                }
                f.write_str(")")
            }
        }
    }
}

fn parse_coord(text: &str) -> Result<LngLat, ShapeParseError> {
    let mut parts = text.split_whitespace();
    let (Some(x), Some(y), None) = (parts.next(), parts.next(), parts.next()) else {
        return Err(ShapeParseError::InvalidCoordinate(text.trim().to_string()));
    };
    let lng = x
        .parse::<f64>()
        .map_err(|_| ShapeParseError::InvalidCoordinate(text.trim().to_string()))?;
    let lat = y
        .parse::<f64>()
        .map_err(|_| ShapeParseError::InvalidCoordinate(text.trim().to_string()))?;
    Ok(LngLat::new(lng, lat))
}

impl FromStr for Shape {
    type Err = ShapeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let open = s
            .find('(')
            .ok_or_else(|| ShapeParseError::MissingParens(s.to_string()))?;
        if !s.ends_with(')') {
            return Err(ShapeParseError::MissingParens(s.to_string()));
        }
        let kind = s[..open].trim().to_ascii_uppercase();
        let body = s[open + 1..s.len() - 1].trim();
        if body.is_empty() {
            return Err(ShapeParseError::Empty);
        }

        match kind.as_str() {
            "POINT" => Ok(Shape::Point(parse_coord(body)?)),
            "LINESTRING" => {
                let coords = body
                    .split(',')
                    .map(parse_coord)
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Shape::LineString(coords))
            }
            _ => Err(ShapeParseError::UnknownType(kind)),
        }
    }
}
