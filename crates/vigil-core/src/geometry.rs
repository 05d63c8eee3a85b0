//! Zone geometry: a tagged sum type with GeoJSON wire form and WKT input.
//!
//! Every containment/proximity/serialisation branch matches exhaustively on
//! the variant; there is no runtime type-tag inspection anywhere else.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::geo::{self, LonLat};

/// Radius in metres a client should use when drawing a Point zone. Display
/// only; a point has zero area and no containment semantics.
pub const POINT_RENDER_RADIUS_M: f64 = 100.0;

// ─── Errors ──────────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum GeometryError {
  #[error("unsupported geometry type: {0:?}")]
  UnsupportedType(String),

  #[error("malformed geometry: {0}")]
  Malformed(String),

  #[error("polygon ring needs at least 3 distinct vertices, got {0}")]
  RingTooSmall(usize),

  #[error("coordinates must be finite numbers")]
  NonFinite,
}

// ─── Geometry ────────────────────────────────────────────────────────────────

/// The stored shape of a zone.
///
/// A `Polygon` holds its exterior ring as an **open** vertex list (the
/// first vertex implicitly closes it), longitude first, with ≥3 distinct
/// vertices. A `Point` is a bare coordinate; it participates in proximity
/// queries but never in containment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "GeoJson", into = "GeoJson")]
pub enum Geometry {
  Polygon(Vec<LonLat>),
  Point(LonLat),
}

impl Geometry {
  /// Build a polygon from an open ring, validating the ring invariants.
  /// A trailing vertex equal to the first (closed-ring input) is dropped.
  pub fn polygon(mut ring: Vec<LonLat>) -> Result<Self, GeometryError> {
    if ring.len() > 3 && ring.first() == ring.last() {
      ring.pop();
    }
    if ring.iter().any(|v| !v.is_finite()) {
      return Err(GeometryError::NonFinite);
    }
    let mut distinct: Vec<LonLat> = Vec::with_capacity(ring.len());
    for v in &ring {
      if !distinct.contains(v) {
        distinct.push(*v);
      }
    }
    if distinct.len() < 3 {
      return Err(GeometryError::RingTooSmall(distinct.len()));
    }
    Ok(Geometry::Polygon(ring))
  }

  pub fn point(coord: LonLat) -> Result<Self, GeometryError> {
    if !coord.is_finite() {
      return Err(GeometryError::NonFinite);
    }
    Ok(Geometry::Point(coord))
  }

  /// Great-circle containment. Area-only: a `Point` zone never contains
  /// anything.
  pub fn contains(&self, p: LonLat) -> bool {
    match self {
      Geometry::Polygon(ring) => geo::point_in_ring(p, ring),
      Geometry::Point(_) => false,
    }
  }

  /// True geographic distance in metres from `p` to this geometry.
  pub fn distance_m(&self, p: LonLat) -> f64 {
    match self {
      Geometry::Polygon(ring) => geo::distance_to_ring_m(p, ring),
      Geometry::Point(c) => geo::haversine_m(p, *c),
    }
  }
}

// ─── GeoJSON wire form ───────────────────────────────────────────────────────

/// Wire representation: `{"type": "Polygon"|"Point", "coordinates": …}`,
/// longitude-first. Polygon rings go out closed (first vertex repeated), as
/// GeoJSON consumers expect.
#[derive(Serialize, Deserialize)]
#[serde(tag = "type", content = "coordinates")]
enum GeoJson {
  Polygon(Vec<Vec<[f64; 2]>>),
  Point([f64; 2]),
}

impl From<Geometry> for GeoJson {
  fn from(g: Geometry) -> Self {
    match g {
      Geometry::Polygon(ring) => {
        let mut coords: Vec<[f64; 2]> =
          ring.iter().map(|v| [v.lon, v.lat]).collect();
        if let Some(first) = coords.first().copied() {
          coords.push(first);
        }
        GeoJson::Polygon(vec![coords])
      }
      Geometry::Point(c) => GeoJson::Point([c.lon, c.lat]),
    }
  }
}

impl TryFrom<GeoJson> for Geometry {
  type Error = GeometryError;

  fn try_from(g: GeoJson) -> Result<Self, GeometryError> {
    match g {
      GeoJson::Polygon(rings) => {
        // Only the exterior ring is stored; holes are not supported.
        let ring = rings
          .into_iter()
          .next()
          .ok_or_else(|| GeometryError::Malformed("polygon has no rings".into()))?;
        Geometry::polygon(
          ring.iter().map(|c| LonLat::new(c[0], c[1])).collect(),
        )
      }
      GeoJson::Point(c) => Geometry::point(LonLat::new(c[0], c[1])),
    }
  }
}

// ─── WKT input ───────────────────────────────────────────────────────────────

/// Parse the WKT subset accepted by the privileged create operation:
/// `POLYGON((lon lat, …))` with a single ring, or `POINT(lon lat)`.
/// Longitude first, per the storage invariant.
pub fn parse_wkt(input: &str) -> Result<Geometry, GeometryError> {
  let trimmed = input.trim();
  let upper = trimmed.to_ascii_uppercase();

  if let Some(rest) = upper.strip_prefix("POLYGON") {
    let inner = strip_parens(rest.trim_start(), trimmed)?;
    let ring_str = strip_parens(inner.trim(), trimmed)?;
    // Reject multi-ring input rather than silently dropping holes.
    if ring_str.contains('(') || ring_str.contains(')') {
      return Err(GeometryError::Malformed(
        "only single-ring polygons are supported".into(),
      ));
    }
    let ring = ring_str
      .split(',')
      .map(parse_wkt_coord)
      .collect::<Result<Vec<_>, _>>()?;
    Geometry::polygon(ring)
  } else if let Some(rest) = upper.strip_prefix("POINT") {
    let inner = strip_parens(rest.trim_start(), trimmed)?;
    Geometry::point(parse_wkt_coord(inner)?)
  } else {
    let tag: String =
      upper.chars().take_while(|c| c.is_ascii_alphabetic()).collect();
    Err(GeometryError::UnsupportedType(tag))
  }
}

fn strip_parens<'a>(s: &'a str, original: &str) -> Result<&'a str, GeometryError> {
  s.strip_prefix('(')
    .and_then(|s| s.strip_suffix(')'))
    .ok_or_else(|| {
      GeometryError::Malformed(format!("unbalanced parentheses in {original:?}"))
    })
}

fn parse_wkt_coord(s: &str) -> Result<LonLat, GeometryError> {
  let mut parts = s.split_whitespace();
  let lon = parts
    .next()
    .and_then(|t| t.parse::<f64>().ok())
    .ok_or_else(|| GeometryError::Malformed(format!("bad coordinate: {s:?}")))?;
  let lat = parts
    .next()
    .and_then(|t| t.parse::<f64>().ok())
    .ok_or_else(|| GeometryError::Malformed(format!("bad coordinate: {s:?}")))?;
  if parts.next().is_some() {
    return Err(GeometryError::Malformed(format!(
      "expected two values per coordinate, got more in {s:?}"
    )));
  }
  let coord = LonLat::new(lon, lat);
  if !coord.is_finite() {
    return Err(GeometryError::NonFinite);
  }
  Ok(coord)
}
