//! Great-circle geometry over WGS84 coordinates.
//!
//! All coordinates are decimal degrees with **longitude first**. This axis
//! order is the storage and wire invariant for the whole system; every
//! constructor in this module keeps it explicit.
//!
//! Containment uses a gnomonic projection centred on the test point:
//! great-circle edges map to straight lines in that projection, so a planar
//! winding test on the projected ring is an exact spherical test for
//! polygons spanning less than a hemisphere (which safety zones always do).

use serde::{Deserialize, Serialize};

/// Mean earth radius in metres (IUGG).
pub const EARTH_RADIUS_M: f64 = 6_371_008.8;

// ─── Coordinate types ────────────────────────────────────────────────────────

/// A longitude/latitude pair in decimal degrees, longitude first.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LonLat {
  pub lon: f64,
  pub lat: f64,
}

impl LonLat {
  pub fn new(lon: f64, lat: f64) -> Self {
    Self { lon, lat }
  }

  pub fn is_finite(self) -> bool {
    self.lon.is_finite() && self.lat.is_finite()
  }
}

/// A client-reported position fix. Ephemeral; the core never persists one.
///
/// Request bodies carry latitude/longitude as named fields, so the wire
/// shape cannot silently swap the axes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PositionSample {
  pub latitude:  f64,
  pub longitude: f64,
}

impl PositionSample {
  pub fn new(latitude: f64, longitude: f64) -> Self {
    Self { latitude, longitude }
  }

  pub fn lon_lat(self) -> LonLat {
    LonLat::new(self.longitude, self.latitude)
  }

  pub fn is_finite(self) -> bool {
    self.latitude.is_finite() && self.longitude.is_finite()
  }
}

// ─── Unit-vector helpers ─────────────────────────────────────────────────────

fn unit(p: LonLat) -> [f64; 3] {
  let (lon, lat) = (p.lon.to_radians(), p.lat.to_radians());
  [lat.cos() * lon.cos(), lat.cos() * lon.sin(), lat.sin()]
}

fn dot(a: [f64; 3], b: [f64; 3]) -> f64 {
  a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

fn cross3(a: [f64; 3], b: [f64; 3]) -> [f64; 3] {
  [
    a[1] * b[2] - a[2] * b[1],
    a[2] * b[0] - a[0] * b[2],
    a[0] * b[1] - a[1] * b[0],
  ]
}

fn norm(a: [f64; 3]) -> f64 {
  dot(a, a).sqrt()
}

/// Angle between two unit vectors, in radians. Stable near 0 and π.
fn angle_between(a: [f64; 3], b: [f64; 3]) -> f64 {
  norm(cross3(a, b)).atan2(dot(a, b))
}

// ─── Distance ────────────────────────────────────────────────────────────────

/// Great-circle distance between two coordinates, in metres (haversine).
pub fn haversine_m(a: LonLat, b: LonLat) -> f64 {
  let (la1, la2) = (a.lat.to_radians(), b.lat.to_radians());
  let dlat = (b.lat - a.lat).to_radians();
  let dlon = (b.lon - a.lon).to_radians();

  let h = (dlat / 2.0).sin().powi(2)
    + la1.cos() * la2.cos() * (dlon / 2.0).sin().powi(2);
  2.0 * EARTH_RADIUS_M * h.sqrt().min(1.0).asin()
}

/// Distance in metres from `p` to the great-circle arc `a`–`b`.
///
/// Uses the cross-track distance when the perpendicular foot falls on the
/// arc, otherwise the distance to the nearer endpoint.
pub fn distance_to_arc_m(p: LonLat, a: LonLat, b: LonLat) -> f64 {
  let (up, ua, ub) = (unit(p), unit(a), unit(b));

  let n = cross3(ua, ub);
  let n_len = norm(n);
  if n_len < 1e-12 {
    // Degenerate edge: endpoints coincide (or are antipodal).
    return haversine_m(p, a).min(haversine_m(p, b));
  }
  let n_hat = [n[0] / n_len, n[1] / n_len, n[2] / n_len];

  // Foot of the perpendicular from p onto the great circle through a and b.
  let s = dot(up, n_hat);
  let f = [up[0] - s * n_hat[0], up[1] - s * n_hat[1], up[2] - s * n_hat[2]];
  let f_len = norm(f);
  if f_len < 1e-12 {
    // p is a pole of the great circle: every point of the arc is a quarter
    // turn away.
    return std::f64::consts::FRAC_PI_2 * EARTH_RADIUS_M;
  }
  let f_hat = [f[0] / f_len, f[1] / f_len, f[2] / f_len];

  // The foot lies on the arc iff it sits between a and b along the circle.
  let arc = angle_between(ua, ub);
  let on_arc =
    angle_between(ua, f_hat) + angle_between(f_hat, ub) <= arc + 1e-9;

  if on_arc {
    s.clamp(-1.0, 1.0).asin().abs() * EARTH_RADIUS_M
  } else {
    haversine_m(p, a).min(haversine_m(p, b))
  }
}

// ─── Containment ─────────────────────────────────────────────────────────────

/// Spherical point-in-polygon for an open ring of ≥3 vertices (the first
/// vertex implicitly closes the ring).
///
/// Returns `false` for degenerate rings and whenever any vertex lies 90° or
/// more from the test point — a containing polygon smaller than a
/// hemisphere cannot have one.
pub fn point_in_ring(p: LonLat, ring: &[LonLat]) -> bool {
  if ring.len() < 3 {
    return false;
  }

  let o = unit(p);
  // Tangent-plane basis at p: east and north.
  let (lon, lat) = (p.lon.to_radians(), p.lat.to_radians());
  let east = [-lon.sin(), lon.cos(), 0.0];
  let north = [
    -lat.sin() * lon.cos(),
    -lat.sin() * lon.sin(),
    lat.cos(),
  ];

  let mut proj = Vec::with_capacity(ring.len());
  for v in ring {
    let u = unit(*v);
    let c = dot(o, u);
    if c <= 1e-12 {
      return false;
    }
    // Gnomonic projection: great circles through the vertices become
    // straight lines, so planar winding below is exact.
    proj.push((dot(u, east) / c, dot(u, north) / c));
  }

  winding_contains_origin(&proj)
}

/// Nonzero-winding test of the origin against a planar polygon.
fn winding_contains_origin(pts: &[(f64, f64)]) -> bool {
  let mut wn = 0i32;
  for i in 0..pts.len() {
    let a = pts[i];
    let b = pts[(i + 1) % pts.len()];
    // cross > 0 ⇔ the origin is left of the directed edge a→b.
    let cross = a.0 * b.1 - a.1 * b.0;
    if a.1 <= 0.0 {
      if b.1 > 0.0 && cross > 0.0 {
        wn += 1;
      }
    } else if b.1 <= 0.0 && cross < 0.0 {
      wn -= 1;
    }
  }
  wn != 0
}

/// Distance in metres from `p` to a polygon ring: zero when inside,
/// otherwise the minimum distance to any edge (including the closing edge).
pub fn distance_to_ring_m(p: LonLat, ring: &[LonLat]) -> f64 {
  if point_in_ring(p, ring) {
    return 0.0;
  }
  let mut min = f64::INFINITY;
  for i in 0..ring.len() {
    let a = ring[i];
    let b = ring[(i + 1) % ring.len()];
    let d = distance_to_arc_m(p, a, b);
    if d < min {
      min = d;
    }
  }
  min
}

#[cfg(test)]
mod tests {
  use super::*;

  // The example safe-zone ring near Guwahati, longitude first.
  fn guwahati_ring() -> Vec<LonLat> {
    vec![
      LonLat::new(91.736, 26.144),
      LonLat::new(91.738, 26.144),
      LonLat::new(91.738, 26.146),
      LonLat::new(91.736, 26.146),
    ]
  }

  #[test]
  fn haversine_one_degree_of_latitude() {
    let a = LonLat::new(0.0, 0.0);
    let b = LonLat::new(0.0, 1.0);
    let d = haversine_m(a, b);
    // One degree of latitude is ~111.2 km on the mean sphere.
    assert!((d - 111_195.0).abs() < 200.0, "got {d}");
  }

  #[test]
  fn haversine_zero_for_same_point() {
    let p = LonLat::new(91.737, 26.145);
    assert_eq!(haversine_m(p, p), 0.0);
  }

  #[test]
  fn point_inside_ring() {
    assert!(point_in_ring(LonLat::new(91.737, 26.145), &guwahati_ring()));
  }

  #[test]
  fn point_outside_ring() {
    assert!(!point_in_ring(LonLat::new(78.0, 22.0), &guwahati_ring()));
    // Just outside the eastern edge.
    assert!(!point_in_ring(LonLat::new(91.7385, 26.145), &guwahati_ring()));
  }

  #[test]
  fn winding_direction_does_not_matter() {
    let mut ring = guwahati_ring();
    ring.reverse();
    assert!(point_in_ring(LonLat::new(91.737, 26.145), &ring));
  }

  #[test]
  fn degenerate_ring_contains_nothing() {
    let ring = vec![LonLat::new(0.0, 0.0), LonLat::new(1.0, 1.0)];
    assert!(!point_in_ring(LonLat::new(0.5, 0.5), &ring));
  }

  #[test]
  fn distance_zero_inside_ring() {
    assert_eq!(
      distance_to_ring_m(LonLat::new(91.737, 26.145), &guwahati_ring()),
      0.0
    );
  }

  #[test]
  fn distance_outside_ring_is_to_nearest_edge() {
    // 0.01° of longitude east of the eastern edge at this latitude is
    // roughly 1 km.
    let d = distance_to_ring_m(LonLat::new(91.748, 26.145), &guwahati_ring());
    assert!((500.0..2_000.0).contains(&d), "got {d}");
  }

  #[test]
  fn distance_to_arc_perpendicular_foot() {
    // Equator segment from 0° to 1° east; point 0.5° east, 0.5° north.
    let d = distance_to_arc_m(
      LonLat::new(0.5, 0.5),
      LonLat::new(0.0, 0.0),
      LonLat::new(1.0, 0.0),
    );
    assert!((d - 55_597.0).abs() < 200.0, "got {d}");
  }

  #[test]
  fn distance_to_arc_beyond_endpoint() {
    // Foot falls past b, so distance is to the endpoint itself.
    let d = distance_to_arc_m(
      LonLat::new(2.0, 0.0),
      LonLat::new(0.0, 0.0),
      LonLat::new(1.0, 0.0),
    );
    let expected = haversine_m(LonLat::new(2.0, 0.0), LonLat::new(1.0, 0.0));
    assert!((d - expected).abs() < 1.0, "got {d}, expected {expected}");
  }
}
