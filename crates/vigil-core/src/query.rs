//! The containment and proximity evaluators.
//!
//! Both are thin, stateless components: they validate the input shape and
//! delegate the geography predicate to the injected [`ZoneStore`]. Each
//! call is an independent, idempotent read — evaluating the same position
//! sample through both in the same tick is fine and may race.

use std::sync::Arc;

use serde::Serialize;
use uuid::Uuid;

use crate::{
  Error, Result,
  geo::{LonLat, PositionSample},
  geometry::Geometry,
  store::ZoneStore,
  zone::Zone,
};

/// Radius applied when a nearby query does not specify one. Fixed at 5000
/// metres; earlier revisions of the system wavered between 2000 and 5000,
/// and 5000 is the documented choice.
pub const DEFAULT_NEARBY_RADIUS_M: f64 = 5000.0;

pub(crate) fn require_finite(sample: PositionSample) -> Result<LonLat> {
  if !sample.is_finite() {
    return Err(Error::validation(
      "latitude and longitude must be finite numbers",
    ));
  }
  Ok(sample.lon_lat())
}

// ─── Containment ─────────────────────────────────────────────────────────────

/// Point-in-zone evaluation. `Ok(None)` is the explicit "not inside any
/// zone" answer, distinct from any error.
pub struct Containment<S> {
  store: Arc<S>,
}

impl<S> Clone for Containment<S> {
  fn clone(&self) -> Self {
    Self { store: Arc::clone(&self.store) }
  }
}

impl<S: ZoneStore> Containment<S> {
  pub fn new(store: Arc<S>) -> Self {
    Self { store }
  }

  pub async fn check(&self, sample: PositionSample) -> Result<Option<Zone>> {
    let point = require_finite(sample)?;
    self.store.find_containing(point).await.map_err(Error::store)
  }
}

// ─── Proximity ───────────────────────────────────────────────────────────────

/// A zone with its geometry serialised for client rendering (GeoJSON,
/// longitude-first).
#[derive(Debug, Clone, Serialize)]
pub struct ZoneFeature {
  pub id:       Uuid,
  pub name:     String,
  pub geometry: Geometry,
}

impl From<Zone> for ZoneFeature {
  fn from(z: Zone) -> Self {
    Self { id: z.zone_id, name: z.name, geometry: z.geometry }
  }
}

/// Radius search around a position.
pub struct Proximity<S> {
  store: Arc<S>,
}

impl<S> Clone for Proximity<S> {
  fn clone(&self) -> Self {
    Self { store: Arc::clone(&self.store) }
  }
}

impl<S: ZoneStore> Proximity<S> {
  pub fn new(store: Arc<S>) -> Self {
    Self { store }
  }

  /// All zones within `radius_m` metres (default
  /// [`DEFAULT_NEARBY_RADIUS_M`]) of the sample, ascending by zone id.
  pub async fn nearby(
    &self,
    sample: PositionSample,
    radius_m: Option<f64>,
  ) -> Result<Vec<ZoneFeature>> {
    let point = require_finite(sample)?;
    let radius = radius_m.unwrap_or(DEFAULT_NEARBY_RADIUS_M);
    if !radius.is_finite() || radius <= 0.0 {
      return Err(Error::validation(
        "radius must be a positive, finite number of metres",
      ));
    }

    let zones = self
      .store
      .find_within(point, radius)
      .await
      .map_err(Error::store)?;
    Ok(zones.into_iter().map(ZoneFeature::from).collect())
  }
}

#[cfg(test)]
mod tests {
  use std::sync::Mutex;

  use chrono::Utc;

  use super::*;
  use crate::{
    geo::LonLat,
    store::ZoneStore,
    zone::{NewZone, Zone},
  };

  #[derive(Debug, thiserror::Error)]
  #[error("fake store error")]
  struct FakeError;

  /// Records the arguments of the last spatial query.
  #[derive(Default)]
  struct FakeZoneStore {
    zones:       Vec<Zone>,
    last_radius: Mutex<Option<f64>>,
  }

  fn polygon_zone(name: &str) -> Zone {
    Zone {
      zone_id:           Uuid::new_v4(),
      name:              name.to_string(),
      geometry:          Geometry::polygon(vec![
        LonLat::new(91.736, 26.144),
        LonLat::new(91.738, 26.144),
        LonLat::new(91.738, 26.146),
        LonLat::new(91.736, 26.146),
      ])
      .unwrap(),
      authority_contact: None,
      created_at:        Utc::now(),
    }
  }

  impl ZoneStore for FakeZoneStore {
    type Error = FakeError;

    async fn insert_zone(&self, _input: NewZone) -> Result<Zone, FakeError> {
      unimplemented!("not needed by these tests")
    }

    async fn get_zone(&self, _id: Uuid) -> Result<Option<Zone>, FakeError> {
      unimplemented!("not needed by these tests")
    }

    async fn list_zones(&self) -> Result<Vec<Zone>, FakeError> {
      Ok(self.zones.clone())
    }

    async fn find_containing(
      &self,
      point: LonLat,
    ) -> Result<Option<Zone>, FakeError> {
      Ok(
        self
          .zones
          .iter()
          .find(|z| z.geometry.contains(point))
          .cloned(),
      )
    }

    async fn find_within(
      &self,
      point: LonLat,
      radius_m: f64,
    ) -> Result<Vec<Zone>, FakeError> {
      *self.last_radius.lock().unwrap() = Some(radius_m);
      Ok(
        self
          .zones
          .iter()
          .filter(|z| z.geometry.distance_m(point) <= radius_m)
          .cloned()
          .collect(),
      )
    }

    async fn delete_zone(&self, _id: Uuid) -> Result<bool, FakeError> {
      unimplemented!("not needed by these tests")
    }
  }

  #[tokio::test]
  async fn containment_rejects_non_finite_input() {
    let c = Containment::new(Arc::new(FakeZoneStore::default()));
    let err = c
      .check(PositionSample::new(f64::NAN, 91.7))
      .await
      .unwrap_err();
    assert!(matches!(err, Error::Validation(_)));
  }

  #[tokio::test]
  async fn containment_finds_zone_and_reports_none_outside() {
    let zone = polygon_zone("riverside");
    let store = Arc::new(FakeZoneStore {
      zones: vec![zone.clone()],
      ..Default::default()
    });
    let c = Containment::new(store);

    let hit = c.check(PositionSample::new(26.145, 91.737)).await.unwrap();
    assert_eq!(hit.map(|z| z.zone_id), Some(zone.zone_id));

    let miss = c.check(PositionSample::new(22.0, 78.0)).await.unwrap();
    assert!(miss.is_none());
  }

  #[tokio::test]
  async fn nearby_applies_the_documented_default_radius() {
    let store = Arc::new(FakeZoneStore::default());
    let p = Proximity::new(Arc::clone(&store));

    p.nearby(PositionSample::new(26.145, 91.737), None)
      .await
      .unwrap();
    assert_eq!(
      *store.last_radius.lock().unwrap(),
      Some(DEFAULT_NEARBY_RADIUS_M)
    );
  }

  #[tokio::test]
  async fn nearby_rejects_bad_radii() {
    let p = Proximity::new(Arc::new(FakeZoneStore::default()));
    let sample = PositionSample::new(26.145, 91.737);

    for bad in [0.0, -10.0, f64::NAN, f64::INFINITY] {
      let err = p.nearby(sample, Some(bad)).await.unwrap_err();
      assert!(matches!(err, Error::Validation(_)), "radius {bad}");
    }
  }

  #[tokio::test]
  async fn nearby_serialises_zone_geometry() {
    let zone = polygon_zone("riverside");
    let store = Arc::new(FakeZoneStore {
      zones: vec![zone.clone()],
      ..Default::default()
    });
    let p = Proximity::new(store);

    let features = p
      .nearby(PositionSample::new(26.145, 91.737), Some(1000.0))
      .await
      .unwrap();
    assert_eq!(features.len(), 1);
    assert_eq!(features[0].id, zone.zone_id);

    let json = serde_json::to_value(&features[0]).unwrap();
    assert_eq!(json["geometry"]["type"], "Polygon");
  }
}
