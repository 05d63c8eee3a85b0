//! Zone check-ins: a photo reference tied to an optional zone.
//!
//! Records are insert-only; retention and the photo bytes themselves are
//! external concerns — the core stores an opaque reference.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  Error, Result,
  geo::PositionSample,
  query::require_finite,
  store::{CheckinStore, ZoneStore},
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckIn {
  pub checkin_id: Uuid,
  pub owner_id:   Uuid,
  pub zone_id:    Option<Uuid>,
  pub photo_ref:  String,
  pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewCheckIn {
  pub owner_id:  Uuid,
  pub zone_id:   Option<Uuid>,
  pub photo_ref: String,
}

/// Check-in component. When a zone id is supplied the submitted position
/// is re-evaluated server-side: the client's own inside/outside flag is
/// not trusted.
pub struct CheckIns<S> {
  store: Arc<S>,
}

impl<S> Clone for CheckIns<S> {
  fn clone(&self) -> Self {
    Self { store: Arc::clone(&self.store) }
  }
}

impl<S> CheckIns<S>
where
  S: ZoneStore + CheckinStore,
{
  pub fn new(store: Arc<S>) -> Self {
    Self { store }
  }

  pub async fn create(
    &self,
    owner: Uuid,
    position: PositionSample,
    zone_id: Option<Uuid>,
    photo_ref: String,
  ) -> Result<CheckIn> {
    let point = require_finite(position)?;
    if photo_ref.trim().is_empty() {
      return Err(Error::validation("photo reference must not be empty"));
    }

    if let Some(id) = zone_id {
      let zone = self
        .store
        .get_zone(id)
        .await
        .map_err(Error::store)?
        .ok_or_else(|| Error::validation(format!("unknown zone: {id}")))?;
      if !zone.geometry.contains(point) {
        return Err(Error::validation(
          "current position is not inside the requested zone",
        ));
      }
    }

    self
      .store
      .insert_checkin(NewCheckIn { owner_id: owner, zone_id, photo_ref })
      .await
      .map_err(Error::store)
  }

  pub async fn list(&self, owner: Uuid) -> Result<Vec<CheckIn>> {
    self.store.list_checkins(owner).await.map_err(Error::store)
  }
}
