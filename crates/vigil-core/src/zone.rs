//! Zone — a registered safety area (or point of interest).
//!
//! Zones are system-owned and visible to every user. They are created by
//! the admin role only and never mutated in place; removal is an
//! administrative store operation with no client-facing route.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::geometry::Geometry;

/// Contact details of the authority responsible for a zone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthorityContact {
  pub authority: String,
  pub phone:     Option<String>,
  pub email:     Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Zone {
  pub zone_id:           Uuid,
  pub name:              String,
  pub geometry:          Geometry,
  pub authority_contact: Option<AuthorityContact>,
  pub created_at:        DateTime<Utc>,
}

/// Input for [`crate::store::ZoneStore::insert_zone`]. The id and timestamp
/// are assigned by the store.
#[derive(Debug, Clone)]
pub struct NewZone {
  pub name:              String,
  pub geometry:          Geometry,
  pub authority_contact: Option<AuthorityContact>,
}
