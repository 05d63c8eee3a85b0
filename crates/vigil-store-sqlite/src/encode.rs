//! Encoding and decoding helpers between Rust domain types and the
//! plain-text representations stored in SQLite columns.
//!
//! Timestamps are RFC 3339 strings, UUIDs hyphenated lowercase, geometry
//! and authority contacts compact GeoJSON/JSON.

use chrono::{DateTime, Utc};
use uuid::Uuid;
use vigil_core::{
  alert::AlertEvent,
  checkin::CheckIn,
  contact::FamilyContact,
  geometry::Geometry,
  user::{Role, User},
  zone::{AuthorityContact, Zone},
};

use crate::{Error, Result};

// ─── Uuid ────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String {
  id.hyphenated().to_string()
}

pub fn decode_uuid(s: &str) -> Result<Uuid> {
  Ok(Uuid::parse_str(s)?)
}

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339()
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Role ────────────────────────────────────────────────────────────────────

pub fn encode_role(r: Role) -> &'static str {
  match r {
    Role::User => "user",
    Role::Admin => "admin",
  }
}

pub fn decode_role(s: &str) -> Result<Role> {
  match s {
    "user" => Ok(Role::User),
    "admin" => Ok(Role::Admin),
    other => Err(Error::UnknownRole(other.to_string())),
  }
}

// ─── Geometry / authority contact ────────────────────────────────────────────

pub fn encode_geometry(g: &Geometry) -> Result<String> {
  Ok(serde_json::to_string(g)?)
}

pub fn decode_geometry(s: &str) -> Result<Geometry> {
  Ok(serde_json::from_str(s)?)
}

pub fn encode_authority(a: &AuthorityContact) -> Result<String> {
  Ok(serde_json::to_string(a)?)
}

pub fn decode_authority(s: &str) -> Result<AuthorityContact> {
  Ok(serde_json::from_str(s)?)
}

// ─── Raw row types ───────────────────────────────────────────────────────────

/// A `zones` row as read from SQLite, before decoding. Decoding is kept
/// separate so the spatial queries can skip a row whose geometry is
/// malformed instead of failing the whole call.
pub struct RawZone {
  pub zone_id:           String,
  pub name:              String,
  pub geometry_json:     String,
  pub authority_contact: Option<String>,
  pub created_at:        String,
}

impl RawZone {
  pub fn into_zone(self) -> Result<Zone> {
    Ok(Zone {
      zone_id:           decode_uuid(&self.zone_id)?,
      name:              self.name,
      geometry:          decode_geometry(&self.geometry_json)?,
      authority_contact: self
        .authority_contact
        .as_deref()
        .map(decode_authority)
        .transpose()?,
      created_at:        decode_dt(&self.created_at)?,
    })
  }
}

pub struct RawContact {
  pub contact_id: String,
  pub owner_id:   String,
  pub name:       String,
  pub phone:      Option<String>,
  pub email:      Option<String>,
  pub created_at: String,
}

impl RawContact {
  pub fn into_contact(self) -> Result<FamilyContact> {
    Ok(FamilyContact {
      contact_id: decode_uuid(&self.contact_id)?,
      owner_id:   decode_uuid(&self.owner_id)?,
      name:       self.name,
      phone:      self.phone,
      email:      self.email,
      created_at: decode_dt(&self.created_at)?,
    })
  }
}

pub struct RawUser {
  pub user_id:    String,
  pub name:       String,
  pub email:      String,
  pub role:       String,
  pub created_at: String,
}

impl RawUser {
  pub fn into_user(self) -> Result<User> {
    Ok(User {
      user_id:    decode_uuid(&self.user_id)?,
      name:       self.name,
      email:      self.email,
      role:       decode_role(&self.role)?,
      created_at: decode_dt(&self.created_at)?,
    })
  }
}

pub struct RawAlert {
  pub alert_id:   String,
  pub owner_id:   String,
  pub latitude:   f64,
  pub longitude:  f64,
  pub message:    String,
  pub created_at: String,
  pub resolved:   bool,
}

impl RawAlert {
  pub fn into_alert(self) -> Result<AlertEvent> {
    Ok(AlertEvent {
      alert_id:   decode_uuid(&self.alert_id)?,
      owner_id:   decode_uuid(&self.owner_id)?,
      latitude:   self.latitude,
      longitude:  self.longitude,
      message:    self.message,
      created_at: decode_dt(&self.created_at)?,
      resolved:   self.resolved,
    })
  }
}

pub struct RawCheckin {
  pub checkin_id: String,
  pub owner_id:   String,
  pub zone_id:    Option<String>,
  pub photo_ref:  String,
  pub created_at: String,
}

impl RawCheckin {
  pub fn into_checkin(self) -> Result<CheckIn> {
    Ok(CheckIn {
      checkin_id: decode_uuid(&self.checkin_id)?,
      owner_id:   decode_uuid(&self.owner_id)?,
      zone_id:    self.zone_id.as_deref().map(decode_uuid).transpose()?,
      photo_ref:  self.photo_ref,
      created_at: decode_dt(&self.created_at)?,
    })
  }
}
