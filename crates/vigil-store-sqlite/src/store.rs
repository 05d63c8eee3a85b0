//! [`SqliteStore`] — the SQLite implementation of every Vigil store trait.

use std::path::Path;

use chrono::Utc;
use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use vigil_core::{
  alert::{AlertEvent, NewAlertEvent},
  checkin::{CheckIn, NewCheckIn},
  contact::{FamilyContact, NewContact},
  geo::LonLat,
  roster::MAX_CONTACTS,
  store::{
    AlertStore, CheckinStore, ContactInsert, RosterStore, UserStore, ZoneStore,
  },
  user::{NewUser, User},
  zone::{NewZone, Zone},
};

use crate::{
  Error, Result,
  encode::{
    RawAlert, RawCheckin, RawContact, RawUser, RawZone, encode_authority,
    encode_dt, encode_geometry, encode_role, encode_uuid,
  },
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Vigil store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted. All
/// access is serialised onto one connection, which also makes the roster's
/// count-then-insert transaction race-free.
#[derive(Clone)]
pub struct SqliteStore {
  pub(crate) conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Load every zone row, in ascending zone-id order (the documented
  /// tie-break for containment and the stable order for proximity).
  async fn load_zone_rows(&self) -> Result<Vec<RawZone>> {
    let raws: Vec<RawZone> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(
          "SELECT zone_id, name, geometry_json, authority_contact, created_at
           FROM zones ORDER BY zone_id",
        )?;
        let rows = stmt
          .query_map([], |row| {
            Ok(RawZone {
              zone_id:           row.get(0)?,
              name:              row.get(1)?,
              geometry_json:     row.get(2)?,
              authority_contact: row.get(3)?,
              created_at:        row.get(4)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    Ok(raws)
  }
}

/// Decode a raw zone row, warn-logging and dropping it on failure. One
/// corrupt record must not abort evaluation of its siblings.
fn decode_or_skip(raw: RawZone) -> Option<Zone> {
  let id = raw.zone_id.clone();
  match raw.into_zone() {
    Ok(zone) => Some(zone),
    Err(e) => {
      tracing::warn!(zone_id = %id, error = %e, "skipping zone with malformed stored geometry");
      None
    }
  }
}

// ─── ZoneStore ───────────────────────────────────────────────────────────────

impl ZoneStore for SqliteStore {
  type Error = Error;

  async fn insert_zone(&self, input: NewZone) -> Result<Zone> {
    let zone = Zone {
      zone_id:           Uuid::new_v4(),
      name:              input.name,
      geometry:          input.geometry,
      authority_contact: input.authority_contact,
      created_at:        Utc::now(),
    };

    let id_str = encode_uuid(zone.zone_id);
    let name = zone.name.clone();
    let geometry_str = encode_geometry(&zone.geometry)?;
    let authority_str = zone
      .authority_contact
      .as_ref()
      .map(encode_authority)
      .transpose()?;
    let at_str = encode_dt(zone.created_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO zones (zone_id, name, geometry_json, authority_contact, created_at)
           VALUES (?1, ?2, ?3, ?4, ?5)",
          rusqlite::params![id_str, name, geometry_str, authority_str, at_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(zone)
  }

  async fn get_zone(&self, id: Uuid) -> Result<Option<Zone>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawZone> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT zone_id, name, geometry_json, authority_contact, created_at
               FROM zones WHERE zone_id = ?1",
              rusqlite::params![id_str],
              |row| {
                Ok(RawZone {
                  zone_id:           row.get(0)?,
                  name:              row.get(1)?,
                  geometry_json:     row.get(2)?,
                  authority_contact: row.get(3)?,
                  created_at:        row.get(4)?,
                })
              },
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawZone::into_zone).transpose()
  }

  async fn list_zones(&self) -> Result<Vec<Zone>> {
    let raws = self.load_zone_rows().await?;
    Ok(raws.into_iter().filter_map(decode_or_skip).collect())
  }

  async fn find_containing(&self, point: LonLat) -> Result<Option<Zone>> {
    // Ascending zone-id order makes the overlap tie-break deterministic.
    for raw in self.load_zone_rows().await? {
      if let Some(zone) = decode_or_skip(raw) {
        if zone.geometry.contains(point) {
          return Ok(Some(zone));
        }
      }
    }
    Ok(None)
  }

  async fn find_within(&self, point: LonLat, radius_m: f64) -> Result<Vec<Zone>> {
    let raws = self.load_zone_rows().await?;
    Ok(
      raws
        .into_iter()
        .filter_map(decode_or_skip)
        .filter(|z| z.geometry.distance_m(point) <= radius_m)
        .collect(),
    )
  }

  async fn delete_zone(&self, id: Uuid) -> Result<bool> {
    let id_str = encode_uuid(id);
    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM zones WHERE zone_id = ?1",
          rusqlite::params![id_str],
        )?)
      })
      .await?;
    Ok(changed > 0)
  }
}

// ─── RosterStore ─────────────────────────────────────────────────────────────

impl RosterStore for SqliteStore {
  type Error = Error;

  async fn insert_contact(
    &self,
    owner: Uuid,
    input: NewContact,
  ) -> Result<ContactInsert> {
    let contact = FamilyContact {
      contact_id: Uuid::new_v4(),
      owner_id:   owner,
      name:       input.name,
      phone:      input.phone,
      email:      input.email,
      created_at: Utc::now(),
    };

    let id_str = encode_uuid(contact.contact_id);
    let owner_str = encode_uuid(owner);
    let name = contact.name.clone();
    let phone = contact.phone.clone();
    let email = contact.email.clone();
    let at_str = encode_dt(contact.created_at);

    // Count and insert under one immediate transaction: the cap check is
    // the single place where a lost race would be a correctness bug.
    let inserted: bool = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction_with_behavior(
          rusqlite::TransactionBehavior::Immediate,
        )?;
        let count: i64 = tx.query_row(
          "SELECT COUNT(*) FROM family_contacts WHERE owner_id = ?1",
          rusqlite::params![owner_str],
          |row| row.get(0),
        )?;
        if count >= MAX_CONTACTS as i64 {
          return Ok(false);
        }
        tx.execute(
          "INSERT INTO family_contacts (contact_id, owner_id, name, phone, email, created_at)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
          rusqlite::params![id_str, owner_str, name, phone, email, at_str],
        )?;
        tx.commit()?;
        Ok(true)
      })
      .await?;

    if inserted {
      Ok(ContactInsert::Inserted(contact))
    } else {
      Ok(ContactInsert::CapReached)
    }
  }

  async fn list_contacts(&self, owner: Uuid) -> Result<Vec<FamilyContact>> {
    let owner_str = encode_uuid(owner);

    let raws: Vec<RawContact> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT contact_id, owner_id, name, phone, email, created_at
           FROM family_contacts WHERE owner_id = ?1 ORDER BY rowid",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![owner_str], |row| {
            Ok(RawContact {
              contact_id: row.get(0)?,
              owner_id:   row.get(1)?,
              name:       row.get(2)?,
              phone:      row.get(3)?,
              email:      row.get(4)?,
              created_at: row.get(5)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawContact::into_contact).collect()
  }

  async fn remove_contact(&self, owner: Uuid, contact_id: Uuid) -> Result<()> {
    let owner_str = encode_uuid(owner);
    let id_str = encode_uuid(contact_id);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "DELETE FROM family_contacts WHERE contact_id = ?1 AND owner_id = ?2",
          rusqlite::params![id_str, owner_str],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── UserStore ───────────────────────────────────────────────────────────────

impl UserStore for SqliteStore {
  type Error = Error;

  async fn insert_user(&self, input: NewUser) -> Result<User> {
    let user = User {
      user_id:    Uuid::new_v4(),
      name:       input.name,
      email:      input.email,
      role:       input.role,
      created_at: Utc::now(),
    };

    let id_str = encode_uuid(user.user_id);
    let name = user.name.clone();
    let email = user.email.clone();
    let role_str = encode_role(user.role).to_owned();
    let at_str = encode_dt(user.created_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO users (user_id, name, email, role, created_at)
           VALUES (?1, ?2, ?3, ?4, ?5)",
          rusqlite::params![id_str, name, email, role_str, at_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(user)
  }

  async fn get_user(&self, id: Uuid) -> Result<Option<User>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawUser> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT user_id, name, email, role, created_at
               FROM users WHERE user_id = ?1",
              rusqlite::params![id_str],
              |row| {
                Ok(RawUser {
                  user_id:    row.get(0)?,
                  name:       row.get(1)?,
                  email:      row.get(2)?,
                  role:       row.get(3)?,
                  created_at: row.get(4)?,
                })
              },
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawUser::into_user).transpose()
  }

  async fn delete_user(&self, id: Uuid) -> Result<bool> {
    let id_str = encode_uuid(id);
    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM users WHERE user_id = ?1",
          rusqlite::params![id_str],
        )?)
      })
      .await?;
    Ok(changed > 0)
  }
}

// ─── AlertStore ──────────────────────────────────────────────────────────────

impl AlertStore for SqliteStore {
  type Error = Error;

  async fn insert_alert(&self, input: NewAlertEvent) -> Result<AlertEvent> {
    let alert = AlertEvent {
      alert_id:   Uuid::new_v4(),
      owner_id:   input.owner_id,
      latitude:   input.latitude,
      longitude:  input.longitude,
      message:    input.message,
      created_at: Utc::now(),
      resolved:   false,
    };

    let id_str = encode_uuid(alert.alert_id);
    let owner_str = encode_uuid(alert.owner_id);
    let (lat, lon) = (alert.latitude, alert.longitude);
    let message = alert.message.clone();
    let at_str = encode_dt(alert.created_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO sos_alerts (alert_id, owner_id, latitude, longitude, message, created_at, resolved)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6, 0)",
          rusqlite::params![id_str, owner_str, lat, lon, message, at_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(alert)
  }

  async fn list_alerts(&self, owner: Uuid) -> Result<Vec<AlertEvent>> {
    let owner_str = encode_uuid(owner);

    let raws: Vec<RawAlert> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT alert_id, owner_id, latitude, longitude, message, created_at, resolved
           FROM sos_alerts WHERE owner_id = ?1 ORDER BY rowid DESC",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![owner_str], |row| {
            Ok(RawAlert {
              alert_id:   row.get(0)?,
              owner_id:   row.get(1)?,
              latitude:   row.get(2)?,
              longitude:  row.get(3)?,
              message:    row.get(4)?,
              created_at: row.get(5)?,
              resolved:   row.get(6)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawAlert::into_alert).collect()
  }
}

// ─── CheckinStore ────────────────────────────────────────────────────────────

impl CheckinStore for SqliteStore {
  type Error = Error;

  async fn insert_checkin(&self, input: NewCheckIn) -> Result<CheckIn> {
    let checkin = CheckIn {
      checkin_id: Uuid::new_v4(),
      owner_id:   input.owner_id,
      zone_id:    input.zone_id,
      photo_ref:  input.photo_ref,
      created_at: Utc::now(),
    };

    let id_str = encode_uuid(checkin.checkin_id);
    let owner_str = encode_uuid(checkin.owner_id);
    let zone_str = checkin.zone_id.map(encode_uuid);
    let photo_ref = checkin.photo_ref.clone();
    let at_str = encode_dt(checkin.created_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO checkins (checkin_id, owner_id, zone_id, photo_ref, created_at)
           VALUES (?1, ?2, ?3, ?4, ?5)",
          rusqlite::params![id_str, owner_str, zone_str, photo_ref, at_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(checkin)
  }

  async fn list_checkins(&self, owner: Uuid) -> Result<Vec<CheckIn>> {
    let owner_str = encode_uuid(owner);

    let raws: Vec<RawCheckin> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT checkin_id, owner_id, zone_id, photo_ref, created_at
           FROM checkins WHERE owner_id = ?1 ORDER BY rowid DESC",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![owner_str], |row| {
            Ok(RawCheckin {
              checkin_id: row.get(0)?,
              owner_id:   row.get(1)?,
              zone_id:    row.get(2)?,
              photo_ref:  row.get(3)?,
              created_at: row.get(4)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawCheckin::into_checkin).collect()
  }
}
