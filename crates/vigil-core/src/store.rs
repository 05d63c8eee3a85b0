//! Store traits and supporting types.
//!
//! One trait per concern, implemented by storage backends (e.g.
//! `vigil-store-sqlite`). Components receive the store they need at
//! construction, so tests can substitute in-memory fakes.
//!
//! All methods return `Send` futures so the traits can be used in
//! multi-threaded async runtimes (tokio with `axum`).

use std::future::Future;

use uuid::Uuid;

use crate::{
  alert::{AlertEvent, NewAlertEvent},
  checkin::{CheckIn, NewCheckIn},
  contact::{FamilyContact, NewContact},
  geo::LonLat,
  user::{NewUser, User},
  zone::{NewZone, Zone},
};

// ─── Zones ───────────────────────────────────────────────────────────────────

/// The geometry store: zone records plus the two geography predicates.
///
/// Both spatial queries treat a row whose stored geometry fails to decode
/// as a data-quality fault isolated to that row: the row is skipped (and
/// logged), never propagated as a query failure.
pub trait ZoneStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  fn insert_zone(
    &self,
    input: NewZone,
  ) -> impl Future<Output = Result<Zone, Self::Error>> + Send + '_;

  fn get_zone(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Zone>, Self::Error>> + Send + '_;

  fn list_zones(
    &self,
  ) -> impl Future<Output = Result<Vec<Zone>, Self::Error>> + Send + '_;

  /// First zone whose **area** geometry contains `point` under
  /// great-circle semantics. Point-type zones never match. When several
  /// zones overlap, the winner is the first by ascending zone id — a
  /// stable, documented tie-break.
  fn find_containing(
    &self,
    point: LonLat,
  ) -> impl Future<Output = Result<Option<Zone>, Self::Error>> + Send + '_;

  /// Every zone whose geometry lies within `radius_m` metres of `point`,
  /// measured as true geographic distance. Ordered ascending by zone id.
  fn find_within(
    &self,
    point: LonLat,
    radius_m: f64,
  ) -> impl Future<Output = Result<Vec<Zone>, Self::Error>> + Send + '_;

  /// Administrative removal. Returns `false` if the zone did not exist.
  fn delete_zone(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;
}

// ─── Roster ──────────────────────────────────────────────────────────────────

/// Outcome of a conditional contact insert. The cap check and the insert
/// happen atomically per owner inside the store, so two concurrent adds
/// can never both pass the check.
#[derive(Debug, Clone, PartialEq)]
pub enum ContactInsert {
  Inserted(FamilyContact),
  CapReached,
}

pub trait RosterStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Insert unless the owner already has the maximum number of contacts.
  /// Validation of the contact fields happens in [`crate::roster::Roster`]
  /// before this is called.
  fn insert_contact(
    &self,
    owner: Uuid,
    input: NewContact,
  ) -> impl Future<Output = Result<ContactInsert, Self::Error>> + Send + '_;

  /// All of the owner's contacts, in creation order.
  fn list_contacts(
    &self,
    owner: Uuid,
  ) -> impl Future<Output = Result<Vec<FamilyContact>, Self::Error>> + Send + '_;

  /// Owner-scoped delete; a no-op (not an error) when the id does not
  /// exist or belongs to someone else.
  fn remove_contact(
    &self,
    owner: Uuid,
    contact_id: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;
}

// ─── Users ───────────────────────────────────────────────────────────────────

pub trait UserStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  fn insert_user(
    &self,
    input: NewUser,
  ) -> impl Future<Output = Result<User, Self::Error>> + Send + '_;

  fn get_user(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send + '_;

  /// Administrative removal; owned records (contacts, check-ins) cascade.
  fn delete_user(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;
}

// ─── Alerts ──────────────────────────────────────────────────────────────────

pub trait AlertStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  fn insert_alert(
    &self,
    input: NewAlertEvent,
  ) -> impl Future<Output = Result<AlertEvent, Self::Error>> + Send + '_;

  /// The owner's alert history, newest first.
  fn list_alerts(
    &self,
    owner: Uuid,
  ) -> impl Future<Output = Result<Vec<AlertEvent>, Self::Error>> + Send + '_;
}

// ─── Check-ins ───────────────────────────────────────────────────────────────

pub trait CheckinStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  fn insert_checkin(
    &self,
    input: NewCheckIn,
  ) -> impl Future<Output = Result<CheckIn, Self::Error>> + Send + '_;

  /// The owner's check-ins, newest first.
  fn list_checkins(
    &self,
    owner: Uuid,
  ) -> impl Future<Output = Result<Vec<CheckIn>, Self::Error>> + Send + '_;
}
