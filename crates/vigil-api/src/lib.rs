//! JSON REST API for Vigil.
//!
//! Exposes an axum [`Router`] backed by any store implementing the
//! `vigil-core` store traits and any [`SmsTransport`]. Auth, TLS, and
//! transport concerns are the caller's responsibility: handlers consume
//! the already-verified identity forwarded by the upstream gateway (see
//! [`identity`]).
//!
//! # Mounting
//!
//! ```rust,ignore
//! let app = vigil_api::router(store.clone(), transport.clone());
//! ```

pub mod checkin;
pub mod error;
pub mod family;
pub mod geofence;
pub mod identity;
pub mod sos;

use std::sync::Arc;

use axum::{
  Router,
  routing::{delete, get, post},
};
use vigil_core::{
  checkin::CheckIns,
  dispatch::{Dispatcher, SmsTransport},
  query::{Containment, Proximity},
  roster::Roster,
  store::{AlertStore, CheckinStore, RosterStore, UserStore, ZoneStore},
};

pub use error::ApiError;
pub use identity::Identity;

/// Everything the API needs from a storage backend, in one bound.
pub trait StoreBound:
  ZoneStore + RosterStore + UserStore + AlertStore + CheckinStore + 'static
{
}

impl<S> StoreBound for S where
  S: ZoneStore + RosterStore + UserStore + AlertStore + CheckinStore + 'static
{
}

/// Shared state threaded through all handlers: the components, each
/// constructed once with its injected store, plus the raw store for the
/// thin admin reads.
pub struct AppState<S, T> {
  pub containment: Containment<S>,
  pub proximity:   Proximity<S>,
  pub roster:      Roster<S>,
  pub checkins:    CheckIns<S>,
  pub dispatcher:  Dispatcher<S, T>,
  pub store:       Arc<S>,
}

impl<S, T> Clone for AppState<S, T> {
  fn clone(&self) -> Self {
    Self {
      containment: self.containment.clone(),
      proximity:   self.proximity.clone(),
      roster:      self.roster.clone(),
      checkins:    self.checkins.clone(),
      dispatcher:  self.dispatcher.clone(),
      store:       Arc::clone(&self.store),
    }
  }
}

/// Build a fully-materialised API router for `store` and `transport`.
pub fn router<S, T>(store: Arc<S>, transport: Arc<T>) -> Router
where
  S: StoreBound,
  T: SmsTransport + 'static,
{
  let state = AppState {
    containment: Containment::new(Arc::clone(&store)),
    proximity:   Proximity::new(Arc::clone(&store)),
    roster:      Roster::new(Arc::clone(&store)),
    checkins:    CheckIns::new(Arc::clone(&store)),
    dispatcher:  Dispatcher::new(Arc::clone(&store), transport),
    store,
  };

  Router::new()
    // Geofence queries
    .route("/geofence/check-location", post(geofence::check_location::<S, T>))
    .route("/geofence/nearby", get(geofence::nearby::<S, T>))
    .route("/geofence/create", post(geofence::create::<S, T>))
    .route("/geofence/zones", get(geofence::list::<S, T>))
    // Roster
    .route("/family", post(family::add::<S, T>).get(family::list::<S, T>))
    .route("/family/{id}", delete(family::remove::<S, T>))
    // Emergency dispatch
    .route("/sos/trigger", post(sos::trigger::<S, T>))
    .route("/sos/history", get(sos::history::<S, T>))
    // Check-ins
    .route("/checkin", post(checkin::create::<S, T>).get(checkin::list::<S, T>))
    .with_state(state)
}

// ─── Integration tests ───────────────────────────────────────────────────────
