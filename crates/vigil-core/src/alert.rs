//! AlertEvent — the persistent record of one SOS trigger.
//!
//! Exactly one event is written per trigger, after all send attempts have
//! resolved, regardless of how many succeeded. Events are never deleted;
//! resolution is a separate administrative action.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertEvent {
  pub alert_id:   Uuid,
  pub owner_id:   Uuid,
  pub latitude:   f64,
  pub longitude:  f64,
  pub message:    String,
  pub created_at: DateTime<Utc>,
  pub resolved:   bool,
}

/// Input for [`crate::store::AlertStore::insert_alert`]; `resolved` starts
/// false.
#[derive(Debug, Clone)]
pub struct NewAlertEvent {
  pub owner_id:  Uuid,
  pub latitude:  f64,
  pub longitude: f64,
  pub message:   String,
}
