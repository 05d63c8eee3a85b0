//! FamilyContact — one entry in a user's emergency roster.
//!
//! Contacts are created and deleted, never edited; replace-by-delete-then-
//! add is the only update path. They cascade away with the owning user.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FamilyContact {
  pub contact_id: Uuid,
  pub owner_id:   Uuid,
  pub name:       String,
  pub phone:      Option<String>,
  pub email:      Option<String>,
  pub created_at: DateTime<Utc>,
}

/// Input for [`crate::roster::Roster::add`]. At least one of phone/email
/// must be present; see the roster module for the accepted patterns.
#[derive(Debug, Clone, Deserialize)]
pub struct NewContact {
  pub name:  String,
  pub phone: Option<String>,
  pub email: Option<String>,
}
