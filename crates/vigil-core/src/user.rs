//! User — the minimal identity record the core needs.
//!
//! Registration and login live outside this system; the core only resolves
//! an already-authenticated owner id to a display identity (dispatch step
//! one) and distinguishes the admin role for privileged zone operations.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
  User,
  Admin,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
  pub user_id:    Uuid,
  pub name:       String,
  pub email:      String,
  pub role:       Role,
  pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewUser {
  pub name:  String,
  pub email: String,
  pub role:  Role,
}
