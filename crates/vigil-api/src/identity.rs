//! Request identity.
//!
//! The core never authenticates. An upstream gateway terminates auth and
//! forwards the verified identity in two headers: `x-vigil-user` (the
//! owner's UUID, required) and `x-vigil-role` (`admin` for operators,
//! anything else means a regular user).

use axum::{extract::FromRequestParts, http::request::Parts};
use uuid::Uuid;
use vigil_core::user::Role;

use crate::error::ApiError;

pub const USER_HEADER: &str = "x-vigil-user";
pub const ROLE_HEADER: &str = "x-vigil-role";

#[derive(Debug, Clone, Copy)]
pub struct Identity {
  pub user_id: Uuid,
  pub role:    Role,
}

impl Identity {
  pub fn require_admin(&self) -> Result<(), ApiError> {
    match self.role {
      Role::Admin => Ok(()),
      Role::User => Err(ApiError::Forbidden),
    }
  }
}

impl<S: Send + Sync> FromRequestParts<S> for Identity {
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    _state: &S,
  ) -> Result<Self, Self::Rejection> {
    let user_id = parts
      .headers
      .get(USER_HEADER)
      .and_then(|v| v.to_str().ok())
      .and_then(|s| Uuid::parse_str(s).ok())
      .ok_or(ApiError::Unauthorized)?;

    let role = match parts.headers.get(ROLE_HEADER).and_then(|v| v.to_str().ok())
    {
      Some("admin") => Role::Admin,
      _ => Role::User,
    };

    Ok(Identity { user_id, role })
  }
}
