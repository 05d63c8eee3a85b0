//! Handlers for `/family` endpoints — the emergency-contact roster.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `POST`   | `/family` | Body: `{"name":…,"phone":…,"email":…}`; 201 on success |
//! | `GET`    | `/family` | Creation order |
//! | `DELETE` | `/family/{id}` | Always ok; owner-scoped |

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use serde_json::json;
use uuid::Uuid;
use vigil_core::{
  contact::{FamilyContact, NewContact},
  dispatch::SmsTransport,
};

use crate::{AppState, StoreBound, error::ApiError, identity::Identity};

/// `POST /family`
pub async fn add<S, T>(
  State(app): State<AppState<S, T>>,
  identity: Identity,
  Json(body): Json<NewContact>,
) -> Result<impl IntoResponse, ApiError>
where
  S: StoreBound,
  T: SmsTransport + 'static,
{
  let contact = app.roster.add(identity.user_id, body).await?;
  Ok((StatusCode::CREATED, Json(contact)))
}

/// `GET /family`
pub async fn list<S, T>(
  State(app): State<AppState<S, T>>,
  identity: Identity,
) -> Result<Json<Vec<FamilyContact>>, ApiError>
where
  S: StoreBound,
  T: SmsTransport + 'static,
{
  let contacts = app.roster.list(identity.user_id).await?;
  Ok(Json(contacts))
}

/// `DELETE /family/{id}` — a no-op for unknown or foreign ids.
pub async fn remove<S, T>(
  State(app): State<AppState<S, T>>,
  identity: Identity,
  Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError>
where
  S: StoreBound,
  T: SmsTransport + 'static,
{
  app.roster.remove(identity.user_id, id).await?;
  Ok(Json(json!({ "removed": true })))
}
