//! Handlers for `/checkin` endpoints.
//!
//! A check-in that names a zone is validated server-side: the submitted
//! position must actually be inside that zone. The photo itself is stored
//! elsewhere; the body carries an opaque reference.

use axum::{
  Json,
  extract::State,
  http::StatusCode,
  response::IntoResponse,
};
use serde::Deserialize;
use uuid::Uuid;
use vigil_core::{
  checkin::CheckIn, dispatch::SmsTransport, geo::PositionSample,
};

use crate::{AppState, StoreBound, error::ApiError, identity::Identity};

#[derive(Debug, Deserialize)]
pub struct CreateCheckInBody {
  pub latitude:  f64,
  pub longitude: f64,
  pub zone_id:   Option<Uuid>,
  pub photo_ref: String,
}

/// `POST /checkin`
pub async fn create<S, T>(
  State(app): State<AppState<S, T>>,
  identity: Identity,
  Json(body): Json<CreateCheckInBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: StoreBound,
  T: SmsTransport + 'static,
{
  let sample = PositionSample::new(body.latitude, body.longitude);
  let checkin = app
    .checkins
    .create(identity.user_id, sample, body.zone_id, body.photo_ref)
    .await?;
  Ok((StatusCode::CREATED, Json(checkin)))
}

/// `GET /checkin`
pub async fn list<S, T>(
  State(app): State<AppState<S, T>>,
  identity: Identity,
) -> Result<Json<Vec<CheckIn>>, ApiError>
where
  S: StoreBound,
  T: SmsTransport + 'static,
{
  let listed = app.checkins.list(identity.user_id).await?;
  Ok(Json(listed))
}
