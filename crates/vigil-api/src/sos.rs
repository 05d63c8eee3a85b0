//! Handlers for `/sos` endpoints — emergency dispatch.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/sos/trigger` | Body: `{"latitude":…,"longitude":…,"message":…}` |
//! | `GET`  | `/sos/history` | The caller's alert events, newest first |

use axum::{Json, extract::State};
use serde::Deserialize;
use serde_json::{Value, json};
use vigil_core::{
  alert::AlertEvent, dispatch::SmsTransport, geo::PositionSample,
};

use crate::{AppState, StoreBound, error::ApiError, identity::Identity};

#[derive(Debug, Deserialize)]
pub struct TriggerBody {
  pub latitude:  f64,
  pub longitude: f64,
  pub message:   Option<String>,
}

/// `POST /sos/trigger`
///
/// The returned count is the number of send attempts made against
/// contacts with a phone number — submission, not delivery confirmation.
/// Which individual sends failed is visible only in logs, by design.
pub async fn trigger<S, T>(
  State(app): State<AppState<S, T>>,
  identity: Identity,
  Json(body): Json<TriggerBody>,
) -> Result<Json<Value>, ApiError>
where
  S: StoreBound,
  T: SmsTransport + 'static,
{
  let sample = PositionSample::new(body.latitude, body.longitude);
  let receipt = app
    .dispatcher
    .trigger(identity.user_id, sample, body.message)
    .await?;
  Ok(Json(json!({ "notified": receipt.notified })))
}

/// `GET /sos/history`
pub async fn history<S, T>(
  State(app): State<AppState<S, T>>,
  identity: Identity,
) -> Result<Json<Vec<AlertEvent>>, ApiError>
where
  S: StoreBound,
  T: SmsTransport + 'static,
{
  let alerts = app
    .store
    .list_alerts(identity.user_id)
    .await
    .map_err(ApiError::unavailable)?;
  Ok(Json(alerts))
}
