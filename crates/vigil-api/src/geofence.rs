//! Handlers for `/geofence` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/geofence/check-location` | Body: `{"latitude":…,"longitude":…}` |
//! | `GET`  | `/geofence/nearby` | `?lat&lon[&radius]`, radius defaults to 5000 m |
//! | `POST` | `/geofence/create` | Admin only; body: `{"name":…,"wkt":…}` |
//! | `GET`  | `/geofence/zones` | Admin only |

use axum::{
  Json,
  extract::{Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use vigil_core::{
  dispatch::SmsTransport,
  geo::PositionSample,
  geometry::parse_wkt,
  query::ZoneFeature,
  zone::{AuthorityContact, NewZone, Zone},
};

use crate::{AppState, StoreBound, error::ApiError, identity::Identity};

// ─── Check location ──────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CheckLocationBody {
  pub latitude:  f64,
  pub longitude: f64,
}

#[derive(Debug, Serialize)]
pub struct CheckLocationResponse {
  pub inside: bool,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub zone:   Option<ZoneRef>,
}

#[derive(Debug, Serialize)]
pub struct ZoneRef {
  pub id:   Uuid,
  pub name: String,
}

/// `POST /geofence/check-location`
pub async fn check_location<S, T>(
  State(app): State<AppState<S, T>>,
  _identity: Identity,
  Json(body): Json<CheckLocationBody>,
) -> Result<Json<CheckLocationResponse>, ApiError>
where
  S: StoreBound,
  T: SmsTransport + 'static,
{
  let sample = PositionSample::new(body.latitude, body.longitude);
  let zone = app.containment.check(sample).await?;

  Ok(Json(match zone {
    Some(z) => CheckLocationResponse {
      inside: true,
      zone:   Some(ZoneRef { id: z.zone_id, name: z.name }),
    },
    None => CheckLocationResponse { inside: false, zone: None },
  }))
}

// ─── Nearby ──────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct NearbyParams {
  pub lat:    f64,
  pub lon:    f64,
  /// Metres; defaults to [`vigil_core::query::DEFAULT_NEARBY_RADIUS_M`].
  pub radius: Option<f64>,
}

/// `GET /geofence/nearby?lat=<lat>&lon=<lon>[&radius=<m>]`
pub async fn nearby<S, T>(
  State(app): State<AppState<S, T>>,
  _identity: Identity,
  Query(params): Query<NearbyParams>,
) -> Result<Json<Vec<ZoneFeature>>, ApiError>
where
  S: StoreBound,
  T: SmsTransport + 'static,
{
  let sample = PositionSample::new(params.lat, params.lon);
  let features = app.proximity.nearby(sample, params.radius).await?;
  Ok(Json(features))
}

// ─── Create (admin) ──────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CreateZoneBody {
  pub name:              String,
  /// `POLYGON((lon lat, …))` or `POINT(lon lat)`, longitude first.
  pub wkt:               String,
  pub authority_contact: Option<AuthorityContact>,
}

/// `POST /geofence/create` — privileged.
pub async fn create<S, T>(
  State(app): State<AppState<S, T>>,
  identity: Identity,
  Json(body): Json<CreateZoneBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: StoreBound,
  T: SmsTransport + 'static,
{
  identity.require_admin()?;

  if body.name.trim().is_empty() {
    return Err(ApiError::BadRequest("zone name must not be empty".into()));
  }
  let geometry =
    parse_wkt(&body.wkt).map_err(|e| ApiError::BadRequest(e.to_string()))?;

  let zone = app
    .store
    .insert_zone(NewZone {
      name: body.name,
      geometry,
      authority_contact: body.authority_contact,
    })
    .await
    .map_err(ApiError::unavailable)?;

  Ok((StatusCode::CREATED, Json(zone)))
}

/// `GET /geofence/zones` — privileged; feeds the admin map editor.
pub async fn list<S, T>(
  State(app): State<AppState<S, T>>,
  identity: Identity,
) -> Result<Json<Vec<Zone>>, ApiError>
where
  S: StoreBound,
  T: SmsTransport + 'static,
{
  identity.require_admin()?;
  let zones = app.store.list_zones().await.map_err(ApiError::unavailable)?;
  Ok(Json(zones))
}
