//! Demo seeding for empty stores.

use anyhow::Context as _;
use vigil_core::{
  geo::LonLat,
  geometry::Geometry,
  store::{UserStore as _, ZoneStore as _},
  user::{NewUser, Role},
  zone::{AuthorityContact, NewZone},
};
use vigil_store_sqlite::SqliteStore;

/// Insert an example zone and an admin user, but only if the store holds
/// no zones yet. Repeated startups with `seed_demo = true` stay idempotent.
pub async fn seed_demo(store: &SqliteStore) -> anyhow::Result<()> {
  let zones = store.list_zones().await.context("failed to list zones")?;
  if !zones.is_empty() {
    tracing::debug!("store already has zones, skipping demo seed");
    return Ok(());
  }

  let geometry = Geometry::polygon(vec![
    LonLat::new(91.736, 26.144),
    LonLat::new(91.738, 26.144),
    LonLat::new(91.738, 26.146),
    LonLat::new(91.736, 26.146),
  ])
  .context("demo polygon is invalid")?;

  let zone = store
    .insert_zone(NewZone {
      name: "Example Safe Zone".to_string(),
      geometry,
      authority_contact: Some(AuthorityContact {
        authority: "City Police Control Room".to_string(),
        phone:     Some("+913612340100".to_string()),
        email:     None,
      }),
    })
    .await
    .context("failed to insert demo zone")?;

  let admin = store
    .insert_user(NewUser {
      name:  "Demo Admin".to_string(),
      email: "admin@example.com".to_string(),
      role:  Role::Admin,
    })
    .await
    .context("failed to insert demo admin")?;

  tracing::info!(
    zone_id = %zone.zone_id,
    admin_id = %admin.user_id,
    "seeded demo zone and admin user"
  );
  Ok(())
}
