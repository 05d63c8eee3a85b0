//! Integration tests for `SqliteStore` against an in-memory database.

use uuid::Uuid;
use vigil_core::{
  alert::NewAlertEvent,
  checkin::NewCheckIn,
  contact::NewContact,
  geo::LonLat,
  geometry::{Geometry, parse_wkt},
  store::{
    AlertStore, CheckinStore, ContactInsert, RosterStore, UserStore, ZoneStore,
  },
  user::{NewUser, Role},
  zone::NewZone,
};

use crate::SqliteStore;

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory().await.expect("in-memory store")
}

fn example_ring() -> Geometry {
  Geometry::polygon(vec![
    LonLat::new(91.736, 26.144),
    LonLat::new(91.738, 26.144),
    LonLat::new(91.738, 26.146),
    LonLat::new(91.736, 26.146),
  ])
  .unwrap()
}

fn zone(name: &str, geometry: Geometry) -> NewZone {
  NewZone { name: name.to_string(), geometry, authority_contact: None }
}

fn phone_contact(name: &str, phone: &str) -> NewContact {
  NewContact {
    name:  name.to_string(),
    phone: Some(phone.to_string()),
    email: None,
  }
}

async fn seed_user(s: &SqliteStore) -> Uuid {
  s.insert_user(NewUser {
    name:  "Asha".to_string(),
    email: "asha@example.com".to_string(),
    role:  Role::User,
  })
  .await
  .unwrap()
  .user_id
}

// ─── Zones ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn insert_and_get_zone() {
  let s = store().await;
  let created = s.insert_zone(zone("riverside", example_ring())).await.unwrap();

  let fetched = s.get_zone(created.zone_id).await.unwrap().unwrap();
  assert_eq!(fetched, created);

  assert!(s.get_zone(Uuid::new_v4()).await.unwrap().is_none());
}

#[tokio::test]
async fn find_containing_inside_and_outside() {
  let s = store().await;
  let created = s.insert_zone(zone("riverside", example_ring())).await.unwrap();

  let hit = s
    .find_containing(LonLat::new(91.737, 26.145))
    .await
    .unwrap()
    .expect("inside the ring");
  assert_eq!(hit.zone_id, created.zone_id);

  assert!(
    s.find_containing(LonLat::new(78.0, 22.0)).await.unwrap().is_none()
  );
}

#[tokio::test]
async fn find_containing_never_matches_point_zones() {
  let s = store().await;
  let coord = LonLat::new(91.737, 26.145);
  s.insert_zone(zone("kiosk", Geometry::point(coord).unwrap()))
    .await
    .unwrap();

  assert!(s.find_containing(coord).await.unwrap().is_none());
}

#[tokio::test]
async fn overlap_tie_break_is_ascending_zone_id() {
  let s = store().await;
  let a = s.insert_zone(zone("first", example_ring())).await.unwrap();
  let b = s.insert_zone(zone("second", example_ring())).await.unwrap();

  let winner_id = a.zone_id.min(b.zone_id);
  for _ in 0..3 {
    let hit = s
      .find_containing(LonLat::new(91.737, 26.145))
      .await
      .unwrap()
      .unwrap();
    assert_eq!(hit.zone_id, winner_id);
  }
}

#[tokio::test]
async fn find_within_uses_geographic_distance() {
  let s = store().await;
  let near = s.insert_zone(zone("near", example_ring())).await.unwrap();
  // ~0.09° of latitude north of the ring: roughly 10 km away.
  let far_ring = parse_wkt(
    "POLYGON((91.736 26.234, 91.738 26.234, 91.738 26.236, 91.736 26.236))",
  )
  .unwrap();
  let far = s.insert_zone(zone("far", far_ring)).await.unwrap();

  let point = LonLat::new(91.737, 26.145);
  let within_2km = s.find_within(point, 2_000.0).await.unwrap();
  assert_eq!(
    within_2km.iter().map(|z| z.zone_id).collect::<Vec<_>>(),
    vec![near.zone_id]
  );

  let within_20km = s.find_within(point, 20_000.0).await.unwrap();
  let mut ids: Vec<Uuid> = within_20km.iter().map(|z| z.zone_id).collect();
  ids.sort();
  let mut expected = vec![near.zone_id, far.zone_id];
  expected.sort();
  assert_eq!(ids, expected);
}

#[tokio::test]
async fn find_within_point_zone_by_haversine() {
  let s = store().await;
  let created = s
    .insert_zone(zone(
      "kiosk",
      Geometry::point(LonLat::new(91.74, 26.145)).unwrap(),
    ))
    .await
    .unwrap();

  // ~300 m west of the kiosk.
  let point = LonLat::new(91.737, 26.145);
  let hits = s.find_within(point, 500.0).await.unwrap();
  assert_eq!(hits.len(), 1);
  assert_eq!(hits[0].zone_id, created.zone_id);

  assert!(s.find_within(point, 100.0).await.unwrap().is_empty());
}

#[tokio::test]
async fn growing_radius_never_loses_results() {
  let s = store().await;
  s.insert_zone(zone("a", example_ring())).await.unwrap();
  s.insert_zone(zone("b", Geometry::point(LonLat::new(91.75, 26.15)).unwrap()))
    .await
    .unwrap();
  s.insert_zone(zone("c", Geometry::point(LonLat::new(91.90, 26.30)).unwrap()))
    .await
    .unwrap();

  let point = LonLat::new(91.737, 26.145);
  let mut previous: Vec<Uuid> = Vec::new();
  for radius in [500.0, 2_000.0, 5_000.0, 50_000.0] {
    let ids: Vec<Uuid> = s
      .find_within(point, radius)
      .await
      .unwrap()
      .iter()
      .map(|z| z.zone_id)
      .collect();
    assert!(
      previous.iter().all(|id| ids.contains(id)),
      "result set shrank between radii"
    );
    previous = ids;
  }
}

#[tokio::test]
async fn malformed_geometry_row_is_skipped_not_fatal() {
  let s = store().await;
  let good = s.insert_zone(zone("good", example_ring())).await.unwrap();

  // Corrupt row injected behind the store's back: a two-vertex "polygon".
  s.conn
    .call(|conn| {
      conn.execute(
        "INSERT INTO zones (zone_id, name, geometry_json, created_at)
         VALUES ('00000000-0000-0000-0000-000000000000', 'broken',
                 '{\"type\":\"Polygon\",\"coordinates\":[[[0,0],[1,1]]]}',
                 '2024-01-01T00:00:00+00:00')",
        [],
      )?;
      Ok(())
    })
    .await
    .unwrap();

  // The corrupt row sorts first by zone id, so both queries must walk
  // past it.
  let hit = s
    .find_containing(LonLat::new(91.737, 26.145))
    .await
    .unwrap()
    .expect("good zone still found");
  assert_eq!(hit.zone_id, good.zone_id);

  let nearby = s
    .find_within(LonLat::new(91.737, 26.145), 5_000.0)
    .await
    .unwrap();
  assert_eq!(nearby.len(), 1);
}

#[tokio::test]
async fn delete_zone_reports_existence() {
  let s = store().await;
  let created = s.insert_zone(zone("temp", example_ring())).await.unwrap();

  assert!(s.delete_zone(created.zone_id).await.unwrap());
  assert!(!s.delete_zone(created.zone_id).await.unwrap());
  assert!(s.get_zone(created.zone_id).await.unwrap().is_none());
}

// ─── Roster ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn contact_cap_is_enforced() {
  let s = store().await;
  let owner = seed_user(&s).await;

  for i in 0..5 {
    let outcome = s
      .insert_contact(owner, phone_contact("c", &format!("+91987654321{i}")))
      .await
      .unwrap();
    assert!(matches!(outcome, ContactInsert::Inserted(_)));
  }

  let sixth = s
    .insert_contact(owner, phone_contact("c6", "+919876543215"))
    .await
    .unwrap();
  assert_eq!(sixth, ContactInsert::CapReached);

  assert_eq!(s.list_contacts(owner).await.unwrap().len(), 5);
}

#[tokio::test]
async fn concurrent_adds_at_the_cap_cannot_both_win() {
  let s = store().await;
  let owner = seed_user(&s).await;

  for i in 0..4 {
    s.insert_contact(owner, phone_contact("c", &format!("+91987654321{i}")))
      .await
      .unwrap();
  }

  let (a, b) = tokio::join!(
    s.insert_contact(owner, phone_contact("x", "+919876543215")),
    s.insert_contact(owner, phone_contact("y", "+919876543216")),
  );
  let outcomes = [a.unwrap(), b.unwrap()];
  let inserted = outcomes
    .iter()
    .filter(|o| matches!(o, ContactInsert::Inserted(_)))
    .count();
  assert_eq!(inserted, 1, "exactly one concurrent add may win the last slot");
  assert_eq!(s.list_contacts(owner).await.unwrap().len(), 5);
}

#[tokio::test]
async fn contacts_list_in_creation_order() {
  let s = store().await;
  let owner = seed_user(&s).await;

  for (i, name) in ["first", "second", "third"].iter().enumerate() {
    s.insert_contact(owner, phone_contact(name, &format!("+91987654321{i}")))
      .await
      .unwrap();
  }

  let names: Vec<String> = s
    .list_contacts(owner)
    .await
    .unwrap()
    .into_iter()
    .map(|c| c.name)
    .collect();
  assert_eq!(names, vec!["first", "second", "third"]);
}

#[tokio::test]
async fn remove_contact_is_owner_scoped_and_tolerant() {
  let s = store().await;
  let owner = seed_user(&s).await;
  let other = s
    .insert_user(NewUser {
      name:  "Ravi".to_string(),
      email: "ravi@example.com".to_string(),
      role:  Role::User,
    })
    .await
    .unwrap()
    .user_id;

  let ContactInsert::Inserted(contact) = s
    .insert_contact(owner, phone_contact("c", "+919876543210"))
    .await
    .unwrap()
  else {
    panic!("insert failed");
  };

  // Unknown id and cross-owner delete are both silent no-ops.
  s.remove_contact(owner, Uuid::new_v4()).await.unwrap();
  s.remove_contact(other, contact.contact_id).await.unwrap();
  assert_eq!(s.list_contacts(owner).await.unwrap().len(), 1);

  s.remove_contact(owner, contact.contact_id).await.unwrap();
  assert!(s.list_contacts(owner).await.unwrap().is_empty());
}

#[tokio::test]
async fn deleting_a_user_cascades_their_contacts() {
  let s = store().await;
  let owner = seed_user(&s).await;
  s.insert_contact(owner, phone_contact("c", "+919876543210"))
    .await
    .unwrap();

  assert!(s.delete_user(owner).await.unwrap());
  assert!(s.list_contacts(owner).await.unwrap().is_empty());
}

// ─── Users / alerts / check-ins ──────────────────────────────────────────────

#[tokio::test]
async fn insert_and_get_user() {
  let s = store().await;
  let user = s
    .insert_user(NewUser {
      name:  "Admin".to_string(),
      email: "admin@example.com".to_string(),
      role:  Role::Admin,
    })
    .await
    .unwrap();

  let fetched = s.get_user(user.user_id).await.unwrap().unwrap();
  assert_eq!(fetched, user);
  assert_eq!(fetched.role, Role::Admin);

  assert!(s.get_user(Uuid::new_v4()).await.unwrap().is_none());
}

#[tokio::test]
async fn alerts_start_unresolved_and_list_newest_first() {
  let s = store().await;
  let owner = seed_user(&s).await;

  let first = s
    .insert_alert(NewAlertEvent {
      owner_id:  owner,
      latitude:  26.145,
      longitude: 91.737,
      message:   "first".to_string(),
    })
    .await
    .unwrap();
  assert!(!first.resolved);

  s.insert_alert(NewAlertEvent {
    owner_id:  owner,
    latitude:  26.146,
    longitude: 91.738,
    message:   "second".to_string(),
  })
  .await
  .unwrap();

  let alerts = s.list_alerts(owner).await.unwrap();
  assert_eq!(alerts.len(), 2);
  assert_eq!(alerts[0].message, "second");
  assert_eq!(alerts[1].message, "first");
}

#[tokio::test]
async fn checkin_round_trip_with_and_without_zone() {
  let s = store().await;
  let owner = seed_user(&s).await;
  let z = s.insert_zone(zone("riverside", example_ring())).await.unwrap();

  s.insert_checkin(NewCheckIn {
    owner_id:  owner,
    zone_id:   Some(z.zone_id),
    photo_ref: "/uploads/a.jpg".to_string(),
  })
  .await
  .unwrap();
  s.insert_checkin(NewCheckIn {
    owner_id:  owner,
    zone_id:   None,
    photo_ref: "/uploads/b.jpg".to_string(),
  })
  .await
  .unwrap();

  let listed = s.list_checkins(owner).await.unwrap();
  assert_eq!(listed.len(), 2);
  assert_eq!(listed[0].photo_ref, "/uploads/b.jpg");
  assert_eq!(listed[0].zone_id, None);
  assert_eq!(listed[1].zone_id, Some(z.zone_id));
}
