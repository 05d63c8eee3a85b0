//! The alert dispatcher: partial-failure-tolerant fan-out of one SOS
//! message to every phone-bearing roster contact.
//!
//! Send attempts run concurrently, one spawned task per contact (the
//! roster cap bounds the fan-out at five). A failure against one contact
//! is recorded and logged but never aborts the siblings. The whole
//! pipeline itself runs on its own task, so a caller that disconnects
//! mid-dispatch cannot cancel in-flight sends or the AlertEvent write.

use std::{future::Future, sync::Arc};

use thiserror::Error;
use uuid::Uuid;

use crate::{
  Error, Result,
  alert::{AlertEvent, NewAlertEvent},
  geo::PositionSample,
  query::require_finite,
  store::{AlertStore, RosterStore, UserStore},
  user::User,
};

// ─── Transport boundary ──────────────────────────────────────────────────────

/// One accepted submission. "Accepted" means the transport took the
/// message, not that the recipient received it.
#[derive(Debug, Clone, PartialEq)]
pub struct SendOutcome {
  pub to: String,
}

#[derive(Debug, Clone, Error)]
#[error("send to {to} failed: {reason}")]
pub struct SendError {
  pub to:     String,
  pub reason: String,
}

/// External messaging transport: one call per recipient per trigger.
pub trait SmsTransport: Send + Sync {
  fn send(
    &self,
    to: &str,
    body: &str,
  ) -> impl Future<Output = Result<SendOutcome, SendError>> + Send;
}

// ─── Dispatcher ──────────────────────────────────────────────────────────────

/// What the caller gets back: the attempt count and the persisted event.
/// `notified` counts attempts made against contacts with a phone number,
/// never confirmed deliveries.
#[derive(Debug, Clone)]
pub struct DispatchReceipt {
  pub notified: usize,
  pub alert:    AlertEvent,
}

pub struct Dispatcher<S, T> {
  store:     Arc<S>,
  transport: Arc<T>,
}

impl<S, T> Clone for Dispatcher<S, T> {
  fn clone(&self) -> Self {
    Self {
      store:     Arc::clone(&self.store),
      transport: Arc::clone(&self.transport),
    }
  }
}

impl<S, T> Dispatcher<S, T>
where
  S: UserStore + RosterStore + AlertStore + 'static,
  T: SmsTransport + 'static,
{
  pub fn new(store: Arc<S>, transport: Arc<T>) -> Self {
    Self { store, transport }
  }

  /// Trigger an emergency alert for `owner` at `position`.
  ///
  /// Fatal preconditions: [`Error::OwnerNotFound`] when the owner record
  /// is missing, [`Error::NoRecipients`] when the roster is empty (an
  /// emergency dispatch with zero recipients is an error, not a silent
  /// no-op) — neither persists anything nor sends anything. Per-contact
  /// send failures are swallowed here and visible only in logs.
  pub async fn trigger(
    &self,
    owner: Uuid,
    position: PositionSample,
    message: Option<String>,
  ) -> Result<DispatchReceipt> {
    require_finite(position)?;

    let store = Arc::clone(&self.store);
    let transport = Arc::clone(&self.transport);

    // Detached task: dropping the returned future (client disconnect)
    // must not drop an emergency alert on the floor.
    tokio::spawn(run_trigger(store, transport, owner, position, message))
      .await
      .map_err(Error::store)?
  }
}

async fn run_trigger<S, T>(
  store: Arc<S>,
  transport: Arc<T>,
  owner: Uuid,
  position: PositionSample,
  message: Option<String>,
) -> Result<DispatchReceipt>
where
  S: UserStore + RosterStore + AlertStore + 'static,
  T: SmsTransport + 'static,
{
  let user = store
    .get_user(owner)
    .await
    .map_err(Error::store)?
    .ok_or(Error::OwnerNotFound(owner))?;

  let contacts = store.list_contacts(owner).await.map_err(Error::store)?;
  if contacts.is_empty() {
    return Err(Error::NoRecipients);
  }

  let body = alert_body(&user, position, message.as_deref());

  let mut handles = Vec::with_capacity(contacts.len());
  for contact in &contacts {
    let Some(phone) = contact.phone.clone() else {
      tracing::debug!(
        contact_id = %contact.contact_id,
        "skipping contact without a phone number"
      );
      continue;
    };
    let transport = Arc::clone(&transport);
    let body = body.clone();
    let to = phone.clone();
    let handle =
      tokio::spawn(async move { transport.send(&phone, &body).await });
    handles.push((to, handle));
  }
  let attempted = handles.len();

  // Await every attempt before persisting; failures are collected, not
  // propagated.
  let mut outcomes: Vec<Result<SendOutcome, SendError>> =
    Vec::with_capacity(attempted);
  for (to, handle) in handles {
    match handle.await {
      Ok(result) => outcomes.push(result),
      Err(e) => outcomes.push(Err(SendError {
        to,
        reason: format!("send task failed: {e}"),
      })),
    }
  }

  for outcome in &outcomes {
    if let Err(e) = outcome {
      tracing::warn!(owner = %owner, error = %e, "alert send failed");
    }
  }
  let accepted = outcomes.iter().filter(|o| o.is_ok()).count();
  tracing::info!(
    owner = %owner,
    attempted,
    accepted,
    "alert fan-out complete"
  );

  let alert = store
    .insert_alert(NewAlertEvent {
      owner_id:  owner,
      latitude:  position.latitude,
      longitude: position.longitude,
      message:   message.unwrap_or_default(),
    })
    .await
    .map_err(Error::store)?;

  Ok(DispatchReceipt { notified: attempted, alert })
}

/// Fixed alert template: the owner's display identity, the caller's
/// message when present, and a map link built from the trigger position
/// (map links are latitude-first, unlike stored geometry).
fn alert_body(user: &User, position: PositionSample, message: Option<&str>) -> String {
  let mut body = format!("SOS ALERT\n{} ({}) needs help.", user.name, user.email);
  if let Some(msg) = message.filter(|m| !m.trim().is_empty()) {
    body.push('\n');
    body.push_str(msg);
  }
  body.push_str(&format!(
    "\nLocation: https://maps.google.com/?q={},{}",
    position.latitude, position.longitude
  ));
  body
}

#[cfg(test)]
mod tests {
  use std::{
    collections::HashMap,
    sync::Mutex,
  };

  use chrono::Utc;

  use super::*;
  use crate::{
    contact::{FamilyContact, NewContact},
    store::ContactInsert,
    user::Role,
  };

  #[derive(Debug, thiserror::Error)]
  #[error("mem store error")]
  struct MemError;

  /// In-memory store covering the three traits the dispatcher needs.
  #[derive(Default)]
  struct MemStore {
    users:    Mutex<HashMap<Uuid, User>>,
    contacts: Mutex<Vec<FamilyContact>>,
    alerts:   Mutex<Vec<AlertEvent>>,
  }

  impl MemStore {
    fn with_user(name: &str) -> (Arc<Self>, Uuid) {
      let store = Arc::new(Self::default());
      let id = Uuid::new_v4();
      store.users.lock().unwrap().insert(
        id,
        User {
          user_id:    id,
          name:       name.to_string(),
          email:      format!("{}@example.com", name.to_lowercase()),
          role:       Role::User,
          created_at: Utc::now(),
        },
      );
      (store, id)
    }

    fn push_contact(&self, owner: Uuid, name: &str, phone: Option<&str>) {
      self.contacts.lock().unwrap().push(FamilyContact {
        contact_id: Uuid::new_v4(),
        owner_id:   owner,
        name:       name.to_string(),
        phone:      phone.map(str::to_string),
        email:      None,
        created_at: Utc::now(),
      });
    }
  }

  impl UserStore for MemStore {
    type Error = MemError;

    async fn insert_user(&self, _input: crate::user::NewUser) -> Result<User, MemError> {
      unimplemented!("not needed by these tests")
    }

    async fn get_user(&self, id: Uuid) -> Result<Option<User>, MemError> {
      Ok(self.users.lock().unwrap().get(&id).cloned())
    }

    async fn delete_user(&self, _id: Uuid) -> Result<bool, MemError> {
      unimplemented!("not needed by these tests")
    }
  }

  impl RosterStore for MemStore {
    type Error = MemError;

    async fn insert_contact(
      &self,
      _owner: Uuid,
      _input: NewContact,
    ) -> Result<ContactInsert, MemError> {
      unimplemented!("not needed by these tests")
    }

    async fn list_contacts(
      &self,
      owner: Uuid,
    ) -> Result<Vec<FamilyContact>, MemError> {
      Ok(
        self
          .contacts
          .lock()
          .unwrap()
          .iter()
          .filter(|c| c.owner_id == owner)
          .cloned()
          .collect(),
      )
    }

    async fn remove_contact(
      &self,
      _owner: Uuid,
      _contact_id: Uuid,
    ) -> Result<(), MemError> {
      unimplemented!("not needed by these tests")
    }
  }

  impl AlertStore for MemStore {
    type Error = MemError;

    async fn insert_alert(
      &self,
      input: NewAlertEvent,
    ) -> Result<AlertEvent, MemError> {
      let alert = AlertEvent {
        alert_id:   Uuid::new_v4(),
        owner_id:   input.owner_id,
        latitude:   input.latitude,
        longitude:  input.longitude,
        message:    input.message,
        created_at: Utc::now(),
        resolved:   false,
      };
      self.alerts.lock().unwrap().push(alert.clone());
      Ok(alert)
    }

    async fn list_alerts(&self, _owner: Uuid) -> Result<Vec<AlertEvent>, MemError> {
      unimplemented!("not needed by these tests")
    }
  }

  /// Transport that accepts everything except one configured number, and
  /// records the accepted submissions.
  #[derive(Default)]
  struct FlakyTransport {
    fail_number: Option<String>,
    submitted:   Mutex<Vec<String>>,
  }

  impl SmsTransport for FlakyTransport {
    async fn send(&self, to: &str, _body: &str) -> Result<SendOutcome, SendError> {
      if self.fail_number.as_deref() == Some(to) {
        return Err(SendError {
          to:     to.to_string(),
          reason: "provider rejected the message".to_string(),
        });
      }
      self.submitted.lock().unwrap().push(to.to_string());
      Ok(SendOutcome { to: to.to_string() })
    }
  }

  fn sample() -> PositionSample {
    PositionSample::new(26.145, 91.737)
  }

  #[tokio::test]
  async fn one_failing_send_does_not_affect_the_others() {
    let (store, owner) = MemStore::with_user("Asha");
    store.push_contact(owner, "Ravi", Some("+919876543210"));
    store.push_contact(owner, "Mina", Some("+919876543211"));
    store.push_contact(owner, "Tara", Some("+919876543212"));

    let transport = Arc::new(FlakyTransport {
      fail_number: Some("+919876543211".to_string()),
      ..Default::default()
    });
    let dispatcher = Dispatcher::new(Arc::clone(&store), Arc::clone(&transport));

    let receipt = dispatcher
      .trigger(owner, sample(), Some("help".to_string()))
      .await
      .unwrap();

    // All three contacts were attempted, two submissions went through,
    // exactly one event was persisted.
    assert_eq!(receipt.notified, 3);
    let mut submitted = transport.submitted.lock().unwrap().clone();
    submitted.sort();
    assert_eq!(submitted, vec!["+919876543210", "+919876543212"]);
    assert_eq!(store.alerts.lock().unwrap().len(), 1);
  }

  #[tokio::test]
  async fn empty_roster_is_fatal_and_persists_nothing() {
    let (store, owner) = MemStore::with_user("Asha");
    let transport = Arc::new(FlakyTransport::default());
    let dispatcher = Dispatcher::new(Arc::clone(&store), Arc::clone(&transport));

    let err = dispatcher.trigger(owner, sample(), None).await.unwrap_err();
    assert!(matches!(err, Error::NoRecipients));
    assert!(store.alerts.lock().unwrap().is_empty());
    assert!(transport.submitted.lock().unwrap().is_empty());
  }

  #[tokio::test]
  async fn unknown_owner_is_fatal() {
    let store = Arc::new(MemStore::default());
    let transport = Arc::new(FlakyTransport::default());
    let dispatcher = Dispatcher::new(Arc::clone(&store), transport);

    let missing = Uuid::new_v4();
    let err = dispatcher.trigger(missing, sample(), None).await.unwrap_err();
    assert!(matches!(err, Error::OwnerNotFound(id) if id == missing));
    assert!(store.alerts.lock().unwrap().is_empty());
  }

  #[tokio::test]
  async fn contacts_without_a_phone_are_skipped_and_not_counted() {
    let (store, owner) = MemStore::with_user("Asha");
    store.push_contact(owner, "Ravi", Some("+919876543210"));
    store.push_contact(owner, "Mail-only", None);

    let transport = Arc::new(FlakyTransport::default());
    let dispatcher = Dispatcher::new(Arc::clone(&store), Arc::clone(&transport));

    let receipt = dispatcher.trigger(owner, sample(), None).await.unwrap();
    assert_eq!(receipt.notified, 1);
    assert_eq!(transport.submitted.lock().unwrap().len(), 1);
  }

  #[tokio::test]
  async fn all_email_roster_still_persists_the_event() {
    let (store, owner) = MemStore::with_user("Asha");
    store.push_contact(owner, "Mail-only", None);

    let transport = Arc::new(FlakyTransport::default());
    let dispatcher = Dispatcher::new(Arc::clone(&store), Arc::clone(&transport));

    let receipt = dispatcher.trigger(owner, sample(), None).await.unwrap();
    assert_eq!(receipt.notified, 0);
    assert_eq!(store.alerts.lock().unwrap().len(), 1);
  }

  #[test]
  fn alert_body_embeds_identity_message_and_map_link() {
    let user = User {
      user_id:    Uuid::new_v4(),
      name:       "Asha".to_string(),
      email:      "asha@example.com".to_string(),
      role:       Role::User,
      created_at: Utc::now(),
    };
    let body = alert_body(&user, sample(), Some("trapped near the ghat"));
    assert!(body.contains("Asha (asha@example.com)"));
    assert!(body.contains("trapped near the ghat"));
    // Map links are latitude-first.
    assert!(body.contains("https://maps.google.com/?q=26.145,91.737"));
  }
}
