//! The emergency-contact roster: a bounded, validated list per user.
//!
//! Validation runs before any store access. The cap itself is enforced by
//! the store's atomic conditional insert, so concurrent adds cannot
//! overshoot it.

use std::sync::{Arc, LazyLock};

use regex::Regex;
use uuid::Uuid;

use crate::{
  Error, Result,
  contact::{FamilyContact, NewContact},
  store::{ContactInsert, RosterStore},
};

/// Upper bound on contacts per user.
pub const MAX_CONTACTS: usize = 5;

/// Accepted phone shape: `+` then an E.164 country code (1–3 digits, no
/// leading zero) followed by a 10-digit mobile number starting 6–9, e.g.
/// `+919876543210`.
static PHONE_RE: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"^\+[1-9]\d{0,2}[6-9]\d{9}$").expect("phone pattern compiles")
});

/// Basic `local@domain.tld` shape; no attempt at full RFC 5322.
static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s.]+$").expect("email pattern compiles")
});

pub struct Roster<S> {
  store: Arc<S>,
}

impl<S> Clone for Roster<S> {
  fn clone(&self) -> Self {
    Self { store: Arc::clone(&self.store) }
  }
}

impl<S: RosterStore> Roster<S> {
  pub fn new(store: Arc<S>) -> Self {
    Self { store }
  }

  pub async fn add(&self, owner: Uuid, input: NewContact) -> Result<FamilyContact> {
    validate(&input)?;
    match self
      .store
      .insert_contact(owner, input)
      .await
      .map_err(Error::store)?
    {
      ContactInsert::Inserted(contact) => Ok(contact),
      ContactInsert::CapReached => Err(Error::LimitExceeded),
    }
  }

  /// The owner's contacts in creation order.
  pub async fn list(&self, owner: Uuid) -> Result<Vec<FamilyContact>> {
    self.store.list_contacts(owner).await.map_err(Error::store)
  }

  /// Always succeeds: removing an unknown or foreign id is a no-op. The
  /// owner scoping happens inside the store's delete, never as a separate
  /// lookup.
  pub async fn remove(&self, owner: Uuid, contact_id: Uuid) -> Result<()> {
    self
      .store
      .remove_contact(owner, contact_id)
      .await
      .map_err(Error::store)
  }
}

fn validate(input: &NewContact) -> Result<()> {
  if input.name.trim().is_empty() {
    return Err(Error::validation("contact name must not be empty"));
  }
  if let Some(phone) = &input.phone {
    if !PHONE_RE.is_match(phone) {
      return Err(Error::validation(format!(
        "invalid phone number {phone:?}: expected +<countrycode> followed by \
         a 10-digit mobile number starting 6-9"
      )));
    }
  }
  if let Some(email) = &input.email {
    if !EMAIL_RE.is_match(email) {
      return Err(Error::validation(format!("invalid email address {email:?}")));
    }
  }
  if input.phone.is_none() && input.email.is_none() {
    return Err(Error::validation(
      "a contact needs at least one of phone or email",
    ));
  }
  Ok(())
}
