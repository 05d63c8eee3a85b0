//! Error types for `vigil-core`.

use thiserror::Error;
use uuid::Uuid;

use crate::roster::MAX_CONTACTS;

#[derive(Debug, Error)]
pub enum Error {
  /// Bad input shape; rejected before any store is touched.
  #[error("{0}")]
  Validation(String),

  /// The owner already has the maximum number of emergency contacts.
  #[error("a user may have at most {MAX_CONTACTS} emergency contacts")]
  LimitExceeded,

  /// Dispatch precondition: the triggering user has no record.
  #[error("owner not found: {0}")]
  OwnerNotFound(Uuid),

  /// Dispatch precondition: the owner's roster is empty.
  #[error("no emergency contacts to notify")]
  NoRecipients,

  /// The persistence layer failed; the caller may retry.
  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  pub fn validation(reason: impl Into<String>) -> Self {
    Error::Validation(reason.into())
  }

  pub fn store(e: impl std::error::Error + Send + Sync + 'static) -> Self {
    Error::Store(Box::new(e))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
