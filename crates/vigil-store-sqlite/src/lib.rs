//! SQLite backend for the Vigil stores.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated
//! thread without blocking the async runtime. SQLite has no spatial
//! extension here, so the geography predicates (`find_containing`,
//! `find_within`) scan the zones table and apply `vigil-core`'s
//! great-circle math per row.

mod encode;
mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::SqliteStore;

#[cfg(test)]
mod tests;
