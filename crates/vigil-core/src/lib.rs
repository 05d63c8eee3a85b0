//! Core types and trait definitions for the Vigil geofence service.
//!
//! This crate holds the domain model (zones, contacts, alerts, check-ins),
//! the spherical geometry math, the store trait boundary, and the three
//! components with real behaviour: the containment/proximity evaluators,
//! the roster, and the alert dispatcher. It is deliberately free of HTTP
//! and database dependencies; every component is constructed with an
//! injected store so tests can substitute an in-memory fake.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod alert;
pub mod checkin;
pub mod contact;
pub mod dispatch;
pub mod error;
pub mod geo;
pub mod geometry;
pub mod query;
pub mod roster;
pub mod store;
pub mod user;
pub mod zone;

pub use error::{Error, Result};
