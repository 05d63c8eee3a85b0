//! SQL schema for the Vigil SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! the `PRAGMA user_version` number.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS users (
    user_id     TEXT PRIMARY KEY,
    name        TEXT NOT NULL,
    email       TEXT NOT NULL,
    role        TEXT NOT NULL DEFAULT 'user',   -- 'user' | 'admin'
    created_at  TEXT NOT NULL
);

-- Zones are system-owned and immutable once created: no UPDATE is ever
-- issued against this table, only admin-level INSERT and DELETE.
CREATE TABLE IF NOT EXISTS zones (
    zone_id            TEXT PRIMARY KEY,
    name               TEXT NOT NULL,
    geometry_json      TEXT NOT NULL,   -- GeoJSON, longitude-first
    authority_contact  TEXT,            -- JSON or NULL
    created_at         TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS family_contacts (
    contact_id  TEXT PRIMARY KEY,
    owner_id    TEXT NOT NULL REFERENCES users(user_id) ON DELETE CASCADE,
    name        TEXT NOT NULL,
    phone       TEXT,
    email       TEXT,
    created_at  TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS sos_alerts (
    alert_id    TEXT PRIMARY KEY,
    owner_id    TEXT NOT NULL REFERENCES users(user_id),
    latitude    REAL NOT NULL,
    longitude   REAL NOT NULL,
    message     TEXT NOT NULL DEFAULT '',
    created_at  TEXT NOT NULL,
    resolved    INTEGER NOT NULL DEFAULT 0
);

CREATE TABLE IF NOT EXISTS checkins (
    checkin_id  TEXT PRIMARY KEY,
    owner_id    TEXT NOT NULL REFERENCES users(user_id) ON DELETE CASCADE,
    zone_id     TEXT REFERENCES zones(zone_id) ON DELETE SET NULL,
    photo_ref   TEXT NOT NULL,
    created_at  TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS contacts_owner_idx ON family_contacts(owner_id);
CREATE INDEX IF NOT EXISTS alerts_owner_idx   ON sos_alerts(owner_id);
CREATE INDEX IF NOT EXISTS checkins_owner_idx ON checkins(owner_id);

PRAGMA user_version = 1;
";
