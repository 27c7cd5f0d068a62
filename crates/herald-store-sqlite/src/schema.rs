//! SQL schema for the Herald SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

-- `position` is the paging key; AUTOINCREMENT keeps it strictly increasing
-- and never reused.
CREATE TABLE IF NOT EXISTS subscriptions (
    position             INTEGER PRIMARY KEY AUTOINCREMENT,
    subscription_id      TEXT NOT NULL UNIQUE,
    lookup_name          TEXT NOT NULL,   -- attribute binding the subject
    subject_id           TEXT NOT NULL,
    subject_logical_name TEXT NOT NULL,
    owner_id             TEXT NOT NULL,
    owner_logical_name   TEXT NOT NULL,
    state                TEXT NOT NULL DEFAULT 'active',  -- 'active' | 'inactive'
    created_at           TEXT NOT NULL
);

-- Notifications are append-only.
-- No UPDATE or DELETE is ever issued against this table.
CREATE TABLE IF NOT EXISTS notifications (
    notification_id      TEXT PRIMARY KEY,
    owner_id             TEXT NOT NULL,
    owner_logical_name   TEXT NOT NULL,
    event_code           INTEGER NOT NULL,
    lookup_name          TEXT NOT NULL,
    subject_id           TEXT NOT NULL,
    subject_logical_name TEXT NOT NULL,
    data                 TEXT NOT NULL,   -- serialized EventData
    created_at           TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS subscriptions_subject_idx
    ON subscriptions(lookup_name, subject_id, state);
CREATE INDEX IF NOT EXISTS notifications_owner_idx
    ON notifications(owner_id, created_at);

PRAGMA user_version = 1;
";
