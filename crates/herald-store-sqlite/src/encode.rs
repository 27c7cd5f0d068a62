//! Encoding and decoding helpers between Herald domain types and the
//! plain-text representations stored in SQLite columns.
//!
//! Timestamps are RFC 3339 strings with microsecond precision. UUIDs are
//! hyphenated lowercase strings. Event kinds are stored as their numeric
//! option-set code.

use chrono::{DateTime, SecondsFormat, Utc};
use herald_core::{
  event::EventKind,
  notification::Notification,
  record::RecordRef,
  subscription::{Subscription, SubscriptionState},
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── SubscriptionState ───────────────────────────────────────────────────────

pub fn encode_state(state: SubscriptionState) -> &'static str {
  match state {
    SubscriptionState::Active => "active",
    SubscriptionState::Inactive => "inactive",
  }
}

pub fn decode_state(s: &str) -> Result<SubscriptionState> {
  match s {
    "active" => Ok(SubscriptionState::Active),
    "inactive" => Ok(SubscriptionState::Inactive),
    other => Err(Error::UnknownValue { column: "state", value: other.to_owned() }),
  }
}

// ─── EventKind ───────────────────────────────────────────────────────────────

pub fn decode_event(code: i32) -> Result<EventKind> {
  EventKind::from_code(code).ok_or_else(|| Error::UnknownValue {
    column: "event_code",
    value:  code.to_string(),
  })
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw values read directly from a `subscriptions` row.
pub struct RawSubscription {
  pub position:             i64,
  pub subscription_id:      String,
  pub lookup_name:          String,
  pub subject_id:           String,
  pub subject_logical_name: String,
  pub owner_id:             String,
  pub owner_logical_name:   String,
  pub state:                String,
  pub created_at:           String,
}

impl RawSubscription {
  pub const COLUMNS: &'static str = "position, subscription_id, lookup_name, subject_id, \
     subject_logical_name, owner_id, owner_logical_name, state, created_at";

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      position:             row.get(0)?,
      subscription_id:      row.get(1)?,
      lookup_name:          row.get(2)?,
      subject_id:           row.get(3)?,
      subject_logical_name: row.get(4)?,
      owner_id:             row.get(5)?,
      owner_logical_name:   row.get(6)?,
      state:                row.get(7)?,
      created_at:           row.get(8)?,
    })
  }

  pub fn into_subscription(self) -> Result<Subscription> {
    Ok(Subscription {
      subscription_id: decode_uuid(&self.subscription_id)?,
      lookup_name:     self.lookup_name,
      subject:         RecordRef::new(self.subject_logical_name, decode_uuid(&self.subject_id)?),
      owner:           RecordRef::new(self.owner_logical_name, decode_uuid(&self.owner_id)?),
      state:           decode_state(&self.state)?,
      created_at:      decode_dt(&self.created_at)?,
    })
  }
}

/// Raw values read directly from a `notifications` row.
pub struct RawNotification {
  pub notification_id:      String,
  pub owner_id:             String,
  pub owner_logical_name:   String,
  pub event_code:           i32,
  pub lookup_name:          String,
  pub subject_id:           String,
  pub subject_logical_name: String,
  pub data:                 String,
  pub created_at:           String,
}

impl RawNotification {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      notification_id:      row.get(0)?,
      owner_id:             row.get(1)?,
      owner_logical_name:   row.get(2)?,
      event_code:           row.get(3)?,
      lookup_name:          row.get(4)?,
      subject_id:           row.get(5)?,
      subject_logical_name: row.get(6)?,
      data:                 row.get(7)?,
      created_at:           row.get(8)?,
    })
  }

  pub fn into_notification(self) -> Result<Notification> {
    Ok(Notification {
      notification_id: decode_uuid(&self.notification_id)?,
      owner:           RecordRef::new(self.owner_logical_name, decode_uuid(&self.owner_id)?),
      event:           decode_event(self.event_code)?,
      lookup_name:     self.lookup_name,
      subject:         RecordRef::new(self.subject_logical_name, decode_uuid(&self.subject_id)?),
      data:            self.data,
      created_at:      decode_dt(&self.created_at)?,
    })
  }
}
