//! Notification records, the serialized event payload, and the per-subscriber
//! write loop.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  Error, Result,
  event::EventKind,
  record::RecordRef,
  store::NotificationStore,
  subscription::Subscription,
};

// ─── Payload ─────────────────────────────────────────────────────────────────

/// The payload stored on every notification of one invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventData {
  /// Relevant attribute names; `None` when only a reference was supplied.
  pub updated_fields:         Option<Vec<String>>,
  pub event_record_reference: RecordRef,
}

impl EventData {
  /// Serialize to the string persisted on each notification.
  pub fn to_json(&self) -> Result<String> { Ok(serde_json::to_string(self)?) }

  pub fn from_json(raw: &str) -> Result<Self> { Ok(serde_json::from_str(raw)?) }
}

// ─── Notification ────────────────────────────────────────────────────────────

/// Input to [`NotificationStore::create_notification`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewNotification {
  pub owner:       RecordRef,
  pub event:       EventKind,
  /// Attribute name the subject is stored under.
  pub lookup_name: String,
  pub subject:     RecordRef,
  /// Serialized [`EventData`].
  pub data:        String,
}

/// A persisted, per-subscriber record of one event. Never mutated after
/// creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
  pub notification_id: Uuid,
  pub owner:           RecordRef,
  pub event:           EventKind,
  pub lookup_name:     String,
  pub subject:         RecordRef,
  pub data:            String,
  pub created_at:      DateTime<Utc>,
}

// ─── Fan-out ─────────────────────────────────────────────────────────────────

/// Everything shared by the notifications of a single invocation.
#[derive(Debug, Clone)]
pub struct Broadcast<'a> {
  pub event:       EventKind,
  pub lookup_name: &'a str,
  pub subject:     &'a RecordRef,
  pub data:        &'a str,
}

/// Write one notification per subscription, sequentially.
///
/// A failed write stops the loop. Notifications already written stay
/// persisted and are reported through [`Error::PartialFanout`].
pub async fn fan_out<S: NotificationStore>(
  store: &S,
  subscriptions: &[Subscription],
  broadcast: &Broadcast<'_>,
) -> Result<Vec<Notification>> {
  let mut written = Vec::with_capacity(subscriptions.len());

  for subscription in subscriptions {
    let input = NewNotification {
      owner:       subscription.owner.clone(),
      event:       broadcast.event,
      lookup_name: broadcast.lookup_name.to_owned(),
      subject:     broadcast.subject.clone(),
      data:        broadcast.data.to_owned(),
    };

    match store.create_notification(input).await {
      Ok(notification) => written.push(notification),
      Err(e) => {
        let delivered: Vec<Uuid> =
          written.iter().map(|n: &Notification| n.notification_id).collect();
        tracing::warn!(
          owner = %subscription.owner.id,
          delivered = delivered.len(),
          remaining = subscriptions.len() - delivered.len(),
          error = %e,
          "notification write failed, fan-out incomplete"
        );
        return Err(Error::PartialFanout {
          delivered,
          failed_owner: subscription.owner.id,
          source: Box::new(e),
        });
      }
    }
  }

  Ok(written)
}
