//! [`Fanout`]: the single entry point invoked by the triggering platform.
//!
//! One invocation runs to completion: classify the operation, resolve the
//! subject, collect the captured fields, look up subscribers, then write one
//! notification per subscriber. Missing targets and unresolved subjects end
//! the invocation quietly; storage failures propagate.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  Error, Result,
  config::FanoutConfig,
  event::EventKind,
  filter::captured_fields,
  notification::{Broadcast, EventData, fan_out},
  record::{Image, RecordRef, Target},
  resolve::{SkipReason, resolve},
  store::NotificationStore,
  subscription::{SubscriptionQuery, find_subscribers},
};

// ─── Invocation ──────────────────────────────────────────────────────────────

/// Everything the platform supplies for one triggering call.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Invocation {
  /// Operation name, e.g. `"Update"`.
  pub message:    String,
  pub target:     Option<Target>,
  /// Pre-images in the order the platform supplied them.
  #[serde(default)]
  pub pre_images: Vec<Image>,
  /// The acting user.
  pub user_id:    Uuid,
}

/// What an invocation did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
  Skipped { reason: SkipReason },
  Delivered(Delivery),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Delivery {
  pub event:         EventKind,
  pub subject:       RecordRef,
  /// IDs of the notifications written, one per subscriber.
  pub notifications: Vec<Uuid>,
}

// ─── Engine ──────────────────────────────────────────────────────────────────

/// The fan-out engine. Cloning is cheap; store and config are shared.
pub struct Fanout<S> {
  store:  Arc<S>,
  config: Arc<FanoutConfig>,
}

impl<S> Clone for Fanout<S> {
  fn clone(&self) -> Self {
    Self { store: Arc::clone(&self.store), config: Arc::clone(&self.config) }
  }
}

impl<S: NotificationStore> Fanout<S> {
  /// Build an engine, validating `config` once up front.
  pub fn new(store: Arc<S>, config: FanoutConfig) -> Result<Self> {
    config.validate()?;
    Ok(Self { store, config: Arc::new(config) })
  }

  pub fn config(&self) -> &FanoutConfig { &self.config }

  pub fn store(&self) -> &Arc<S> { &self.store }

  /// Run one invocation.
  pub async fn execute(&self, invocation: &Invocation) -> Result<Outcome> {
    let event = EventKind::classify(&invocation.message);
    tracing::debug!(message = %invocation.message, %event, "classified operation");

    let resolved = match resolve(
      &self.config,
      invocation.target.as_ref(),
      &invocation.pre_images,
    ) {
      Ok(resolved) => resolved,
      Err(reason) => {
        tracing::info!(?reason, %event, "failed to find subject, skipping");
        return Ok(Outcome::Skipped { reason });
      }
    };

    tracing::debug!(
      event_record = %resolved.event_record.id,
      subject = %resolved.subject.id,
      subject_type = %resolved.subject.logical_name,
      "resolved subject"
    );

    let data = EventData {
      updated_fields:         captured_fields(
        invocation.target.as_ref().and_then(Target::attributes),
        self.config.captured_fields.as_deref(),
      ),
      event_record_reference: resolved.event_record,
    };

    let query = SubscriptionQuery::for_subject(
      &self.config,
      &resolved.subject,
      invocation.user_id,
    );
    let subscriptions =
      find_subscribers(self.store.as_ref(), &query, self.config.page_size)
        .await
        .map_err(|e| Error::Subscriptions(Box::new(e)))?;

    let payload = data.to_json()?;
    let broadcast = Broadcast {
      event,
      lookup_name: &self.config.notification_lookup_name,
      subject: &resolved.subject,
      data: &payload,
    };
    let written = fan_out(self.store.as_ref(), &subscriptions, &broadcast).await?;

    tracing::info!(
      subject = %resolved.subject.id,
      %event,
      count = written.len(),
      "notifications created"
    );

    Ok(Outcome::Delivered(Delivery {
      event,
      subject: resolved.subject,
      notifications: written.into_iter().map(|n| n.notification_id).collect(),
    }))
  }
}
