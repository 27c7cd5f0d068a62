//! [`SqliteStore`]: the SQLite implementation of [`NotificationStore`] and
//! [`SubscriptionRegistry`].

use std::path::Path;

use chrono::Utc;
use uuid::Uuid;

use herald_core::{
  notification::{NewNotification, Notification},
  store::{NotificationStore, SubscriptionRegistry},
  subscription::{
    NewSubscription, Page, PageRequest, Subscription, SubscriptionQuery, SubscriptionState,
  },
};

use crate::{
  encode::{encode_dt, encode_state, encode_uuid, RawNotification, RawSubscription},
  schema::SCHEMA,
  Error, Result,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Herald store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── NotificationStore impl ──────────────────────────────────────────────────

impl NotificationStore for SqliteStore {
  type Error = Error;

  async fn subscriptions_page(
    &self,
    query: &SubscriptionQuery,
    page: PageRequest,
  ) -> Result<Page<Subscription>> {
    let lookup_name = query.lookup_name.clone();
    let subject_id  = encode_uuid(query.subject_id);
    let exclude     = query.exclude_owner.map(encode_uuid);
    let after       = page.after;
    // One extra row tells us whether another page exists.
    let limit_val   = i64::try_from(page.limit)
      .ok()
      .and_then(|limit| limit.checked_add(1))
      .ok_or(Error::PageLimit(page.limit))?;

    let mut raws: Vec<RawSubscription> = self
      .conn
      .call(move |conn| {
        let sql = format!(
          "SELECT {}
           FROM subscriptions
           WHERE lookup_name = ?1
             AND subject_id  = ?2
             AND state       = 'active'
             AND (?3 IS NULL OR owner_id != ?3)
             AND (?4 IS NULL OR position > ?4)
           ORDER BY position
           LIMIT ?5",
          RawSubscription::COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(
            rusqlite::params![lookup_name, subject_id, exclude, after, limit_val],
            RawSubscription::from_row,
          )?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    let more = raws.len() > page.limit;
    raws.truncate(page.limit);
    let next = if more { raws.last().map(|raw| raw.position) } else { None };

    let items = raws
      .into_iter()
      .map(RawSubscription::into_subscription)
      .collect::<Result<_>>()?;

    Ok(Page { items, next })
  }

  async fn create_notification(&self, input: NewNotification) -> Result<Notification> {
    let notification = Notification {
      notification_id: Uuid::new_v4(),
      owner:           input.owner,
      event:           input.event,
      lookup_name:     input.lookup_name,
      subject:         input.subject,
      data:            input.data,
      created_at:      Utc::now(),
    };

    let id_str            = encode_uuid(notification.notification_id);
    let owner_id_str      = encode_uuid(notification.owner.id);
    let owner_name        = notification.owner.logical_name.clone();
    let event_code        = notification.event.code();
    let lookup_name       = notification.lookup_name.clone();
    let subject_id_str    = encode_uuid(notification.subject.id);
    let subject_name      = notification.subject.logical_name.clone();
    let data              = notification.data.clone();
    let created_at_str    = encode_dt(notification.created_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO notifications (
             notification_id, owner_id, owner_logical_name, event_code,
             lookup_name, subject_id, subject_logical_name, data, created_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
          rusqlite::params![
            id_str,
            owner_id_str,
            owner_name,
            event_code,
            lookup_name,
            subject_id_str,
            subject_name,
            data,
            created_at_str,
          ],
        )?;
        Ok(())
      })
      .await?;

    Ok(notification)
  }
}

// ─── SubscriptionRegistry impl ───────────────────────────────────────────────

impl SubscriptionRegistry for SqliteStore {
  async fn add_subscription(&self, input: NewSubscription) -> Result<Subscription> {
    let subscription = Subscription {
      subscription_id: Uuid::new_v4(),
      lookup_name:     input.lookup_name,
      subject:         input.subject,
      owner:           input.owner,
      state:           SubscriptionState::Active,
      created_at:      Utc::now(),
    };

    let id_str         = encode_uuid(subscription.subscription_id);
    let lookup_name    = subscription.lookup_name.clone();
    let subject_id_str = encode_uuid(subscription.subject.id);
    let subject_name   = subscription.subject.logical_name.clone();
    let owner_id_str   = encode_uuid(subscription.owner.id);
    let owner_name     = subscription.owner.logical_name.clone();
    let state_str      = encode_state(subscription.state);
    let at_str         = encode_dt(subscription.created_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO subscriptions (
             subscription_id, lookup_name, subject_id, subject_logical_name,
             owner_id, owner_logical_name, state, created_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
          rusqlite::params![
            id_str,
            lookup_name,
            subject_id_str,
            subject_name,
            owner_id_str,
            owner_name,
            state_str,
            at_str,
          ],
        )?;
        Ok(())
      })
      .await?;

    tracing::debug!(
      subscription = %subscription.subscription_id,
      subject = %subscription.subject.id,
      "subscription added"
    );
    Ok(subscription)
  }

  async fn set_subscription_state(
    &self,
    subscription_id: Uuid,
    state: SubscriptionState,
  ) -> Result<bool> {
    let id_str    = encode_uuid(subscription_id);
    let state_str = encode_state(state);

    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE subscriptions SET state = ?2 WHERE subscription_id = ?1",
          rusqlite::params![id_str, state_str],
        )?)
      })
      .await?;

    Ok(changed > 0)
  }

  async fn notifications_for_owner(&self, owner_id: Uuid) -> Result<Vec<Notification>> {
    let owner_id_str = encode_uuid(owner_id);

    let raws: Vec<RawNotification> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT
             notification_id, owner_id, owner_logical_name, event_code,
             lookup_name, subject_id, subject_logical_name, data, created_at
           FROM notifications
           WHERE owner_id = ?1
           ORDER BY rowid",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![owner_id_str], RawNotification::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawNotification::into_notification).collect()
  }
}
