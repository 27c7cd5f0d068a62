//! Subscriptions and the exhaustive, paged subscriber lookup.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  config::{FanoutConfig, MAX_PAGE_SIZE},
  record::RecordRef,
  store::NotificationStore,
};

// ─── Subscription ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionState {
  #[default]
  Active,
  Inactive,
}

/// A user's standing interest in a subject. Created and removed outside the
/// fan-out engine; the engine only reads them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subscription {
  pub subscription_id: Uuid,
  /// Name of the lookup attribute binding this subscription to `subject`.
  pub lookup_name:     String,
  pub subject:         RecordRef,
  pub owner:           RecordRef,
  pub state:           SubscriptionState,
  pub created_at:      DateTime<Utc>,
}

/// Input to [`crate::store::SubscriptionRegistry::add_subscription`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSubscription {
  pub lookup_name: String,
  pub subject:     RecordRef,
  pub owner:       RecordRef,
}

// ─── Query ───────────────────────────────────────────────────────────────────

/// Filters for one subscriber lookup. Only active subscriptions ever match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscriptionQuery {
  pub lookup_name:   String,
  pub subject_id:    Uuid,
  /// Subscriptions owned by this user are left out.
  pub exclude_owner: Option<Uuid>,
}

impl SubscriptionQuery {
  /// Build the query for `subject` on behalf of the acting user.
  pub fn for_subject(config: &FanoutConfig, subject: &RecordRef, actor: Uuid) -> Self {
    Self {
      lookup_name:   config.subscription_lookup_name.clone(),
      subject_id:    subject.id,
      exclude_owner: (!config.notify_current_user).then_some(actor),
    }
  }

  /// Whether `subscription` satisfies every filter of this query.
  pub fn matches(&self, subscription: &Subscription) -> bool {
    subscription.state == SubscriptionState::Active
      && subscription.lookup_name == self.lookup_name
      && subscription.subject.id == self.subject_id
      && self.exclude_owner != Some(subscription.owner.id)
  }
}

/// One page window of a paged read. Pages are keyed on a store-assigned,
/// strictly increasing position, so rows changing state between pages never
/// shift later rows out of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
  /// Return only rows positioned after this one; `None` starts from the top.
  pub after: Option<i64>,
  pub limit: usize,
}

/// A page of results.
#[derive(Debug, Clone)]
pub struct Page<T> {
  pub items: Vec<T>,
  /// Position of the last returned row when further pages exist.
  pub next:  Option<i64>,
}

// ─── Lookup ──────────────────────────────────────────────────────────────────

/// Retrieve every subscription matching `query`, following pages until the
/// store reports none remain.
pub async fn find_subscribers<S: NotificationStore>(
  store: &S,
  query: &SubscriptionQuery,
  page_size: usize,
) -> Result<Vec<Subscription>, S::Error> {
  let mut found = Vec::new();
  let mut page = PageRequest { after: None, limit: page_size.clamp(1, MAX_PAGE_SIZE) };

  loop {
    let Page { items, next } = store.subscriptions_page(query, page).await?;
    let fetched = items.len();
    found.extend(items);

    let Some(next) = next else { break };
    if fetched == 0 || page.after.is_some_and(|after| next <= after) {
      tracing::warn!(
        after = ?page.after,
        next,
        "store reported more subscriptions without advancing"
      );
      break;
    }
    page.after = Some(next);
  }

  tracing::debug!(
    subject = %query.subject_id,
    count = found.len(),
    "subscribers retrieved"
  );
  Ok(found)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::testing::{MemoryStore, subscription};

  fn config(notify_current_user: bool) -> FanoutConfig {
    FanoutConfig {
      parent_lookup_name:       Some("account".into()),
      subscription_lookup_name: "oss_accountid".into(),
      notification_lookup_name: "oss_accountid".into(),
      notify_current_user,
      captured_fields:          None,
      page_size:                2,
    }
  }

  #[test]
  fn actor_is_excluded_unless_notify_current_user() {
    let subject = RecordRef::new("account", Uuid::new_v4());
    let actor = Uuid::new_v4();

    let q = SubscriptionQuery::for_subject(&config(false), &subject, actor);
    assert_eq!(q.exclude_owner, Some(actor));
    assert_eq!(q.lookup_name, "oss_accountid");

    let q = SubscriptionQuery::for_subject(&config(true), &subject, actor);
    assert_eq!(q.exclude_owner, None);
  }

  #[test]
  fn inactive_and_foreign_subscriptions_do_not_match() {
    let subject = RecordRef::new("account", Uuid::new_v4());
    let q = SubscriptionQuery::for_subject(&config(true), &subject, Uuid::new_v4());

    let active = subscription("oss_accountid", &subject, Uuid::new_v4());
    assert!(q.matches(&active));

    let mut inactive = active.clone();
    inactive.state = SubscriptionState::Inactive;
    assert!(!q.matches(&inactive));

    let mut other_lookup = active.clone();
    other_lookup.lookup_name = "oss_caseid".into();
    assert!(!q.matches(&other_lookup));
  }

  #[tokio::test]
  async fn lookup_follows_every_page() {
    let subject = RecordRef::new("account", Uuid::new_v4());
    let store = MemoryStore::default();
    for _ in 0..5 {
      store.insert(subscription("oss_accountid", &subject, Uuid::new_v4()));
    }
    store.insert(subscription("oss_accountid", &RecordRef::new("account", Uuid::new_v4()), Uuid::new_v4()));

    let q = SubscriptionQuery::for_subject(&config(true), &subject, Uuid::new_v4());
    let found = find_subscribers(&store, &q, 2).await.unwrap();

    assert_eq!(found.len(), 5);
    assert_eq!(store.page_calls(), 3);
  }

  #[tokio::test]
  async fn deactivation_between_pages_skips_no_one() {
    let subject = RecordRef::new("account", Uuid::new_v4());
    let store = MemoryStore::default();
    let subs: Vec<_> = (0..4)
      .map(|_| subscription("oss_accountid", &subject, Uuid::new_v4()))
      .collect();
    for s in &subs {
      store.insert(s.clone());
    }
    let q = SubscriptionQuery::for_subject(&config(true), &subject, Uuid::new_v4());

    let first = store
      .subscriptions_page(&q, PageRequest { after: None, limit: 2 })
      .await
      .unwrap();
    assert_eq!(first.items.len(), 2);
    store.deactivate(subs[0].subscription_id);

    let second = store
      .subscriptions_page(&q, PageRequest { after: first.next, limit: 2 })
      .await
      .unwrap();
    let ids: Vec<_> = second.items.iter().map(|s| s.subscription_id).collect();
    assert_eq!(ids, vec![subs[2].subscription_id, subs[3].subscription_id]);
    assert!(second.next.is_none());
  }

  #[tokio::test]
  async fn oversized_page_size_still_returns_everyone() {
    let subject = RecordRef::new("account", Uuid::new_v4());
    let store = MemoryStore::default();
    for _ in 0..3 {
      store.insert(subscription("oss_accountid", &subject, Uuid::new_v4()));
    }
    let q = SubscriptionQuery::for_subject(&config(true), &subject, Uuid::new_v4());

    let found = find_subscribers(&store, &q, usize::MAX).await.unwrap();
    assert_eq!(found.len(), 3);
  }

  #[tokio::test]
  async fn lookup_excludes_actor_and_inactive() {
    let subject = RecordRef::new("account", Uuid::new_v4());
    let actor = Uuid::new_v4();
    let store = MemoryStore::default();
    store.insert(subscription("oss_accountid", &subject, actor));
    store.insert(subscription("oss_accountid", &subject, Uuid::new_v4()));
    let mut inactive = subscription("oss_accountid", &subject, Uuid::new_v4());
    inactive.state = SubscriptionState::Inactive;
    store.insert(inactive);

    let q = SubscriptionQuery::for_subject(&config(false), &subject, actor);
    let found = find_subscribers(&store, &q, 10).await.unwrap();

    assert_eq!(found.len(), 1);
    assert!(found.iter().all(|s| s.owner.id != actor));
    assert!(found.iter().all(|s| s.state == SubscriptionState::Active));
  }
}
