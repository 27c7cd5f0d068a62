//! In-memory store used by the unit tests.

use std::sync::{
  Mutex,
  atomic::{AtomicUsize, Ordering},
};

use chrono::Utc;
use thiserror::Error;
use uuid::Uuid;

use crate::{
  notification::{NewNotification, Notification},
  record::RecordRef,
  store::NotificationStore,
  subscription::{Page, PageRequest, Subscription, SubscriptionQuery, SubscriptionState},
};

#[derive(Debug, Error)]
#[error("memory store failure: {0}")]
pub struct MemoryError(&'static str);

#[derive(Default)]
pub struct MemoryStore {
  subscriptions:  Mutex<Vec<Subscription>>,
  notifications:  Mutex<Vec<Notification>>,
  page_calls:     AtomicUsize,
  create_calls:   AtomicUsize,
  fail_create_at: Option<usize>,
  fail_lookup:    bool,
}

impl MemoryStore {
  /// Fail the create call with this zero-based index.
  pub fn fail_create_at(mut self, index: usize) -> Self {
    self.fail_create_at = Some(index);
    self
  }

  pub fn fail_lookup(mut self) -> Self {
    self.fail_lookup = true;
    self
  }

  pub fn insert(&self, subscription: Subscription) {
    self.subscriptions.lock().unwrap().push(subscription);
  }

  pub fn deactivate(&self, subscription_id: Uuid) {
    for s in self.subscriptions.lock().unwrap().iter_mut() {
      if s.subscription_id == subscription_id {
        s.state = SubscriptionState::Inactive;
      }
    }
  }

  pub fn notifications(&self) -> Vec<Notification> {
    self.notifications.lock().unwrap().clone()
  }

  pub fn page_calls(&self) -> usize { self.page_calls.load(Ordering::SeqCst) }
}

impl NotificationStore for MemoryStore {
  type Error = MemoryError;

  async fn subscriptions_page(
    &self,
    query: &SubscriptionQuery,
    page: PageRequest,
  ) -> Result<Page<Subscription>, MemoryError> {
    self.page_calls.fetch_add(1, Ordering::SeqCst);
    if self.fail_lookup {
      return Err(MemoryError("lookup"));
    }

    // Vector index doubles as the row position.
    let (items, next) = {
      let subscriptions = self.subscriptions.lock().unwrap();
      let mut matching = subscriptions
        .iter()
        .enumerate()
        .map(|(i, s)| (i as i64, s))
        .filter(|(pos, s)| page.after.is_none_or(|after| *pos > after) && query.matches(s));

      let mut items = Vec::new();
      let mut last = None;
      for (pos, s) in matching.by_ref().take(page.limit) {
        items.push(s.clone());
        last = Some(pos);
      }
      let next = if matching.next().is_some() { last } else { None };
      (items, next)
    };
    Ok(Page { items, next })
  }

  async fn create_notification(
    &self,
    input: NewNotification,
  ) -> Result<Notification, MemoryError> {
    let index = self.create_calls.fetch_add(1, Ordering::SeqCst);
    if self.fail_create_at == Some(index) {
      return Err(MemoryError("create"));
    }

    let notification = Notification {
      notification_id: Uuid::new_v4(),
      owner:           input.owner,
      event:           input.event,
      lookup_name:     input.lookup_name,
      subject:         input.subject,
      data:            input.data,
      created_at:      Utc::now(),
    };
    self.notifications.lock().unwrap().push(notification.clone());
    Ok(notification)
  }
}

/// An active subscription owned by `owner` on `subject`.
pub fn subscription(lookup_name: &str, subject: &RecordRef, owner: Uuid) -> Subscription {
  Subscription {
    subscription_id: Uuid::new_v4(),
    lookup_name:     lookup_name.to_owned(),
    subject:         subject.clone(),
    owner:           RecordRef::new("systemuser", owner),
    state:           SubscriptionState::Active,
    created_at:      Utc::now(),
  }
}
