//! Storage traits consumed by the fan-out engine.
//!
//! [`NotificationStore`] is everything the engine needs: a paged read of
//! subscriptions and a single-record notification write. Each write is
//! expected to be atomic on its own; the engine holds no locks.
//!
//! [`SubscriptionRegistry`] covers the surrounding administration that is not
//! part of fan-out itself.

use std::future::Future;

use uuid::Uuid;

use crate::{
  notification::{NewNotification, Notification},
  subscription::{NewSubscription, Page, PageRequest, Subscription, SubscriptionQuery, SubscriptionState},
};

/// Storage operations used during a fan-out invocation.
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes (e.g. tokio with `axum`).
pub trait NotificationStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Return one page of active subscriptions matching `query`.
  fn subscriptions_page<'a>(
    &'a self,
    query: &'a SubscriptionQuery,
    page: PageRequest,
  ) -> impl Future<Output = Result<Page<Subscription>, Self::Error>> + Send + 'a;

  /// Persist one notification and return the stored record.
  fn create_notification(
    &self,
    input: NewNotification,
  ) -> impl Future<Output = Result<Notification, Self::Error>> + Send + '_;
}

/// Management of subscriptions and read access to delivered notifications.
pub trait SubscriptionRegistry: NotificationStore {
  /// Create and persist an active subscription.
  fn add_subscription(
    &self,
    input: NewSubscription,
  ) -> impl Future<Output = Result<Subscription, Self::Error>> + Send + '_;

  /// Change a subscription's state. Returns `false` if it does not exist.
  fn set_subscription_state(
    &self,
    subscription_id: Uuid,
    state: SubscriptionState,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// All notifications owned by `owner_id`, oldest first.
  fn notifications_for_owner(
    &self,
    owner_id: Uuid,
  ) -> impl Future<Output = Result<Vec<Notification>, Self::Error>> + Send + '_;
}
