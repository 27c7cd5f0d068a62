//! Error types for `herald-core`.

use thiserror::Error;
use uuid::Uuid;

/// A boxed storage-backend error.
pub type StoreError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Error)]
pub enum Error {
  #[error("invalid configuration: {0}")]
  InvalidConfig(String),

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),

  #[error("subscription lookup failed: {0}")]
  Subscriptions(#[source] StoreError),

  /// A notification write failed. Notifications listed in `delivered` were
  /// persisted before the failure and are not rolled back.
  #[error(
    "notification for owner {failed_owner} failed after {} delivered: {source}",
    .delivered.len()
  )]
  PartialFanout {
    delivered:    Vec<Uuid>,
    failed_owner: Uuid,
    #[source]
    source:       StoreError,
  },
}

impl Error {
  /// Notifications that were persisted before this error occurred.
  pub fn delivered(&self) -> &[Uuid] {
    match self {
      Self::PartialFanout { delivered, .. } => delivered.as_slice(),
      _ => &[],
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
