//! Process-wide fan-out configuration, resolved once at startup.

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Number of subscriptions requested per page during lookup.
pub const DEFAULT_PAGE_SIZE: usize = 5000;

/// Largest page a single store round-trip may be asked for.
pub const MAX_PAGE_SIZE: usize = 100_000;

fn default_page_size() -> usize { DEFAULT_PAGE_SIZE }

/// Fan-out settings.
///
/// Keys are camelCase on the wire (`parentLookupName`, ...). The snake_case
/// aliases let the same struct be read from TOML or environment layers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FanoutConfig {
  /// Lookup on the event record that points at the subject. Absent or empty
  /// means the event record is itself the subject.
  #[serde(default, alias = "parent_lookup_name")]
  pub parent_lookup_name:       Option<String>,
  /// Lookup on a subscription that points at its subject.
  #[serde(alias = "subscription_lookup_name")]
  pub subscription_lookup_name: String,
  /// Attribute name under which the subject is stored on a notification.
  #[serde(alias = "notification_lookup_name")]
  pub notification_lookup_name: String,
  /// Whether the acting user is notified about their own changes.
  #[serde(default, alias = "notify_current_user")]
  pub notify_current_user:      bool,
  /// Optional allow-list of attribute names to capture in the payload.
  #[serde(default, alias = "captured_fields")]
  pub captured_fields:          Option<Vec<String>>,
  #[serde(default = "default_page_size", alias = "page_size")]
  pub page_size:                usize,
}

impl FanoutConfig {
  /// Parse and validate a JSON configuration string.
  pub fn from_json(raw: &str) -> Result<Self> {
    let config: Self = serde_json::from_str(raw)?;
    config.validate()?;
    Ok(config)
  }

  pub fn validate(&self) -> Result<()> {
    if self.subscription_lookup_name.trim().is_empty() {
      return Err(Error::InvalidConfig(
        "subscriptionLookupName must not be empty".into(),
      ));
    }
    if self.notification_lookup_name.trim().is_empty() {
      return Err(Error::InvalidConfig(
        "notificationLookupName must not be empty".into(),
      ));
    }
    if self.page_size == 0 || self.page_size > MAX_PAGE_SIZE {
      return Err(Error::InvalidConfig(format!(
        "pageSize must be between 1 and {MAX_PAGE_SIZE}"
      )));
    }
    Ok(())
  }

  /// The parent lookup name, or `None` in self-targeting mode.
  pub fn parent_lookup(&self) -> Option<&str> {
    self.parent_lookup_name.as_deref().filter(|n| !n.is_empty())
  }
}
