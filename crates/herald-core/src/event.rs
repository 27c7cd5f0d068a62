//! Event kinds and classification of inbound operation names.

use std::fmt;

use serde::{Deserialize, Serialize};

/// What happened to the event record. Every notification written by one
/// invocation carries the same kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
  Update,
  Create,
  Assign,
  Delete,
  UserMention,
}

impl EventKind {
  /// Map an operation name to an event kind. Matching is case-insensitive and
  /// total: anything outside the known set is a user mention.
  pub fn classify(message: &str) -> Self {
    match message.to_lowercase().as_str() {
      "create" => Self::Create,
      "update" => Self::Update,
      "assign" => Self::Assign,
      "delete" => Self::Delete,
      _ => Self::UserMention,
    }
  }

  /// The option-set code persisted on notification records.
  pub fn code(self) -> i32 {
    match self {
      Self::Update => 863_910_000,
      Self::Create => 863_910_001,
      Self::Assign => 863_910_002,
      Self::Delete => 863_910_003,
      Self::UserMention => 863_910_004,
    }
  }

  pub fn from_code(code: i32) -> Option<Self> {
    match code {
      863_910_000 => Some(Self::Update),
      863_910_001 => Some(Self::Create),
      863_910_002 => Some(Self::Assign),
      863_910_003 => Some(Self::Delete),
      863_910_004 => Some(Self::UserMention),
      _ => None,
    }
  }

  pub fn as_str(self) -> &'static str {
    match self {
      Self::Update => "update",
      Self::Create => "create",
      Self::Assign => "assign",
      Self::Delete => "delete",
      Self::UserMention => "user_mention",
    }
  }
}

impl fmt::Display for EventKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}
