//! Record references and typed attribute bags.
//!
//! The host platform hands us records as loosely-typed attribute maps. Here
//! every value is a tagged [`AttributeValue`], so a lookup can be read by name
//! and may be absent without giving up type safety.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ─── References ──────────────────────────────────────────────────────────────

/// A pointer to a persisted record: its logical type name plus identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordRef {
  pub id:           Uuid,
  pub logical_name: String,
}

impl RecordRef {
  pub fn new(logical_name: impl Into<String>, id: Uuid) -> Self {
    Self { id, logical_name: logical_name.into() }
  }

  /// A reference with the nil UUID does not point at anything yet.
  pub fn is_empty(&self) -> bool { self.id.is_nil() }
}

// ─── Attribute values ────────────────────────────────────────────────────────

/// A single attribute value as supplied by the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum AttributeValue {
  /// A lookup to another record.
  Reference(RecordRef),
  Text(String),
  Integer(i64),
  Decimal(f64),
  Boolean(bool),
  /// A choice value, stored as its numeric code.
  OptionSet(i32),
  DateTime(DateTime<Utc>),
  /// The attribute is present but cleared.
  Null,
}

impl AttributeValue {
  pub fn as_reference(&self) -> Option<&RecordRef> {
    match self {
      Self::Reference(r) => Some(r),
      _ => None,
    }
  }
}

/// Attribute name → value. Names are matched exactly.
pub type Attributes = BTreeMap<String, AttributeValue>;

// ─── Records ─────────────────────────────────────────────────────────────────

/// The record that changed. On update `attributes` usually holds only the
/// changed fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
  pub reference:  RecordRef,
  #[serde(default)]
  pub attributes: Attributes,
}

impl EventRecord {
  pub fn new(reference: RecordRef) -> Self {
    Self { reference, attributes: Attributes::new() }
  }

  /// Builder-style attribute setter.
  pub fn with(mut self, name: impl Into<String>, value: AttributeValue) -> Self {
    self.attributes.insert(name.into(), value);
    self
  }
}

/// What the triggering call supplied as its target: a full record, or only a
/// reference to one (e.g. on delete).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Target {
  Record(EventRecord),
  Reference(RecordRef),
}

impl Target {
  pub fn reference(&self) -> &RecordRef {
    match self {
      Self::Record(r) => &r.reference,
      Self::Reference(r) => r,
    }
  }

  /// `None` when only a reference was supplied.
  pub fn attributes(&self) -> Option<&Attributes> {
    match self {
      Self::Record(r) => Some(&r.attributes),
      Self::Reference(_) => None,
    }
  }
}

/// A named snapshot of attribute values taken before the triggering
/// operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Image {
  pub name:       String,
  #[serde(default)]
  pub attributes: Attributes,
}

impl Image {
  pub fn new(name: impl Into<String>) -> Self {
    Self { name: name.into(), attributes: Attributes::new() }
  }

  pub fn with(mut self, name: impl Into<String>, value: AttributeValue) -> Self {
    self.attributes.insert(name.into(), value);
    self
  }
}
