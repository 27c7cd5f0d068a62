//! Resolution of the event record and the subject subscriptions attach to.

use serde::{Deserialize, Serialize};

use crate::{
  config::FanoutConfig,
  record::{AttributeValue, Image, RecordRef, Target},
};

/// Why an invocation ended without writing anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
  /// Neither a record nor a reference was supplied.
  NoTarget,
  /// The parent lookup could not be read from the record or any pre-image.
  SubjectUnresolved,
}

/// The outcome of a successful resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved {
  /// The record that physically changed.
  pub event_record: RecordRef,
  /// The record subscriptions are anchored to.
  pub subject:      RecordRef,
}

/// Determine the event record and its subject.
///
/// With no parent lookup configured the event record is its own subject.
/// Otherwise the parent lookup is read from the target's attributes, falling
/// back to the first pre-image that contains it. On delete the host supplies
/// only a reference plus pre-images, so the fallback is what keeps deletions
/// notifiable.
pub fn resolve(
  config: &FanoutConfig,
  target: Option<&Target>,
  pre_images: &[Image],
) -> Result<Resolved, SkipReason> {
  let target = target.ok_or(SkipReason::NoTarget)?;
  let event_record = target.reference().clone();

  let subject = match config.parent_lookup() {
    None if !event_record.is_empty() => Some(event_record.clone()),
    None => None,
    Some(lookup) => parent_reference(lookup, target, pre_images),
  };

  match subject {
    Some(subject) => Ok(Resolved { event_record, subject }),
    None => Err(SkipReason::SubjectUnresolved),
  }
}

/// Read `lookup` from the target, else from the first pre-image holding it.
///
/// Presence decides the source: a target attribute that is present but not a
/// reference (e.g. cleared to null) does not fall through to the pre-images.
fn parent_reference(
  lookup: &str,
  target: &Target,
  pre_images: &[Image],
) -> Option<RecordRef> {
  let value = target
    .attributes()
    .and_then(|attrs| attrs.get(lookup))
    .or_else(|| {
      pre_images
        .iter()
        .find_map(|image| image.attributes.get(lookup))
    })?;

  match value {
    AttributeValue::Reference(r) => Some(r.clone()),
    other => {
      tracing::debug!(lookup, value = ?other, "parent lookup is not a reference");
      None
    }
  }
}

#[cfg(test)]
mod tests {
  use uuid::Uuid;

  use super::*;
  use crate::record::EventRecord;

  fn config(parent: Option<&str>) -> FanoutConfig {
    FanoutConfig {
      parent_lookup_name:       parent.map(str::to_owned),
      subscription_lookup_name: "oss_subjectid".into(),
      notification_lookup_name: "oss_subjectid".into(),
      notify_current_user:      false,
      captured_fields:          None,
      page_size:                10,
    }
  }

  fn account() -> RecordRef { RecordRef::new("account", Uuid::new_v4()) }

  fn case_record() -> EventRecord {
    EventRecord::new(RecordRef::new("case", Uuid::new_v4()))
  }

  #[test]
  fn missing_target_is_skipped() {
    assert_eq!(
      resolve(&config(Some("account")), None, &[]),
      Err(SkipReason::NoTarget)
    );
  }

  #[test]
  fn self_targeting_without_parent_lookup() {
    let record = case_record();
    let target = Target::Record(record.clone());
    let resolved = resolve(&config(None), Some(&target), &[]).unwrap();
    assert_eq!(resolved.subject, record.reference);
    assert_eq!(resolved.event_record, record.reference);

    let resolved = resolve(&config(Some("")), Some(&target), &[]).unwrap();
    assert_eq!(resolved.subject, record.reference);
  }

  #[test]
  fn self_targeting_with_empty_reference_is_unresolved() {
    let target = Target::Reference(RecordRef::new("case", Uuid::nil()));
    assert_eq!(
      resolve(&config(None), Some(&target), &[]),
      Err(SkipReason::SubjectUnresolved)
    );
  }

  #[test]
  fn parent_read_from_target_attributes() {
    let parent = account();
    let target = Target::Record(
      case_record().with("account", AttributeValue::Reference(parent.clone())),
    );
    let stale = Image::new("pre")
      .with("account", AttributeValue::Reference(account()));
    let resolved = resolve(&config(Some("account")), Some(&target), &[stale]).unwrap();
    assert_eq!(resolved.subject, parent);
  }

  #[test]
  fn parent_falls_back_to_first_image_containing_it() {
    let first = account();
    let target = Target::Record(case_record().with("priority", AttributeValue::Integer(2)));
    let images = [
      Image::new("unrelated").with("title", AttributeValue::Text("x".into())),
      Image::new("pre").with("account", AttributeValue::Reference(first.clone())),
      Image::new("later").with("account", AttributeValue::Reference(account())),
    ];
    let resolved = resolve(&config(Some("account")), Some(&target), &images).unwrap();
    assert_eq!(resolved.subject, first);
  }

  #[test]
  fn reference_only_target_uses_pre_image() {
    let parent = account();
    let target = Target::Reference(RecordRef::new("case", Uuid::new_v4()));
    let images = [Image::new("pre").with("account", AttributeValue::Reference(parent.clone()))];
    let resolved = resolve(&config(Some("account")), Some(&target), &images).unwrap();
    assert_eq!(resolved.subject, parent);
    assert_eq!(resolved.event_record, *target.reference());
  }

  #[test]
  fn absent_everywhere_is_unresolved() {
    let target = Target::Record(case_record());
    let images = [Image::new("pre").with("title", AttributeValue::Text("x".into()))];
    assert_eq!(
      resolve(&config(Some("account")), Some(&target), &images),
      Err(SkipReason::SubjectUnresolved)
    );
  }

  #[test]
  fn cleared_lookup_on_target_is_unresolved() {
    let target = Target::Record(case_record().with("account", AttributeValue::Null));
    let images = [Image::new("pre").with("account", AttributeValue::Reference(account()))];
    assert_eq!(
      resolve(&config(Some("account")), Some(&target), &images),
      Err(SkipReason::SubjectUnresolved)
    );
  }
}
