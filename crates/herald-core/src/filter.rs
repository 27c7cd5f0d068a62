//! Selection of the attribute names captured in a notification payload.

use std::collections::HashSet;

use crate::record::Attributes;

/// Compute the attribute names relevant to this event.
///
/// Returns `None` when the target carried no attributes (reference only).
/// Without an allow-list every attribute name is returned; otherwise only the
/// names matching an allow-list entry, ignoring case.
pub fn captured_fields(
  attributes: Option<&Attributes>,
  allow_list: Option<&[String]>,
) -> Option<Vec<String>> {
  let names = attributes?.keys();

  Some(match allow_list {
    None => names.cloned().collect(),
    Some(allowed) => {
      let allowed: HashSet<String> =
        allowed.iter().map(|field| field.to_lowercase()).collect();
      names
        .filter(|name| allowed.contains(&name.to_lowercase()))
        .cloned()
        .collect()
    }
  })
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::record::AttributeValue;

  fn attrs(names: &[&str]) -> Attributes {
    names
      .iter()
      .map(|n| (n.to_string(), AttributeValue::Integer(1)))
      .collect()
  }

  #[test]
  fn reference_only_yields_no_fields() {
    assert_eq!(captured_fields(None, None), None);
    assert_eq!(captured_fields(None, Some(&["a".to_string()][..])), None);
  }

  #[test]
  fn no_allow_list_returns_every_name() {
    let a = attrs(&["priority", "title", "statuscode"]);
    let mut got = captured_fields(Some(&a), None).unwrap();
    got.sort();
    assert_eq!(got, vec!["priority", "statuscode", "title"]);
  }

  #[test]
  fn allow_list_intersects_case_insensitively() {
    let a = attrs(&["priority", "Title", "modifiedon"]);
    let allowed = vec!["TITLE".to_string(), "Priority".to_string(), "other".to_string()];
    let mut got = captured_fields(Some(&a), Some(allowed.as_slice())).unwrap();
    got.sort();
    assert_eq!(got, vec!["Title", "priority"]);
  }

  #[test]
  fn repeated_allow_list_entries_match_once() {
    let a = attrs(&["Priority", "title"]);
    let allowed = vec!["priority".to_string(), "PRIORITY".to_string()];
    assert_eq!(
      captured_fields(Some(&a), Some(allowed.as_slice())),
      Some(vec!["Priority".to_string()])
    );
  }

  #[test]
  fn empty_allow_list_captures_nothing() {
    let a = attrs(&["priority"]);
    assert_eq!(captured_fields(Some(&a), Some(&[][..])), Some(vec![]));
  }
}
