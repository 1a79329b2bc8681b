//! Read-only configuration snapshots: the close-template rule table and the
//! action label table.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

// ─── Rule table ──────────────────────────────────────────────────────────────

/// What closing a request with a given template declares about the account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DefaultOutcome {
  Created,
  NotCreated,
  /// Templates that defer, or declare nothing.
  #[default]
  Neutral,
}

impl DefaultOutcome {
  /// Interpret a stored `defaultaction` value. Only `created` and
  /// `not created` carry an outcome; anything else (including no value) is
  /// neutral.
  pub fn from_stored(value: Option<&str>) -> Self {
    match value {
      Some("created") => Self::Created,
      Some("not created") => Self::NotCreated,
      _ => Self::Neutral,
    }
  }
}

/// A single close template and its declared outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleEntry {
  pub template_id:     u32,
  pub default_outcome: DefaultOutcome,
}

/// Template id → declared outcome.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleTable {
  entries: HashMap<u32, DefaultOutcome>,
}

impl RuleTable {
  pub fn new() -> Self { Self::default() }

  pub fn insert(&mut self, entry: RuleEntry) {
    self.entries.insert(entry.template_id, entry.default_outcome);
  }

  pub fn get(&self, template_id: u32) -> Option<DefaultOutcome> {
    self.entries.get(&template_id).copied()
  }

  pub fn len(&self) -> usize { self.entries.len() }

  pub fn is_empty(&self) -> bool { self.entries.is_empty() }
}

impl FromIterator<RuleEntry> for RuleTable {
  fn from_iter<T: IntoIterator<Item = RuleEntry>>(iter: T) -> Self {
    let mut table = Self::new();
    for entry in iter {
      table.insert(entry);
    }
    table
  }
}

// ─── Label table ─────────────────────────────────────────────────────────────

/// Raw action code → human-readable label.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LabelTable {
  labels: HashMap<String, String>,
}

impl LabelTable {
  pub fn new() -> Self { Self::default() }

  pub fn insert(&mut self, action: impl Into<String>, label: impl Into<String>) {
    self.labels.insert(action.into(), label.into());
  }

  /// The display label for `action`, or `action` itself when none is defined.
  pub fn resolve<'a>(&'a self, action: &'a str) -> &'a str {
    self.labels.get(action).map(String::as_str).unwrap_or(action)
  }
}

impl<A, L> FromIterator<(A, L)> for LabelTable
where
  A: Into<String>,
  L: Into<String>,
{
  fn from_iter<T: IntoIterator<Item = (A, L)>>(iter: T) -> Self {
    let mut table = Self::new();
    for (action, label) in iter {
      table.insert(action, label);
    }
    table
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn stored_default_actions() {
    assert_eq!(DefaultOutcome::from_stored(Some("created")), DefaultOutcome::Created);
    assert_eq!(
      DefaultOutcome::from_stored(Some("not created")),
      DefaultOutcome::NotCreated
    );
    assert_eq!(DefaultOutcome::from_stored(Some("defer")), DefaultOutcome::Neutral);
    assert_eq!(DefaultOutcome::from_stored(Some("none")), DefaultOutcome::Neutral);
    assert_eq!(DefaultOutcome::from_stored(None), DefaultOutcome::Neutral);
  }

  #[test]
  fn label_falls_back_to_raw_action() {
    let labels: LabelTable = [("Closed 1", "Created!")].into_iter().collect();
    assert_eq!(labels.resolve("Closed 1"), "Created!");
    assert_eq!(labels.resolve("Approved"), "Approved");
  }
}
