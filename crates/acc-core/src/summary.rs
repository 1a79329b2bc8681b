//! Activity histogram: how often a user performed each kind of action.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{event::LogEvent, rules::LabelTable};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityCount {
  pub label: String,
  pub count: u64,
}

/// Count `events` by display label, sorted by label ascending.
///
/// Two raw actions that resolve to the same label share one entry.
pub fn summarize(events: &[LogEvent], labels: &LabelTable) -> Vec<ActivityCount> {
  let mut counts: BTreeMap<&str, u64> = BTreeMap::new();
  for event in events {
    *counts.entry(labels.resolve(&event.action)).or_default() += 1;
  }

  counts
    .into_iter()
    .map(|(label, count)| ActivityCount { label: label.to_owned(), count })
    .collect()
}
