//! Classification of request-closure log actions into account outcomes.
//!
//! A closure is logged as `"Closed <suffix>"`. Modern closures use the id of
//! the email template that was sent, whose declared default action says
//! whether an account was created. Older rows use literal markers instead:
//! `custom-y` (custom close, created), `custom-n` (custom close, not created)
//! and `0` (dropped).
//!
//! The rule table is consulted first; a legacy marker only decides when the
//! rule table has nothing to say. Both can apply to the same suffix (`0` is a
//! valid template id), and the rule table must win.

use serde::{Deserialize, Serialize};

use crate::rules::{DefaultOutcome, RuleTable};

/// Every closure action starts with this.
pub const CLOSURE_PREFIX: &str = "Closed ";

const LEGACY_CREATED: &str = "custom-y";
const LEGACY_NOT_CREATED: &str = "custom-n";
const LEGACY_DROPPED: &str = "0";

/// The bucket a closure event falls into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeCategory {
  Created,
  NotCreated,
  /// Not a closure, or a closure that declares no outcome.
  Other,
}

/// Classify a single log action against `rules`. Total and pure.
pub fn classify(action: &str, rules: &RuleTable) -> OutcomeCategory {
  let Some(suffix) = closure_suffix(action) else {
    return OutcomeCategory::Other;
  };

  if let Some(template_id) = template_id(suffix) {
    match rules.get(template_id) {
      Some(DefaultOutcome::Created) => return OutcomeCategory::Created,
      Some(DefaultOutcome::NotCreated) => return OutcomeCategory::NotCreated,
      Some(DefaultOutcome::Neutral) | None => {}
    }
  }

  match suffix {
    LEGACY_CREATED => OutcomeCategory::Created,
    LEGACY_NOT_CREATED | LEGACY_DROPPED => OutcomeCategory::NotCreated,
    _ => OutcomeCategory::Other,
  }
}

/// The part after `"Closed "`, if `action` is a closure with a non-empty
/// suffix.
pub fn closure_suffix(action: &str) -> Option<&str> {
  action
    .strip_prefix(CLOSURE_PREFIX)
    .filter(|suffix| !suffix.is_empty())
}

/// Parse a suffix as a template id. Only the canonical decimal form matches,
/// i.e. exactly what formatting `"Closed {id}"` produces: no sign, no
/// whitespace, no leading zeros.
fn template_id(suffix: &str) -> Option<u32> {
  if !suffix.bytes().all(|b| b.is_ascii_digit()) {
    return None;
  }
  if suffix.len() > 1 && suffix.starts_with('0') {
    return None;
  }
  suffix.parse().ok()
}
