//! The account log: what has been done *to* a user, as opposed to what the
//! user did.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{event::LogEvent, user::UserId};

/// A raw audit row as returned by the store: the event plus the acting user's
/// name, if that user still exists.
#[derive(Debug, Clone)]
pub struct AuditRecord {
  pub event:      LogEvent,
  pub actor_name: Option<String>,
}

/// One line of a user's account log, ready for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEntry {
  pub id:          i64,
  pub timestamp:   DateTime<Utc>,
  pub actor_id:    UserId,
  pub actor_name:  Option<String>,
  pub action:      String,
  /// Human description of `action`, e.g. "changed roles".
  pub description: String,
  pub comment:     Option<String>,
}

impl From<AuditRecord> for AuditEntry {
  fn from(record: AuditRecord) -> Self {
    let AuditRecord { event, actor_name } = record;
    Self {
      id: event.id,
      timestamp: event.timestamp,
      actor_id: event.actor,
      actor_name,
      description: describe_user_action(&event.action).to_owned(),
      action: event.action,
      comment: event.comment,
    }
  }
}

/// Description of an action performed on a user account. Unknown actions are
/// returned verbatim.
pub fn describe_user_action(action: &str) -> &str {
  match action {
    "Approved" => "approved",
    "Declined" => "declined",
    "Suspended" | "Deactivated" => "deactivated",
    "Demoted" => "demoted",
    "Promoted" => "promoted",
    "Renamed" => "renamed",
    "Prefchange" => "changed user preferences",
    "RoleChange" => "changed roles",
    "Registered" => "registered",
    "UserIdentified" => "marked identified",
    "UserUnidentified" => "marked not identified",
    "OAuthLinked" => "linked OAuth identity",
    "OAuthUnlinked" => "unlinked OAuth identity",
    other => other,
  }
}

/// Convert and order audit records newest first (ties by descending id).
pub fn prepare_account_log(records: Vec<AuditRecord>) -> Vec<AuditEntry> {
  let mut entries: Vec<AuditEntry> = records.into_iter().map(AuditEntry::from).collect();
  entries.sort_by(|a, b| b.timestamp.cmp(&a.timestamp).then(b.id.cmp(&a.id)));
  entries
}
