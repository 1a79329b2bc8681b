//! Log events: the immutable history the report is computed from.
//!
//! Events are written by other parts of the tool (request handling, user
//! management, template editing). Nothing in this workspace ever updates or
//! deletes one.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{classify::CLOSURE_PREFIX, user::UserId};

// ─── Object type ─────────────────────────────────────────────────────────────

/// The kind of object a log event refers to; mirrors the `objecttype` column.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObjectType {
  User,
  Request,
  EmailTemplate,
  WelcomeTemplate,
  Comment,
  Ban,
  Domain,
  /// Object types this crate has no special handling for, kept verbatim.
  Other(String),
}

impl ObjectType {
  pub fn as_str(&self) -> &str {
    match self {
      Self::User => "User",
      Self::Request => "Request",
      Self::EmailTemplate => "EmailTemplate",
      Self::WelcomeTemplate => "WelcomeTemplate",
      Self::Comment => "Comment",
      Self::Ban => "Ban",
      Self::Domain => "Domain",
      Self::Other(s) => s,
    }
  }
}

impl From<&str> for ObjectType {
  fn from(s: &str) -> Self {
    match s {
      "User" => Self::User,
      "Request" => Self::Request,
      "EmailTemplate" => Self::EmailTemplate,
      "WelcomeTemplate" => Self::WelcomeTemplate,
      "Comment" => Self::Comment,
      "Ban" => Self::Ban,
      "Domain" => Self::Domain,
      other => Self::Other(other.to_owned()),
    }
  }
}

// ─── LogEvent ────────────────────────────────────────────────────────────────

/// One row of the tool's action log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEvent {
  pub id:          i64,
  pub timestamp:   DateTime<Utc>,
  /// The user who performed the action.
  pub actor:       UserId,
  /// Raw action code, e.g. `"Approved"` or `"Closed 12"`.
  pub action:      String,
  pub object_type: ObjectType,
  pub object_id:   i64,
  pub comment:     Option<String>,
}

impl LogEvent {
  /// Whether this event closed an account creation request.
  pub fn is_request_closure(&self) -> bool {
    self.object_type == ObjectType::Request
      && self.action.starts_with(CLOSURE_PREFIX)
  }
}
