//! Tool users, the subjects a statistics report is built for.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Numeric identifier of a tool user.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct UserId(pub i64);

impl fmt::Display for UserId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { self.0.fmt(f) }
}

/// Account status of a tool user, as stored in the `status` column.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Serialize,
  Deserialize,
  strum::Display,
  strum::EnumString,
)]
pub enum UserStatus {
  New,
  Active,
  /// Older rows still carry the pre-rename value `Suspended`.
  #[strum(to_string = "Deactivated", serialize = "Suspended")]
  Deactivated,
  Declined,
}

/// A tool user. Only the fields the statistics page reads are modelled.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
  pub id:               UserId,
  pub username:         String,
  /// The user's account name on the wiki; input to the identification check.
  pub on_wiki_name:     String,
  pub status:           UserStatus,
  /// Administrative override of the identification check: `None` means
  /// "ask the check", `Some(_)` pins the result.
  pub force_identified: Option<bool>,
  pub created_at:       DateTime<Utc>,
}
