//! Facts about a user's linked wiki (OAuth) identity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The identity the wiki reported when the link was last refreshed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalIdentity {
  pub username:   String,
  pub edit_count: u64,
  /// OAuth grants held by the consumer for this user.
  pub grants:     Vec<String>,
  pub blocked:    bool,
  pub issued_at:  DateTime<Utc>,
  pub expires_at: DateTime<Utc>,
}

/// Present on a report only when the link is fully established.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkageFacts {
  pub identity:         ExternalIdentity,
  pub identity_expired: bool,
}

impl LinkageFacts {
  /// Evaluate expiry of `identity` as of `now`.
  pub fn new(identity: ExternalIdentity, now: DateTime<Utc>) -> Self {
    let identity_expired = identity.expires_at <= now;
    Self { identity, identity_expired }
  }
}
