//! Encoding and decoding helpers between domain types and the plain values
//! stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 strings. Tri-state flags are nullable
//! integers. Grant lists are compact JSON arrays.

use std::str::FromStr as _;

use acc_core::{
  audit::AuditRecord,
  event::{LogEvent, ObjectType},
  linkage::ExternalIdentity,
  user::{User, UserId, UserStatus},
};
use chrono::{DateTime, Utc};

use crate::{Error, Result};

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

#[cfg(test)]
pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── UserStatus ──────────────────────────────────────────────────────────────

pub fn decode_status(s: &str) -> Result<UserStatus> {
  UserStatus::from_str(s).map_err(|_| Error::UnexpectedValue {
    column: "users.status",
    value:  s.to_owned(),
  })
}

// ─── Tri-state flag ──────────────────────────────────────────────────────────

pub fn decode_force_identified(v: Option<i64>) -> Result<Option<bool>> {
  match v {
    None => Ok(None),
    Some(0) => Ok(Some(false)),
    Some(1) => Ok(Some(true)),
    Some(other) => Err(Error::UnexpectedValue {
      column: "users.force_identified",
      value:  other.to_string(),
    }),
  }
}

// ─── Counts ──────────────────────────────────────────────────────────────────

pub fn decode_edit_count(v: i64) -> Result<u64> {
  u64::try_from(v).map_err(|_| Error::UnexpectedValue {
    column: "oauth_identities.edit_count",
    value:  v.to_string(),
  })
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw values read directly from a `users` row.
pub struct RawUser {
  pub id:               i64,
  pub username:         String,
  pub onwiki_name:      String,
  pub status:           String,
  pub force_identified: Option<i64>,
  pub created_at:       String,
}

impl RawUser {
  pub const COLUMNS: &'static str =
    "id, username, onwiki_name, status, force_identified, created_at";

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:               row.get(0)?,
      username:         row.get(1)?,
      onwiki_name:      row.get(2)?,
      status:           row.get(3)?,
      force_identified: row.get(4)?,
      created_at:       row.get(5)?,
    })
  }

  pub fn into_user(self) -> Result<User> {
    Ok(User {
      id:               UserId(self.id),
      username:         self.username,
      on_wiki_name:     self.onwiki_name,
      status:           decode_status(&self.status)?,
      force_identified: decode_force_identified(self.force_identified)?,
      created_at:       decode_dt(&self.created_at)?,
    })
  }
}

/// Raw values read from a `log` row, optionally joined with the actor's name.
pub struct RawLogEvent {
  pub id:          i64,
  pub timestamp:   String,
  pub user_id:     i64,
  pub action:      String,
  pub object_type: String,
  pub object_id:   i64,
  pub comment:     Option<String>,
  pub actor_name:  Option<String>,
}

impl RawLogEvent {
  /// Reads the columns listed in [`Self::COLUMNS`]; `actor_name` stays empty.
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:          row.get(0)?,
      timestamp:   row.get(1)?,
      user_id:     row.get(2)?,
      action:      row.get(3)?,
      object_type: row.get(4)?,
      object_id:   row.get(5)?,
      comment:     row.get(6)?,
      actor_name:  None,
    })
  }

  pub const COLUMNS: &'static str =
    "l.id, l.timestamp, l.user_id, l.action, l.object_type, l.object_id, l.comment";

  pub fn into_event(self) -> Result<LogEvent> {
    Ok(LogEvent {
      id:          self.id,
      timestamp:   decode_dt(&self.timestamp)?,
      actor:       UserId(self.user_id),
      action:      self.action,
      object_type: ObjectType::from(self.object_type.as_str()),
      object_id:   self.object_id,
      comment:     self.comment,
    })
  }

  pub fn into_audit_record(mut self) -> Result<AuditRecord> {
    let actor_name = self.actor_name.take();
    Ok(AuditRecord { event: self.into_event()?, actor_name })
  }
}

/// Raw values read from an `oauth_identities` row.
pub struct RawIdentity {
  pub username:   String,
  pub edit_count: i64,
  pub grants:     String,
  pub blocked:    bool,
  pub issued_at:  String,
  pub expires_at: String,
}

impl RawIdentity {
  pub fn into_identity(self) -> Result<ExternalIdentity> {
    Ok(ExternalIdentity {
      username:   self.username,
      edit_count: decode_edit_count(self.edit_count)?,
      grants:     serde_json::from_str(&self.grants)?,
      blocked:    self.blocked,
      issued_at:  decode_dt(&self.issued_at)?,
      expires_at: decode_dt(&self.expires_at)?,
    })
  }
}
