//! Collaborator traits the report assembler depends on.
//!
//! Implemented by storage and integration backends (e.g. `acc-store-sqlite`).
//! Every method is read-only from this crate's point of view, and every
//! returned future is `Send` so assembly can run on a multi-threaded runtime.

use std::{collections::HashMap, future::Future};

use crate::{
  audit::AuditRecord,
  event::LogEvent,
  linkage::LinkageFacts,
  permission::{Capability, Standing},
  rules::{LabelTable, RuleTable},
  user::{User, UserId},
};

// ─── Account data ────────────────────────────────────────────────────────────

/// Users, their log history, and the configuration tables used to interpret
/// that history.
pub trait AccountStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Retrieve a user by id. Returns `None` if not found.
  fn get_user(
    &self,
    id: UserId,
  ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send + '_;

  /// Every log event performed by `actor`, oldest first.
  fn log_events_by_actor(
    &self,
    actor: UserId,
  ) -> impl Future<Output = Result<Vec<LogEvent>, Self::Error>> + Send + '_;

  /// Log events whose object is the user `subject` (approvals, role changes,
  /// renames…), newest first, with the acting user's name where known.
  fn audit_log_for_user(
    &self,
    subject: UserId,
  ) -> impl Future<Output = Result<Vec<AuditRecord>, Self::Error>> + Send + '_;

  /// Names of the given requests. Ids with no matching request are absent
  /// from the returned map.
  fn request_names(
    &self,
    request_ids: Vec<i64>,
  ) -> impl Future<Output = Result<HashMap<i64, String>, Self::Error>> + Send + '_;

  /// Snapshot of close-template outcomes.
  fn rule_table(&self) -> impl Future<Output = Result<RuleTable, Self::Error>> + Send + '_;

  /// Snapshot of action display labels.
  fn label_table(&self) -> impl Future<Output = Result<LabelTable, Self::Error>> + Send + '_;
}

// ─── Linked identity ─────────────────────────────────────────────────────────

pub trait LinkageProvider: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Linkage facts for `user`; `None` unless the link is fully established.
  fn linkage(
    &self,
    user: UserId,
  ) -> impl Future<Output = Result<Option<LinkageFacts>, Self::Error>> + Send + '_;
}

// ─── Identification ──────────────────────────────────────────────────────────

/// The (possibly slow, networked) identification check.
pub trait IdentificationCheck: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  fn is_identified<'a>(
    &'a self,
    on_wiki_name: &'a str,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + 'a;
}

// ─── Authorization ───────────────────────────────────────────────────────────

pub trait Authorizer: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Whether `viewer` may exercise `capability` on `subject`.
  fn is_allowed(
    &self,
    viewer: UserId,
    subject: UserId,
    capability: Capability,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;
}

/// Source of a viewer's status and roles, used by
/// [`RoleAuthorizer`](crate::permission::RoleAuthorizer).
pub trait RoleDirectory: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Returns `None` if the user does not exist.
  fn standing(
    &self,
    user: UserId,
  ) -> impl Future<Output = Result<Option<Standing>, Self::Error>> + Send + '_;
}
