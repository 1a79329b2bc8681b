//! User-management capabilities and the role-based authorizer.

use std::future::Future;

use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator as _;

use crate::{
  collab::{Authorizer, RoleDirectory},
  user::{UserId, UserStatus},
};

// ─── Capabilities ────────────────────────────────────────────────────────────

/// The user-management actions a report advertises to its viewer.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Serialize,
  Deserialize,
  strum::Display,
  strum::EnumString,
  strum::EnumIter,
)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase")]
pub enum Capability {
  Approve,
  Deactivate,
  Rename,
  EditUser,
  EditRoles,
}

/// One flag per [`Capability`], each computed independently.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PermissionFlags {
  pub approve:    bool,
  pub deactivate: bool,
  pub rename:     bool,
  pub edit_user:  bool,
  pub edit_roles: bool,
}

impl PermissionFlags {
  pub fn allows(&self, capability: Capability) -> bool {
    match capability {
      Capability::Approve => self.approve,
      Capability::Deactivate => self.deactivate,
      Capability::Rename => self.rename,
      Capability::EditUser => self.edit_user,
      Capability::EditRoles => self.edit_roles,
    }
  }

  /// Capabilities whose flag is set, in declaration order.
  pub fn granted(&self) -> Vec<Capability> {
    Capability::iter().filter(|c| self.allows(*c)).collect()
  }
}

// ─── Policy ──────────────────────────────────────────────────────────────────

/// Which roles grant each capability. Deserialised from the `permissions`
/// section of the server configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CapabilityPolicy {
  pub approve:    Vec<String>,
  pub deactivate: Vec<String>,
  pub rename:     Vec<String>,
  pub edit_user:  Vec<String>,
  pub edit_roles: Vec<String>,
}

impl Default for CapabilityPolicy {
  fn default() -> Self {
    let admin = || vec!["admin".to_owned()];
    Self {
      approve:    admin(),
      deactivate: admin(),
      rename:     admin(),
      edit_user:  admin(),
      edit_roles: vec!["admin".to_owned(), "toolRoot".to_owned()],
    }
  }
}

impl CapabilityPolicy {
  pub fn roles_for(&self, capability: Capability) -> &[String] {
    match capability {
      Capability::Approve => &self.approve,
      Capability::Deactivate => &self.deactivate,
      Capability::Rename => &self.rename,
      Capability::EditUser => &self.edit_user,
      Capability::EditRoles => &self.edit_roles,
    }
  }

  /// Whether any of `roles` grants `capability`.
  pub fn allows(&self, capability: Capability, roles: &[String]) -> bool {
    let granting = self.roles_for(capability);
    roles.iter().any(|r| granting.contains(r))
  }
}

// ─── Role-based authorizer ───────────────────────────────────────────────────

/// A user's account status and assigned roles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Standing {
  pub status: UserStatus,
  pub roles:  Vec<String>,
}

impl Standing {
  pub fn is_active(&self) -> bool { self.status == UserStatus::Active }
}

/// [`Authorizer`] that grants a capability when the viewer is active and holds
/// one of the roles the policy lists for it.
#[derive(Debug, Clone)]
pub struct RoleAuthorizer<D> {
  directory: D,
  policy:    CapabilityPolicy,
}

impl<D> RoleAuthorizer<D> {
  pub fn new(directory: D, policy: CapabilityPolicy) -> Self {
    Self { directory, policy }
  }
}

impl<D: RoleDirectory> Authorizer for RoleAuthorizer<D> {
  type Error = D::Error;

  fn is_allowed(
    &self,
    viewer: UserId,
    _subject: UserId,
    capability: Capability,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_ {
    async move {
      let allowed = match self.directory.standing(viewer).await? {
        Some(standing) => {
          standing.is_active() && self.policy.allows(capability, &standing.roles)
        }
        None => false,
      };
      Ok(allowed)
    }
  }
}
