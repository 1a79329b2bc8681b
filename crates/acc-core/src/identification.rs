//! Identification status: whether a user has identified to the foundation.

use std::future::Future;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IdentificationStatus {
  /// The external check found the user.
  Detected,
  /// The external check did not find the user.
  Missing,
  /// An administrator marked the user as identified.
  ForcedOn,
  /// An administrator marked the user as not identified.
  ForcedOff,
}

impl IdentificationStatus {
  pub fn forced(flag: bool) -> Self {
    if flag { Self::ForcedOn } else { Self::ForcedOff }
  }

  pub fn checked(identified: bool) -> Self {
    if identified { Self::Detected } else { Self::Missing }
  }
}

/// Resolve the status from the stored override and an external check.
///
/// `check` is only invoked when there is no override.
pub fn resolve(forced: Option<bool>, check: impl FnOnce() -> bool) -> IdentificationStatus {
  match forced {
    Some(flag) => IdentificationStatus::forced(flag),
    None => IdentificationStatus::checked(check()),
  }
}

/// Async, fallible variant of [`resolve`] for checks that go over the network.
pub async fn resolve_with<F, Fut, E>(
  forced: Option<bool>,
  check: F,
) -> Result<IdentificationStatus, E>
where
  F: FnOnce() -> Fut,
  Fut: Future<Output = Result<bool, E>>,
{
  match forced {
    Some(flag) => Ok(IdentificationStatus::forced(flag)),
    None => check().await.map(IdentificationStatus::checked),
  }
}
