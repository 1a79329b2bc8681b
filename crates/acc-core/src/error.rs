//! Error types for `acc-core`.

use std::time::Duration;

use thiserror::Error;

use crate::user::UserId;

/// Which external collaborator a failure came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum Collaborator {
  Store,
  Linkage,
  Identification,
  Authorization,
}

#[derive(Debug, Error)]
pub enum Error {
  #[error("user not found: {0}")]
  NotFound(UserId),

  #[error("{collaborator} collaborator failed: {source}")]
  Collaborator {
    collaborator: Collaborator,
    #[source]
    source:       Box<dyn std::error::Error + Send + Sync>,
  },

  #[error("{collaborator} collaborator timed out after {after:?}")]
  Timeout {
    collaborator: Collaborator,
    after:        Duration,
  },
}

impl Error {
  /// Wrap a collaborator's own error type.
  pub fn collaborator<E>(collaborator: Collaborator, error: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::Collaborator { collaborator, source: Box::new(error) }
  }

  pub fn is_not_found(&self) -> bool { matches!(self, Self::NotFound(_)) }

  /// The collaborator that failed or timed out, if any.
  pub fn failed_collaborator(&self) -> Option<Collaborator> {
    match self {
      Self::NotFound(_) => None,
      Self::Collaborator { collaborator, .. } | Self::Timeout { collaborator, .. } => {
        Some(*collaborator)
      }
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
