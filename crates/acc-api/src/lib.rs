//! JSON API for the per-user statistics report.
//!
//! Exposes an axum [`Router`] backed by any [`ReportService`] (in practice a
//! [`ReportAssembler`]). Sessions, TLS and rendering are the caller's
//! responsibility; the viewer is passed explicitly as a query parameter.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", acc_api::api_router(assembler.clone()))
//! ```

pub mod error;
pub mod users;

use std::{future::Future, sync::Arc};

use acc_core::{
  ReportAssembler, UserReport,
  collab::{AccountStore, Authorizer, IdentificationCheck, LinkageProvider},
  user::{User, UserId},
};
use axum::{Router, routing::get};

pub use error::ApiError;

// ─── Service seam ────────────────────────────────────────────────────────────

/// What the handlers need from the report layer.
pub trait ReportService: Send + Sync + 'static {
  fn user(
    &self,
    id: UserId,
  ) -> impl Future<Output = acc_core::Result<Option<User>>> + Send + '_;

  fn report(
    &self,
    subject: UserId,
    viewer: UserId,
  ) -> impl Future<Output = acc_core::Result<UserReport>> + Send + '_;
}

impl<S, L, I, A> ReportService for ReportAssembler<S, L, I, A>
where
  S: AccountStore + 'static,
  L: LinkageProvider + 'static,
  I: IdentificationCheck + 'static,
  A: Authorizer + 'static,
{
  fn user(
    &self,
    id: UserId,
  ) -> impl Future<Output = acc_core::Result<Option<User>>> + Send + '_ {
    ReportAssembler::user(self, id)
  }

  fn report(
    &self,
    subject: UserId,
    viewer: UserId,
  ) -> impl Future<Output = acc_core::Result<UserReport>> + Send + '_ {
    self.assemble(subject, viewer)
  }
}

// ─── Router ──────────────────────────────────────────────────────────────────

/// Build the API router for `service`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<R: ReportService>(service: Arc<R>) -> Router<()> {
  Router::new()
    .route("/users/{id}", get(users::get_one::<R>))
    .route("/users/{id}/stats", get(users::stats::<R>))
    .with_state(service)
}
