//! Handlers for `/users` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/users/:id` | 404 if not found |
//! | `GET`  | `/users/:id/stats` | `?viewer=<id>` required; the full [`UserReport`] |

use std::sync::Arc;

use acc_core::{
  UserReport,
  user::{User, UserId},
};
use axum::{
  Json,
  extract::{Path, Query, State},
};
use serde::Deserialize;

use crate::{ReportService, error::ApiError};

// ─── Get one ─────────────────────────────────────────────────────────────────

/// `GET /users/:id`
pub async fn get_one<R: ReportService>(
  State(service): State<Arc<R>>,
  Path(id): Path<i64>,
) -> Result<Json<User>, ApiError> {
  let user = service
    .user(UserId(id))
    .await?
    .ok_or_else(|| ApiError::NotFound(format!("user {id} not found")))?;
  Ok(Json(user))
}

// ─── Stats ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct StatsParams {
  /// The user looking at the page; decides the permission flags.
  pub viewer: i64,
}

/// `GET /users/:id/stats?viewer=<id>`
pub async fn stats<R: ReportService>(
  State(service): State<Arc<R>>,
  Path(id): Path<i64>,
  Query(params): Query<StatsParams>,
) -> Result<Json<UserReport>, ApiError> {
  let report = service.report(UserId(id), UserId(params.viewer)).await?;
  Ok(Json(report))
}
