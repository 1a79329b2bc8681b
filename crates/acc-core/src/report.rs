//! [`UserReport`] and the [`ReportAssembler`] that builds it.

use std::{collections::HashMap, future::Future, time::Duration};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::{
  Collaborator, Error, Result,
  audit::{AuditEntry, prepare_account_log},
  classify::{OutcomeCategory, classify},
  collab::{AccountStore, Authorizer, IdentificationCheck, LinkageProvider},
  event::LogEvent,
  identification::{IdentificationStatus, resolve_with},
  linkage::LinkageFacts,
  permission::{Capability, PermissionFlags},
  rules::RuleTable,
  summary::{ActivityCount, summarize},
  user::{User, UserId},
};

// ─── Report ──────────────────────────────────────────────────────────────────

/// A closed request, as listed under "created" or "not created".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClosedRequest {
  pub timestamp:    DateTime<Utc>,
  pub request_id:   i64,
  pub request_name: String,
}

/// Everything the statistics page shows about one user. Computed on demand,
/// never stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserReport {
  pub user:           User,
  /// When the underlying data was read.
  pub generated_at:   DateTime<Utc>,
  /// Histogram of the user's own actions, sorted by label.
  pub activity:       Vec<ActivityCount>,
  /// Requests the user closed with an account created, oldest first.
  pub created:        Vec<ClosedRequest>,
  /// Requests the user closed without creating an account, oldest first.
  pub not_created:    Vec<ClosedRequest>,
  /// Actions performed on the user's account, newest first.
  pub account_log:    Vec<AuditEntry>,
  pub identification: IdentificationStatus,
  pub linkage:        Option<LinkageFacts>,
  /// What the viewer may do to this user.
  pub permissions:    PermissionFlags,
}

/// Split the request closures in `events` into created and not-created lists.
///
/// Closures whose request is missing from `request_names` are dropped. Each
/// list is sorted by timestamp; events with equal timestamps keep their
/// relative order.
pub fn partition_closures(
  events: &[LogEvent],
  rules: &RuleTable,
  request_names: &HashMap<i64, String>,
) -> (Vec<ClosedRequest>, Vec<ClosedRequest>) {
  let mut created = Vec::new();
  let mut not_created = Vec::new();

  for event in events.iter().filter(|e| e.is_request_closure()) {
    let bucket = match classify(&event.action, rules) {
      OutcomeCategory::Created => &mut created,
      OutcomeCategory::NotCreated => &mut not_created,
      OutcomeCategory::Other => continue,
    };
    let Some(name) = request_names.get(&event.object_id) else {
      continue;
    };
    bucket.push(ClosedRequest {
      timestamp:    event.timestamp,
      request_id:   event.object_id,
      request_name: name.clone(),
    });
  }

  created.sort_by_key(|c| c.timestamp);
  not_created.sort_by_key(|c| c.timestamp);
  (created, not_created)
}

// ─── Assembler ───────────────────────────────────────────────────────────────

/// Per-call limits for the collaborators that may be slow.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AssembleOptions {
  pub identification_timeout: Option<Duration>,
  pub audit_timeout:          Option<Duration>,
}

/// Builds [`UserReport`]s from its collaborators.
pub struct ReportAssembler<S, L, I, A> {
  store:          S,
  linkage:        L,
  identification: I,
  authorizer:     A,
  options:        AssembleOptions,
}

impl<S, L, I, A> ReportAssembler<S, L, I, A>
where
  S: AccountStore,
  L: LinkageProvider,
  I: IdentificationCheck,
  A: Authorizer,
{
  pub fn new(store: S, linkage: L, identification: I, authorizer: A) -> Self {
    Self {
      store,
      linkage,
      identification,
      authorizer,
      options: AssembleOptions::default(),
    }
  }

  pub fn with_options(mut self, options: AssembleOptions) -> Self {
    self.options = options;
    self
  }

  /// Look up a user without building a report.
  pub async fn user(&self, id: UserId) -> Result<Option<User>> {
    self
      .store
      .get_user(id)
      .await
      .map_err(|e| Error::collaborator(Collaborator::Store, e))
  }

  /// Build the report for `subject_id` as seen by `viewer_id`.
  ///
  /// Fails with [`Error::NotFound`] if the subject does not exist, and with a
  /// collaborator error if any fetch fails; no partial report is produced.
  #[tracing::instrument(skip_all, fields(subject = %subject_id, viewer = %viewer_id))]
  pub async fn assemble(&self, subject_id: UserId, viewer_id: UserId) -> Result<UserReport> {
    let user = self.user(subject_id).await?.ok_or(Error::NotFound(subject_id))?;
    let generated_at = Utc::now();

    let result = tokio::try_join!(
      self.history(subject_id),
      self.account_log(subject_id),
      self.identification_status(&user),
      self.linkage_facts(subject_id),
      self.permissions(viewer_id, subject_id),
    );
    let ((activity, created, not_created), account_log, identification, linkage, permissions) =
      match result {
        Ok(parts) => parts,
        Err(e) => {
          warn!(error = %e, "report assembly failed");
          return Err(e);
        }
      };

    debug!(
      activity = activity.len(),
      created = created.len(),
      not_created = not_created.len(),
      account_log = account_log.len(),
      ?identification,
      "report assembled"
    );

    Ok(UserReport {
      user,
      generated_at,
      activity,
      created,
      not_created,
      account_log,
      identification,
      linkage,
      permissions,
    })
  }

  /// Activity summary plus the closure buckets; all derived from the same
  /// event history.
  async fn history(
    &self,
    subject_id: UserId,
  ) -> Result<(Vec<ActivityCount>, Vec<ClosedRequest>, Vec<ClosedRequest>)> {
    let (events, rules, labels) = tokio::try_join!(
      self.from_store(self.store.log_events_by_actor(subject_id)),
      self.from_store(self.store.rule_table()),
      self.from_store(self.store.label_table()),
    )?;

    let activity = summarize(&events, &labels);

    let mut request_ids: Vec<i64> = events
      .iter()
      .filter(|e| e.is_request_closure())
      .map(|e| e.object_id)
      .collect();
    request_ids.sort_unstable();
    request_ids.dedup();

    let request_names = if request_ids.is_empty() {
      HashMap::new()
    } else {
      self.from_store(self.store.request_names(request_ids)).await?
    };

    let (created, not_created) = partition_closures(&events, &rules, &request_names);
    Ok((activity, created, not_created))
  }

  async fn account_log(&self, subject_id: UserId) -> Result<Vec<AuditEntry>> {
    let records = bounded(
      Collaborator::Store,
      self.options.audit_timeout,
      self.from_store(self.store.audit_log_for_user(subject_id)),
    )
    .await?;
    Ok(prepare_account_log(records))
  }

  async fn identification_status(&self, user: &User) -> Result<IdentificationStatus> {
    let check = || {
      bounded(Collaborator::Identification, self.options.identification_timeout, async {
        self
          .identification
          .is_identified(&user.on_wiki_name)
          .await
          .map_err(|e| Error::collaborator(Collaborator::Identification, e))
      })
    };
    resolve_with(user.force_identified, check).await
  }

  async fn linkage_facts(&self, subject_id: UserId) -> Result<Option<LinkageFacts>> {
    self
      .linkage
      .linkage(subject_id)
      .await
      .map_err(|e| Error::collaborator(Collaborator::Linkage, e))
  }

  async fn permissions(&self, viewer: UserId, subject: UserId) -> Result<PermissionFlags> {
    let (approve, deactivate, rename, edit_user, edit_roles) = tokio::try_join!(
      self.allowed(viewer, subject, Capability::Approve),
      self.allowed(viewer, subject, Capability::Deactivate),
      self.allowed(viewer, subject, Capability::Rename),
      self.allowed(viewer, subject, Capability::EditUser),
      self.allowed(viewer, subject, Capability::EditRoles),
    )?;

    Ok(PermissionFlags { approve, deactivate, rename, edit_user, edit_roles })
  }

  async fn allowed(
    &self,
    viewer: UserId,
    subject: UserId,
    capability: Capability,
  ) -> Result<bool> {
    self
      .authorizer
      .is_allowed(viewer, subject, capability)
      .await
      .map_err(|e| Error::collaborator(Collaborator::Authorization, e))
  }

  async fn from_store<T>(
    &self,
    fut: impl Future<Output = Result<T, S::Error>>,
  ) -> Result<T> {
    fut.await.map_err(|e| Error::collaborator(Collaborator::Store, e))
  }
}

/// Await `fut`, failing with [`Error::Timeout`] if `limit` elapses first.
async fn bounded<T>(
  collaborator: Collaborator,
  limit: Option<Duration>,
  fut: impl Future<Output = Result<T>>,
) -> Result<T> {
  match limit {
    Some(after) => tokio::time::timeout(after, fut)
      .await
      .map_err(|_| Error::Timeout { collaborator, after })?,
    None => fut.await,
  }
}
