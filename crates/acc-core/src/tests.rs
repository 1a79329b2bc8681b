//! Report assembly against in-memory fake collaborators.

use std::{
  collections::HashMap,
  future::Future,
  sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
  },
  time::Duration,
};

use chrono::{DateTime, TimeZone, Utc};

use crate::{
  AssembleOptions, Collaborator, Error, ReportAssembler,
  audit::AuditRecord,
  collab::{AccountStore, Authorizer, IdentificationCheck, LinkageProvider},
  event::{LogEvent, ObjectType},
  identification::IdentificationStatus,
  linkage::{ExternalIdentity, LinkageFacts},
  permission::{Capability, PermissionFlags},
  report::ClosedRequest,
  rules::{DefaultOutcome, LabelTable, RuleEntry, RuleTable},
  user::{User, UserId, UserStatus},
};

// ─── Fakes ───────────────────────────────────────────────────────────────────

#[derive(Debug, thiserror::Error)]
#[error("fake {0} failure")]
struct FakeError(&'static str);

#[derive(Default)]
struct FakeStore {
  users:       HashMap<UserId, User>,
  events:      Vec<LogEvent>,
  audit:       Vec<AuditRecord>,
  requests:    HashMap<i64, String>,
  rules:       RuleTable,
  labels:      LabelTable,
  fail_audit:  bool,
  audit_delay: Option<Duration>,
}

impl AccountStore for FakeStore {
  type Error = FakeError;

  fn get_user(
    &self,
    id: UserId,
  ) -> impl Future<Output = Result<Option<User>, FakeError>> + Send + '_ {
    async move { Ok(self.users.get(&id).cloned()) }
  }

  fn log_events_by_actor(
    &self,
    actor: UserId,
  ) -> impl Future<Output = Result<Vec<LogEvent>, FakeError>> + Send + '_ {
    async move {
      Ok(self.events.iter().filter(|e| e.actor == actor).cloned().collect())
    }
  }

  fn audit_log_for_user(
    &self,
    subject: UserId,
  ) -> impl Future<Output = Result<Vec<AuditRecord>, FakeError>> + Send + '_ {
    async move {
      if self.fail_audit {
        return Err(FakeError("audit"));
      }
      if let Some(delay) = self.audit_delay {
        tokio::time::sleep(delay).await;
      }
      Ok(
        self
          .audit
          .iter()
          .filter(|r| r.event.object_id == subject.0)
          .cloned()
          .collect(),
      )
    }
  }

  fn request_names(
    &self,
    request_ids: Vec<i64>,
  ) -> impl Future<Output = Result<HashMap<i64, String>, FakeError>> + Send + '_ {
    async move {
      Ok(
        request_ids
          .into_iter()
          .filter_map(|id| self.requests.get(&id).map(|n| (id, n.clone())))
          .collect(),
      )
    }
  }

  fn rule_table(&self) -> impl Future<Output = Result<RuleTable, FakeError>> + Send + '_ {
    async move { Ok(self.rules.clone()) }
  }

  fn label_table(&self) -> impl Future<Output = Result<LabelTable, FakeError>> + Send + '_ {
    async move { Ok(self.labels.clone()) }
  }
}

#[derive(Default)]
struct FakeLinkage(Option<LinkageFacts>);

impl LinkageProvider for FakeLinkage {
  type Error = FakeError;

  fn linkage(
    &self,
    _user: UserId,
  ) -> impl Future<Output = Result<Option<LinkageFacts>, FakeError>> + Send + '_ {
    async move { Ok(self.0.clone()) }
  }
}

#[derive(Default)]
struct FakeCheck {
  identified: bool,
  delay:      Option<Duration>,
  calls:      Arc<AtomicUsize>,
}

impl IdentificationCheck for FakeCheck {
  type Error = FakeError;

  fn is_identified<'a>(
    &'a self,
    _on_wiki_name: &'a str,
  ) -> impl Future<Output = Result<bool, FakeError>> + Send + 'a {
    async move {
      self.calls.fetch_add(1, Ordering::SeqCst);
      if let Some(delay) = self.delay {
        tokio::time::sleep(delay).await;
      }
      Ok(self.identified)
    }
  }
}

#[derive(Default)]
struct FakeAuthorizer {
  granted: Vec<Capability>,
  calls:   Arc<AtomicUsize>,
}

impl Authorizer for FakeAuthorizer {
  type Error = FakeError;

  fn is_allowed(
    &self,
    _viewer: UserId,
    _subject: UserId,
    capability: Capability,
  ) -> impl Future<Output = Result<bool, FakeError>> + Send + '_ {
    async move {
      self.calls.fetch_add(1, Ordering::SeqCst);
      Ok(self.granted.contains(&capability))
    }
  }
}

type Assembler = ReportAssembler<FakeStore, FakeLinkage, FakeCheck, FakeAuthorizer>;

// ─── Fixtures ────────────────────────────────────────────────────────────────

const SUBJECT: UserId = UserId(1);
const VIEWER: UserId = UserId(2);

fn ts(secs: i64) -> DateTime<Utc> { Utc.timestamp_opt(secs, 0).unwrap() }

fn user(id: UserId, force_identified: Option<bool>) -> User {
  User {
    id,
    username: format!("user{}", id.0),
    on_wiki_name: format!("Wiki user {}", id.0),
    status: UserStatus::Active,
    force_identified,
    created_at: ts(0),
  }
}

fn event(id: i64, secs: i64, action: &str, object_type: ObjectType, object_id: i64) -> LogEvent {
  LogEvent {
    id,
    timestamp: ts(secs),
    actor: SUBJECT,
    action: action.into(),
    object_type,
    object_id,
    comment: None,
  }
}

fn closure(id: i64, secs: i64, action: &str, request_id: i64) -> LogEvent {
  event(id, secs, action, ObjectType::Request, request_id)
}

fn store_with_subject(force_identified: Option<bool>) -> FakeStore {
  let mut store = FakeStore::default();
  store.users.insert(SUBJECT, user(SUBJECT, force_identified));
  store.users.insert(VIEWER, user(VIEWER, None));
  store
}

fn assembler(store: FakeStore) -> Assembler {
  ReportAssembler::new(
    store,
    FakeLinkage::default(),
    FakeCheck::default(),
    FakeAuthorizer::default(),
  )
}

// ─── Closure buckets ─────────────────────────────────────────────────────────

#[tokio::test]
async fn rule_and_legacy_closures_land_in_their_buckets() {
  let mut store = store_with_subject(Some(true));
  store.rules = [RuleEntry { template_id: 5, default_outcome: DefaultOutcome::Created }]
    .into_iter()
    .collect();
  store.events = vec![
    closure(10, 1, "Closed 5", 100),
    closure(11, 2, "Closed custom-n", 101),
  ];
  store.requests.insert(100, "Alpha".into());
  store.requests.insert(101, "Beta".into());

  let report = assembler(store).assemble(SUBJECT, VIEWER).await.unwrap();

  assert_eq!(report.created, vec![ClosedRequest {
    timestamp:    ts(1),
    request_id:   100,
    request_name: "Alpha".into(),
  }]);
  assert_eq!(report.not_created, vec![ClosedRequest {
    timestamp:    ts(2),
    request_id:   101,
    request_name: "Beta".into(),
  }]);
}

#[tokio::test]
async fn buckets_are_sorted_and_skip_unmatched_closures() {
  let mut store = store_with_subject(Some(false));
  store.events = vec![
    closure(1, 30, "Closed custom-y", 1),
    closure(2, 10, "Closed custom-y", 2),
    closure(3, 20, "Closed 0", 3),
    // Request no longer exists.
    closure(4, 5, "Closed custom-y", 404),
    // Neutral closure.
    closure(5, 6, "Closed custom", 1),
    // Closure-looking action on a non-request object.
    event(6, 7, "Closed custom-y", ObjectType::User, 1),
    event(7, 8, "Reserved", ObjectType::Request, 1),
  ];
  for id in 1..=3 {
    store.requests.insert(id, format!("Request {id}"));
  }

  let report = assembler(store).assemble(SUBJECT, VIEWER).await.unwrap();

  let created: Vec<_> = report.created.iter().map(|c| c.request_id).collect();
  assert_eq!(created, [2, 1]);
  let not_created: Vec<_> = report.not_created.iter().map(|c| c.request_id).collect();
  assert_eq!(not_created, [3]);

  // Every event still counts towards the activity summary.
  assert_eq!(report.activity.iter().map(|a| a.count).sum::<u64>(), 7);
}

#[tokio::test]
async fn activity_uses_labels_and_sorts() {
  let mut store = store_with_subject(Some(true));
  store.labels = [("Closed 5", "Created (template)")].into_iter().collect();
  store.events = vec![
    closure(1, 1, "Reserved", 1),
    closure(2, 2, "Closed 5", 1),
    closure(3, 3, "Reserved", 2),
  ];

  let report = assembler(store).assemble(SUBJECT, VIEWER).await.unwrap();
  let got: Vec<_> = report
    .activity
    .iter()
    .map(|a| (a.label.as_str(), a.count))
    .collect();
  assert_eq!(got, [("Created (template)", 1), ("Reserved", 2)]);
}

// ─── Failure handling ────────────────────────────────────────────────────────

#[tokio::test]
async fn missing_subject_is_not_found() {
  let store = store_with_subject(None);
  let check = FakeCheck::default();
  let calls = check.calls.clone();
  let assembler = ReportAssembler::new(
    store,
    FakeLinkage::default(),
    check,
    FakeAuthorizer::default(),
  );

  let err = assembler.assemble(UserId(99), VIEWER).await.unwrap_err();
  assert!(matches!(err, Error::NotFound(UserId(99))));
  assert!(err.is_not_found());
  assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn collaborator_failure_aborts_assembly() {
  let mut store = store_with_subject(Some(true));
  store.fail_audit = true;

  let err = assembler(store).assemble(SUBJECT, VIEWER).await.unwrap_err();
  assert!(matches!(
    err,
    Error::Collaborator { collaborator: Collaborator::Store, .. }
  ));
}

#[tokio::test]
async fn slow_identification_check_times_out() {
  let check = FakeCheck {
    identified: true,
    delay:      Some(Duration::from_millis(500)),
    calls:      Arc::default(),
  };
  let assembler = ReportAssembler::new(
    store_with_subject(None),
    FakeLinkage::default(),
    check,
    FakeAuthorizer::default(),
  )
  .with_options(AssembleOptions {
    identification_timeout: Some(Duration::from_millis(10)),
    audit_timeout:          None,
  });

  let err = assembler.assemble(SUBJECT, VIEWER).await.unwrap_err();
  assert!(matches!(
    err,
    Error::Timeout { collaborator: Collaborator::Identification, .. }
  ));
}

#[tokio::test]
async fn slow_audit_fetch_times_out() {
  let mut store = store_with_subject(Some(true));
  store.audit_delay = Some(Duration::from_millis(500));
  let assembler = assembler(store).with_options(AssembleOptions {
    identification_timeout: None,
    audit_timeout:          Some(Duration::from_millis(10)),
  });

  let err = assembler.assemble(SUBJECT, VIEWER).await.unwrap_err();
  assert!(matches!(
    err,
    Error::Timeout { collaborator: Collaborator::Store, after }
      if after == Duration::from_millis(10)
  ));
}

#[tokio::test]
async fn audit_fetch_within_its_limit_succeeds() {
  let mut store = store_with_subject(Some(true));
  store.audit_delay = Some(Duration::from_millis(5));
  let assembler = assembler(store).with_options(AssembleOptions {
    identification_timeout: None,
    audit_timeout:          Some(Duration::from_secs(5)),
  });

  let report = assembler.assemble(SUBJECT, VIEWER).await.unwrap();
  assert!(report.account_log.is_empty());
}

// ─── Identification ──────────────────────────────────────────────────────────

#[tokio::test]
async fn forced_flag_skips_the_check() {
  for (flag, expected) in [
    (true, IdentificationStatus::ForcedOn),
    (false, IdentificationStatus::ForcedOff),
  ] {
    let check = FakeCheck { identified: true, ..FakeCheck::default() };
    let calls = check.calls.clone();
    let assembler = ReportAssembler::new(
      store_with_subject(Some(flag)),
      FakeLinkage::default(),
      check,
      FakeAuthorizer::default(),
    );

    let report = assembler.assemble(SUBJECT, VIEWER).await.unwrap();
    assert_eq!(report.identification, expected);
    assert_eq!(calls.load(Ordering::SeqCst), 0);
  }
}

#[tokio::test]
async fn unset_flag_runs_the_check_once() {
  for (identified, expected) in [
    (true, IdentificationStatus::Detected),
    (false, IdentificationStatus::Missing),
  ] {
    let check = FakeCheck { identified, ..FakeCheck::default() };
    let calls = check.calls.clone();
    let assembler = ReportAssembler::new(
      store_with_subject(None),
      FakeLinkage::default(),
      check,
      FakeAuthorizer::default(),
    );

    let report = assembler.assemble(SUBJECT, VIEWER).await.unwrap();
    assert_eq!(report.identification, expected);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
  }
}

// ─── Audit log, linkage, permissions ─────────────────────────────────────────

#[tokio::test]
async fn empty_account_log_is_an_empty_list() {
  let report = assembler(store_with_subject(Some(true)))
    .assemble(SUBJECT, VIEWER)
    .await
    .unwrap();
  assert!(report.account_log.is_empty());
  assert!(report.linkage.is_none());

  let json = serde_json::to_value(&report).unwrap();
  assert_eq!(json["account_log"], serde_json::json!([]));
}

#[tokio::test]
async fn account_log_is_described_newest_first() {
  let mut store = store_with_subject(Some(true));
  store.audit = vec![
    AuditRecord {
      event:      LogEvent { actor: VIEWER, ..event(1, 10, "Approved", ObjectType::User, 1) },
      actor_name: Some("user2".into()),
    },
    AuditRecord {
      event:      LogEvent { actor: VIEWER, ..event(2, 20, "RoleChange", ObjectType::User, 1) },
      actor_name: Some("user2".into()),
    },
  ];

  let report = assembler(store).assemble(SUBJECT, VIEWER).await.unwrap();
  let got: Vec<_> = report
    .account_log
    .iter()
    .map(|e| e.description.as_str())
    .collect();
  assert_eq!(got, ["changed roles", "approved"]);
}

#[tokio::test]
async fn linkage_facts_pass_through() {
  let facts = LinkageFacts::new(
    ExternalIdentity {
      username:   "Wiki user 1".into(),
      edit_count: 1234,
      grants:     vec!["basic".into(), "createaccount".into()],
      blocked:    false,
      issued_at:  ts(0),
      expires_at: ts(1),
    },
    ts(100),
  );
  let assembler = ReportAssembler::new(
    store_with_subject(Some(true)),
    FakeLinkage(Some(facts.clone())),
    FakeCheck::default(),
    FakeAuthorizer::default(),
  );

  let report = assembler.assemble(SUBJECT, VIEWER).await.unwrap();
  assert_eq!(report.linkage, Some(facts));
  assert!(report.linkage.unwrap().identity_expired);
}

#[tokio::test]
async fn each_capability_is_checked_independently() {
  let authorizer = FakeAuthorizer {
    granted: vec![Capability::Approve, Capability::EditRoles],
    calls:   Arc::default(),
  };
  let calls = authorizer.calls.clone();
  let assembler = ReportAssembler::new(
    store_with_subject(Some(true)),
    FakeLinkage::default(),
    FakeCheck::default(),
    authorizer,
  );

  let report = assembler.assemble(SUBJECT, VIEWER).await.unwrap();
  assert_eq!(report.permissions, PermissionFlags {
    approve:    true,
    deactivate: false,
    rename:     false,
    edit_user:  false,
    edit_roles: true,
  });
  assert_eq!(calls.load(Ordering::SeqCst), 5);
}
