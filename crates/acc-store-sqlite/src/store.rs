//! [`SqliteStore`], the SQLite implementation of the report collaborators.

use std::{collections::HashMap, path::Path};

use acc_core::{
  audit::AuditRecord,
  collab::{AccountStore, LinkageProvider, RoleDirectory},
  event::LogEvent,
  linkage::LinkageFacts,
  permission::Standing,
  rules::{DefaultOutcome, LabelTable, RuleEntry, RuleTable},
  user::{User, UserId},
};
use chrono::{DateTime, Utc};
use rusqlite::OptionalExtension as _;
use tracing::warn;

use crate::{
  Result,
  encode::{RawIdentity, RawLogEvent, RawUser, decode_dt, decode_status},
  schema::SCHEMA,
};

/// Ids bound per `request_names` query; SQLite caps bound variables at 32766.
const REQUEST_NAME_BATCH: usize = 1000;

// ─── Store ───────────────────────────────────────────────────────────────────

/// Statistics data backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  #[cfg(test)]
  pub(crate) fn connection(&self) -> &tokio_rusqlite::Connection { &self.conn }

  /// When the identification check last found `on_wiki_name`, if ever.
  pub async fn identification_checked_at(
    &self,
    on_wiki_name: &str,
  ) -> Result<Option<DateTime<Utc>>> {
    let name = on_wiki_name.to_owned();

    let raw: Option<String> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT check_time FROM id_cache WHERE onwiki_name = ?1",
              rusqlite::params![name],
              |row| row.get(0),
            )
            .optional()?,
        )
      })
      .await?;

    raw.as_deref().map(decode_dt).transpose()
  }
}

// ─── AccountStore impl ───────────────────────────────────────────────────────

impl AccountStore for SqliteStore {
  type Error = crate::Error;

  async fn get_user(&self, id: UserId) -> Result<Option<User>> {
    let raw: Option<RawUser> = self
      .conn
      .call(move |conn| {
        let sql = format!("SELECT {} FROM users WHERE id = ?1", RawUser::COLUMNS);
        Ok(
          conn
            .query_row(&sql, rusqlite::params![id.0], RawUser::from_row)
            .optional()?,
        )
      })
      .await?;

    raw.map(RawUser::into_user).transpose()
  }

  async fn log_events_by_actor(&self, actor: UserId) -> Result<Vec<LogEvent>> {
    let raws: Vec<RawLogEvent> = self
      .conn
      .call(move |conn| {
        let sql = format!(
          "SELECT {} FROM log l WHERE l.user_id = ?1 ORDER BY l.timestamp, l.id",
          RawLogEvent::COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params![actor.0], RawLogEvent::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawLogEvent::into_event).collect()
  }

  async fn audit_log_for_user(&self, subject: UserId) -> Result<Vec<AuditRecord>> {
    let raws: Vec<RawLogEvent> = self
      .conn
      .call(move |conn| {
        let sql = format!(
          "SELECT {}, a.username
           FROM log l
           LEFT JOIN users a ON a.id = l.user_id
           WHERE l.object_type = 'User' AND l.object_id = ?1
           ORDER BY l.timestamp DESC, l.id DESC",
          RawLogEvent::COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params![subject.0], |row| {
            let mut raw = RawLogEvent::from_row(row)?;
            raw.actor_name = row.get(7)?;
            Ok(raw)
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawLogEvent::into_audit_record).collect()
  }

  async fn request_names(&self, request_ids: Vec<i64>) -> Result<HashMap<i64, String>> {
    if request_ids.is_empty() {
      return Ok(HashMap::new());
    }

    let names = self
      .conn
      .call(move |conn| {
        let mut names = HashMap::with_capacity(request_ids.len());
        for chunk in request_ids.chunks(REQUEST_NAME_BATCH) {
          let placeholders = vec!["?"; chunk.len()].join(", ");
          let sql = format!("SELECT id, name FROM requests WHERE id IN ({placeholders})");
          let mut stmt = conn.prepare_cached(&sql)?;
          let rows = stmt.query_map(rusqlite::params_from_iter(chunk), |row| {
            Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?))
          })?;
          for row in rows {
            let (id, name) = row?;
            names.insert(id, name);
          }
        }
        Ok(names)
      })
      .await?;

    Ok(names)
  }

  async fn rule_table(&self) -> Result<RuleTable> {
    let rows: Vec<(i64, Option<String>)> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare("SELECT id, default_action FROM email_templates")?;
        let rows = stmt
          .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    let mut table = RuleTable::new();
    for (id, default_action) in rows {
      let Ok(template_id) = u32::try_from(id) else {
        warn!(id, "skipping email template with out-of-range id");
        continue;
      };
      table.insert(RuleEntry {
        template_id,
        default_outcome: DefaultOutcome::from_stored(default_action.as_deref()),
      });
    }
    Ok(table)
  }

  async fn label_table(&self) -> Result<LabelTable> {
    let rows: Vec<(String, String)> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare("SELECT closes, mail_desc FROM closes")?;
        let rows = stmt
          .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    Ok(rows.into_iter().collect())
  }
}

// ─── LinkageProvider impl ────────────────────────────────────────────────────

impl LinkageProvider for SqliteStore {
  type Error = crate::Error;

  /// Fully linked means both an access token and a stored identity exist.
  async fn linkage(&self, user: UserId) -> Result<Option<LinkageFacts>> {
    let raw: Option<RawIdentity> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT i.username, i.edit_count, i.grants, i.blocked,
                      i.issued_at, i.expires_at
               FROM oauth_identities i
               JOIN oauth_tokens t
                 ON t.user_id = i.user_id AND t.token_type = 'access'
               WHERE i.user_id = ?1",
              rusqlite::params![user.0],
              |row| {
                Ok(RawIdentity {
                  username:   row.get(0)?,
                  edit_count: row.get(1)?,
                  grants:     row.get(2)?,
                  blocked:    row.get(3)?,
                  issued_at:  row.get(4)?,
                  expires_at: row.get(5)?,
                })
              },
            )
            .optional()?,
        )
      })
      .await?;

    let Some(raw) = raw else { return Ok(None) };
    Ok(Some(LinkageFacts::new(raw.into_identity()?, Utc::now())))
  }
}

// ─── RoleDirectory impl ──────────────────────────────────────────────────────

impl RoleDirectory for SqliteStore {
  type Error = crate::Error;

  async fn standing(&self, user: UserId) -> Result<Option<Standing>> {
    let raw: Option<(String, Vec<String>)> = self
      .conn
      .call(move |conn| {
        let status: Option<String> = conn
          .query_row(
            "SELECT status FROM users WHERE id = ?1",
            rusqlite::params![user.0],
            |row| row.get(0),
          )
          .optional()?;
        let Some(status) = status else { return Ok(None) };

        let mut stmt =
          conn.prepare("SELECT role FROM user_roles WHERE user_id = ?1 ORDER BY role")?;
        let roles = stmt
          .query_map(rusqlite::params![user.0], |row| row.get(0))?
          .collect::<rusqlite::Result<Vec<String>>>()?;
        Ok(Some((status, roles)))
      })
      .await?;

    let Some((status, roles)) = raw else { return Ok(None) };
    Ok(Some(Standing { status: decode_status(&status)?, roles }))
  }
}
