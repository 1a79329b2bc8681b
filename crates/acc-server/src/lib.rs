//! Server wiring for the statistics API: configuration, collaborator
//! construction and the HTTP router.

use std::{
  path::{Path, PathBuf},
  sync::Arc,
  time::Duration,
};

use acc_core::{
  AssembleOptions, ReportAssembler,
  permission::{CapabilityPolicy, RoleAuthorizer},
};
use acc_store_sqlite::{CachedIdentification, SqliteStore};
use anyhow::Context as _;
use axum::Router;
use serde::Deserialize;
use tower_http::trace::TraceLayer;

/// The assembler as wired by this server: every collaborator backed by one
/// SQLite store.
pub type Assembler = ReportAssembler<
  SqliteStore,
  SqliteStore,
  CachedIdentification,
  RoleAuthorizer<SqliteStore>,
>;

// ─── Configuration ───────────────────────────────────────────────────────────

/// Runtime configuration, deserialised from `config.toml` and `ACC_*`
/// environment variables.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:                        String,
  #[serde(default = "default_port")]
  pub port:                        u16,
  pub store_path:                  PathBuf,
  /// How long a positive identification check stays valid.
  #[serde(default = "default_identification_max_age_days")]
  pub identification_max_age_days: i64,
  pub identification_timeout_ms:   Option<u64>,
  pub audit_timeout_ms:            Option<u64>,
  #[serde(default)]
  pub permissions:                 CapabilityPolicy,
}

fn default_host() -> String { "127.0.0.1".to_owned() }

fn default_port() -> u16 { 8080 }

fn default_identification_max_age_days() -> i64 { 1 }

impl ServerConfig {
  /// Read `path` (if it exists) layered under `ACC_*` environment variables.
  pub fn load(path: &Path) -> anyhow::Result<Self> {
    let settings = config::Config::builder()
      .add_source(config::File::from(path).required(false))
      .add_source(config::Environment::with_prefix("ACC"))
      .build()
      .context("failed to read config file")?;

    Self::from_settings(settings)
  }

  pub fn from_settings(settings: config::Config) -> anyhow::Result<Self> {
    settings
      .try_deserialize()
      .context("failed to deserialise ServerConfig")
  }

  pub fn assemble_options(&self) -> AssembleOptions {
    AssembleOptions {
      identification_timeout: self.identification_timeout_ms.map(Duration::from_millis),
      audit_timeout:          self.audit_timeout_ms.map(Duration::from_millis),
    }
  }
}

// ─── Construction ────────────────────────────────────────────────────────────

/// Open the store named in `cfg` and wire all collaborators to it.
pub async fn build_assembler(cfg: &ServerConfig) -> anyhow::Result<Assembler> {
  let store_path = expand_tilde(&cfg.store_path);
  let store = SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))?;

  Ok(assembler_for(store, cfg))
}

/// Wire all collaborators to an already-open `store`.
pub fn assembler_for(store: SqliteStore, cfg: &ServerConfig) -> Assembler {
  let identification = CachedIdentification::new(
    store.clone(),
    chrono::Duration::days(cfg.identification_max_age_days),
  );
  let authorizer = RoleAuthorizer::new(store.clone(), cfg.permissions.clone());

  ReportAssembler::new(store.clone(), store, identification, authorizer)
    .with_options(cfg.assemble_options())
}

/// The full HTTP application: the API under `/api`, with request tracing.
pub fn router(assembler: Arc<Assembler>) -> Router {
  Router::new()
    .nest("/api", acc_api::api_router(assembler))
    .layer(TraceLayer::new_for_http())
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_tilde(path: &Path) -> PathBuf {
  expand_home(path, std::env::var_os("HOME").map(PathBuf::from))
}

fn expand_home(path: &Path, home: Option<PathBuf>) -> PathBuf {
  match (path.strip_prefix("~"), home) {
    (Ok(rest), Some(home)) => home.join(rest),
    _ => path.to_path_buf(),
  }
}
