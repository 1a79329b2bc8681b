//! acc-stats binary.
//!
//! Reads `config.toml` (or the path given with `--config`), opens the SQLite
//! store, and either serves the statistics API over HTTP or prints a single
//! user's report.
//!
//! ```sh
//! cargo run -p acc-server -- report --user 42 --viewer 1
//! ```

use std::{path::PathBuf, sync::Arc};

use acc_core::user::UserId;
use acc_server::{ServerConfig, build_assembler, router};
use anyhow::Context as _;
use clap::{Parser, Subcommand};
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Account creation tool user statistics")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,

  #[command(subcommand)]
  command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
  /// Serve the JSON API (the default).
  Serve,
  /// Print one user's report as JSON and exit.
  Report {
    /// The user the report is about.
    #[arg(long)]
    user:   i64,
    /// The user viewing the report; decides the permission flags.
    #[arg(long)]
    viewer: i64,
  },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  // Logs go to stderr so `report` output stays pipeable.
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .with_writer(std::io::stderr)
    .init();

  let cli = Cli::parse();
  let server_cfg = ServerConfig::load(&cli.config)?;
  let assembler = Arc::new(build_assembler(&server_cfg).await?);

  match cli.command.unwrap_or(Command::Serve) {
    Command::Serve => {
      let app = router(assembler);
      let address = format!("{}:{}", server_cfg.host, server_cfg.port);

      tracing::info!("Listening on http://{address}");
      let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("failed to bind {address}"))?;

      axum::serve(listener, app).await.context("server error")?;
    }
    Command::Report { user, viewer } => {
      let report = assembler
        .assemble(UserId(user), UserId(viewer))
        .await
        .with_context(|| format!("failed to build report for user {user}"))?;
      println!("{}", serde_json::to_string_pretty(&report)?);
    }
  }

  Ok(())
}
