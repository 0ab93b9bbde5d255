//! netawatch server binary.
//!
//! Reads `config.toml` (or the path specified with `--config`), opens an
//! in-process SQLite store, and serves the JSON API over HTTP.
//!
//! # One-shot modes
//!
//! The weekly scoring batch is normally triggered over HTTP
//! (`POST /scores/calculate`), but cron-style deployments can run it
//! directly and exit:
//!
//! ```
//! netawatch --calculate-scores
//! ```
//!
//! The pincode → ward lookup table is seeded from a JSON array of
//! mappings:
//!
//! ```
//! netawatch --import-pincodes pincodes.json
//! ```

use std::{
  path::{Path, PathBuf},
  sync::Arc,
};

use anyhow::Context as _;
use chrono::Utc;
use clap::Parser;
use netawatch_core::{batch::run_weekly_scoring, geo::WardLocation, store::CivicStore};
use netawatch_store_sqlite::SqliteStore;
use serde::Deserialize;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "NetaWatch civic-signals server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,

  /// Run the weekly ward scoring batch once and exit.
  #[arg(long)]
  calculate_scores: bool,

  /// Seed the pincode lookup table from a JSON file and exit.
  #[arg(long, value_name = "FILE")]
  import_pincodes: Option<PathBuf>,
}

/// Runtime server configuration, deserialised from `config.toml`.
#[derive(Deserialize, Clone)]
struct ServerConfig {
  host:       String,
  port:       u16,
  store_path: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  // Initialise tracing.
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  // Load configuration.
  let settings = config::Config::builder()
    .add_source(config::File::from(cli.config).required(false))
    .add_source(config::Environment::with_prefix("NETAWATCH"))
    .build()
    .context("failed to read config file")?;

  let server_cfg: ServerConfig = settings
    .try_deserialize()
    .context("failed to deserialise ServerConfig")?;

  // Expand `~` in store path.
  let store_path = expand_tilde(&server_cfg.store_path);

  // Open SQLite store.
  let store = SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))?;

  // One-shot mode: seed the pincode lookup table and exit.
  if let Some(path) = cli.import_pincodes {
    let imported = import_pincodes(&store, &path).await?;
    tracing::info!("imported {imported} pincode mappings from {path:?}");
    return Ok(());
  }

  // One-shot mode: run the scoring batch and exit.
  if cli.calculate_scores {
    let summary = run_weekly_scoring(&store, Utc::now())
      .await
      .context("weekly scoring run failed")?;
    tracing::info!(
      "scored {} wards for week {}/{}",
      summary.wards_processed,
      summary.week.week_number,
      summary.week.year,
    );
    return Ok(());
  }

  let app = netawatch_api::api_router(Arc::new(store)).layer(TraceLayer::new_for_http());
  let address = format!("{}:{}", server_cfg.host, server_cfg.port);

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}

/// Load a JSON array of [`WardLocation`] mappings into the store.
async fn import_pincodes(store: &SqliteStore, path: &Path) -> anyhow::Result<usize> {
  let raw = std::fs::read_to_string(path)
    .with_context(|| format!("failed to read {path:?}"))?;
  let mappings: Vec<WardLocation> =
    serde_json::from_str(&raw).context("failed to parse pincode mappings")?;

  let count = mappings.len();
  for mapping in mappings {
    store
      .put_location(mapping)
      .await
      .context("failed to store pincode mapping")?;
  }
  Ok(count)
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
