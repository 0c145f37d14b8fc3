#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Beach sargassum stranding risk.
//!
//! ```text
//! sargassum_beaches              # score the latest drift simulation, then report
//! sargassum_beaches --report     # report the latest stored batch
//! sargassum_beaches --json       # latest stored batch as JSON
//! ```
//!
//! The database path comes from `--db`, then `SARGASSUM_DB_PATH`, then
//! `./sargassum_data.db`. `RUST_LOG` controls log verbosity.

use std::path::PathBuf;

use clap::Parser;
use sargassum_database::{SqliteScoreStore, paths};
use sargassum_scoring::{ScoreComputer, ScoreRepository as _, catalog, report};
use sargassum_scoring_models::ScoringConfig;

#[derive(Parser)]
#[command(
    name = "sargassum_beaches",
    about = "Compute and report per-beach sargassum stranding risk"
)]
struct Cli {
    /// Print the latest stored report without computing a new batch
    #[arg(long, conflicts_with = "json")]
    report: bool,

    /// Print the latest stored batch as JSON without computing a new batch
    #[arg(long)]
    json: bool,

    /// `SQLite` database shared with the drift collector
    #[arg(long, value_name = "PATH")]
    db: Option<PathBuf>,

    /// Beach catalog TOML file
    #[arg(long, value_name = "PATH", conflicts_with = "catalog")]
    config: Option<PathBuf>,

    /// Built-in beach catalog to use instead of a file
    #[arg(long, value_name = "ID")]
    catalog: Option<String>,
}

impl Cli {
    fn scoring_config(&self) -> Result<ScoringConfig, catalog::ConfigError> {
        if let Some(path) = &self.config {
            return catalog::load_catalog(path);
        }
        catalog::embedded_catalog(self.catalog.as_deref().unwrap_or(catalog::DEFAULT_CATALOG))
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init();
    let cli = Cli::parse();

    let config = cli.scoring_config().inspect_err(|e| {
        if matches!(e, catalog::ConfigError::UnknownCatalog(_)) {
            log::error!(
                "Available catalogs: {}",
                catalog::embedded_catalog_ids().join(", ")
            );
        }
    })?;

    let db_path = cli.db.clone().unwrap_or_else(paths::db_path_from_env);
    log::info!(
        "Using database {} with catalog '{}' ({} beaches)",
        db_path.display(),
        config.name,
        config.beaches.len()
    );
    let store = SqliteScoreStore::open(&db_path).await?;

    if cli.json {
        let rows = store.latest_batch().await?;
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    if cli.report {
        print!("{}", report::render_latest_report(&store, &config).await?);
        return Ok(());
    }

    let computer = ScoreComputer::new(store, config);
    let inserted = computer.compute_scores().await?;
    if inserted == 0 {
        println!("No new scores computed (no drift snapshot for the configured day offsets).");
    } else {
        println!("{inserted} beach risk scores inserted.");
    }

    print!(
        "{}",
        report::render_latest_report(computer.repository(), computer.config()).await?
    );

    Ok(())
}
