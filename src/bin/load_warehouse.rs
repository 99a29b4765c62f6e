//! Create and fill the landing tables from the current ledger: one table
//! per (entity type, reporting period), dropped and recreated per run.

use anyhow::Result;
use pokiescraper::{
    config::{DbConfig, DbRole, Sources},
    ledger::Ledger,
    load,
};
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder().with_env_filter(env).init();

    let sources = Sources::load("sources.yaml")?;
    let data_dir = sources.data_dir.clone();
    let ledger = Ledger::load(data_dir.join("download_metadata.csv"))?;
    info!("{} documents in ledger", ledger.records().len());

    let pool = DbConfig::from_env(DbRole::Load).connect().await?;
    load::ensure_land_schema(&pool).await?;

    let mut loaded = 0usize;
    let mut skipped = 0usize;
    let mut failed = 0usize;
    for record in ledger.records() {
        if !record.is_loadable() {
            info!(file = %record.filename, "skipping: header or period not recognized");
            skipped += 1;
            continue;
        }
        match load::load_document(&pool, &data_dir, record).await {
            Ok(outcome) => {
                info!(file = %record.filename, table = %outcome.table, rows = outcome.rows, "loaded");
                loaded += 1;
            }
            Err(err) => {
                // The document's transaction is already rolled back; keep going.
                error!(file = %record.filename, "load failed: {err:#}");
                failed += 1;
            }
        }
    }

    info!(loaded, skipped, failed, "warehouse load complete");
    Ok(())
}
