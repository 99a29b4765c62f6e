//! Stage transform, run as `db_user`: copy landed rows into
//! `stage.pokies_stage` with per-row transform metadata.

use anyhow::Result;
use pokiescraper::config::{DbConfig, DbRole};
use pokiescraper::etl;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder().with_env_filter(env).init();

    let pool = DbConfig::from_env(DbRole::User).connect().await?;
    etl::ensure_stage_tables(&pool).await?;
    let staged = etl::stage_transform(&pool).await?;
    info!(rows = staged, "stage transform complete");
    Ok(())
}
