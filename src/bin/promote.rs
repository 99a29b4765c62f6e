//! Promotion, run as `db_owner`: aggregate stage into the per-LGA per-year
//! prod summary and append a promotion audit row.

use anyhow::Result;
use pokiescraper::config::{DbConfig, DbRole};
use pokiescraper::etl;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder().with_env_filter(env).init();

    let config = DbConfig::from_env(DbRole::Owner);
    let pool = config.connect().await?;
    etl::ensure_prod_tables(&pool).await?;
    let rows = etl::promote(&pool, &config.user).await?;
    info!(rows, "promotion complete; promotion_log updated");
    Ok(())
}
