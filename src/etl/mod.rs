// src/etl/mod.rs

//! Two-stage warehouse promotion: a copy-through from land into stage that
//! tags each row with its source id, then an aggregation from stage into
//! the per-LGA per-year prod summary with an audit log entry per run.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use sqlx::types::Json;
use sqlx::{PgPool, Postgres, QueryBuilder, Row};
use tracing::info;

const STAGE_DDL: &[&str] = &[
    "CREATE SCHEMA IF NOT EXISTS stage",
    "CREATE TABLE IF NOT EXISTS stage.pokies_stage (
        id SERIAL PRIMARY KEY,
        machine_id TEXT,
        lga TEXT,
        report_date DATE,
        turnover NUMERIC,
        profit NUMERIC,
        operator_name TEXT,
        transform_meta JSONB,
        staged_at TIMESTAMPTZ DEFAULT now()
    )",
];

const PROD_DDL: &[&str] = &[
    "CREATE SCHEMA IF NOT EXISTS prod",
    "CREATE TABLE IF NOT EXISTS prod.pokies_summary_by_lga_year (
        lga TEXT NOT NULL,
        year INT NOT NULL,
        total_turnover NUMERIC,
        total_profit NUMERIC,
        machines_count BIGINT,
        last_updated TIMESTAMPTZ,
        PRIMARY KEY (lga, year)
    )",
    "CREATE TABLE IF NOT EXISTS prod.promotion_log (
        id SERIAL PRIMARY KEY,
        promoted_by TEXT,
        stage_source TEXT,
        note TEXT,
        promoted_at TIMESTAMPTZ DEFAULT now()
    )",
];

const SELECT_LAND_SQL: &str = "\
SELECT id, machine_id, lga, report_date, \
       turnover::float8 AS turnover, profit::float8 AS profit, operator_name \
FROM land.raw_pokies \
WHERE report_date IS NOT NULL \
ORDER BY id \
LIMIT 1000";

const PROMOTE_SQL: &str = "\
WITH agg AS ( \
  SELECT \
    lga, \
    EXTRACT(YEAR FROM report_date)::int AS year, \
    SUM(turnover) AS total_turnover, \
    SUM(profit) AS total_profit, \
    COUNT(DISTINCT machine_id) AS machines_count \
  FROM stage.pokies_stage \
  GROUP BY lga, year \
) \
INSERT INTO prod.pokies_summary_by_lga_year \
  (lga, year, total_turnover, total_profit, machines_count, last_updated) \
SELECT lga, year, total_turnover, total_profit, machines_count, now() FROM agg \
ON CONFLICT (lga, year) DO UPDATE \
  SET total_turnover = EXCLUDED.total_turnover, \
      total_profit = EXCLUDED.total_profit, \
      machines_count = EXCLUDED.machines_count, \
      last_updated = now()";

const LOG_SQL: &str =
    "INSERT INTO prod.promotion_log (promoted_by, stage_source, note) VALUES ($1, $2, $3)";

pub async fn ensure_stage_tables(pool: &PgPool) -> Result<()> {
    for sql in STAGE_DDL {
        sqlx::query(sql)
            .execute(pool)
            .await
            .context("preparing stage schema")?;
    }
    Ok(())
}

pub async fn ensure_prod_tables(pool: &PgPool) -> Result<()> {
    for sql in PROD_DDL {
        sqlx::query(sql)
            .execute(pool)
            .await
            .context("preparing prod schema")?;
    }
    Ok(())
}

/// Copy-through from the landing table into stage. Each staged row carries
/// the source row id in `transform_meta`.
pub async fn stage_transform(pool: &PgPool) -> Result<u64> {
    let rows = sqlx::query(SELECT_LAND_SQL)
        .fetch_all(pool)
        .await
        .context("reading land.raw_pokies")?;
    if rows.is_empty() {
        info!("no rows to stage from land.raw_pokies");
        return Ok(0);
    }

    let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(
        "INSERT INTO stage.pokies_stage \
         (machine_id, lga, report_date, turnover, profit, operator_name, transform_meta) ",
    );
    builder.push_values(&rows, |mut b, row| {
        let source_id: i32 = row.get("id");
        b.push_bind(row.get::<Option<String>, _>("machine_id"));
        b.push_bind(row.get::<Option<String>, _>("lga"));
        b.push_bind(row.get::<Option<NaiveDate>, _>("report_date"));
        b.push_bind(row.get::<Option<f64>, _>("turnover"));
        b.push_bind(row.get::<Option<f64>, _>("profit"));
        b.push_bind(row.get::<Option<String>, _>("operator_name"));
        b.push_bind(Json(serde_json::json!({ "source_id": source_id })));
    });
    let staged = builder
        .build()
        .execute(pool)
        .await
        .context("inserting into stage.pokies_stage")?
        .rows_affected();

    info!(rows = staged, "staged");
    Ok(staged)
}

/// Aggregate stage into the per-LGA per-year summary and append one audit
/// row for the run. Returns the stage row count that fed the aggregation.
pub async fn promote(pool: &PgPool, promoted_by: &str) -> Result<i64> {
    let staged: i64 = sqlx::query_scalar("SELECT count(*) FROM stage.pokies_stage")
        .fetch_one(pool)
        .await
        .context("counting stage rows")?;
    info!(rows = staged, "promoting stage into prod");

    sqlx::query(PROMOTE_SQL)
        .execute(pool)
        .await
        .context("aggregating into prod summary")?;
    sqlx::query(LOG_SQL)
        .bind(promoted_by)
        .bind("stage.pokies_stage")
        .bind(format!("Promoted {staged} rows aggregated into prod"))
        .execute(pool)
        .await
        .context("writing promotion log")?;
    Ok(staged)
}
