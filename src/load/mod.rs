// src/load/mod.rs

//! Warehouse loading: one landing table per catalogued document, dropped
//! and recreated, with every row inserted inside a single transaction so a
//! failed load leaves no partial table behind.

use crate::ledger::ProvenanceRecord;
use crate::process::table_name::{derive_table_name, parse_period};
use crate::schema::{self, ColumnSpec, SqlType};
use crate::sheet::{self, CellValue};
use anyhow::{anyhow, Context, Result};
use sqlx::{PgPool, Postgres, QueryBuilder};
use std::path::Path;
use tracing::info;

/// Schema the landed report tables live in.
pub const LAND_SCHEMA: &str = "land";

/// Result of landing one document.
#[derive(Debug)]
pub struct LoadOutcome {
    pub table: String,
    pub rows: usize,
}

pub async fn ensure_land_schema(pool: &PgPool) -> Result<()> {
    sqlx::query("CREATE SCHEMA IF NOT EXISTS land")
        .execute(pool)
        .await
        .context("creating land schema")?;
    Ok(())
}

/// Land one catalogued document into `land.<derived table>`. Callers filter
/// on [`ProvenanceRecord::is_loadable`]; a record missing header or period
/// metadata is rejected here.
pub async fn load_document(
    pool: &PgPool,
    data_dir: &Path,
    record: &ProvenanceRecord,
) -> Result<LoadOutcome> {
    let header_row = record
        .header_row
        .ok_or_else(|| anyhow!("no header row located for {}", record.filename))?;
    let start_period = record
        .start_period
        .as_deref()
        .ok_or_else(|| anyhow!("no start period for {}", record.filename))?;
    let end_period = record
        .end_period
        .as_deref()
        .ok_or_else(|| anyhow!("no end period for {}", record.filename))?;

    let table = derive_table_name(record.entity_type.as_str(), start_period, end_period)?;
    let start_date = parse_period(start_period)?;
    let end_date = parse_period(end_period)?;

    let path = data_dir.join(&record.filename);
    let grid = sheet::read_grid(&path)?;
    if header_row >= grid.len() {
        return Err(anyhow!(
            "header row {} out of range for {}",
            header_row,
            record.filename
        ));
    }

    let labels: Vec<String> = grid[header_row]
        .iter()
        .map(|cell| cell.as_text().trim().to_string())
        .collect();
    let names = schema::derive_column_names(&labels);
    let data_rows: Vec<Vec<CellValue>> = grid[header_row + 1..]
        .iter()
        .filter(|row| !row.iter().all(CellValue::is_empty))
        .cloned()
        .collect();
    let columns = schema::infer_columns(&names, &data_rows);

    let mut tx = pool.begin().await.context("opening load transaction")?;
    sqlx::query(&schema::drop_table_sql(LAND_SCHEMA, &table))
        .execute(&mut *tx)
        .await
        .with_context(|| format!("dropping {LAND_SCHEMA}.{table}"))?;
    sqlx::query(&schema::create_table_sql(LAND_SCHEMA, &table, &columns))
        .execute(&mut *tx)
        .await
        .with_context(|| format!("creating {LAND_SCHEMA}.{table}"))?;

    // Stay under the postgres bind-parameter cap per statement.
    let chunk_rows = (u16::MAX as usize / (columns.len() + 2)).clamp(1, 500);
    let mut inserted = 0usize;
    for chunk in data_rows.chunks(chunk_rows) {
        let mut builder: QueryBuilder<Postgres> =
            QueryBuilder::new(insert_prefix(&table, &columns));
        builder.push_values(chunk, |mut b, row| {
            b.push_bind(start_date);
            b.push_bind(end_date);
            for (idx, column) in columns.iter().enumerate() {
                let cell = row.get(idx);
                match column.sql_type {
                    SqlType::Integer => {
                        b.push_bind(cell.and_then(CellValue::as_i64));
                    }
                    SqlType::Numeric => {
                        b.push_bind(cell.and_then(CellValue::as_f64));
                    }
                    SqlType::Text => {
                        b.push_bind(cell.and_then(text_value));
                    }
                }
            }
        });
        builder
            .build()
            .execute(&mut *tx)
            .await
            .with_context(|| format!("inserting into {LAND_SCHEMA}.{table}"))?;
        inserted += chunk.len();
    }
    tx.commit().await.context("committing load transaction")?;

    info!(table = %table, rows = inserted, "landed");
    Ok(LoadOutcome {
        table,
        rows: inserted,
    })
}

fn insert_prefix(table: &str, columns: &[ColumnSpec]) -> String {
    let names = columns
        .iter()
        .map(|c| c.name.as_str())
        .collect::<Vec<_>>()
        .join(", ");
    format!("INSERT INTO {LAND_SCHEMA}.{table} (start_period, end_period, {names}) ")
}

fn text_value(cell: &CellValue) -> Option<String> {
    if cell.is_empty() {
        None
    } else {
        Some(cell.as_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_prefix_orders_period_columns_first() {
        let columns = vec![
            ColumnSpec {
                name: "lga".into(),
                sql_type: SqlType::Text,
            },
            ColumnSpec {
                name: "tax".into(),
                sql_type: SqlType::Numeric,
            },
        ];
        assert_eq!(
            insert_prefix("clb_gam_202306_202311", &columns),
            "INSERT INTO land.clb_gam_202306_202311 (start_period, end_period, lga, tax) "
        );
    }

    #[test]
    fn text_cells_keep_content_and_blanks_are_null() {
        assert_eq!(text_value(&CellValue::Empty), None);
        assert_eq!(
            text_value(&CellValue::Text("Sydney".into())),
            Some("Sydney".into())
        );
        assert_eq!(text_value(&CellValue::Int(5)), Some("5".into()));
    }
}
