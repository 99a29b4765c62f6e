// src/process/table_name.rs

//! Deterministic landing-table naming: the same (type, start, end) triple
//! always maps to the same identifier, so reruns can drop and recreate.

use anyhow::{Context, Result};
use chrono::NaiveDate;

/// Fixed entity-type abbreviations. Unrecognized types fall back to their
/// first three characters, uppercased.
fn short_type(entity_type: &str) -> String {
    match entity_type.to_lowercase().as_str() {
        "club" => "CLB".into(),
        "hotel" => "HTL".into(),
        "venue" => "VEN".into(),
        "lga" => "LGA".into(),
        "postcode" => "PC".into(),
        "monthly" => "MON".into(),
        "annual" => "ANN".into(),
        other => other.chars().take(3).collect::<String>().to_uppercase(),
    }
}

/// An 8-digit `"YYYYMMDD"` ledger period.
pub fn parse_period(period: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(period, "%Y%m%d")
        .with_context(|| format!("invalid period {period:?}, expected YYYYMMDD"))
}

/// Build the table identifier `{type}_gam_{startYYYYMM}_{endYYYYMM}`.
/// Fails when either period is not a valid 8-digit date string.
pub fn derive_table_name(entity_type: &str, start_period: &str, end_period: &str) -> Result<String> {
    let start = parse_period(start_period)?;
    let end = parse_period(end_period)?;
    Ok(format!(
        "{}_GAM_{}_{}",
        short_type(entity_type),
        start.format("%Y%m"),
        end.format("%Y%m"),
    )
    .to_lowercase())
}
