// src/report.rs

//! Human-readable download summary, grouped by entity and newest first.

use crate::ledger::{EntityType, Ledger, ProvenanceRecord};
use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use std::fs;
use std::path::Path;

static PERIOD_PREFIX_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(clubs|hotels)-gaming-machine-").unwrap());
static EXTENSION_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\.xlsx?$").unwrap());

/// Write the markdown summary of successful downloads to `output`.
pub fn write_summary(ledger: &Ledger, output: &Path) -> Result<()> {
    let markdown = render_summary(ledger.records());
    fs::write(output, markdown).with_context(|| format!("writing summary {:?}", output))?;
    Ok(())
}

pub fn render_summary(records: &[ProvenanceRecord]) -> String {
    let mut md = String::from("# Download Metadata Summary\n\n");
    for entity in [EntityType::Club, EntityType::Hotel] {
        let Some(heading) = entity.heading() else {
            continue;
        };
        let mut group: Vec<&ProvenanceRecord> = records
            .iter()
            .filter(|r| r.is_success() && r.entity_type == entity)
            .collect();
        if group.is_empty() {
            continue;
        }
        group.sort_by(|a, b| b.last_download.cmp(&a.last_download));

        md.push_str(&format!("## {heading}\n\n"));
        md.push_str("| Reporting Period | URL | Downloaded | Checksum |\n");
        md.push_str("|---|---|---|---|\n");
        for record in group {
            let link = record
                .url
                .as_deref()
                .map(|u| format!("[Link]({u})"))
                .unwrap_or_default();
            let checksum = record
                .checksum
                .as_deref()
                .map(|c| format!("`{}...`", &c[..c.len().min(16)]))
                .unwrap_or_default();
            md.push_str(&format!(
                "| {} | {} | {} | {} |\n",
                period_label(&record.filename),
                link,
                record.last_download,
                checksum
            ));
        }
        md.push('\n');
    }
    md
}

/// Reporting-period label shown in the summary, recovered from the
/// published filename.
fn period_label(filename: &str) -> String {
    let stripped = PERIOD_PREFIX_RE.replace(filename, "");
    let stripped = EXTENSION_RE.replace(&stripped, "");
    title_case(&stripped.replace('-', " "))
}

fn title_case(text: &str) -> String {
    text.split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first
                    .to_uppercase()
                    .chain(chars.flat_map(char::to_lowercase))
                    .collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
