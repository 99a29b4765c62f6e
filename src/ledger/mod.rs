// src/ledger/mod.rs

//! Provenance ledger: one CSV row per source document, keyed by URL and
//! replaced on rerun so the file never accumulates duplicates.

use anyhow::{Context, Result};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::PathBuf;

/// Entity a report covers, inferred from the published filename.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityType {
    Club,
    Hotel,
    Unknown,
}

impl EntityType {
    pub fn from_filename(filename: &str) -> Self {
        let lower = filename.to_lowercase();
        if lower.contains("clubs") {
            Self::Club
        } else if lower.contains("hotels") {
            Self::Hotel
        } else {
            Self::Unknown
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Club => "club",
            Self::Hotel => "hotel",
            Self::Unknown => "unknown",
        }
    }

    /// Section heading in the download summary; unknown entities are not
    /// reported.
    pub fn heading(&self) -> Option<&'static str> {
        match self {
            Self::Club => Some("Clubs"),
            Self::Hotel => Some("Hotels"),
            Self::Unknown => None,
        }
    }
}

/// One ledger row. Structured fields stay empty when the download failed or
/// the document's layout was not recognized.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProvenanceRecord {
    #[serde(rename = "type")]
    pub entity_type: EntityType,
    pub filename: String,
    pub url: Option<String>,
    pub last_download: String,
    pub checksum: Option<String>,
    pub file_size: Option<u64>,
    pub header_row: Option<usize>,
    pub column_count: Option<usize>,
    pub header_names: Option<String>,
    pub start_period: Option<String>,
    pub end_period: Option<String>,
    pub status: String,
}

impl ProvenanceRecord {
    pub const STATUS_SUCCESS: &'static str = "success";

    /// Row recording a failed download or checksum: no structured fields,
    /// a failure status carrying the error text.
    pub fn failure(filename: String, url: Option<String>, error: impl fmt::Display) -> Self {
        Self {
            entity_type: EntityType::from_filename(&filename),
            filename,
            url,
            last_download: Utc::now().to_rfc3339(),
            checksum: None,
            file_size: None,
            header_row: None,
            column_count: None,
            header_names: None,
            start_period: None,
            end_period: None,
            status: format!("failed: {error}"),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == Self::STATUS_SUCCESS
    }

    /// True when the loader has everything it needs: a located header row
    /// and a fully parsed reporting period.
    pub fn is_loadable(&self) -> bool {
        self.is_success()
            && self.header_row.is_some()
            && self.start_period.is_some()
            && self.end_period.is_some()
    }
}

/// CSV-backed ledger, loaded whole and rewritten on save.
#[derive(Debug)]
pub struct Ledger {
    path: PathBuf,
    records: Vec<ProvenanceRecord>,
}

impl Ledger {
    /// Open the ledger at `path`; a missing file is an empty ledger.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let mut records = Vec::new();
        if path.exists() {
            let mut reader = csv::Reader::from_path(&path)
                .with_context(|| format!("opening ledger {:?}", path))?;
            for row in reader.deserialize() {
                records.push(row.with_context(|| format!("malformed ledger row in {:?}", path))?);
            }
        }
        Ok(Self { path, records })
    }

    pub fn records(&self) -> &[ProvenanceRecord] {
        &self.records
    }

    pub fn contains_filename(&self, filename: &str) -> bool {
        self.records.iter().any(|r| r.filename == filename)
    }

    /// Insert or replace the row for a document. Records are keyed by URL;
    /// documents with no known URL fall back to the filename so manual
    /// drops into the data directory stay deduplicated too.
    pub fn upsert(&mut self, record: ProvenanceRecord) {
        self.records.retain(|existing| match (&record.url, &existing.url) {
            (Some(new), Some(old)) => new != old,
            _ => existing.filename != record.filename,
        });
        self.records.push(record);
    }

    /// Rewrite the whole CSV through a temp file and rename.
    pub fn save(&self) -> Result<()> {
        let tmp = self.path.with_extension("csv.tmp");
        {
            let mut writer = csv::Writer::from_path(&tmp)
                .with_context(|| format!("creating {:?}", tmp))?;
            for record in &self.records {
                writer.serialize(record)?;
            }
            writer.flush()?;
        }
        fs::rename(&tmp, &self.path)
            .with_context(|| format!("replacing ledger {:?}", self.path))?;
        Ok(())
    }
}
