use anyhow::Result;
use chrono::Utc;
use pokiescraper::{
    config::{filename_from_url, Sources},
    fetch::{self, checksum::file_sha256, FetchError},
    ledger::{EntityType, Ledger, ProvenanceRecord},
    process, report, sheet,
};
use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
    sync::Arc,
};
use tokio::sync::{mpsc, Semaphore};
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, EnvFilter};

const SOURCES_FILE: &str = "sources.yaml";
const LEDGER_FILE: &str = "download_metadata.csv";
const SUMMARY_FILE: &str = "VALIDATE_DOWNLOADS.md";

#[tokio::main]
async fn main() -> Result<()> {
    // ─── 1) init logging ─────────────────────────────────────────────
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder().with_env_filter(env).init();
    info!("startup");

    // ─── 2) source catalogue + dirs ──────────────────────────────────
    let sources = Sources::load(SOURCES_FILE)?;
    let data_dir = sources.data_dir.clone();
    fs::create_dir_all(&data_dir)?;
    let mut ledger = Ledger::load(data_dir.join(LEDGER_FILE))?;

    let urls: Vec<String> = sources.urls().map(str::to_string).collect();
    info!("{} documents in catalogue", urls.len());

    // ─── 3) spawn downloader tasks ───────────────────────────────────
    let client = fetch::client()?;
    let (tx, mut rx) = mpsc::channel::<(String, Result<PathBuf, FetchError>)>(100);
    let dl_sem = Arc::new(Semaphore::new(3));
    let mut handles = Vec::with_capacity(urls.len());

    for url in urls {
        let client = client.clone();
        let data_dir = data_dir.clone();
        let tx = tx.clone();
        let sem = dl_sem.clone();

        handles.push(tokio::spawn(async move {
            let _permit = sem.acquire().await.unwrap();
            info!(url = %url, "downloading");
            let outcome = fetch::download_report(&client, &url, &data_dir).await;
            let _ = tx.send((url, outcome)).await;
        }));
    }
    // drop the original sender so `rx.recv()` ends once all downloads finish
    drop(tx);

    // ─── 4) catalogue results as they arrive ─────────────────────────
    let mut ok = 0usize;
    let mut failed = 0usize;
    while let Some((url, outcome)) = rx.recv().await {
        match outcome {
            Ok(path) => {
                ok += 1;
                ledger.upsert(catalogue_document(Some(&url), &path));
            }
            Err(err) => {
                failed += 1;
                error!(url = %url, "download failed: {err}");
                ledger.upsert(ProvenanceRecord::failure(
                    filename_from_url(&url),
                    Some(url),
                    err,
                ));
            }
        }
    }
    for handle in handles {
        let _ = handle.await;
    }

    // ─── 5) catalogue stray spreadsheets already on disk ─────────────
    catalogue_strays(&mut ledger, &data_dir, &sources.url_map());

    // ─── 6) persist ledger + summary ─────────────────────────────────
    ledger.save()?;
    report::write_summary(&ledger, Path::new(SUMMARY_FILE))?;
    info!(ok, failed, "run complete");
    Ok(())
}

/// Build the full provenance record for a document on disk: checksum, size,
/// and the structural scan of its first sheet.
fn catalogue_document(url: Option<&str>, path: &Path) -> ProvenanceRecord {
    let filename = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let url = url.map(str::to_string);

    let checksum = match file_sha256(path) {
        Ok(digest) => digest,
        Err(err) => {
            error!(file = %filename, "checksum failed: {err:#}");
            return ProvenanceRecord::failure(filename, url, err);
        }
    };
    let file_size = fs::metadata(path).map(|m| m.len()).ok();

    // An unreadable or unrecognized layout is still a successful download;
    // the structured fields stay empty and the loader skips the document.
    let inspection = match sheet::read_grid(path) {
        Ok(grid) => process::inspect_grid(&grid),
        Err(err) => {
            warn!(file = %filename, "sheet scan failed: {err:#}");
            process::GridInspection::default()
        }
    };

    ProvenanceRecord {
        entity_type: EntityType::from_filename(&filename),
        filename,
        url,
        last_download: Utc::now().to_rfc3339(),
        checksum: Some(checksum),
        file_size,
        header_row: inspection.header_row,
        column_count: inspection.column_count,
        header_names: inspection.header_names,
        start_period: inspection.start_period,
        end_period: inspection.end_period,
        status: ProvenanceRecord::STATUS_SUCCESS.to_string(),
    }
}

/// Spreadsheets sitting in the data directory without a ledger row (manual
/// drops, or catalogue entries since removed) still get provenance records,
/// matched back to a source URL when the catalogue knows the filename.
fn catalogue_strays(ledger: &mut Ledger, data_dir: &Path, url_map: &HashMap<String, String>) {
    let pattern = format!("{}/*", data_dir.display());
    let entries = match glob::glob(&pattern) {
        Ok(entries) => entries,
        Err(err) => {
            warn!("cannot scan {data_dir:?}: {err}");
            return;
        }
    };
    for path in entries.flatten() {
        if !path.is_file() {
            continue;
        }
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if !is_spreadsheet(name) || ledger.contains_filename(name) {
            continue;
        }
        info!(file = %name, "cataloguing stray file");
        let url = url_map.get(name).map(String::as_str);
        ledger.upsert(catalogue_document(url, &path));
    }
}

fn is_spreadsheet(name: &str) -> bool {
    let lower = name.to_lowercase();
    lower.ends_with(".xlsx") || lower.ends_with(".xls")
}
