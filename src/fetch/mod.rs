// src/fetch/mod.rs

use reqwest::Client;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tokio::fs;

pub mod checksum;

/// Upper bound on a single document fetch. Expiry is recorded as a normal
/// download failure and never retried.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Failures while fetching one document; the message becomes the ledger's
/// failure status for that URL.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("writing download: {0}")]
    Io(#[from] std::io::Error),
}

/// HTTP client shared by every download in a run.
pub fn client() -> Result<Client, reqwest::Error> {
    Client::builder().timeout(REQUEST_TIMEOUT).build()
}

/// Download one report URL into `data_dir`, keeping the published filename.
/// Returns the path written.
pub async fn download_report(
    client: &Client,
    url: &str,
    data_dir: &Path,
) -> Result<PathBuf, FetchError> {
    let filename = crate::config::filename_from_url(url);
    let dest = data_dir.join(&filename);
    let resp = client.get(url).send().await?.error_for_status()?;
    let bytes = resp.bytes().await?;
    fs::write(&dest, &bytes).await?;
    Ok(dest)
}
