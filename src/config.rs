// src/config.rs

use anyhow::{Context, Result};
use serde::Deserialize;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::collections::HashMap;
use std::env;
use std::path::{Path, PathBuf};
use url::Url;

/// Source catalogue shared by the downloader and the warehouse loader, read
/// from `sources.yaml`. The publisher moves files between noindex folders
/// from time to time; the catalogue is the single place URLs are maintained.
#[derive(Debug, Clone, Deserialize)]
pub struct Sources {
    /// Directory downloaded documents (and the ledger) are written to.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    /// Clubs/hotels gaming-machine report spreadsheets.
    #[serde(default)]
    pub gaming_reports: Vec<String>,
    /// Licensed premises list spreadsheets.
    #[serde(default)]
    pub premises_lists: Vec<String>,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("raw-data")
}

impl Sources {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = std::fs::File::open(path.as_ref())
            .with_context(|| format!("opening source catalogue {:?}", path.as_ref()))?;
        serde_yaml::from_reader(file)
            .with_context(|| format!("parsing source catalogue {:?}", path.as_ref()))
    }

    /// Every URL in the catalogue, gaming reports first.
    pub fn urls(&self) -> impl Iterator<Item = &str> {
        self.gaming_reports
            .iter()
            .chain(&self.premises_lists)
            .map(String::as_str)
    }

    /// filename → URL, for matching files already on disk back to their
    /// source.
    pub fn url_map(&self) -> HashMap<String, String> {
        self.urls()
            .map(|u| (filename_from_url(u), u.to_string()))
            .collect()
    }
}

/// Last path segment of a URL. Percent-encoding is kept as published since
/// downloaded files are saved under the encoded name.
pub fn filename_from_url(url: &str) -> String {
    Url::parse(url)
        .ok()
        .and_then(|u| {
            u.path_segments()
                .and_then(|segments| segments.last().map(str::to_string))
        })
        .filter(|segment| !segment.is_empty())
        .unwrap_or_else(|| url.rsplit('/').next().unwrap_or(url).to_string())
}

/// Database roles provisioned by the local docker database.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DbRole {
    /// Landing-table writer.
    Load,
    /// Stage-transform runner.
    User,
    /// Prod promotion runner.
    Owner,
}

impl DbRole {
    pub fn user(&self) -> &'static str {
        match self {
            Self::Load => "db_load",
            Self::User => "db_user",
            Self::Owner => "db_owner",
        }
    }

    fn default_password(&self) -> &'static str {
        match self {
            Self::Load => "load_pass",
            Self::User => "user_pass",
            Self::Owner => "owner_pass",
        }
    }
}

/// Connection settings resolved from the standard `PG*` environment
/// variables, with defaults matching the local docker database.
#[derive(Debug, Clone)]
pub struct DbConfig {
    pub host: String,
    pub port: u16,
    pub database: String,
    pub user: String,
    pub password: String,
}

impl DbConfig {
    pub fn from_env(role: DbRole) -> Self {
        Self {
            host: env::var("PGHOST").unwrap_or_else(|_| "localhost".into()),
            port: env::var("PGPORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(5432),
            database: env::var("PGDATABASE").unwrap_or_else(|_| "aus_pokies".into()),
            user: env::var("PGUSER").unwrap_or_else(|_| role.user().to_string()),
            password: env::var("PGPASSWORD")
                .unwrap_or_else(|_| role.default_password().to_string()),
        }
    }

    pub fn url(&self) -> String {
        format!(
            "postgres://{}:{}@{}:{}/{}",
            self.user, self.password, self.host, self.port, self.database
        )
    }

    pub async fn connect(&self) -> Result<PgPool> {
        PgPoolOptions::new()
            .max_connections(4)
            .connect(&self.url())
            .await
            .with_context(|| {
                format!("connecting to {} as {}", self.database, self.user)
            })
    }
}
