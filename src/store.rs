use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

const UNKNOWN_URL: &str = "UNKNOWN_URL";

/// Source page URL → discovered logo URL, in snapshot order.
pub type LogoMap = IndexMap<String, Option<String>>;

// ── Snapshots ──

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// One captured page as dumped by the scraping tool.
#[derive(Debug, Clone, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub html: Option<String>,
    pub metadata: SnapshotMeta,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SnapshotMeta {
    #[serde(rename = "sourceURL", default)]
    pub source_url: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(rename = "ogImage", default)]
    pub og_image: Option<String>,
}

impl SnapshotMeta {
    /// `sourceURL`, then `url`, then a placeholder. Empty strings count as absent.
    pub fn page_url(&self) -> &str {
        [self.source_url.as_deref(), self.url.as_deref()]
            .into_iter()
            .flatten()
            .find(|u| !u.is_empty())
            .unwrap_or(UNKNOWN_URL)
    }
}

pub fn load_snapshot(path: &Path) -> Result<Snapshot, SnapshotError> {
    let content = fs::read_to_string(path).map_err(|source| SnapshotError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&content).map_err(|source| SnapshotError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

// ── Portfolio ──

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioEntry {
    pub title: String,
    pub url: String,
    /// description, screenshot, status and anything else, kept verbatim.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo: Option<String>,
}

/// Hand-picked logo for a site the extractor could not resolve.
#[derive(Debug, Clone, Deserialize)]
pub struct ManualLogo {
    pub url: String,
    #[serde(rename = "logoUrl", default)]
    pub logo_url: Option<String>,
}

// ── Files ──

pub fn load_scrape_paths(path: &Path) -> Result<Vec<PathBuf>> {
    read_json(path)
}

pub fn load_logo_map(path: &Path) -> Result<LogoMap> {
    read_json(path)
}

pub fn save_logo_map(path: &Path, logos: &LogoMap) -> Result<()> {
    write_json(path, logos)
}

pub fn load_portfolio(path: &Path) -> Result<Vec<PortfolioEntry>> {
    read_json(path)
}

pub fn save_portfolio(path: &Path, portfolio: &[PortfolioEntry]) -> Result<()> {
    write_json(path, &portfolio)
}

pub fn load_manual_logos(path: &Path) -> Result<Vec<ManualLogo>> {
    read_json(path)
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content =
        fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))
}

fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    let json = serde_json::to_string_pretty(value)?;
    fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))
}
