use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::Deserialize;

const DEFAULT_CONFIG_FILE: &str = "logo_harvest";
const ENV_PREFIX: &str = "LOGO";

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// JSON array of scrape snapshot paths.
    pub scrape_paths: PathBuf,
    pub logos_file: PathBuf,
    pub portfolio_file: PathBuf,
    pub manual_logos_file: PathBuf,
    /// Where downloaded logos land on disk.
    pub output_dir: PathBuf,
    /// How `output_dir` is referenced from the portfolio data.
    pub public_prefix: String,
    pub fetch: FetchSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FetchSettings {
    pub max_redirects: usize,
    pub timeout_secs: u64,
    pub user_agent: String,
}

impl Settings {
    /// Defaults, then `logo_harvest.toml` (or `path` if given), then `LOGO_*`
    /// environment variables. Nested keys use `__`, e.g. `LOGO_FETCH__MAX_REDIRECTS`.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let file = match path {
            Some(p) => File::from(p).required(true),
            None => File::with_name(DEFAULT_CONFIG_FILE).required(false),
        };

        Config::builder()
            .set_default("scrape_paths", "scrape_paths.json")?
            .set_default("logos_file", "extracted_logos.json")?
            .set_default("portfolio_file", "research/portfolio_data.json")?
            .set_default("manual_logos_file", "manual_logos.json")?
            .set_default("output_dir", "public/client-logos")?
            .set_default("public_prefix", "/client-logos")?
            .set_default("fetch.max_redirects", 5_i64)?
            .set_default("fetch.timeout_secs", 30_i64)?
            .set_default("fetch.user_agent", concat!("logo_harvest/", env!("CARGO_PKG_VERSION")))?
            .add_source(file)
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .context("Failed to load settings")?
            .try_deserialize()
            .context("Invalid settings")
    }
}
