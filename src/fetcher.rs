use std::path::{Path, PathBuf};
use std::time::Duration;

use reqwest::header::LOCATION;
use reqwest::{redirect, Response, StatusCode};
use thiserror::Error;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};
use url::Url;

use crate::settings::FetchSettings;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("invalid url {url}: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("unsupported scheme `{0}`")]
    UnsupportedScheme(String),

    #[error("network error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Status Code: {status} ({url})")]
    Status { url: String, status: u16 },

    #[error("redirect from {url} has no usable Location header")]
    BadRedirect { url: String },

    #[error("more than {limit} redirects starting at {url}")]
    TooManyRedirects { url: String, limit: usize },

    #[error("failed to write {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Plain GET downloader. Redirects are followed by hand so the hop count stays bounded.
pub struct Fetcher {
    client: reqwest::Client,
    max_redirects: usize,
}

impl Fetcher {
    pub fn new(settings: &FetchSettings) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .user_agent(settings.user_agent.as_str())
            .redirect(redirect::Policy::none())
            .build()?;

        Ok(Self {
            client,
            max_redirects: settings.max_redirects,
        })
    }

    /// Download `url` into `dest`, returning the number of bytes written.
    ///
    /// `dest` is only created once a 200 arrives, so a failed fetch leaves nothing behind.
    pub async fn download(&self, url: &str, dest: &Path) -> Result<u64, FetchError> {
        let mut current = parse_http_url(url)?;

        for hop in 0..=self.max_redirects {
            let response = self.client.get(current.clone()).send().await?;

            match response.status() {
                StatusCode::OK => return save_body(response, dest).await,
                StatusCode::MOVED_PERMANENTLY | StatusCode::FOUND => {
                    let next = redirect_target(&current, &response)?;
                    debug!("Redirect {} -> {} (hop {})", current, next, hop + 1);
                    current = next;
                }
                status => {
                    return Err(FetchError::Status {
                        url: current.to_string(),
                        status: status.as_u16(),
                    })
                }
            }
        }

        Err(FetchError::TooManyRedirects {
            url: url.to_string(),
            limit: self.max_redirects,
        })
    }
}

fn parse_http_url(url: &str) -> Result<Url, FetchError> {
    let parsed = Url::parse(url).map_err(|source| FetchError::InvalidUrl {
        url: url.to_string(),
        source,
    })?;
    ensure_http(parsed)
}

fn ensure_http(url: Url) -> Result<Url, FetchError> {
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(FetchError::UnsupportedScheme(other.to_string())),
    }
}

/// Resolve `Location` against the URL that answered with the redirect.
fn redirect_target(current: &Url, response: &Response) -> Result<Url, FetchError> {
    let bad = || FetchError::BadRedirect {
        url: current.to_string(),
    };
    let location = response
        .headers()
        .get(LOCATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(bad)?;
    let next = current.join(location).map_err(|_| bad())?;
    ensure_http(next)
}

async fn save_body(response: Response, dest: &Path) -> Result<u64, FetchError> {
    let io_err = |source| FetchError::Io {
        path: dest.to_path_buf(),
        source,
    };

    let mut file = File::create(dest).await.map_err(io_err)?;
    match stream_into(response, &mut file, dest).await {
        Ok(written) => Ok(written),
        Err(e) => {
            drop(file);
            if let Err(rm) = tokio::fs::remove_file(dest).await {
                warn!("Could not remove partial {}: {}", dest.display(), rm);
            }
            Err(e)
        }
    }
}

async fn stream_into(mut response: Response, file: &mut File, dest: &Path) -> Result<u64, FetchError> {
    let io_err = |source| FetchError::Io {
        path: dest.to_path_buf(),
        source,
    };

    let mut written = 0u64;
    while let Some(chunk) = response.chunk().await? {
        file.write_all(&chunk).await.map_err(io_err)?;
        written += chunk.len() as u64;
    }
    file.flush().await.map_err(io_err)?;
    Ok(written)
}

// ── Tests ──
