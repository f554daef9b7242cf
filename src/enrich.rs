use std::path::PathBuf;

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{info, warn};

use crate::fetcher::Fetcher;
use crate::settings::Settings;
use crate::store::{LogoMap, ManualLogo, PortfolioEntry};
use crate::utils::{slugify, url_extension, url_variants};

/// Download stats returned after a batch.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct EnrichStats {
    pub total: usize,
    pub downloaded: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// Where logo files are written and how the portfolio refers to them.
#[derive(Debug, Clone)]
pub struct LogoDir {
    pub dir: PathBuf,
    pub public_prefix: String,
}

impl LogoDir {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            dir: settings.output_dir.clone(),
            public_prefix: settings.public_prefix.clone(),
        }
    }

    pub fn ensure(&self) -> Result<()> {
        std::fs::create_dir_all(&self.dir)
            .with_context(|| format!("Failed to create {}", self.dir.display()))
    }

    fn public_path(&self, file_name: &str) -> String {
        format!("{}/{}", self.public_prefix.trim_end_matches('/'), file_name)
    }
}

/// Mapped logo for a portfolio URL, trying trailing-slash variants. Null and empty entries don't count.
pub fn lookup_logo<'a>(logos: &'a LogoMap, url: &str) -> Option<&'a str> {
    let keys = url_variants(url);
    keys.iter().find_map(|key| {
        logos
            .get(key.as_str())
            .and_then(|v| v.as_deref())
            .filter(|v| !v.is_empty())
    })
}

/// `<slug><ext>` for a project's logo file.
pub fn logo_file_name(title: &str, logo_url: &str) -> Result<String> {
    let ext = url_extension(logo_url).with_context(|| format!("Bad logo url {}", logo_url))?;
    Ok(format!("{}{}", slugify(title), ext))
}

/// Download one logo and point the entry at it. The entry is untouched on failure.
pub async fn attach_logo(
    fetcher: &Fetcher,
    target: &LogoDir,
    entry: &mut PortfolioEntry,
    logo_url: &str,
) -> Result<()> {
    let file_name = logo_file_name(&entry.title, logo_url)?;
    let dest = target.dir.join(&file_name);

    info!("Downloading {} to {}...", logo_url, dest.display());
    fetcher.download(logo_url, &dest).await?;

    entry.logo = Some(target.public_path(&file_name));
    Ok(())
}

/// Enrich every entry that has a mapped logo. Strictly sequential.
pub async fn download_logos(
    fetcher: &Fetcher,
    target: &LogoDir,
    logos: &LogoMap,
    portfolio: &mut [PortfolioEntry],
) -> Result<EnrichStats> {
    target.ensure()?;

    let pb = progress_bar(portfolio.len())?;
    let mut stats = EnrichStats {
        total: portfolio.len(),
        ..Default::default()
    };

    for entry in portfolio.iter_mut() {
        match lookup_logo(logos, &entry.url) {
            Some(logo_url) => {
                let outcome = attach_logo(fetcher, target, entry, logo_url).await;
                record(&mut stats, &entry.title, outcome);
            }
            None => stats.skipped += 1,
        }
        pb.inc(1);
    }

    pb.finish_and_clear();
    info!(
        "Logos: {} downloaded, {} without mapping, {} failed",
        stats.downloaded, stats.skipped, stats.failed
    );
    Ok(stats)
}

/// Apply hand-picked logos. Each pair updates the first entry whose URL matches
/// exactly or with the pair's trailing slash dropped.
pub async fn apply_manual_logos(
    fetcher: &Fetcher,
    target: &LogoDir,
    manual: &[ManualLogo],
    portfolio: &mut [PortfolioEntry],
) -> Result<EnrichStats> {
    target.ensure()?;

    let mut stats = EnrichStats {
        total: manual.len(),
        ..Default::default()
    };

    for pick in manual {
        let Some(logo_url) = pick.logo_url.as_deref().filter(|u| !u.is_empty()) else {
            stats.skipped += 1;
            continue;
        };

        let bare = pick.url.strip_suffix('/').unwrap_or(&pick.url);
        let Some(entry) = portfolio.iter_mut().find(|p| p.url == pick.url || p.url == bare) else {
            warn!("No portfolio entry for {}", pick.url);
            stats.skipped += 1;
            continue;
        };

        let outcome = attach_logo(fetcher, target, entry, logo_url).await;
        record(&mut stats, &pick.url, outcome);
    }

    Ok(stats)
}

fn record(stats: &mut EnrichStats, label: &str, outcome: Result<()>) {
    match outcome {
        Ok(()) => stats.downloaded += 1,
        Err(e) => {
            warn!("Failed to download logo for {}: {:#}", label, e);
            stats.failed += 1;
        }
    }
}

fn progress_bar(len: usize) -> Result<ProgressBar> {
    let pb = ProgressBar::new(len as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40} {pos}/{len} ({per_sec}, eta {eta})")?
            .progress_chars("=> "),
    );
    Ok(pb)
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{load_portfolio, save_portfolio};
    use crate::test_support::{serve_fixtures, settings_in, LOGO_BYTES};

    fn entry(title: &str, url: &str) -> PortfolioEntry {
        let mut extra = serde_json::Map::new();
        extra.insert("description".into(), "Site build".into());
        extra.insert("status".into(), "live".into());
        PortfolioEntry {
            title: title.into(),
            url: url.into(),
            extra,
            logo: None,
        }
    }

    #[test]
    fn lookup_tolerates_trailing_slash() {
        let mut logos = LogoMap::new();
        logos.insert("https://a.example/".into(), Some("https://a.example/logo.svg".into()));
        logos.insert("https://b.example".into(), Some("https://b.example/logo.png".into()));
        logos.insert("https://c.example".into(), None);

        assert_eq!(lookup_logo(&logos, "https://a.example"), Some("https://a.example/logo.svg"));
        assert_eq!(lookup_logo(&logos, "https://b.example/"), Some("https://b.example/logo.png"));
        assert_eq!(lookup_logo(&logos, "https://c.example"), None);
        assert_eq!(lookup_logo(&logos, "https://d.example"), None);
    }

    #[test]
    fn null_exact_key_falls_back_to_variant() {
        let mut logos = LogoMap::new();
        logos.insert("https://a.example".into(), None);
        logos.insert("https://a.example/".into(), Some("https://a.example/l.png".into()));
        assert_eq!(lookup_logo(&logos, "https://a.example"), Some("https://a.example/l.png"));
    }

    #[test]
    fn file_name_from_title_and_url() {
        assert_eq!(
            logo_file_name("Pro-Clean & Co.", "https://x.com/brand/logo.svg").unwrap(),
            "pro-clean-co.svg"
        );
        assert_eq!(
            logo_file_name("Imperial Nexus", "https://x.com/uploads/062bc15e").unwrap(),
            "imperial-nexus.png"
        );
        assert!(logo_file_name("Broken", "not a url").is_err());
    }

    #[tokio::test]
    async fn end_to_end_download_updates_portfolio() {
        let base = serve_fixtures().await;
        let root = tempfile::tempdir().unwrap();
        let settings = settings_in(root.path());

        save_portfolio(
            &settings.portfolio_file,
            &[
                entry("Pro-Clean & Co.", "https://proclean.example"),
                entry("No Logo Ltd", "https://nologo.example/"),
                entry("Dead Link", "https://dead.example/"),
            ],
        )
        .unwrap();

        let mut logos = LogoMap::new();
        logos.insert("https://proclean.example/".into(), Some(format!("{base}/moved")));
        logos.insert("https://nologo.example/".into(), None);
        logos.insert("https://dead.example/".into(), Some(format!("{base}/missing")));

        let fetcher = Fetcher::new(&settings.fetch).unwrap();
        let target = LogoDir::from_settings(&settings);
        let mut portfolio = load_portfolio(&settings.portfolio_file).unwrap();
        let before = portfolio.clone();

        let stats = download_logos(&fetcher, &target, &logos, &mut portfolio).await.unwrap();
        save_portfolio(&settings.portfolio_file, &portfolio).unwrap();

        assert_eq!(
            stats,
            EnrichStats {
                total: 3,
                downloaded: 1,
                skipped: 1,
                failed: 1,
            }
        );

        let saved = load_portfolio(&settings.portfolio_file).unwrap();
        assert_eq!(saved[0].logo.as_deref(), Some("/client-logos/pro-clean-co.png"));
        assert_eq!(saved[0].extra, before[0].extra);
        assert_eq!(saved[1], before[1]);
        assert_eq!(saved[2], before[2]);

        let file = settings.output_dir.join("pro-clean-co.png");
        assert_eq!(std::fs::read(file).unwrap(), LOGO_BYTES);
        assert!(!settings.output_dir.join("dead-link.png").exists());
    }

    #[tokio::test]
    async fn manual_logos_match_without_trailing_slash() {
        let base = serve_fixtures().await;
        let root = tempfile::tempdir().unwrap();
        let settings = settings_in(root.path());

        let mut portfolio = vec![
            entry("Imperial Nexus", "https://www.imperialnexus.example"),
            entry("Trusted Installs", "https://www.trusted.example/"),
        ];
        let manual = vec![
            ManualLogo {
                url: "https://www.trusted.example/".into(),
                logo_url: None,
            },
            ManualLogo {
                url: "https://www.imperialnexus.example/".into(),
                logo_url: Some(format!("{base}/logo.png")),
            },
            ManualLogo {
                url: "https://unknown.example/".into(),
                logo_url: Some(format!("{base}/logo.png")),
            },
        ];

        let fetcher = Fetcher::new(&settings.fetch).unwrap();
        let target = LogoDir::from_settings(&settings);
        let stats = apply_manual_logos(&fetcher, &target, &manual, &mut portfolio)
            .await
            .unwrap();

        assert_eq!(stats.downloaded, 1);
        assert_eq!(stats.skipped, 2);
        assert_eq!(portfolio[0].logo.as_deref(), Some("/client-logos/imperial-nexus.png"));
        assert_eq!(portfolio[1].logo, None);
        assert!(settings.output_dir.join("imperial-nexus.png").exists());
    }
}
