use std::path::PathBuf;

use tracing::{info, warn};

use crate::parser::{self, Strategy};
use crate::store::{self, LogoMap};

/// Extract stats returned after completion.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ExtractStats {
    pub total: usize,
    pub found: usize,
    pub missing: usize,
    pub errors: usize,
}

/// Build a fresh logo mapping from the given snapshots, one at a time.
///
/// A snapshot that cannot be read or parsed is logged and skipped: without
/// its metadata there is no page URL to key a null under.
pub fn extract_logos(paths: &[PathBuf]) -> (LogoMap, ExtractStats) {
    let mut logos = LogoMap::new();
    let mut stats = ExtractStats {
        total: paths.len(),
        ..Default::default()
    };

    for path in paths {
        let snapshot = match store::load_snapshot(path) {
            Ok(s) => s,
            Err(e) => {
                warn!("Error processing {}: {}", path.display(), e);
                stats.errors += 1;
                continue;
            }
        };

        let page_url = snapshot.metadata.page_url().to_string();
        let logo = match parser::process_snapshot(&snapshot) {
            Some((found, url)) => {
                let source = match found.strategy {
                    Strategy::Html => "HTML",
                    Strategy::OgImage => "og:image",
                };
                info!("Found logo in {} for {}: {}", source, page_url, url);
                stats.found += 1;
                Some(url)
            }
            None => {
                info!("No logo for {}", page_url);
                stats.missing += 1;
                None
            }
        };

        logos.insert(page_url, logo);
    }

    (logos, stats)
}
