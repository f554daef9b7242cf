pub mod images;
pub mod normalize;

use crate::store::Snapshot;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    Html,
    OgImage,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogoMatch {
    /// Exactly as written in the page, before normalization.
    pub raw: String,
    pub strategy: Strategy,
}

/// Best-guess logo for a snapshot: first logo-like `<img>`, else an
/// `og:image` that itself mentions "logo". No favicon fallback.
pub fn find_logo(snapshot: &Snapshot) -> Option<LogoMatch> {
    if let Some(src) = snapshot.html.as_deref().and_then(images::first_logo_src) {
        return Some(LogoMatch {
            raw: src.to_string(),
            strategy: Strategy::Html,
        });
    }

    snapshot
        .metadata
        .og_image
        .as_deref()
        .filter(|og| og.to_lowercase().contains("logo"))
        .map(|og| LogoMatch {
            raw: og.to_string(),
            strategy: Strategy::OgImage,
        })
}

/// Two-step pipeline: find → normalize against the page URL.
pub fn process_snapshot(snapshot: &Snapshot) -> Option<(LogoMatch, String)> {
    let found = find_logo(snapshot)?;
    let url = normalize::normalize_logo_url(&found.raw, snapshot.metadata.page_url());
    Some((found, url))
}

// ── Tests ──
