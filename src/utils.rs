use std::sync::OnceLock;
use std::time::Duration;

use regex::Regex;
use url::Url;

const DEFAULT_EXTENSION: &str = ".png";

/// Lowercase, collapse every non-alphanumeric run to `-`, trim the ends.
pub fn slugify(title: &str) -> String {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| Regex::new(r"[^a-z0-9]+").unwrap());
    re.replace_all(&title.to_lowercase(), "-")
        .trim_matches('-')
        .to_string()
}

/// Extension (with the dot) of the last path segment, `.png` when there is none.
pub fn url_extension(url: &str) -> Result<String, url::ParseError> {
    let parsed = Url::parse(url)?;
    let name = parsed.path().rsplit('/').next().unwrap_or_default();
    let ext = match name.rfind('.') {
        Some(i) if i > 0 && i + 1 < name.len() => &name[i..],
        _ => DEFAULT_EXTENSION,
    };
    Ok(ext.to_string())
}

/// Keys a page URL may have been recorded under: as-is, with and without a trailing slash.
pub fn url_variants(url: &str) -> [String; 3] {
    [
        url.to_string(),
        format!("{}/", url),
        url.strip_suffix('/').unwrap_or(url).to_string(),
    ]
}

pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max).collect();
        format!("{}...", truncated)
    }
}

pub fn format_duration(d: Duration) -> String {
    let secs = d.as_secs();
    if secs < 60 {
        format!("{:.1}s", d.as_secs_f64())
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}
