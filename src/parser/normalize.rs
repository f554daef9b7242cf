use tracing::debug;
use url::Url;

/// Make a logo reference absolute against the page it was found on.
///
/// Relative paths are joined onto the page origin as-is; `..` segments are
/// not resolved. If the page URL does not parse, the logo comes back raw.
pub fn normalize_logo_url(logo: &str, page_url: &str) -> String {
    if logo.starts_with("http") || logo.starts_with("data:") {
        return logo.to_string();
    }

    let base = match Url::parse(page_url) {
        Ok(base) => base,
        Err(e) => {
            debug!("Leaving {} as-is, bad page url {}: {}", logo, page_url, e);
            return logo.to_string();
        }
    };
    let origin = base.origin().ascii_serialization();

    if logo.starts_with("//") {
        format!("https:{}", logo)
    } else if logo.starts_with('/') {
        format!("{}{}", origin, logo)
    } else {
        format!("{}/{}", origin, logo)
    }
}
