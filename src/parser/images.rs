use std::sync::LazyLock;

use regex::Regex;

static IMG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)<img\s+([^>]+)>").unwrap());
static SRC_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r#"(?i)src=["']([^"']+)["']"#).unwrap());
static ALT_LOGO_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)alt=["'][^"']*logo[^"']*["']"#).unwrap());
static CLASS_LOGO_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)class=["'][^"']*logo[^"']*["']"#).unwrap());
static ID_LOGO_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)id=["'][^"']*logo[^"']*["']"#).unwrap());

/// An `<img>` tag with a quoted `src`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImgTag<'a> {
    pub src: &'a str,
    pub is_logo: bool,
}

/// All `<img>` tags carrying a `src`, in document order.
pub fn scan_images(html: &str) -> impl Iterator<Item = ImgTag<'_>> {
    IMG_RE.captures_iter(html).filter_map(|caps| {
        let attrs = caps.get(1)?.as_str();
        let src = SRC_RE.captures(attrs)?.get(1)?.as_str();
        Some(ImgTag {
            src,
            is_logo: looks_like_logo(src, attrs),
        })
    })
}

/// `src` of the first logo-like image. Later candidates are never considered.
pub fn first_logo_src(html: &str) -> Option<&str> {
    scan_images(html).find(|img| img.is_logo).map(|img| img.src)
}

fn looks_like_logo(src: &str, attrs: &str) -> bool {
    src.to_lowercase().contains("logo")
        || ALT_LOGO_RE.is_match(attrs)
        || CLASS_LOGO_RE.is_match(attrs)
        || ID_LOGO_RE.is_match(attrs)
}
