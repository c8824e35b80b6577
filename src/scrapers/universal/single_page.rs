//! Whole-page extraction for monitored URLs without list selectors.

use std::collections::HashSet;

use scraper::{Html, Selector};
use url::Url;

use super::selectors::{element_text, parse_selector};
use crate::models::ContentType;
use crate::utils::{char_len, collapse_whitespace, truncate_chars};

/// Content regions tried in priority order.
const CONTENT_SELECTORS: &[&str] = &[
    "article",
    ".notice",
    ".board",
    ".content",
    "[class*='notice']",
    "[class*='event']",
    "main",
    ".detail",
];

const IMAGE_EXTENSIONS: &[&str] = &[".jpg", ".jpeg", ".png", ".webp", ".gif"];

/// Cap on whole-page fallback text.
const FALLBACK_TEXT_CHARS: usize = 50_000;
/// Cap on extracted text.
const MAX_TEXT_CHARS: usize = 100_000;
/// Below this many characters of text, a found image wins.
const IMAGE_TEXT_THRESHOLD: usize = 200;
/// Cap on raw HTML stored when no text could be extracted.
const RAW_HTML_CHARS: usize = 50_000;

/// Best-effort text and banner image of a page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageContent {
    pub text: String,
    pub image_url: Option<String>,
}

impl PageContent {
    /// Decide whether the page is an image notice and what to store.
    pub fn classify(&self, html: &str) -> (ContentType, String) {
        match &self.image_url {
            Some(image) if char_len(&self.text) < IMAGE_TEXT_THRESHOLD => {
                (ContentType::Image, image.clone())
            }
            _ if self.text.is_empty() => (
                ContentType::Text,
                truncate_chars(html, RAW_HTML_CHARS).to_string(),
            ),
            _ => (ContentType::Text, self.text.clone()),
        }
    }
}

/// Resolve an `img src` to an absolute image URL.
///
/// Only protocol-relative and root-relative sources are resolved; other
/// relative paths are rejected, as are URLs without an image extension.
fn resolve_image_src(src: &str, page_url: Option<&Url>) -> Option<String> {
    let src = src.trim();
    let absolute = if let Some(rest) = src.strip_prefix("//") {
        format!("https://{}", rest)
    } else if src.starts_with('/') {
        page_url?.join(src).ok()?.to_string()
    } else {
        src.to_string()
    };

    let lower = absolute.to_ascii_lowercase();
    let is_http = lower.starts_with("http://") || lower.starts_with("https://");
    let is_image = IMAGE_EXTENSIONS.iter().any(|ext| lower.contains(ext));
    (is_http && is_image).then_some(absolute)
}

/// Extract the text and representative image of a page.
pub fn extract_page_content(html: &str, page_url: &str) -> PageContent {
    let document = Html::parse_document(html);
    let base = Url::parse(page_url).ok();
    let img_selector = Selector::parse("img[src]").ok();

    let mut visited = HashSet::new();
    let mut parts: Vec<String> = Vec::new();
    let mut image_url: Option<String> = None;

    for selector in CONTENT_SELECTORS.iter().filter_map(|s| parse_selector(s)) {
        for element in document.select(&selector) {
            // `.notice` and `[class*='notice']` often hit the same element.
            if !visited.insert(element.id()) {
                continue;
            }
            let text = element_text(element, " ");
            if !text.is_empty() {
                parts.push(text);
            }

            if image_url.is_none() {
                image_url = img_selector
                    .as_ref()
                    .and_then(|sel| element.select(sel).next())
                    .and_then(|img| img.value().attr("src"))
                    .and_then(|src| resolve_image_src(src, base.as_ref()));
            }
        }
    }

    let mut text = parts.join(" ").trim().to_string();
    if text.is_empty() {
        let whole = collapse_whitespace(&element_text(document.root_element(), " "));
        text = truncate_chars(&whole, FALLBACK_TEXT_CHARS).to_string();
    }

    PageContent {
        text: truncate_chars(&text, MAX_TEXT_CHARS).to_string(),
        image_url,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = "https://www.air.test/ko/notice";

    #[test]
    fn test_notice_region_with_relative_image_stays_text() {
        let html = r#"<html><body><div class="notice">신규 이벤트<img src="banner.jpg"></div></body></html>"#;
        let content = extract_page_content(html, PAGE);
        assert!(content.text.contains("신규 이벤트"));
        assert_eq!(content.image_url, None);

        let (content_type, raw) = content.classify(html);
        assert_eq!(content_type, ContentType::Text);
        assert!(raw.contains("신규 이벤트"));
    }

    #[test]
    fn test_short_text_with_banner_is_image() {
        let html = r#"<main><img src="/upload/banner_0301.png"><p>특가</p></main>"#;
        let content = extract_page_content(html, PAGE);
        assert_eq!(
            content.image_url.as_deref(),
            Some("https://www.air.test/upload/banner_0301.png")
        );
        let (content_type, raw) = content.classify(html);
        assert_eq!(content_type, ContentType::Image);
        assert_eq!(raw, "https://www.air.test/upload/banner_0301.png");
    }

    #[test]
    fn test_long_text_beats_image() {
        let body = "항공권 특가 안내 ".repeat(40);
        let html = format!(r#"<article><img src="//cdn.air.test/a.webp">{}</article>"#, body);
        let content = extract_page_content(&html, PAGE);
        assert_eq!(content.image_url.as_deref(), Some("https://cdn.air.test/a.webp"));
        assert_eq!(content.classify(&html).0, ContentType::Text);
    }

    #[test]
    fn test_fallback_to_whole_page_text() {
        let html = "<html><body><p>운항 안내</p><p>변경 공지</p></body></html>";
        let content = extract_page_content(html, PAGE);
        assert_eq!(content.text, "운항 안내 변경 공지");
    }

    #[test]
    fn test_empty_page_stores_raw_html() {
        let html = "<html><body></body></html>";
        let content = extract_page_content(html, PAGE);
        assert_eq!(content.classify(html), (ContentType::Text, html.to_string()));
    }

    #[test]
    fn test_resolve_image_src() {
        let base = Url::parse(PAGE).unwrap();
        assert_eq!(resolve_image_src("/a/b.GIF", Some(&base)).as_deref(), Some("https://www.air.test/a/b.GIF"));
        assert_eq!(resolve_image_src("icon.svg", Some(&base)), None);
        assert_eq!(resolve_image_src("https://x.test/pixel", Some(&base)), None);
    }
}
