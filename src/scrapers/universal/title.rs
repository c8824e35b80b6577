//! Title extraction for list items and detail pages.

use std::sync::LazyLock;

use regex::Regex;
use scraper::Html;

use super::selectors::{element_text, normalize_title_selector, parse_selector};
use crate::models::PLACEHOLDER_TITLE;
use crate::utils::{char_len, truncate_chars};

/// Longest detail title we keep.
const MAX_TITLE_CHARS: usize = 500;

static MEANINGFUL_CHAR: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[a-zA-Z0-9가-힣]").unwrap());

/// Whether a title scraped from a list row is worth keeping.
///
/// Rejects the placeholder, very short or very long strings, and strings
/// made only of punctuation or symbols.
pub fn is_usable_list_title(title: &str) -> bool {
    let len = char_len(title);
    title != PLACEHOLDER_TITLE && len > 2 && len < 150 && MEANINGFUL_CHAR.is_match(title)
}

/// Extract the title of a detail page.
///
/// Tried in order: the configured selector, the Chakra UI heading some
/// carriers use, `<title>`, `og:title`, the first `<h1>`. Falls back to
/// the placeholder.
pub fn extract_detail_title(html: &str, title_selector: Option<&str>) -> String {
    let document = Html::parse_document(html);

    let first_text = |selector: &str| -> Option<String> {
        let selector = parse_selector(selector)?;
        let element = document.select(&selector).next()?;
        let text = element_text(element, "");
        (!text.is_empty()).then(|| truncate_chars(&text, MAX_TITLE_CHARS).to_string())
    };

    if let Some(selector) = title_selector.and_then(normalize_title_selector) {
        if let Some(title) = first_text(&selector) {
            return title;
        }
    }

    if html.contains("chakra-text") {
        if let Some(title) = first_text("h1.chakra-text") {
            return title;
        }
    }

    if let Some(title) = first_text("title") {
        return title;
    }

    if let Some(selector) = parse_selector(r#"meta[property="og:title"]"#) {
        let og = document
            .select(&selector)
            .filter_map(|m| m.value().attr("content"))
            .map(str::trim)
            .find(|c| !c.is_empty());
        if let Some(content) = og {
            return truncate_chars(content, MAX_TITLE_CHARS).to_string();
        }
    }

    first_text("h1").unwrap_or_else(|| PLACEHOLDER_TITLE.to_string())
}
