//! Operator selector normalization and small DOM helpers.

use scraper::{ElementRef, Selector};
use tracing::debug;

/// Characters that mark a string as real CSS rather than a bare name.
const SELECTOR_SYNTAX: &[char] = &[' ', '[', ']', '(', ')', ':', '>', '+', '~', '#', '.'];

/// Bare names that are element names rather than class names.
const BARE_TAGS: &[&str] = &[
    "a", "li", "tr", "td", "dl", "dt", "dd", "p", "span", "strong", "em", "b", "article",
    "section", "table", "tbody", "h1", "h2", "h3", "h4", "h5", "h6",
];

/// Normalize a list-link (or list-title) selector.
///
/// `ul` and `div` mean "anchors directly inside"; any other bare
/// identifier that is not a common element name is taken as a class.
pub fn normalize_link_selector(raw: &str) -> String {
    let s = raw.trim();
    if s.is_empty() {
        return String::new();
    }

    match s.to_ascii_lowercase().as_str() {
        "ul" => return "ul > a".to_string(),
        "div" => return "div > a".to_string(),
        lower if BARE_TAGS.contains(&lower) => return lower.to_string(),
        _ => {}
    }

    if s.contains(SELECTOR_SYNTAX) {
        s.to_string()
    } else {
        format!(".{}", s)
    }
}

/// Normalize a detail-title selector: a bare `div` means its `strong` child.
pub fn normalize_title_selector(raw: &str) -> Option<String> {
    let s = raw.trim();
    if s.is_empty() {
        None
    } else if s.eq_ignore_ascii_case("div") {
        Some("div strong".to_string())
    } else {
        Some(s.to_string())
    }
}

/// Parse a selector, logging and discarding invalid ones.
pub fn parse_selector(selector: &str) -> Option<Selector> {
    match Selector::parse(selector) {
        Ok(s) => Some(s),
        Err(e) => {
            debug!("Ignoring invalid selector {:?}: {:?}", selector, e);
            None
        }
    }
}

/// Visible text of an element: trimmed fragments joined by `separator`.
pub fn element_text(element: ElementRef<'_>, separator: &str) -> String {
    element
        .text()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(separator)
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::Html;

    #[test]
    fn test_normalize_link_selector() {
        assert_eq!(normalize_link_selector("ul"), "ul > a");
        assert_eq!(normalize_link_selector(" DIV "), "div > a");
        assert_eq!(normalize_link_selector("event-item"), ".event-item");
        assert_eq!(normalize_link_selector("li"), "li");
        assert_eq!(normalize_link_selector("ul.board li"), "ul.board li");
        assert_eq!(normalize_link_selector("#list a"), "#list a");
        assert_eq!(normalize_link_selector(""), "");
    }

    #[test]
    fn test_normalize_title_selector() {
        assert_eq!(normalize_title_selector("div").as_deref(), Some("div strong"));
        assert_eq!(normalize_title_selector("h2.tit").as_deref(), Some("h2.tit"));
        assert_eq!(normalize_title_selector("  "), None);
    }

    #[test]
    fn test_parse_selector_rejects_garbage() {
        assert!(parse_selector("ul > li").is_some());
        assert!(parse_selector("ul >>> [").is_none());
    }

    #[test]
    fn test_element_text_joins_fragments() {
        let doc = Html::parse_fragment("<div> 봄맞이 <b>특가</b>\n <i> </i>이벤트 </div>");
        let sel = Selector::parse("div").unwrap();
        let div = doc.select(&sel).next().unwrap();
        assert_eq!(element_text(div, " "), "봄맞이 특가 이벤트");
        assert_eq!(element_text(div, ""), "봄맞이특가이벤트");
    }
}
