//! Resolving list elements to detail-page URLs.

use std::iter;
use std::sync::LazyLock;

use regex::Regex;
use scraper::ElementRef;
use url::Url;

/// A site convention where an attribute value identifies the detail page.
#[derive(Debug, Clone, Copy)]
pub struct AttributeLinkRule {
    pub attribute: &'static str,
    /// Path joined with the page URL; `{value}` is replaced by the attribute.
    pub path_template: &'static str,
}

/// Attribute conventions tried before looking at anchors.
pub const ATTRIBUTE_LINK_RULES: &[AttributeLinkRule] = &[AttributeLinkRule {
    attribute: "data-event-seq-no",
    path_template: "/ko/contents/event/viewEventList.do?eventSeqNo={value}",
}];

static SINGLE_QUOTED: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"'(.*?)'").unwrap());
static DOUBLE_QUOTED: LazyLock<Regex> = LazyLock::new(|| Regex::new(r#""(.*?)""#).unwrap());

/// First quoted string literal in a script snippet, single quotes preferred.
pub fn quoted_literal(script: &str) -> Option<&str> {
    SINGLE_QUOTED
        .captures(script)
        .or_else(|| DOUBLE_QUOTED.captures(script))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Join `href` against `base`, keeping only http(s) results.
pub fn join_url(base: &Url, href: &str) -> Option<String> {
    let joined = base.join(href.trim()).ok()?;
    matches!(joined.scheme(), "http" | "https").then(|| joined.to_string())
}

/// Canonical form used for URL comparisons: trimmed, no fragment, no
/// trailing slash.
pub fn normalize_url(url: &str) -> String {
    let trimmed = url.trim().trim_end_matches('/');
    let without_fragment = match trimmed.split_once('#') {
        Some((head, _)) => head,
        None => trimmed,
    };
    without_fragment.trim_end_matches('/').to_string()
}

fn self_and_descendants<'a>(element: ElementRef<'a>) -> impl Iterator<Item = ElementRef<'a>> {
    element.descendants().filter_map(ElementRef::wrap)
}

/// Resolve the detail URL a list element points at.
///
/// Tried in order: attribute conventions, anchor `href`s (including
/// `javascript:` wrappers around a quoted path), then `onclick` handlers.
pub fn resolve_element_link(element: ElementRef<'_>, base: &Url) -> Option<String> {
    for node in self_and_descendants(element) {
        for rule in ATTRIBUTE_LINK_RULES {
            if let Some(value) = node.value().attr(rule.attribute).map(str::trim) {
                if !value.is_empty() {
                    return join_url(base, &rule.path_template.replace("{value}", value));
                }
            }
        }
    }

    let anchors = iter::once(element).chain(
        self_and_descendants(element)
            .skip(1)
            .filter(|e| e.value().name() == "a"),
    );
    for anchor in anchors {
        let Some(href) = anchor.value().attr("href").map(str::trim) else {
            continue;
        };
        if href.is_empty() || href == "#" || href.starts_with("javascript:void") {
            continue;
        }
        if href.starts_with("javascript:") {
            if let Some(url) = quoted_literal(href).and_then(|path| join_url(base, path)) {
                return Some(url);
            }
            continue;
        }
        return join_url(base, href);
    }

    for node in self_and_descendants(element) {
        let Some(onclick) = node.value().attr("onclick") else {
            continue;
        };
        if let Some(path) = quoted_literal(onclick) {
            if path.contains('/') || path.contains(".do") || path.contains("http") {
                return join_url(base, path);
            }
        }
    }

    None
}
