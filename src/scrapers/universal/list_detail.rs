//! List-page parsing: candidate detail links with co-located title and
//! period text, plus the pagination control.

use scraper::{ElementRef, Html, Selector};
use tracing::{debug, warn};
use url::Url;

use super::links::{normalize_url, resolve_element_link};
use super::selectors::{element_text, normalize_link_selector, parse_selector};
use crate::models::SelectorHints;

/// One detail link found on a list page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListCandidate {
    /// Normalized absolute detail URL.
    pub url: String,
    pub title: Option<String>,
    pub period: Option<String>,
}

/// Everything extracted from one list page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListPage {
    pub candidates: Vec<ListCandidate>,
    /// Next page, if there is a control that leads somewhere else.
    pub next_url: Option<String>,
}

fn optional_selector(raw: Option<&str>) -> Option<Selector> {
    let normalized = normalize_link_selector(raw?);
    if normalized.is_empty() {
        return None;
    }
    parse_selector(&normalized)
}

/// Nearest enclosing list row or table row.
fn row_ancestor(element: ElementRef<'_>) -> Option<ElementRef<'_>> {
    element
        .ancestors()
        .filter_map(ElementRef::wrap)
        .find(|a| matches!(a.value().name(), "li" | "tr"))
}

/// Text of the first `selector` match inside `element`, falling back to
/// the enclosing row.
fn co_located_text(element: ElementRef<'_>, selector: Option<&Selector>) -> Option<String> {
    let selector = selector?;
    let within = |scope: ElementRef<'_>| {
        scope
            .select(selector)
            .map(|e| element_text(e, " "))
            .find(|t| !t.is_empty())
    };

    within(element).or_else(|| row_ancestor(element).and_then(within))
}

/// Parse one list page.
///
/// An invalid or unmatched link selector yields no candidates.
pub fn extract_list_page(html: &str, page_url: &str, hints: &SelectorHints) -> ListPage {
    let Some(raw_link) = hints.list_link.as_deref() else {
        return ListPage::default();
    };
    let Ok(base) = Url::parse(page_url) else {
        warn!("List page URL is not absolute: {}", page_url);
        return ListPage::default();
    };
    let link_selector = normalize_link_selector(raw_link);
    let Some(link_selector) = parse_selector(&link_selector) else {
        warn!("Invalid list selector {:?} for {}", raw_link, page_url);
        return ListPage::default();
    };

    let title_selector = optional_selector(hints.detail_title.as_deref());
    let period_selector = optional_selector(hints.list_period.as_deref());
    let self_url = normalize_url(page_url);

    let document = Html::parse_document(html);
    let candidates: Vec<ListCandidate> = document
        .select(&link_selector)
        .filter_map(|element| {
            let url = normalize_url(&resolve_element_link(element, &base)?);
            if url == self_url {
                return None;
            }
            Some(ListCandidate {
                url,
                title: co_located_text(element, title_selector.as_ref()),
                period: co_located_text(element, period_selector.as_ref()),
            })
        })
        .collect();

    let next_url = hints
        .list_next
        .as_deref()
        .and_then(|raw| parse_selector(raw.trim()))
        .and_then(|sel| document.select(&sel).find_map(|e| resolve_element_link(e, &base)))
        .map(|url| normalize_url(&url))
        .filter(|url| *url != self_url);

    debug!(
        "{}: {} candidates, next page {:?}",
        page_url,
        candidates.len(),
        next_url
    );

    ListPage { candidates, next_url }
}
