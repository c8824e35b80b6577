//! Monitored page model and its extraction hints.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Operator-supplied CSS hints for a monitored page.
///
/// When `list_link` is unset the page is treated as a single notice and
/// change is detected by content hash.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectorHints {
    /// Selects list elements that link to detail pages.
    pub list_link: Option<String>,
    /// Selects the title on a detail page (also tried within list items).
    pub detail_title: Option<String>,
    /// Selects the validity-period text inside a list item.
    pub list_period: Option<String>,
    /// Selects the "next page" control of a list.
    pub list_next: Option<String>,
}

impl SelectorHints {
    /// Whether the page is crawled as a list of detail links.
    pub fn is_list_mode(&self) -> bool {
        self.list_link
            .as_deref()
            .is_some_and(|s| !s.trim().is_empty())
    }
}

/// One watched page together with its crawl state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonitorUrl {
    pub id: String,
    pub airline_id: String,
    pub url: String,
    /// Digest of the last successfully fetched content.
    pub last_html_hash: Option<String>,
    pub last_checked_at: Option<DateTime<Utc>>,
    pub selectors: SelectorHints,
}

impl MonitorUrl {
    pub fn new(airline_id: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            airline_id: airline_id.into(),
            url: url.into(),
            last_html_hash: None,
            last_checked_at: None,
            selectors: SelectorHints::default(),
        }
    }

    pub fn with_selectors(mut self, selectors: SelectorHints) -> Self {
        self.selectors = selectors;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_mode_requires_non_blank_selector() {
        let mut hints = SelectorHints::default();
        assert!(!hints.is_list_mode());

        hints.list_link = Some("   ".to_string());
        assert!(!hints.is_list_mode());

        hints.list_link = Some("ul.board li".to_string());
        assert!(hints.is_list_mode());
    }
}
