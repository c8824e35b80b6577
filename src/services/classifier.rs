//! Keyword classification and event-window extraction for notices.
//!
//! A text notice is a special deal when any of its airline's keywords (or
//! a global keyword) occurs in its text, case-insensitively. Deals then
//! get their event window and routes filled in from the text, without
//! overwriting values the crawler already found.

use std::collections::HashSet;
use std::sync::LazyLock;

use chrono::{DateTime, Datelike, Utc};
use regex::{Captures, Regex};
use tracing::{debug, info};

use crate::models::{ContentType, Keyword, Notice};
use crate::utils::{end_of_day, start_of_day, truncate_chars};

/// How much notice text is scanned for keywords and dates.
const MAX_SCAN_CHARS: usize = 50_000;
/// How much text is kept as `extracted_text` on a deal.
const MAX_EXTRACTED_CHARS: usize = 10_000;

/// Which part of the event window a date pattern yields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DateShape {
    /// `Y.M.D ~ Y.M.D`
    FullRange,
    /// `Y.M.D 까지`
    UntilYmd,
    /// `M.D 까지` or `M월 D일 까지`, current year.
    UntilMd,
    /// `M.D ~ M.D`, current year.
    ShortRange,
    /// `Y년 M월 D일 ~`
    FromYmd,
}

/// Event-window patterns, first match wins. "Until" forms are checked
/// before the short range so `1.15~1.25까지` reads as an end date only.
///
/// The same applies to a dated start with a short end: in
/// `2026.01.10~01.20까지` only `01.20까지` is read, so the start is lost
/// and the end takes the current year.
static DATE_PATTERNS: LazyLock<Vec<(Regex, DateShape)>> = LazyLock::new(|| {
    vec![
        (
            Regex::new(r"(\d{4})\s*[./-]\s*(\d{1,2})\s*[./-]\s*(\d{1,2})\s*[-~]\s*(\d{4})\s*[./-]\s*(\d{1,2})\s*[./-]\s*(\d{1,2})").unwrap(),
            DateShape::FullRange,
        ),
        (
            Regex::new(r"(\d{4})\s*[./-]\s*(\d{1,2})\s*[./-]\s*(\d{1,2})\s*까지").unwrap(),
            DateShape::UntilYmd,
        ),
        (
            Regex::new(r"~?\s*(\d{1,2})\s*(?:[./-]|월)\s*(\d{1,2})\s*일?\s*까지").unwrap(),
            DateShape::UntilMd,
        ),
        (
            Regex::new(r"(\d{1,2})\s*[./-]\s*(\d{1,2})\s*[-~]\s*(\d{1,2})\s*[./-]\s*(\d{1,2})").unwrap(),
            DateShape::ShortRange,
        ),
        (
            Regex::new(r"(\d{4})년\s*(\d{1,2})월\s*(\d{1,2})일\s*[-~]").unwrap(),
            DateShape::FromYmd,
        ),
    ]
});

static ROUTE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[A-Z]{3}\s*[-~]\s*[A-Z]{3}|김포\s*[-~]\s*제주|인천\s*[-~]\s*제주|제주\s*[-~]\s*김포").unwrap()
});

type EventWindow = (Option<DateTime<Utc>>, Option<DateTime<Utc>>);

fn group<T: std::str::FromStr>(caps: &Captures<'_>, index: usize) -> Option<T> {
    caps.get(index)?.as_str().parse().ok()
}

fn window_from(caps: &Captures<'_>, shape: DateShape, year: i32) -> Option<EventWindow> {
    let window = match shape {
        DateShape::FullRange => (
            Some(start_of_day(group(caps, 1)?, group(caps, 2)?, group(caps, 3)?)?),
            Some(end_of_day(group(caps, 4)?, group(caps, 5)?, group(caps, 6)?)?),
        ),
        DateShape::UntilYmd => (
            None,
            Some(end_of_day(group(caps, 1)?, group(caps, 2)?, group(caps, 3)?)?),
        ),
        DateShape::UntilMd => (None, Some(end_of_day(year, group(caps, 1)?, group(caps, 2)?)?)),
        DateShape::ShortRange => (
            Some(start_of_day(year, group(caps, 1)?, group(caps, 2)?)?),
            Some(end_of_day(year, group(caps, 3)?, group(caps, 4)?)?),
        ),
        DateShape::FromYmd => (
            Some(start_of_day(group(caps, 1)?, group(caps, 2)?, group(caps, 3)?)?),
            None,
        ),
    };
    Some(window)
}

/// Extract the event window from notice text.
///
/// Only the first pattern that matches is interpreted; an impossible
/// calendar date in that match yields `(None, None)`.
pub fn extract_event_window(text: &str, current_year: i32) -> EventWindow {
    DATE_PATTERNS
        .iter()
        .find_map(|(pattern, shape)| pattern.captures(text).map(|caps| (caps, *shape)))
        .and_then(|(caps, shape)| window_from(&caps, shape, current_year))
        .unwrap_or((None, None))
}

/// Route pairs such as `ICN-NRT` or `김포-제주`, deduplicated in order of
/// appearance.
pub fn extract_routes(text: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    ROUTE_PATTERN
        .find_iter(text)
        .map(|m| m.as_str().to_string())
        .filter(|route| seen.insert(route.clone()))
        .collect()
}

/// Classifies notices against a fixed keyword set.
#[derive(Debug, Clone)]
pub struct Classifier {
    keywords: Vec<String>,
}

impl Classifier {
    /// Build a classifier from an airline's keywords (own plus global).
    pub fn new(keywords: &[Keyword]) -> Self {
        Self::from_terms(keywords.iter().map(|k| k.keyword.as_str()))
    }

    pub fn from_terms<'a>(terms: impl IntoIterator<Item = &'a str>) -> Self {
        Self {
            keywords: terms
                .into_iter()
                .map(|t| t.trim().to_lowercase())
                .filter(|t| !t.is_empty())
                .collect(),
        }
    }

    /// First keyword found in `text`, if any.
    pub fn matching_keyword(&self, text: &str) -> Option<&str> {
        let haystack = text.to_lowercase();
        self.keywords
            .iter()
            .find(|k| haystack.contains(k.as_str()))
            .map(String::as_str)
    }

    /// Classify `notice` in place and return whether it is a deal.
    pub fn classify(&self, notice: &mut Notice, now: DateTime<Utc>) -> bool {
        match notice.content_type {
            ContentType::Text => self.classify_text(notice, now),
            ContentType::Image => {
                info!("Image analysis is disabled, skipping notice {}", notice.id);
                false
            }
        }
    }

    fn classify_text(&self, notice: &mut Notice, now: DateTime<Utc>) -> bool {
        notice.analyzed_at = Some(now);
        let text = truncate_chars(&notice.raw_content, MAX_SCAN_CHARS);

        let Some(keyword) = self.matching_keyword(text) else {
            debug!("Notice {} matched no keyword", notice.id);
            return false;
        };

        let (start, end) = extract_event_window(text, now.year());
        let routes = extract_routes(text);
        let extracted = truncate_chars(text, MAX_EXTRACTED_CHARS).to_string();

        notice.extracted_text = Some(extracted);
        notice.event_start = notice.event_start.or(start);
        notice.event_end = notice.event_end.or(end);
        if notice.routes.is_empty() {
            notice.routes = routes;
        }
        notice.is_special_deal = true;

        info!(
            "Notice {} is a deal (keyword {:?}, window {:?} - {:?})",
            notice.id, keyword, notice.event_start, notice.event_end
        );
        true
    }
}
