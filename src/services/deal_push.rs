//! Turning classified notices into deals.

use crate::models::{Airline, Notice, NewDeal, PLACEHOLDER_TITLE};
use crate::utils::truncate_chars;

/// Longest description stored on a deal.
const MAX_DESCRIPTION_CHARS: usize = 500;

/// Title shown when a notice carries no meaningful text of its own.
fn fallback_title(airline: &Airline) -> String {
    format!("{} 특가", airline.name)
}

/// Build the deal for a flagged notice, or `None` if it isn't a deal.
///
/// Callers are responsible for skipping notices that already have a deal.
pub fn build_deal(notice: &Notice, airline: &Airline) -> Option<NewDeal> {
    if !notice.is_special_deal {
        return None;
    }

    let text = notice.extracted_text.as_deref().map(str::trim).unwrap_or_default();
    let title = if text.is_empty() || text == PLACEHOLDER_TITLE || text == airline.name {
        fallback_title(airline)
    } else {
        text.to_string()
    };

    let description = notice
        .extracted_text
        .as_deref()
        .filter(|t| !t.is_empty() && *t != title)
        .map(|t| truncate_chars(t, MAX_DESCRIPTION_CHARS).to_string());

    Some(NewDeal {
        notice_id: notice.id.clone(),
        airline_id: notice.airline_id.clone(),
        title,
        description,
        url: Some(notice.source_url.clone()),
        event_start: notice.event_start,
        event_end: notice.event_end,
        routes: notice.routes.clone(),
        image_url: notice.is_image().then(|| notice.raw_content.clone()),
    })
}
