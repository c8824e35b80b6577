//! Deal model: the outward-facing artifact derived from a notice.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A stored deal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Deal {
    pub id: String,
    /// Originating notice; cleared if the notice is deleted.
    pub notice_id: Option<String>,
    pub airline_id: String,
    pub title: String,
    pub description: Option<String>,
    pub url: Option<String>,
    pub event_start: Option<DateTime<Utc>>,
    pub event_end: Option<DateTime<Utc>>,
    pub routes: Vec<String>,
    /// Filled in later by the price crawler.
    pub price: Option<i64>,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A deal about to be inserted.
#[derive(Debug, Clone, PartialEq)]
pub struct NewDeal {
    pub notice_id: String,
    pub airline_id: String,
    pub title: String,
    pub description: Option<String>,
    pub url: Option<String>,
    pub event_start: Option<DateTime<Utc>>,
    pub event_end: Option<DateTime<Utc>>,
    pub routes: Vec<String>,
    pub image_url: Option<String>,
}
