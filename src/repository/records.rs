//! Diesel ORM models for database tables.
//!
//! Records mirror the table layout (timestamps as RFC3339 text, routes as
//! JSON text) and convert to and from the domain models.

use diesel::prelude::*;

use super::util::{routes_from_json, routes_to_json};
use super::{parse_datetime, parse_datetime_opt};
use crate::models::{Airline, ContentType, Deal, Keyword, MonitorUrl, Notice, SelectorHints};
use crate::schema;

/// Airline record from the database.
#[derive(Queryable, Selectable, Insertable, Debug, Clone)]
#[diesel(table_name = schema::airlines)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct AirlineRecord {
    pub id: String,
    pub name: String,
    pub base_url: String,
    pub logo_url: Option<String>,
    pub created_at: String,
}

impl From<AirlineRecord> for Airline {
    fn from(record: AirlineRecord) -> Self {
        Airline {
            id: record.id,
            name: record.name,
            base_url: record.base_url,
            logo_url: record.logo_url,
            created_at: parse_datetime(&record.created_at),
        }
    }
}

impl From<&Airline> for AirlineRecord {
    fn from(airline: &Airline) -> Self {
        AirlineRecord {
            id: airline.id.clone(),
            name: airline.name.clone(),
            base_url: airline.base_url.clone(),
            logo_url: airline.logo_url.clone(),
            created_at: airline.created_at.to_rfc3339(),
        }
    }
}

/// Keyword record from the database.
#[derive(Queryable, Selectable, Insertable, Debug, Clone)]
#[diesel(table_name = schema::keywords)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct KeywordRecord {
    pub id: String,
    pub airline_id: Option<String>,
    pub keyword: String,
    pub created_at: String,
}

impl From<KeywordRecord> for Keyword {
    fn from(record: KeywordRecord) -> Self {
        Keyword {
            id: record.id,
            airline_id: record.airline_id,
            keyword: record.keyword,
            created_at: parse_datetime(&record.created_at),
        }
    }
}

impl From<&Keyword> for KeywordRecord {
    fn from(keyword: &Keyword) -> Self {
        KeywordRecord {
            id: keyword.id.clone(),
            airline_id: keyword.airline_id.clone(),
            keyword: keyword.keyword.clone(),
            created_at: keyword.created_at.to_rfc3339(),
        }
    }
}

/// Monitored URL record from the database.
#[derive(Queryable, Selectable, Insertable, Debug, Clone)]
#[diesel(table_name = schema::monitor_urls)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct MonitorUrlRecord {
    pub id: String,
    pub airline_id: String,
    pub url: String,
    pub last_html_hash: Option<String>,
    pub last_checked_at: Option<String>,
    pub list_link_selector: Option<String>,
    pub detail_title_selector: Option<String>,
    pub list_period_selector: Option<String>,
    pub list_next_selector: Option<String>,
}

impl From<MonitorUrlRecord> for MonitorUrl {
    fn from(record: MonitorUrlRecord) -> Self {
        MonitorUrl {
            id: record.id,
            airline_id: record.airline_id,
            url: record.url,
            last_html_hash: record.last_html_hash,
            last_checked_at: parse_datetime_opt(record.last_checked_at),
            selectors: SelectorHints {
                list_link: record.list_link_selector,
                detail_title: record.detail_title_selector,
                list_period: record.list_period_selector,
                list_next: record.list_next_selector,
            },
        }
    }
}

impl From<&MonitorUrl> for MonitorUrlRecord {
    fn from(monitor: &MonitorUrl) -> Self {
        MonitorUrlRecord {
            id: monitor.id.clone(),
            airline_id: monitor.airline_id.clone(),
            url: monitor.url.clone(),
            last_html_hash: monitor.last_html_hash.clone(),
            last_checked_at: monitor.last_checked_at.map(|dt| dt.to_rfc3339()),
            list_link_selector: monitor.selectors.list_link.clone(),
            detail_title_selector: monitor.selectors.detail_title.clone(),
            list_period_selector: monitor.selectors.list_period.clone(),
            list_next_selector: monitor.selectors.list_next.clone(),
        }
    }
}

/// Notice record from the database.
#[derive(Queryable, Selectable, Insertable, Debug, Clone)]
#[diesel(table_name = schema::notices)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct NoticeRecord {
    pub id: String,
    pub airline_id: String,
    pub source_url: String,
    pub content_type: String,
    pub raw_content: String,
    pub extracted_text: Option<String>,
    pub event_start: Option<String>,
    pub event_end: Option<String>,
    pub routes: Option<String>,
    pub is_special_deal: bool,
    pub created_at: String,
    pub analyzed_at: Option<String>,
}

impl From<NoticeRecord> for Notice {
    fn from(record: NoticeRecord) -> Self {
        Notice {
            id: record.id,
            airline_id: record.airline_id,
            source_url: record.source_url,
            content_type: ContentType::from_str(&record.content_type).unwrap_or(ContentType::Text),
            raw_content: record.raw_content,
            extracted_text: record.extracted_text,
            event_start: parse_datetime_opt(record.event_start),
            event_end: parse_datetime_opt(record.event_end),
            routes: routes_from_json(record.routes),
            is_special_deal: record.is_special_deal,
            created_at: parse_datetime(&record.created_at),
            analyzed_at: parse_datetime_opt(record.analyzed_at),
        }
    }
}

impl From<&Notice> for NoticeRecord {
    fn from(notice: &Notice) -> Self {
        NoticeRecord {
            id: notice.id.clone(),
            airline_id: notice.airline_id.clone(),
            source_url: notice.source_url.clone(),
            content_type: notice.content_type.as_str().to_string(),
            raw_content: notice.raw_content.clone(),
            extracted_text: notice.extracted_text.clone(),
            event_start: notice.event_start.map(|dt| dt.to_rfc3339()),
            event_end: notice.event_end.map(|dt| dt.to_rfc3339()),
            routes: routes_to_json(&notice.routes),
            is_special_deal: notice.is_special_deal,
            created_at: notice.created_at.to_rfc3339(),
            analyzed_at: notice.analyzed_at.map(|dt| dt.to_rfc3339()),
        }
    }
}

/// Deal record from the database.
#[derive(Queryable, Selectable, Insertable, Debug, Clone)]
#[diesel(table_name = schema::deals)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct DealRecord {
    pub id: String,
    pub notice_id: Option<String>,
    pub airline_id: String,
    pub title: String,
    pub description: Option<String>,
    pub url: Option<String>,
    pub event_start: Option<String>,
    pub event_end: Option<String>,
    pub routes: Option<String>,
    pub price: Option<i64>,
    pub image_url: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<DealRecord> for Deal {
    fn from(record: DealRecord) -> Self {
        Deal {
            id: record.id,
            notice_id: record.notice_id,
            airline_id: record.airline_id,
            title: record.title,
            description: record.description,
            url: record.url,
            event_start: parse_datetime_opt(record.event_start),
            event_end: parse_datetime_opt(record.event_end),
            routes: routes_from_json(record.routes),
            price: record.price,
            image_url: record.image_url,
            created_at: parse_datetime(&record.created_at),
            updated_at: parse_datetime(&record.updated_at),
        }
    }
}

impl From<&Deal> for DealRecord {
    fn from(deal: &Deal) -> Self {
        DealRecord {
            id: deal.id.clone(),
            notice_id: deal.notice_id.clone(),
            airline_id: deal.airline_id.clone(),
            title: deal.title.clone(),
            description: deal.description.clone(),
            url: deal.url.clone(),
            event_start: deal.event_start.map(|dt| dt.to_rfc3339()),
            event_end: deal.event_end.map(|dt| dt.to_rfc3339()),
            routes: routes_to_json(&deal.routes),
            price: deal.price,
            image_url: deal.image_url.clone(),
            created_at: deal.created_at.to_rfc3339(),
            updated_at: deal.updated_at.to_rfc3339(),
        }
    }
}
