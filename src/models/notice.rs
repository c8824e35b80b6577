//! Notice model.
//!
//! A notice is one detected unit of page content. The crawler creates it,
//! the classifier later fills in deal status and the event window.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Generic title used when nothing better could be extracted.
pub const PLACEHOLDER_TITLE: &str = "공지";

/// Kind of content a notice carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentType {
    Text,
    Image,
}

impl ContentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Image => "image",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "text" => Some(Self::Text),
            "image" => Some(Self::Image),
            _ => None,
        }
    }
}

/// A persisted record of detected page content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notice {
    pub id: String,
    pub airline_id: String,
    pub source_url: String,
    pub content_type: ContentType,
    /// Extracted text, or the image URL for image notices.
    pub raw_content: String,
    pub extracted_text: Option<String>,
    pub event_start: Option<DateTime<Utc>>,
    pub event_end: Option<DateTime<Utc>>,
    pub routes: Vec<String>,
    pub is_special_deal: bool,
    pub created_at: DateTime<Utc>,
    pub analyzed_at: Option<DateTime<Utc>>,
}

impl Notice {
    /// Create an unanalyzed notice.
    pub fn new(
        airline_id: impl Into<String>,
        source_url: impl Into<String>,
        content_type: ContentType,
        raw_content: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            airline_id: airline_id.into(),
            source_url: source_url.into(),
            content_type,
            raw_content: raw_content.into(),
            extracted_text: None,
            event_start: None,
            event_end: None,
            routes: Vec::new(),
            is_special_deal: false,
            created_at,
            analyzed_at: None,
        }
    }

    pub fn is_image(&self) -> bool {
        self.content_type == ContentType::Image
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_type_round_trip() {
        for ct in [ContentType::Text, ContentType::Image] {
            assert_eq!(ContentType::from_str(ct.as_str()), Some(ct));
        }
        assert_eq!(ContentType::from_str("video"), None);
    }
}
