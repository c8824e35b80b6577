use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A classification keyword.
///
/// Keywords without an airline apply to every airline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Keyword {
    pub id: String,
    pub airline_id: Option<String>,
    pub keyword: String,
    pub created_at: DateTime<Utc>,
}

impl Keyword {
    pub fn new(airline_id: Option<String>, keyword: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            airline_id,
            keyword: keyword.into(),
            created_at: Utc::now(),
        }
    }

    /// Whether this keyword applies to every airline.
    pub fn is_global(&self) -> bool {
        self.airline_id.is_none()
    }
}
