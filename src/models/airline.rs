//! Airline model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An airline whose pages are monitored.
///
/// Read-only from the pipeline's point of view; rows are managed by
/// the seeding commands.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Airline {
    pub id: String,
    pub name: String,
    pub base_url: String,
    pub logo_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Airline {
    /// Create a new airline with a generated id.
    pub fn new(name: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.into(),
            base_url: base_url.into(),
            logo_url: None,
            created_at: Utc::now(),
        }
    }
}
