//! Shared helper functions for CLI commands.

use std::sync::Arc;

use crate::config::Settings;
use crate::repository::DbContext;
use crate::scrapers::{FetchGateway, UniversalCrawler};
use crate::services::Pipeline;

/// Truncate a string for table display, appending "..." when cut.
pub fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_chars.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Open the configured database.
pub fn open_db(settings: &Settings) -> DbContext {
    DbContext::from_url(&settings.resolved_database_url())
}

/// Build the production pipeline: fetch gateway plus universal crawler.
pub fn build_pipeline(settings: &Settings) -> anyhow::Result<Pipeline> {
    let gateway = FetchGateway::from_settings(settings)?;
    tracing::info!("Fetch strategies: {}", gateway.strategy_names().join(", "));

    Ok(Pipeline::new(
        open_db(settings),
        Arc::new(gateway),
        Arc::new(UniversalCrawler::new(settings.first_sight)),
    ))
}
