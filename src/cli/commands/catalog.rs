//! Seeding and listing airlines, monitored URLs, keywords and deals.

use console::style;

use crate::cli::helpers::{open_db, truncate};
use crate::config::Settings;
use crate::models::{Airline, Keyword, MonitorUrl, SelectorHints};

/// Add an airline.
pub async fn cmd_airline_add(
    settings: &Settings,
    name: &str,
    base_url: &str,
    logo: Option<String>,
) -> anyhow::Result<()> {
    let db = open_db(settings);
    let mut airline = Airline::new(name, base_url);
    airline.logo_url = logo;
    db.airlines().save(&airline).await?;

    println!("{} Added airline {} ({})", style("✓").green(), airline.name, airline.id);
    Ok(())
}

/// List airlines.
pub async fn cmd_airline_list(settings: &Settings) -> anyhow::Result<()> {
    let airlines = open_db(settings).airlines().get_all().await?;
    if airlines.is_empty() {
        println!("{} No airlines. Add one with 'aerofinder airline add'.", style("!").yellow());
        return Ok(());
    }

    println!("{:<38} {:<20} Base URL", "ID", "Name");
    println!("{}", "-".repeat(80));
    for airline in airlines {
        println!("{:<38} {:<20} {}", airline.id, truncate(&airline.name, 19), airline.base_url);
    }
    Ok(())
}

/// Add a monitored URL, in list mode when a link selector is given.
pub async fn cmd_monitor_add(
    settings: &Settings,
    airline_id: &str,
    url: &str,
    selectors: SelectorHints,
) -> anyhow::Result<()> {
    let parsed = url::Url::parse(url)?;
    if !matches!(parsed.scheme(), "http" | "https") {
        anyhow::bail!("Only http(s) URLs can be monitored: {}", url);
    }

    let db = open_db(settings);
    let Some(airline) = db.airlines().get(airline_id).await? else {
        println!("{} Airline '{}' not found", style("✗").red(), airline_id);
        return Ok(());
    };

    let monitor = MonitorUrl::new(&airline.id, url).with_selectors(selectors);
    db.monitor_urls().save(&monitor).await?;

    let mode = if monitor.selectors.is_list_mode() { "list" } else { "single page" };
    println!(
        "{} Monitoring {} for {} ({} mode, {})",
        style("✓").green(),
        monitor.url,
        airline.name,
        mode,
        monitor.id
    );
    Ok(())
}

/// List monitored URLs with their crawl state.
pub async fn cmd_monitor_list(settings: &Settings) -> anyhow::Result<()> {
    let monitors = open_db(settings).monitor_urls().get_all().await?;
    if monitors.is_empty() {
        println!("{} No monitored URLs.", style("!").yellow());
        return Ok(());
    }

    for monitor in monitors {
        let checked = monitor
            .last_checked_at
            .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "Never".to_string());
        let mode = if monitor.selectors.is_list_mode() { "list" } else { "page" };
        println!("{:<5} {:<17} {}", mode, checked, monitor.url);
    }
    Ok(())
}

/// Add a keyword, global unless an airline is given.
pub async fn cmd_keyword_add(
    settings: &Settings,
    keyword: &str,
    airline_id: Option<String>,
) -> anyhow::Result<()> {
    let keyword = keyword.trim();
    if keyword.is_empty() {
        anyhow::bail!("Keyword must not be empty");
    }

    let db = open_db(settings);
    if let Some(ref id) = airline_id {
        if db.airlines().get(id).await?.is_none() {
            println!("{} Airline '{}' not found", style("✗").red(), id);
            return Ok(());
        }
    }

    let keyword = Keyword::new(airline_id, keyword);
    db.keywords().save(&keyword).await?;

    let scope = keyword.airline_id.as_deref().unwrap_or("all airlines");
    println!("{} Added keyword '{}' for {}", style("✓").green(), keyword.keyword, scope);
    Ok(())
}

/// List keywords.
pub async fn cmd_keyword_list(settings: &Settings) -> anyhow::Result<()> {
    let keywords = open_db(settings).keywords().get_all().await?;
    for keyword in &keywords {
        let scope = keyword.airline_id.as_deref().unwrap_or("*");
        println!("{:<38} {}", scope, keyword.keyword);
    }
    if keywords.is_empty() {
        println!("{} No keywords; nothing will be classified as a deal.", style("!").yellow());
    }
    Ok(())
}

/// Show the newest deals.
pub async fn cmd_deals(settings: &Settings, limit: usize) -> anyhow::Result<()> {
    let deals = open_db(settings).deals().get_all().await?;
    if deals.is_empty() {
        println!("{} No deals yet.", style("!").yellow());
        return Ok(());
    }

    for deal in deals.into_iter().take(limit) {
        let window = match (deal.event_start, deal.event_end) {
            (None, None) => "-".to_string(),
            (start, end) => format!(
                "{} ~ {}",
                start.map(|d| d.format("%m/%d").to_string()).unwrap_or_default(),
                end.map(|d| d.format("%m/%d").to_string()).unwrap_or_default()
            ),
        };
        println!(
            "{} {:<13} {}",
            style(deal.created_at.format("%Y-%m-%d").to_string()).dim(),
            window,
            style(truncate(&deal.title, 60)).bold()
        );
        if let Some(url) = deal.url {
            println!("  {}", url);
        }
    }
    Ok(())
}
