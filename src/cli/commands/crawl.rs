//! Crawl commands: one-off cycles, the scheduler, and gateway probes.

use console::style;

use crate::cli::helpers::build_pipeline;
use crate::config::Settings;
use crate::scrapers::FetchGateway;
use crate::services::{compute_hash, PipelineError, Scheduler};

/// Run one detection cycle.
///
/// Refuses to start while a cycle from `watch` or another `run` holds the
/// database lease.
pub async fn cmd_run(settings: &Settings) -> anyhow::Result<()> {
    let pipeline = build_pipeline(settings)?;
    let report = match pipeline.run_cycle().await {
        Ok(report) => report,
        Err(PipelineError::Busy) => {
            println!(
                "{} Another cycle is running against this database; try again later",
                style("✗").red()
            );
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    println!(
        "{} {} targets ({} skipped), {} new notices, {} deals",
        style("✓").green(),
        report.targets,
        report.skipped,
        report.new_notices,
        report.deals
    );
    if report.failed > 0 {
        println!("{} {} notices failed analysis", style("!").yellow(), report.failed);
    }
    Ok(())
}

/// Run cycles on the configured interval until Ctrl-C.
pub async fn cmd_watch(settings: &Settings) -> anyhow::Result<()> {
    let pipeline = build_pipeline(settings)?;
    let handle = Scheduler::start(pipeline, settings.crawl_interval().as_secs());

    println!(
        "{} Watching every {}s, press Ctrl-C to stop",
        style("→").cyan(),
        handle.interval().as_secs()
    );
    tokio::signal::ctrl_c().await?;

    println!("{} Stopping after the current cycle...", style("!").yellow());
    handle.shutdown().await;
    Ok(())
}

/// Fetch one URL through the gateway.
pub async fn cmd_fetch(settings: &Settings, url: &str) -> anyhow::Result<()> {
    let gateway = FetchGateway::from_settings(settings)?;
    let route = if gateway.requires_browser(url) { "browser" } else { "http" };

    match gateway.fetch_page(url).await {
        Some(body) => {
            println!("{} {} bytes via {} route", style("✓").green(), body.len(), route);
            println!("  sha256 {}", compute_hash(&body));
            Ok(())
        }
        None => anyhow::bail!("Every fetch strategy failed for {}", url),
    }
}
