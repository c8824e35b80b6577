//! Administrative reset.

use std::io::{self, Write};

use console::style;

use crate::cli::helpers::open_db;
use crate::config::Settings;

/// Delete all deals and notices and reset every monitored URL.
pub async fn cmd_reset(settings: &Settings, confirm: bool) -> anyhow::Result<()> {
    println!(
        "\n{} This deletes every deal and notice and resets crawl state.",
        style("!").yellow()
    );

    if !confirm {
        print!("\nProceed? [y/N] ");
        io::stdout().flush()?;
        let mut input = String::new();
        io::stdin().read_line(&mut input)?;
        if !input.trim().eq_ignore_ascii_case("y") {
            println!("{} Cancelled", style("!").yellow());
            return Ok(());
        }
    }

    let report = open_db(settings).clear_detections().await?;
    println!(
        "{} Deleted {} deals and {} notices, reset {} monitored URLs",
        style("✓").green(),
        report.deals,
        report.notices,
        report.monitor_urls
    );
    Ok(())
}
