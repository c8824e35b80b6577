//! Initialize command.

use console::style;

use crate::config::Settings;

use crate::cli::helpers::open_db;

/// Create the database schema.
pub async fn cmd_init(settings: &Settings) -> anyhow::Result<()> {
    let db = open_db(settings);
    db.init_schema().await?;

    println!(
        "{} Initialized database at {}",
        style("✓").green(),
        db.pool().database_url()
    );
    println!("  Next: add an airline, a monitored URL and some keywords");

    Ok(())
}
