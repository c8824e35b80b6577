//! CLI parser and dispatch to command-specific modules.

mod catalog;
mod crawl;
mod init;
mod reset;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::Settings;

#[derive(Parser)]
#[command(name = "aerofinder")]
#[command(about = "Airline special-deal notice detection")]
#[command(version)]
pub struct Cli {
    /// Config file path (TOML or JSON)
    #[arg(short, long, global = true, env = "AEROFINDER_CONFIG")]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Check if verbose mode is enabled (for early logging setup).
pub fn is_verbose() -> bool {
    std::env::args().any(|arg| arg == "-v" || arg == "--verbose")
}

#[derive(Subcommand)]
enum Commands {
    /// Create the database schema
    Init,

    /// Manage airlines
    Airline {
        #[command(subcommand)]
        command: AirlineCommands,
    },

    /// Manage monitored URLs
    Monitor {
        #[command(subcommand)]
        command: MonitorCommands,
    },

    /// Manage deal keywords
    Keyword {
        #[command(subcommand)]
        command: KeywordCommands,
    },

    /// List pushed deals
    Deals {
        /// Maximum number of deals to show
        #[arg(short, long, default_value = "20")]
        limit: usize,
    },

    /// Run one detection cycle now
    Run,

    /// Run cycles on a schedule until interrupted
    Watch,

    /// Fetch a URL through the fetch gateway and report what came back
    Fetch {
        /// URL to fetch
        url: String,
    },

    /// Delete all deals and notices and forget crawl state
    Reset {
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

#[derive(Subcommand)]
enum AirlineCommands {
    /// Add an airline
    Add {
        name: String,
        base_url: String,
        /// Logo image URL
        #[arg(long)]
        logo: Option<String>,
    },
    /// List airlines
    List,
}

#[derive(Subcommand)]
enum MonitorCommands {
    /// Add a monitored URL for an airline
    Add {
        airline_id: String,
        url: String,
        /// Selector for list links (enables list mode)
        #[arg(long)]
        link: Option<String>,
        /// Selector for titles (detail page, also tried in list rows)
        #[arg(long)]
        title: Option<String>,
        /// Selector for the validity period in list rows
        #[arg(long)]
        period: Option<String>,
        /// Selector for the next-page control
        #[arg(long)]
        next: Option<String>,
    },
    /// List monitored URLs
    List,
}

#[derive(Subcommand)]
enum KeywordCommands {
    /// Add a keyword (global unless --airline is given)
    Add {
        keyword: String,
        #[arg(long)]
        airline: Option<String>,
    },
    /// List keywords
    List,
}

pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let settings = Settings::load(cli.config.as_deref()).await?;

    match cli.command {
        Commands::Init => init::cmd_init(&settings).await,
        Commands::Airline { command } => match command {
            AirlineCommands::Add {
                name,
                base_url,
                logo,
            } => catalog::cmd_airline_add(&settings, &name, &base_url, logo).await,
            AirlineCommands::List => catalog::cmd_airline_list(&settings).await,
        },
        Commands::Monitor { command } => match command {
            MonitorCommands::Add {
                airline_id,
                url,
                link,
                title,
                period,
                next,
            } => {
                let selectors = crate::models::SelectorHints {
                    list_link: link,
                    detail_title: title,
                    list_period: period,
                    list_next: next,
                };
                catalog::cmd_monitor_add(&settings, &airline_id, &url, selectors).await
            }
            MonitorCommands::List => catalog::cmd_monitor_list(&settings).await,
        },
        Commands::Keyword { command } => match command {
            KeywordCommands::Add { keyword, airline } => {
                catalog::cmd_keyword_add(&settings, &keyword, airline).await
            }
            KeywordCommands::List => catalog::cmd_keyword_list(&settings).await,
        },
        Commands::Deals { limit } => catalog::cmd_deals(&settings, limit).await,
        Commands::Run => crawl::cmd_run(&settings).await,
        Commands::Watch => crawl::cmd_watch(&settings).await,
        Commands::Fetch { url } => crawl::cmd_fetch(&settings, &url).await,
        Commands::Reset { yes } => reset::cmd_reset(&settings, yes).await,
    }
}
