use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use countryfx::core::SortOrder;
use countryfx::core::log::init_logging;
use std::path::PathBuf;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

impl From<Commands> for countryfx::AppCommand {
    fn from(cmd: Commands) -> countryfx::AppCommand {
        match cmd {
            Commands::Refresh => countryfx::AppCommand::Refresh,
            Commands::List {
                region,
                currency,
                sort,
            } => countryfx::AppCommand::List {
                region,
                currency,
                sort,
            },
            Commands::Get { name } => countryfx::AppCommand::Get { name },
            Commands::Delete { name } => countryfx::AppCommand::Delete { name },
            Commands::Status => countryfx::AppCommand::Status,
            Commands::Image { output } => countryfx::AppCommand::Image { output },
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Fetch countries and exchange rates and update the cache
    Refresh,
    /// List cached countries
    List {
        /// Only countries in this region (exact match)
        #[arg(long)]
        region: Option<String>,
        /// Only countries using this currency code
        #[arg(long)]
        currency: Option<String>,
        /// One of gdp_desc, gdp_asc, population_desc, population_asc
        #[arg(long)]
        sort: Option<SortOrder>,
    },
    /// Show a single cached country
    Get { name: String },
    /// Remove a country from the cache
    Delete { name: String },
    /// Display cache size and last refresh time
    Status,
    /// Render the summary image
    Image {
        /// Output path, defaults to the cache directory
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => countryfx::cli::setup::setup(),
        Some(cmd) => countryfx::run_command(cmd.into(), cli.config_path.as_deref()).await,
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}
