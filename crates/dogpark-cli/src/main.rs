mod output;
mod search;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::search::SearchCommands;

#[derive(Debug, Parser)]
#[command(name = "dogpark-cli")]
#[command(about = "Find dog parks in Swedish counties or any map area")]
struct Cli {
    /// Print machine-readable JSON instead of tables
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// List the regions that can be searched by identifier
    Regions,
    /// Search for dog parks and print the resulting markers
    Search {
        #[command(subcommand)]
        command: SearchCommands,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let config = dogpark_core::load_app_config_from_env()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let registry = dogpark_core::RegionRegistry::from_optional_path(config.regions_path.as_deref())?;

    match cli.command {
        Some(Commands::Regions) => output::print_regions(registry.regions(), cli.json)?,
        Some(Commands::Search { command }) => {
            search::run_search(&config, &registry, command, cli.json).await?;
        }
        None => println!("dogpark-cli: try `regions` or `search --help`"),
    }

    Ok(())
}
