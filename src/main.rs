use clap::{Parser, Subcommand};
use link_rank::Result;
use link_rank::commands::{check_health, rank_links};
use link_rank::config::{run_interactive_config, show_config};

#[derive(Parser)]
#[command(name = "link-rank")]
#[command(about = "Rank the pages linked from seed URLs by relevance to a query")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Configure Ollama connection and ranking settings
    Config {
        /// Show current configuration
        #[arg(long)]
        show: bool,
    },
    /// Collect links from the seed pages and rank them against a query
    Rank {
        /// Text the linked pages are compared against
        #[arg(long, short)]
        query: String,
        /// Seed URLs, separated by spaces or commas
        #[arg(required = true)]
        urls: Vec<String>,
        /// Only print the best N links
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Check the Ollama server and embedding model
    Health,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Config { show } => {
            if show {
                show_config()?;
            } else {
                run_interactive_config()?;
            }
        }
        Commands::Rank { query, urls, limit } => {
            rank_links(&query, &urls, limit).await?;
        }
        Commands::Health => {
            check_health()?;
        }
    }

    Ok(())
}
