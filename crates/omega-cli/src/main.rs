//! Omega Search CLI - 命令行工具

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use omega_search::SearchMode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

#[derive(Parser)]
#[command(name = "omega-search")]
#[command(about = "Omega Search - clinical trial retrieval service", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP search service
    Serve {
        /// Host to bind to
        #[arg(long)]
        host: Option<String>,
        /// Port to listen on
        #[arg(short, long)]
        port: Option<u16>,
        /// Configuration file path
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Run a single search and print the results
    Search {
        /// Query text, repeat for multiple queries
        #[arg(short, long = "query", required = true)]
        queries: Vec<String>,
        /// Search mode (semantic, statistical, hybrid)
        #[arg(short, long, default_value = "semantic")]
        mode: SearchMode,
        /// Number of results to return (default: search.default_top_k)
        #[arg(short = 'k', long)]
        top_k: Option<usize>,
        /// Dense weight for hybrid search
        #[arg(short, long)]
        alpha: Option<f32>,
        /// Configuration file path
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Print the raw JSON response
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // 初始化日志
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "omega=debug,info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { host, port, config } => {
            commands::serve::run(host, port, config).await?;
        }
        Commands::Search {
            queries,
            mode,
            top_k,
            alpha,
            config,
            json,
        } => {
            let args = commands::search::SearchArgs {
                queries,
                mode,
                top_k,
                alpha,
                json,
            };
            commands::search::run(args, config).await?;
        }
    }

    Ok(())
}
