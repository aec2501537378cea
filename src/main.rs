use clap::Parser;
use sportsbuddies::cli::Cli;
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_FILTER: &str = "sportsbuddies=debug,tower_http=info";

#[tokio::main]
async fn main() {
    // Load .env if present so DATABASE_URL and SESSION_SECRET can live there
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .init();

    let cli = Cli::parse();

    if let Err(e) = sportsbuddies::cli::run(cli).await {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}
