use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::config::AppConfig;
use crate::handlers::MountTable;
use crate::pipeline::Pipeline;

#[derive(Parser, Debug)]
#[command(name = "sportsbuddies")]
#[command(about = "SportsBuddies - find training partners at gyms and pools")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Interface to bind (overrides HOST)")]
    pub host: Option<String>,

    #[arg(long, global = true, help = "Port to listen on (overrides PORT)")]
    pub port: Option<u16>,

    #[arg(long, global = true, help = "Directory of static files (overrides PUBLIC_DIR)")]
    pub public_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Commands {
    #[command(about = "Run the web server (default)")]
    Serve,

    #[command(about = "Print the request pipeline and router mount order, then exit")]
    Describe,
}

impl Cli {
    /// Command-line flags win over the environment
    pub fn apply(&self, config: &mut AppConfig) {
        if let Some(host) = &self.host {
            config.server.host = host.clone();
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if let Some(dir) = &self.public_dir {
            config.server.public_dir = dir.clone();
        }
    }
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => {
            let mut config = AppConfig::from_env()?;
            cli.apply(&mut config);
            crate::app::serve(config).await
        }
        Commands::Describe => {
            describe();
            Ok(())
        }
    }
}

fn describe() {
    println!("Pipeline:");
    for (index, descriptor) in Pipeline::standard().describe().iter().enumerate() {
        let requires: Vec<&str> = descriptor.requires.iter().map(|s| s.name()).collect();
        println!(
            "  {}. {:<15} provides {}{}",
            index + 1,
            descriptor.stage.name(),
            descriptor.provides,
            if requires.is_empty() {
                String::new()
            } else {
                format!(" (after {})", requires.join(", "))
            }
        );
    }

    println!("Routers (first match wins):");
    for name in MountTable::standard().names() {
        println!("  {}", name);
    }
}
