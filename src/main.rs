//! oflp-api - API service for the Ocean Freight Logistics Platform

use anyhow::Context;
use clap::Parser;

use oflp::config::{ServerConfig, DEFAULT_PORT};
use oflp::server;

#[derive(Debug, Parser)]
#[command(name = "oflp-api", version, about = "Ocean freight logistics API service")]
struct Cli {
    /// TCP port to bind
    #[arg(long, env = "OFLP_PORT", default_value_t = DEFAULT_PORT)]
    port: u16,

    /// Allowed CORS origin, repeatable or comma-separated
    #[arg(long = "cors-origin", env = "OFLP_CORS_ORIGINS", value_delimiter = ',')]
    cors_origins: Vec<String>,

    /// Environment label reported by the health endpoint
    #[arg(long, env = "OFLP_ENV", default_value = "development")]
    environment: String,
}

#[tokio::main]
async fn main() {
    env_logger::init();

    if let Err(err) = run().await {
        eprintln!("Error: {}", err);
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = ServerConfig {
        port: cli.port,
        environment: cli.environment,
        ..ServerConfig::default()
    };
    if !cli.cors_origins.is_empty() {
        config.cors_origins = cli.cors_origins;
    }

    server::serve(config)
        .await
        .context("oflp-api exited with an error")
}
