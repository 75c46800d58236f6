use anyhow::Result;
use clap::Parser;
use weather_aggregator::{AggregatorConfig, logging, web};

mod cli;

#[tokio::main]
async fn main() -> Result<()> {
    let args = cli::Cli::parse();

    let mut config = AggregatorConfig::load_from_path(args.config)?;
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if args.verbose {
        config.logging.level = "debug".to_string();
    }

    logging::init(&config.logging)?;
    tracing::debug!(
        "Primary provider at {}, fallback at {}",
        config.openweather.base_url,
        config.weatherapi.base_url
    );

    web::run(&config).await
}
