use std::path::PathBuf;

use clap::Parser;

/// Command-line flags; everything else comes from the config file and environment.
#[derive(Debug, Parser)]
#[command(
    name = "weather-aggregator",
    version,
    about = "Serve merged OpenWeatherMap and WeatherAPI data for a city"
)]
pub struct Cli {
    /// Path to a TOML config file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Port to listen on, overrides `server.port`
    #[arg(long)]
    pub port: Option<u16>,

    /// Log at debug level
    #[arg(long, short)]
    pub verbose: bool,
}
