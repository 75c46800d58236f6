//! `weather-aggregator` - merges OpenWeatherMap and WeatherAPI responses
//!
//! A single form endpoint queries both providers for a city and returns
//! their raw documents side by side, preferring OpenWeatherMap and falling
//! back to WeatherAPI.

pub mod aggregator;
pub mod api;
pub mod config;
pub mod error;
pub mod logging;
pub mod models;
pub mod provider;
pub mod web;

// Re-export core types for public API
pub use aggregator::{ProviderReplies, WeatherAggregator, resolve};
pub use api::AppState;
pub use crate::config::AggregatorConfig;
pub use error::AggregatorError;
pub use models::{ErrorBody, ProviderResponse, RawDocument, Resolution, WeatherAggregate};
pub use provider::{ProviderId, WeatherProvider};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, AggregatorError>;
