//! Primary/fallback aggregation over the two weather providers.

use std::sync::Arc;

use reqwest::Client;
use tracing::{info, instrument};

use crate::{
    Result,
    config::AggregatorConfig,
    models::{ProviderResponse, Resolution, WeatherAggregate},
    provider::{OpenWeatherProvider, WeatherApiProvider, WeatherProvider},
};

/// Asks the primary provider first and falls back to the secondary one.
#[derive(Debug, Clone)]
pub struct WeatherAggregator {
    primary: Arc<dyn WeatherProvider>,
    fallback: Arc<dyn WeatherProvider>,
}

/// The four call outcomes for one city.
#[derive(Debug, Clone)]
pub struct ProviderReplies {
    pub primary_current: ProviderResponse,
    pub primary_forecast: ProviderResponse,
    pub fallback_current: ProviderResponse,
    pub fallback_forecast: ProviderResponse,
}

impl WeatherAggregator {
    pub fn new(primary: Arc<dyn WeatherProvider>, fallback: Arc<dyn WeatherProvider>) -> Self {
        Self { primary, fallback }
    }

    /// OpenWeatherMap as primary, WeatherAPI as fallback, sharing one client.
    pub fn from_config(config: &AggregatorConfig, http: Client) -> Result<Self> {
        let primary = OpenWeatherProvider::from_config(&config.openweather, http.clone())?;
        let fallback = WeatherApiProvider::from_config(&config.weatherapi, http)?;
        Ok(Self::new(Arc::new(primary), Arc::new(fallback)))
    }

    /// Fetch all four documents for `city`, one call after another, and resolve them.
    #[instrument(skip(self))]
    pub async fn aggregate(&self, city: &str) -> Result<Resolution> {
        let replies = ProviderReplies {
            primary_current: self.primary.current(city).await?,
            primary_forecast: self.primary.forecast(city).await?,
            fallback_current: self.fallback.current(city).await?,
            fallback_forecast: self.fallback.forecast(city).await?,
        };

        let resolution = resolve(replies)?;
        info!(
            outcome = resolution.label(),
            "Resolved weather for '{}' (primary: {}, fallback: {})",
            city,
            self.primary.id(),
            self.fallback.id()
        );
        Ok(resolution)
    }
}

/// Decide which documents reach the client.
///
/// The primary current-weather call decides; the fallback current-weather
/// call is consulted only when it failed. Forecast slots are dropped
/// independently when their own call failed.
///
/// Only documents that end up in the aggregate are decoded, so an
/// unreadable body in a discarded slot cannot fail the request.
pub fn resolve(replies: ProviderReplies) -> Result<Resolution> {
    let ProviderReplies {
        primary_current,
        primary_forecast,
        fallback_current,
        fallback_forecast,
    } = replies;

    let resolution = if primary_current.is_success() {
        Resolution::FullSuccess(WeatherAggregate {
            current: primary_current.into_document()?,
            forecast: primary_forecast.into_document()?,
            weatherapi_current: fallback_current.into_document()?,
            weatherapi_forecast: fallback_forecast.into_document()?,
        })
    } else if fallback_current.is_success() {
        Resolution::PartialFallback(WeatherAggregate {
            current: None,
            forecast: None,
            weatherapi_current: fallback_current.into_document()?,
            weatherapi_forecast: fallback_forecast.into_document()?,
        })
    } else {
        Resolution::TotalFailure
    };
    Ok(resolution)
}
