use async_trait::async_trait;
use reqwest::Client;
use tracing::instrument;

use crate::{AggregatorError, Result, config::ProviderConfig, models::ProviderResponse};

use super::{ProviderId, WeatherProvider, endpoint, fetch_document};

/// Temperatures in Celsius, wind in m/s.
const UNITS: &str = "metric";

/// OpenWeatherMap client, the primary provider.
#[derive(Debug, Clone)]
pub struct OpenWeatherProvider {
    api_key: String,
    base_url: String,
    http: Client,
}

impl OpenWeatherProvider {
    pub fn new(api_key: String, base_url: String, http: Client) -> Self {
        Self {
            api_key,
            base_url,
            http,
        }
    }

    pub fn from_config(config: &ProviderConfig, http: Client) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .ok_or_else(|| AggregatorError::config("No API key configured for openweather"))?;

        Ok(Self::new(api_key, config.base_url.clone(), http))
    }

    /// Both endpoints take the same parameters.
    async fn fetch(&self, path: &str, city: &str) -> Result<ProviderResponse> {
        let url = endpoint(&self.base_url, path);
        fetch_document(
            &self.http,
            self.id(),
            &url,
            &[("q", city), ("appid", self.api_key.as_str()), ("units", UNITS)],
        )
        .await
    }
}

#[async_trait]
impl WeatherProvider for OpenWeatherProvider {
    fn id(&self) -> ProviderId {
        ProviderId::OpenWeather
    }

    #[instrument(name = "openweather_current", skip(self))]
    async fn current(&self, city: &str) -> Result<ProviderResponse> {
        self.fetch("weather", city).await
    }

    /// 5 days in 3-hour steps.
    #[instrument(name = "openweather_forecast", skip(self))]
    async fn forecast(&self, city: &str) -> Result<ProviderResponse> {
        self.fetch("forecast", city).await
    }
}
