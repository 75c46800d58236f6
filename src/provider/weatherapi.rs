use async_trait::async_trait;
use reqwest::Client;
use tracing::instrument;

use crate::{AggregatorError, Result, config::ProviderConfig, models::ProviderResponse};

use super::{ProviderId, WeatherProvider, endpoint, fetch_document};

const FORECAST_DAYS: &str = "7";

/// WeatherAPI.com client, the fallback provider.
///
/// Air quality and alerts are always switched off.
#[derive(Debug, Clone)]
pub struct WeatherApiProvider {
    api_key: String,
    base_url: String,
    http: Client,
}

impl WeatherApiProvider {
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
            .ok_or_else(|| AggregatorError::config("No API key configured for weatherapi"))?;

        Ok(Self::new(api_key, config.base_url.clone(), http))
    }
}

#[async_trait]
impl WeatherProvider for WeatherApiProvider {
    fn id(&self) -> ProviderId {
        ProviderId::WeatherApi
    }

    #[instrument(name = "weatherapi_current", skip(self))]
    async fn current(&self, city: &str) -> Result<ProviderResponse> {
        let url = endpoint(&self.base_url, "current.json");
        fetch_document(
            &self.http,
            self.id(),
            &url,
            &[("key", self.api_key.as_str()), ("q", city), ("aqi", "no")],
        )
        .await
    }

    #[instrument(name = "weatherapi_forecast", skip(self))]
    async fn forecast(&self, city: &str) -> Result<ProviderResponse> {
        let url = endpoint(&self.base_url, "forecast.json");
        fetch_document(
            &self.http,
            self.id(),
            &url,
            &[
                ("key", self.api_key.as_str()),
                ("q", city),
                ("days", FORECAST_DAYS),
                ("aqi", "no"),
                ("alerts", "no"),
            ],
        )
        .await
    }
}
