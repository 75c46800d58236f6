//! Weather provider clients
//!
//! Each provider exposes a current-weather call and a forecast call. Neither
//! parses the provider's schema: a 200 response is returned as an undecoded
//! [`RawDocument`] and any other status as [`ProviderResponse::Failed`].

use std::fmt::{self, Debug};
use std::time::{Duration, Instant};

use anyhow::Context;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use tracing::{debug, instrument, warn};

use crate::config::HttpConfig;
use crate::models::{ProviderResponse, RawDocument};
use crate::{AggregatorError, Result};

pub mod openweather;
pub mod weatherapi;

pub use openweather::OpenWeatherProvider;
pub use weatherapi::WeatherApiProvider;

const SLOW_CALL: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderId {
    OpenWeather,
    WeatherApi,
}

impl ProviderId {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderId::OpenWeather => "openweather",
            ProviderId::WeatherApi => "weatherapi",
        }
    }
}

impl fmt::Display for ProviderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    fn id(&self) -> ProviderId;

    /// Current conditions for `city`.
    async fn current(&self, city: &str) -> Result<ProviderResponse>;

    /// Multi-day forecast for `city`.
    async fn forecast(&self, city: &str) -> Result<ProviderResponse>;
}

/// Build the HTTP client shared by both providers.
pub fn build_http_client(config: &HttpConfig) -> anyhow::Result<Client> {
    Client::builder()
        .timeout(Duration::from_secs(config.timeout_seconds.into()))
        .user_agent(config.user_agent.as_str())
        .build()
        .with_context(|| "Failed to create HTTP client")
}

/// Issue one GET and classify the reply.
///
/// Transport failures are errors; every status other than 200 is a
/// [`ProviderResponse::Failed`]. A 200 body is read but not parsed, so a
/// garbled document only matters if its slot ends up in the aggregate.
#[instrument(name = "provider_call", level = "debug", skip_all, fields(provider = %provider, url = %url))]
pub(crate) async fn fetch_document(
    http: &Client,
    provider: ProviderId,
    url: &str,
    query: &[(&str, &str)],
) -> Result<ProviderResponse> {
    let start_time = Instant::now();

    // without_url keeps the API key in the query string out of messages
    let response = http
        .get(url)
        .query(query)
        .send()
        .await
        .map_err(|e| AggregatorError::upstream(provider.as_str(), e.without_url().to_string()))?;

    let status = response.status();
    if status != StatusCode::OK {
        debug!(
            "{} answered {} in {:.3}s",
            provider,
            status,
            start_time.elapsed().as_secs_f64()
        );
        return Ok(ProviderResponse::Failed(status));
    }

    let body = response.bytes().await.map_err(|e| {
        AggregatorError::upstream(
            provider.as_str(),
            format!("failed to read body: {}", e.without_url()),
        )
    })?;

    let elapsed = start_time.elapsed();
    debug!("{} answered 200 in {:.3}s", provider, elapsed.as_secs_f64());
    if elapsed > SLOW_CALL {
        warn!(
            "Slow response from {}: {:.3}s",
            provider,
            elapsed.as_secs_f64()
        );
    }

    Ok(ProviderResponse::Success(RawDocument::new(provider, body.to_vec())))
}

/// Join a base URL and an endpoint path without doubling the slash.
pub(crate) fn endpoint(base_url: &str, path: &str) -> String {
    format!("{}/{}", base_url.trim_end_matches('/'), path)
}
