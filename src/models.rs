//! Data types that flow between the providers, the aggregator and the HTTP layer.

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{AggregatorError, Result, provider::ProviderId};

/// Body of a 200 reply, kept as bytes until its slot is known to be used.
#[derive(Debug, Clone, PartialEq)]
pub struct RawDocument {
    provider: ProviderId,
    body: Vec<u8>,
}

impl RawDocument {
    pub fn new(provider: ProviderId, body: impl Into<Vec<u8>>) -> Self {
        Self {
            provider,
            body: body.into(),
        }
    }

    /// Parse the body as JSON without looking at its schema.
    pub fn decode(&self) -> Result<Value> {
        serde_json::from_slice(&self.body).map_err(|e| {
            AggregatorError::upstream(self.provider.as_str(), format!("invalid JSON body: {e}"))
        })
    }
}

/// Outcome of a single outbound provider call.
///
/// Only the status code decides success; the body of a failed call is
/// dropped without being read.
#[derive(Debug, Clone, PartialEq)]
pub enum ProviderResponse {
    /// HTTP 200, body not yet decoded
    Success(RawDocument),
    /// Any other status
    Failed(StatusCode),
}

impl ProviderResponse {
    pub fn is_success(&self) -> bool {
        matches!(self, ProviderResponse::Success(_))
    }

    /// The document for an aggregate slot, or `None` if the call failed.
    pub fn into_document(self) -> Result<Option<Value>> {
        match self {
            ProviderResponse::Success(raw) => raw.decode().map(Some),
            ProviderResponse::Failed(_) => Ok(None),
        }
    }
}

/// The merged payload returned to the browser.
///
/// Every slot is always serialized; a missing document is written as `null`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WeatherAggregate {
    /// OpenWeatherMap current weather
    pub current: Option<Value>,
    /// OpenWeatherMap 5-day forecast
    pub forecast: Option<Value>,
    pub weatherapi_current: Option<Value>,
    pub weatherapi_forecast: Option<Value>,
}

/// Which provider ended up answering a request.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    /// The primary provider's current weather succeeded
    FullSuccess(WeatherAggregate),
    /// Only the fallback provider's current weather succeeded
    PartialFallback(WeatherAggregate),
    /// Neither current-weather call succeeded
    TotalFailure,
}

impl Resolution {
    /// Short label for logs
    pub fn label(&self) -> &'static str {
        match self {
            Resolution::FullSuccess(_) => "full_success",
            Resolution::PartialFallback(_) => "partial_fallback",
            Resolution::TotalFailure => "total_failure",
        }
    }

    pub fn into_aggregate(self) -> Option<WeatherAggregate> {
        match self {
            Resolution::FullSuccess(aggregate) | Resolution::PartialFallback(aggregate) => {
                Some(aggregate)
            }
            Resolution::TotalFailure => None,
        }
    }
}

/// Body sent when neither provider knows the city.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

impl ErrorBody {
    pub fn new<S: Into<String>>(error: S) -> Self {
        Self {
            error: error.into(),
        }
    }

    pub fn city_not_found() -> Self {
        Self::new("City not found")
    }
}
