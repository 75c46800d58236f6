use std::sync::Arc;

use axum::{
    Form, Router,
    extract::{State, rejection::FormRejection},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::post,
};
use serde::Deserialize;

use crate::{AggregatorError, WeatherAggregator, models::ErrorBody};

/// Shared handler state; immutable after startup.
#[derive(Clone)]
pub struct AppState {
    pub aggregator: Arc<WeatherAggregator>,
}

impl AppState {
    pub fn new(aggregator: WeatherAggregator) -> Self {
        Self {
            aggregator: Arc::new(aggregator),
        }
    }
}

/// Form body of `POST /weather`.
#[derive(Debug, Deserialize)]
pub struct WeatherForm {
    pub city: Option<String>,
}

pub fn router() -> Router<AppState> {
    Router::new().route("/weather", post(get_weather))
}

async fn get_weather(
    State(state): State<AppState>,
    form: Result<Form<WeatherForm>, FormRejection>,
) -> Result<Response, AggregatorError> {
    // Wrong content type or an unparsable body still gets a JSON error
    let Form(form) =
        form.map_err(|rejection| AggregatorError::validation(rejection.body_text()))?;

    // Passed on verbatim; only its absence is rejected
    let city = form
        .city
        .ok_or_else(|| AggregatorError::validation("form field 'city' is required"))?;

    let response = match state.aggregator.aggregate(&city).await?.into_aggregate() {
        Some(aggregate) => Json(aggregate).into_response(),
        None => (StatusCode::NOT_FOUND, Json(ErrorBody::city_not_found())).into_response(),
    };
    Ok(response)
}

impl AggregatorError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AggregatorError::Validation { .. } => StatusCode::BAD_REQUEST,
            AggregatorError::Upstream { .. } => StatusCode::BAD_GATEWAY,
            AggregatorError::Config { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AggregatorError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!("Weather request failed: {}", self);
        } else {
            tracing::warn!("Rejected weather request: {}", self);
        }
        (status, Json(ErrorBody::new(self.user_message()))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        models::{ProviderResponse, RawDocument},
        provider::{ProviderId, WeatherProvider},
    };
    use async_trait::async_trait;
    use axum::{
        body::{Body, to_bytes},
        http::{Request, header},
    };
    use serde_json::{Value, json};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tower::ServiceExt; // for `oneshot`

    #[derive(Debug)]
    struct CountingProvider {
        id: ProviderId,
        current: ProviderResponse,
        calls: AtomicUsize,
    }

    impl CountingProvider {
        fn new(id: ProviderId, current: ProviderResponse) -> Arc<Self> {
            Arc::new(Self {
                id,
                current,
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl WeatherProvider for CountingProvider {
        fn id(&self) -> ProviderId {
            self.id
        }

        async fn current(&self, _city: &str) -> crate::Result<ProviderResponse> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.current.clone())
        }

        async fn forecast(&self, _city: &str) -> crate::Result<ProviderResponse> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(ProviderResponse::Failed(StatusCode::NOT_FOUND))
        }
    }

    fn document(id: ProviderId, doc: Value) -> ProviderResponse {
        ProviderResponse::Success(RawDocument::new(id, serde_json::to_vec(&doc).unwrap()))
    }

    fn app(primary: Arc<CountingProvider>, fallback: Arc<CountingProvider>) -> Router {
        router().with_state(AppState::new(WeatherAggregator::new(primary, fallback)))
    }

    fn form_request(body: &'static str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/weather")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body))
            .unwrap()
    }

    async fn json_body(response: Response) -> Value {
        let body = to_bytes(response.into_body(), 1024 * 1024).await.unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn test_missing_city_is_rejected_before_any_call() {
        let primary = CountingProvider::new(
            ProviderId::OpenWeather,
            document(ProviderId::OpenWeather, json!({})),
        );
        let fallback = CountingProvider::new(
            ProviderId::WeatherApi,
            document(ProviderId::WeatherApi, json!({})),
        );

        let response = app(primary.clone(), fallback.clone())
            .oneshot(form_request("town=London"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert_eq!(body["error"], "Invalid input: form field 'city' is required");
        assert_eq!(primary.calls.load(Ordering::SeqCst), 0);
        assert_eq!(fallback.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_non_form_body_gets_a_json_400() {
        let primary = CountingProvider::new(
            ProviderId::OpenWeather,
            document(ProviderId::OpenWeather, json!({})),
        );
        let fallback = CountingProvider::new(
            ProviderId::WeatherApi,
            document(ProviderId::WeatherApi, json!({})),
        );

        let request = Request::builder()
            .method("POST")
            .uri("/weather")
            .header(header::CONTENT_TYPE, "text/plain")
            .body(Body::from("city=London"))
            .unwrap();
        let response = app(primary.clone(), fallback.clone())
            .oneshot(request)
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let content_type = response.headers()[header::CONTENT_TYPE].to_str().unwrap();
        assert_eq!(content_type, "application/json");
        let body = json_body(response).await;
        assert!(body["error"].as_str().unwrap().starts_with("Invalid input: "));
        assert_eq!(primary.calls.load(Ordering::SeqCst), 0);
        assert_eq!(fallback.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_total_failure_is_404() {
        let primary = CountingProvider::new(
            ProviderId::OpenWeather,
            ProviderResponse::Failed(StatusCode::NOT_FOUND),
        );
        let fallback = CountingProvider::new(
            ProviderId::WeatherApi,
            ProviderResponse::Failed(StatusCode::BAD_REQUEST),
        );

        let response = app(primary, fallback)
            .oneshot(form_request("city=Atlantis"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(json_body(response).await, json!({"error": "City not found"}));
    }

    #[tokio::test]
    async fn test_fallback_answer_is_200() {
        let primary = CountingProvider::new(
            ProviderId::OpenWeather,
            ProviderResponse::Failed(StatusCode::UNAUTHORIZED),
        );
        let fallback = CountingProvider::new(
            ProviderId::WeatherApi,
            document(ProviderId::WeatherApi, json!({"current": {"temp_c": 21.0}})),
        );

        let response = app(primary, fallback)
            .oneshot(form_request("city=Pune"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            json_body(response).await,
            json!({
                "current": null,
                "forecast": null,
                "weatherapi_current": {"current": {"temp_c": 21.0}},
                "weatherapi_forecast": null
            })
        );
    }

    #[test]
    fn test_error_status_mapping() {
        assert_eq!(
            AggregatorError::validation("x").status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AggregatorError::upstream("openweather", "x").status_code(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            AggregatorError::config("x").status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
