//! Gemini REST client.

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tokio_retry2::strategy::{ExponentialBackoff, jitter};
use tokio_retry2::{Retry, RetryError};
use touchline_core::GenerateRequest;
use touchline_error::{GenerationError, GenerationErrorKind};
use touchline_interface::{GenerationResult, TextGenerator};
use tracing::{debug, error, instrument, warn};

use crate::{GeminiRequest, GeminiResponse, ModelsConfig};

/// Text generator backed by the Gemini `generateContent` endpoint.
#[derive(Clone)]
pub struct GeminiGenerator {
    client: Client,
    api_key: String,
    config: ModelsConfig,
}

impl std::fmt::Debug for GeminiGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiGenerator")
            .field("model", &self.config.model)
            .field("endpoint", &self.config.endpoint)
            .finish_non_exhaustive()
    }
}

impl GeminiGenerator {
    /// Client for `config.model` authenticated with `api_key`.
    ///
    /// # Errors
    ///
    /// Fails if the HTTP client cannot be built.
    pub fn new(api_key: impl Into<String>, config: ModelsConfig) -> GenerationResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| GenerationError::new(GenerationErrorKind::Request(e.to_string())))?;
        debug!(model = %config.model, "Created Gemini generator");
        Ok(Self {
            client,
            api_key: api_key.into(),
            config,
        })
    }

    fn url(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.config.endpoint.trim_end_matches('/'),
            self.config.model
        )
    }

    /// One HTTP round trip.
    async fn send_once(&self, body: &GeminiRequest) -> GenerationResult<String> {
        let response = self
            .client
            .post(self.url())
            .header("x-goog-api-key", &self.api_key)
            .json(body)
            .send()
            .await
            .map_err(|e| {
                error!(error = ?e, "Failed to send request to Gemini");
                GenerationError::new(GenerationErrorKind::Request(e.to_string()))
            })?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(GenerationError::new(GenerationErrorKind::Status {
                status_code: status.as_u16(),
                message,
            }));
        }

        let parsed: GeminiResponse = response.json().await.map_err(|e| {
            GenerationError::new(GenerationErrorKind::Response(format!(
                "Failed to parse response: {e}"
            )))
        })?;

        if let Some(reason) = parsed.block_reason() {
            warn!(reason = %reason, "Gemini blocked the output");
            return Err(GenerationError::new(GenerationErrorKind::Empty));
        }
        parsed
            .text()
            .ok_or_else(|| GenerationError::new(GenerationErrorKind::Empty))
    }
}

#[async_trait]
impl TextGenerator for GeminiGenerator {
    #[instrument(
        skip(self, request),
        fields(provider = "gemini", model = %self.config.model, temperature = *request.temperature())
    )]
    async fn generate(&self, request: &GenerateRequest) -> GenerationResult<String> {
        let body = GeminiRequest::from(request);

        let strategy = ExponentialBackoff::from_millis(self.config.retry_backoff_ms)
            .factor(2)
            .max_delay(Duration::from_secs(10))
            .map(jitter)
            .take(self.config.max_retries);

        let body = &body;
        let text = Retry::spawn(strategy, move || async move {
            match self.send_once(body).await {
                Ok(text) => Ok(text),
                Err(e) if e.kind.is_retryable() => {
                    warn!(error = %e, "Transient Gemini failure, will retry");
                    Err(RetryError::Transient {
                        err: e,
                        retry_after: None,
                    })
                }
                Err(e) => Err(RetryError::Permanent(e)),
            }
        })
        .await?;

        debug!(chars = text.chars().count(), "Received candidate");
        Ok(text)
    }

    fn provider_name(&self) -> &'static str {
        "gemini"
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_joins_endpoint_and_model() {
        let generator = GeminiGenerator::new(
            "key",
            ModelsConfig {
                endpoint: "https://example.test/v1beta/".into(),
                model: "gemini-1.5-flash".into(),
                ..ModelsConfig::default()
            },
        )
        .unwrap();
        assert_eq!(
            generator.url(),
            "https://example.test/v1beta/models/gemini-1.5-flash:generateContent"
        );
        assert_eq!(generator.model_name(), "gemini-1.5-flash");
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_a_request_error() {
        let generator = GeminiGenerator::new(
            "key",
            ModelsConfig {
                endpoint: "http://127.0.0.1:9".into(),
                max_retries: 0,
                timeout_secs: 2,
                ..ModelsConfig::default()
            },
        )
        .unwrap();
        let request = GenerateRequest::new("voice", "Post: Derby", 0.9, 100);

        let err = generator.generate(&request).await.unwrap_err();
        assert!(matches!(err.kind, GenerationErrorKind::Request(_)));
    }
}
