//! Gemini HTTP client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use tracing::{debug, error, warn};

use conciliar_core::classification::{AiError, AiRequest, AiSuggestion, AiSuggestionService};
use conciliar_shared::AppError;
use conciliar_shared::config::AiConfig;

use crate::prompt::build_prompt;
use crate::response::{GenerateRequest, GenerateResponse, parse_suggestion};
use crate::retry::RetryPolicy;

/// AI suggestion service backed by the Gemini API.
#[derive(Debug, Clone)]
pub struct GeminiClient {
    http: reqwest::Client,
    base_url: String,
    model: String,
    api_key: String,
    retry: RetryPolicy,
}

impl GeminiClient {
    /// Creates a client from configuration.
    ///
    /// # Errors
    ///
    /// `Config` if no API key is set or the HTTP client cannot be built.
    pub fn from_config(config: &AiConfig) -> Result<Self, AppError> {
        let api_key = config
            .api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| AppError::Config("ai.api_key is required when AI is enabled".into()))?;
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AppError::Config(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key,
            retry: RetryPolicy::new(
                config.max_retries,
                Duration::from_millis(config.backoff_ms),
            ),
        })
    }

    /// Replaces the retry policy.
    #[must_use]
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// The model name.
    pub fn model(&self) -> &str {
        &self.model
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }

    async fn generate(&self, body: &GenerateRequest) -> Result<String, AiError> {
        let response = self
            .http
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(body)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(status_error(status, &text));
        }

        let parsed: GenerateResponse = response
            .json()
            .await
            .map_err(|e| AiError::Transient(format!("Unreadable AI response: {e}")))?;
        parsed
            .text()
            .map(str::to_string)
            .ok_or_else(|| AiError::Transient("AI response has no candidates".into()))
    }
}

#[async_trait]
impl AiSuggestionService for GeminiClient {
    async fn suggest(&self, request: &AiRequest) -> Result<AiSuggestion, AiError> {
        let body = GenerateRequest::from_prompt(build_prompt(request));
        debug!(model = %self.model, accounts = request.accounts.len(), "Requesting AI suggestion");

        let body = &body;
        let result = self
            .retry
            .run(move || async move {
                let text = self.generate(body).await?;
                parse_suggestion(&text, &self.model)
            })
            .await;

        match &result {
            Ok(suggestion) => debug!(
                model = %self.model,
                candidates = suggestion.candidates.len(),
                "AI suggestion received"
            ),
            Err(err @ AiError::Transient(_)) => {
                error!(model = %self.model, error = %err, "AI service failed");
            }
            Err(err) => warn!(model = %self.model, error = %err, "AI service refused the request"),
        }
        result
    }
}

/// Maps a non-success HTTP status to a typed failure.
///
/// - 429 is throttling
/// - 402, and 403 mentioning quota or billing, mean no quota is left
/// - everything else, 5xx included, is transient
#[must_use]
pub fn status_error(status: StatusCode, body: &str) -> AiError {
    let lowered = body.to_lowercase();
    let message = format!("HTTP {}: {}", status.as_u16(), body.chars().take(200).collect::<String>());
    match status {
        StatusCode::TOO_MANY_REQUESTS => AiError::RateLimited(message),
        StatusCode::PAYMENT_REQUIRED => AiError::QuotaExceeded(message),
        StatusCode::FORBIDDEN if lowered.contains("quota") || lowered.contains("billing") => {
            AiError::QuotaExceeded(message)
        }
        _ => AiError::Transient(message),
    }
}

fn transport_error(err: reqwest::Error) -> AiError {
    if err.is_timeout() {
        AiError::Transient(format!("AI request timed out: {err}"))
    } else {
        AiError::Transient(format!("AI request failed: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(429, "", "AI_RATE_LIMITED")]
    #[case(402, "", "AI_QUOTA_EXCEEDED")]
    #[case(403, "Quota exceeded for quota metric", "AI_QUOTA_EXCEEDED")]
    #[case(403, "Billing account disabled", "AI_QUOTA_EXCEEDED")]
    #[case(403, "permission denied", "AI_TRANSIENT")]
    #[case(500, "internal", "AI_TRANSIENT")]
    #[case(503, "overloaded", "AI_TRANSIENT")]
    fn test_status_mapping(#[case] status: u16, #[case] body: &str, #[case] code: &str) {
        let status = StatusCode::from_u16(status).unwrap();
        assert_eq!(status_error(status, body).error_code(), code);
    }

    #[test]
    fn test_quota_is_not_retryable() {
        assert!(!status_error(StatusCode::PAYMENT_REQUIRED, "").is_retryable());
        assert!(status_error(StatusCode::TOO_MANY_REQUESTS, "").is_retryable());
    }

    #[test]
    fn test_from_config_requires_key() {
        let config = AiConfig {
            enabled: true,
            ..AiConfig::default()
        };
        assert!(matches!(
            GeminiClient::from_config(&config),
            Err(AppError::Config(_))
        ));
    }

    #[test]
    fn test_endpoint() {
        let config = AiConfig {
            enabled: true,
            api_key: Some("key".into()),
            base_url: "https://example.test/v1beta/".into(),
            ..AiConfig::default()
        };
        let client = GeminiClient::from_config(&config).unwrap();
        assert_eq!(
            client.endpoint(),
            "https://example.test/v1beta/models/gemini-2.0-flash:generateContent"
        );
    }
}
