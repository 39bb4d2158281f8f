//! HTTP client for the messages API

use std::time::Duration;

use reqwest::{Client, Response, StatusCode};

use super::error::DraftError;
use super::models::{CreateMessageRequest, MessageResponse};

/// Text-completion client used for drafting
pub struct CompletionClient {
    client: Client,
    api_key: String,
    api_url: String,
}

impl CompletionClient {
    /// Default endpoint
    pub const API_URL: &'static str = "https://api.anthropic.com/v1/messages";
    /// API version header value
    const API_VERSION: &'static str = "2023-06-01";
    /// Drafting a whole course can take a while
    const TIMEOUT: Duration = Duration::from_secs(300);

    /// Create a client for the default endpoint
    pub fn new(api_key: String) -> Result<Self, DraftError> {
        Self::with_url(api_key, Self::API_URL)
    }

    /// Create a client for a custom endpoint
    pub fn with_url(api_key: String, api_url: impl Into<String>) -> Result<Self, DraftError> {
        let client = Client::builder().timeout(Self::TIMEOUT).build()?;
        Ok(Self { client, api_key, api_url: api_url.into() })
    }

    /// Send a request and wait for the full reply
    pub async fn send_message(
        &self,
        request: &CreateMessageRequest,
    ) -> Result<MessageResponse, DraftError> {
        tracing::debug!(model = %request.model, max_tokens = request.max_tokens, "sending completion request");

        let response = self
            .client
            .post(&self.api_url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", Self::API_VERSION)
            .header("content-type", "application/json")
            .json(request)
            .send()
            .await?;

        let response = check_status(response).await?;
        let body = response.text().await?;
        let message: MessageResponse = serde_json::from_str(&body)?;

        tracing::info!(
            id = %message.id,
            input_tokens = message.usage.input_tokens,
            output_tokens = message.usage.output_tokens,
            stop_reason = message.stop_reason.as_deref().unwrap_or("none"),
            "completion received"
        );
        Ok(message)
    }
}

async fn check_status(response: Response) -> Result<Response, DraftError> {
    let status = response.status();

    if status == StatusCode::TOO_MANY_REQUESTS {
        let retry_after = response
            .headers()
            .get("retry-after")
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.parse().ok())
            .unwrap_or(60);
        return Err(DraftError::RateLimited { retry_after_seconds: retry_after });
    }

    if status == StatusCode::UNAUTHORIZED {
        return Err(DraftError::ApiError { status: 401, message: "Invalid API key".to_string() });
    }

    if !status.is_success() {
        let message = response.text().await.unwrap_or_default();
        return Err(DraftError::ApiError { status: status.as_u16(), message });
    }

    Ok(response)
}
