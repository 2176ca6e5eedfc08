//! OpenAI-compatible chat-completions invoker.
//!
//! Posts the conversation to `<base_url>/chat/completions` and maps HTTP and
//! transport failures onto [`GatewayError`] kinds so the retry decorator can
//! tell transient failures from permanent ones.

use crate::config::ModelSettings;
use async_trait::async_trait;
use reqwest::StatusCode;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};
use tracing::debug;
use triad_application::{GatewayError, ModelInvoker};
use triad_domain::Message;
use triad_domain::core::string::truncate;

/// Upstream error bodies are cut to this length in error messages
const MAX_ERROR_BODY: usize = 500;

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [Message],
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessageResponse,
}

#[derive(Debug, Deserialize)]
struct ChatMessageResponse {
    content: Option<String>,
}

/// Model invoker for any OpenAI-compatible endpoint
pub struct ChatCompletionsInvoker {
    client: reqwest::Client,
    endpoint: String,
    model: String,
    headers: HeaderMap,
}

impl ChatCompletionsInvoker {
    pub fn new(settings: &ModelSettings) -> Result<Self, GatewayError> {
        let client = reqwest::Client::builder()
            .timeout(settings.timeout)
            .build()
            .map_err(|e| GatewayError::Other(e.to_string()))?;

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let bearer = HeaderValue::from_str(&format!("Bearer {}", settings.api_key))
            .map_err(|e| GatewayError::InvalidRequest(format!("Invalid API key: {e}")))?;
        headers.insert(AUTHORIZATION, bearer);

        Ok(Self {
            client,
            endpoint: format!("{}/chat/completions", settings.base_url.trim_end_matches('/')),
            model: settings.id.clone(),
            headers,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl ModelInvoker for ChatCompletionsInvoker {
    async fn invoke(
        &self,
        messages: &[Message],
        max_tokens: Option<u32>,
    ) -> Result<String, GatewayError> {
        let body = ChatRequest {
            model: &self.model,
            messages,
            max_tokens,
        };

        debug!("Invoking {} with {} messages", self.model, messages.len());
        let response = self
            .client
            .post(&self.endpoint)
            .headers(self.headers.clone())
            .json(&body)
            .send()
            .await
            .map_err(classify_transport)?;

        let status = response.status();
        let text = response.text().await.map_err(classify_transport)?;
        if !status.is_success() {
            return Err(classify_status(status, &text));
        }

        let parsed: ChatResponse = serde_json::from_str(&text)
            .map_err(|e| GatewayError::Other(format!("Unexpected response body: {e}")))?;
        let choice = parsed
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| GatewayError::Other("Missing choices".to_string()))?;

        Ok(choice.message.content.unwrap_or_default())
    }
}

fn classify_transport(e: reqwest::Error) -> GatewayError {
    if e.is_timeout() {
        GatewayError::Timeout
    } else if e.is_connect() || e.is_request() || e.is_body() {
        GatewayError::Connection(e.to_string())
    } else {
        GatewayError::Other(e.to_string())
    }
}

fn classify_status(status: StatusCode, body: &str) -> GatewayError {
    let message = truncate(body.trim(), MAX_ERROR_BODY);
    match status {
        StatusCode::TOO_MANY_REQUESTS => GatewayError::RateLimited(message),
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => GatewayError::Timeout,
        s if s.is_server_error() => GatewayError::Upstream {
            status: s.as_u16(),
            message,
        },
        s => GatewayError::InvalidRequest(format!("HTTP {}: {}", s.as_u16(), message)),
    }
}
