use super::{ChatMessage, ChatRequest, LLMConfig, LLMProvider, LLMResponse, LLM};
use crate::error::{Result, SummarizerError};
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

/// Chat-completions provider for OpenAI and OpenAI-compatible local servers
pub struct OpenAICompatibleProvider {
    provider: LLMProvider,
    endpoint: String,
    api_key: Option<String>,
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<CompletionChoice>,
    usage: Option<CompletionUsage>,
}

#[derive(Debug, Deserialize)]
struct CompletionChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct CompletionUsage {
    total_tokens: u32,
}

impl OpenAICompatibleProvider {
    pub fn new(config: &LLMConfig, api_key: Option<String>) -> Result<Self> {
        let api_key = api_key.filter(|key| !key.trim().is_empty());
        if config.provider.requires_api_key() && api_key.is_none() {
            return Err(SummarizerError::MissingCredential {
                provider: config.provider.name().to_string(),
            });
        }

        let mut builder = reqwest::Client::builder();
        if config.timeout_seconds > 0 {
            builder = builder.timeout(Duration::from_secs(config.timeout_seconds));
        }
        let client = builder
            .build()
            .map_err(|e| SummarizerError::SummarizationFailed(e.to_string()))?;

        Ok(Self {
            provider: config.provider,
            endpoint: config.endpoint().to_string(),
            api_key,
            client,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl LLM for OpenAICompatibleProvider {
    async fn chat(&self, request: ChatRequest) -> Result<LLMResponse> {
        debug!(
            "Sending {} request to {} (model {})",
            self.provider.name(),
            self.endpoint,
            request.model
        );

        let mut http = self.client.post(&self.endpoint).json(&request);
        if let Some(api_key) = &self.api_key {
            http = http.header("Authorization", format!("Bearer {}", api_key));
        }

        let response = http
            .send()
            .await
            .map_err(|e| SummarizerError::SummarizationFailed(e.to_string()))?;

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        parse_completion(self.provider, status, &body)
    }

    fn provider_type(&self) -> LLMProvider {
        self.provider
    }
}

/// Turn an HTTP status and body into a response or a summarization failure
fn parse_completion(provider: LLMProvider, status: StatusCode, body: &str) -> Result<LLMResponse> {
    if !status.is_success() {
        let reason = match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                format!("Invalid API key ({} returned {})", provider.name(), status)
            }
            StatusCode::TOO_MANY_REQUESTS => {
                format!("Rate limit or quota exceeded ({} returned {})", provider.name(), status)
            }
            _ => format!("{} API error {}: {}", provider.name(), status, body.trim()),
        };
        return Err(SummarizerError::SummarizationFailed(reason));
    }

    let parsed: CompletionResponse = serde_json::from_str(body).map_err(|e| {
        SummarizerError::SummarizationFailed(format!("Malformed response from {}: {}", provider.name(), e))
    })?;

    let content = parsed
        .choices
        .into_iter()
        .next()
        .map(|choice| choice.message.content)
        .ok_or_else(|| {
            SummarizerError::SummarizationFailed(format!("Empty response from {}", provider.name()))
        })?;

    Ok(LLMResponse {
        content,
        tokens_used: parsed.usage.map(|u| u.total_tokens),
    })
}
