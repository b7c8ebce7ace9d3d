pub mod providers;
pub mod summarizer;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

use crate::error::Result;

pub use summarizer::{GeneratedSummary, Summarizer};

/// LLM provider types
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, clap::ValueEnum)]
pub enum LLMProvider {
    #[default]
    #[value(name = "openai")]
    OpenAI,
    /// Any local OpenAI-compatible server (LM Studio, llama.cpp, ...)
    #[value(name = "lmstudio")]
    LMStudio,
}

impl LLMProvider {
    pub fn name(&self) -> &'static str {
        match self {
            LLMProvider::OpenAI => "OpenAI",
            LLMProvider::LMStudio => "LMStudio",
        }
    }

    pub fn default_endpoint(&self) -> &'static str {
        match self {
            LLMProvider::OpenAI => "https://api.openai.com/v1/chat/completions",
            LLMProvider::LMStudio => "http://localhost:1234/v1/chat/completions",
        }
    }

    pub fn requires_api_key(&self) -> bool {
        matches!(self, LLMProvider::OpenAI)
    }
}

/// Chat model selector
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ChatModel {
    #[default]
    Gpt4oMini,
    Gpt4o,
    Gpt35Turbo,
    /// Any other model name understood by the endpoint
    Custom(String),
}

impl ChatModel {
    pub const KNOWN: [ChatModel; 3] = [ChatModel::Gpt4oMini, ChatModel::Gpt4o, ChatModel::Gpt35Turbo];

    pub fn as_str(&self) -> &str {
        match self {
            ChatModel::Gpt4oMini => "gpt-4o-mini",
            ChatModel::Gpt4o => "gpt-4o",
            ChatModel::Gpt35Turbo => "gpt-3.5-turbo",
            ChatModel::Custom(name) => name,
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            ChatModel::Gpt4oMini => "Recommended - Fast & Cheap",
            ChatModel::Gpt4o => "More Capable - Higher Cost",
            ChatModel::Gpt35Turbo => "Older - Cheaper",
            ChatModel::Custom(_) => "Custom model",
        }
    }
}

impl From<&str> for ChatModel {
    fn from(name: &str) -> Self {
        match name.trim() {
            "gpt-4o-mini" => ChatModel::Gpt4oMini,
            "gpt-4o" => ChatModel::Gpt4o,
            "gpt-3.5-turbo" => ChatModel::Gpt35Turbo,
            other => ChatModel::Custom(other.to_string()),
        }
    }
}

impl From<String> for ChatModel {
    fn from(name: String) -> Self {
        ChatModel::from(name.as_str())
    }
}

impl From<ChatModel> for String {
    fn from(model: ChatModel) -> Self {
        model.as_str().to_string()
    }
}

impl fmt::Display for ChatModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// LLM configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LLMConfig {
    /// LLM provider to use
    pub provider: LLMProvider,

    /// Chat-completions endpoint; provider default when unset
    pub endpoint: Option<String>,

    /// Model used for summaries
    pub model: ChatModel,

    /// Maximum tokens to generate
    pub max_tokens: u32,

    /// Temperature for generation
    pub temperature: f32,

    /// Request timeout in seconds (0 = no timeout)
    pub timeout_seconds: u64,
}

impl Default for LLMConfig {
    fn default() -> Self {
        Self {
            provider: LLMProvider::OpenAI,
            endpoint: None,
            model: ChatModel::Gpt4oMini,
            max_tokens: 2000,
            temperature: 0.3, // Low temperature for structured output
            timeout_seconds: 0,
        }
    }
}

impl LLMConfig {
    pub fn endpoint(&self) -> &str {
        self.endpoint
            .as_deref()
            .unwrap_or_else(|| self.provider.default_endpoint())
    }
}

/// Chat message for LLM communication
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// One chat-completion request
#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

/// LLM response
#[derive(Debug, Clone)]
pub struct LLMResponse {
    pub content: String,
    pub tokens_used: Option<u32>,
}

/// Trait for LLM providers
#[async_trait]
pub trait LLM: Send + Sync {
    async fn chat(&self, request: ChatRequest) -> Result<LLMResponse>;
    fn provider_type(&self) -> LLMProvider;
}

/// Create LLM instance based on configuration
pub fn create_llm(config: &LLMConfig, api_key: Option<String>) -> Result<Arc<dyn LLM>> {
    Ok(Arc::new(providers::OpenAICompatibleProvider::new(
        config, api_key,
    )?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_llm_config() {
        let config = LLMConfig::default();
        assert_eq!(config.provider, LLMProvider::OpenAI);
        assert_eq!(config.model, ChatModel::Gpt4oMini);
        assert_eq!(config.max_tokens, 2000);
        assert_eq!(config.temperature, 0.3);
        assert_eq!(config.endpoint(), "https://api.openai.com/v1/chat/completions");
    }

    #[test]
    fn test_chat_model_names() {
        assert_eq!(ChatModel::from("gpt-4o"), ChatModel::Gpt4o);
        assert_eq!(ChatModel::from("gpt-3.5-turbo").as_str(), "gpt-3.5-turbo");
        assert_eq!(
            ChatModel::from("llama-3.1-8b"),
            ChatModel::Custom("llama-3.1-8b".to_string())
        );
        for model in ChatModel::KNOWN {
            assert_eq!(ChatModel::from(model.as_str()), model);
        }
    }

    #[test]
    fn test_chat_request_serialization() {
        let request = ChatRequest {
            model: "gpt-4o-mini".to_string(),
            messages: vec![ChatMessage::system("sys"), ChatMessage::user("hi")],
            max_tokens: 5,
            temperature: None,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["max_tokens"], 5);
        assert!(json.get("temperature").is_none());
    }
}
