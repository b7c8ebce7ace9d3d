use std::sync::Arc;
use tracing::{debug, info};

use super::{ChatMessage, ChatModel, ChatRequest, LLMConfig, LLM};
use crate::error::{Result, SummarizerError};
use crate::summary::{linkify, LinkStyle, PromptBuilder, SummaryStyle, SYSTEM_PROMPT};

const VERIFY_PROMPT: &str = "Hello, respond with just 'OK'";
const VERIFY_MAX_TOKENS: u32 = 5;

/// A linkified summary plus what produced it
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedSummary {
    /// Summary with timestamps followed by deep links
    pub text: String,
    /// Model output as received
    pub raw: String,
    pub model: String,
    pub tokens_used: Option<u32>,
}

/// Issues one completion request per summary
#[derive(Clone)]
pub struct Summarizer {
    llm: Arc<dyn LLM>,
    prompts: PromptBuilder,
    max_tokens: u32,
    temperature: f32,
}

impl Summarizer {
    pub fn new(llm: Arc<dyn LLM>, config: &LLMConfig, prompts: PromptBuilder) -> Self {
        Self {
            llm,
            prompts,
            max_tokens: config.max_tokens,
            temperature: config.temperature,
        }
    }

    pub async fn summarize(
        &self,
        transcript: &str,
        video_url: &str,
        model: &ChatModel,
        style: SummaryStyle,
        link_style: LinkStyle,
    ) -> Result<GeneratedSummary> {
        if transcript.trim().is_empty() {
            return Err(SummarizerError::NoTranscriptLoaded);
        }

        let prompt = self.prompts.build(transcript, style);
        info!(
            "🤖 Generating {} summary with {} via {}",
            style.key(),
            model,
            self.llm.provider_type().name()
        );

        let request = ChatRequest {
            model: model.as_str().to_string(),
            messages: vec![ChatMessage::system(SYSTEM_PROMPT), ChatMessage::user(prompt)],
            max_tokens: self.max_tokens,
            temperature: Some(self.temperature),
        };

        let response = self.llm.chat(request).await.map_err(|e| match e {
            SummarizerError::SummarizationFailed(_) | SummarizerError::MissingCredential { .. } => e,
            other => SummarizerError::SummarizationFailed(other.to_string()),
        })?;

        if let Some(tokens) = response.tokens_used {
            debug!("Summary used {} tokens", tokens);
        }

        let raw = unwrap_code_fence(&response.content);
        let text = linkify(&raw, video_url, link_style);
        info!("✅ Summary generated ({} characters)", text.chars().count());

        Ok(GeneratedSummary {
            text,
            raw,
            model: model.as_str().to_string(),
            tokens_used: response.tokens_used,
        })
    }

    /// Check that the configured credential is accepted by the endpoint
    pub async fn verify_credential(&self) -> Result<()> {
        verify_credential(self.llm.as_ref()).await
    }
}

/// Send a tiny request and report whether it succeeded
pub async fn verify_credential(llm: &dyn LLM) -> Result<()> {
    let request = ChatRequest {
        model: ChatModel::Gpt4oMini.as_str().to_string(),
        messages: vec![ChatMessage::user(VERIFY_PROMPT)],
        max_tokens: VERIFY_MAX_TOKENS,
        temperature: None,
    };

    let response = llm.chat(request).await?;
    debug!(
        "{} credential check answered: {}",
        llm.provider_type().name(),
        response.content.trim()
    );
    Ok(())
}

/// Models sometimes wrap the whole answer in a ```markdown block
fn unwrap_code_fence(content: &str) -> String {
    let content = content.trim();

    if content.starts_with("```") && content.ends_with("```") {
        if let Some(start) = content.find('\n') {
            let end = content.len() - 3;
            if end > start {
                return content[start + 1..end].trim().to_string();
            }
        }
    }

    content.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::{LLMProvider, LLMResponse};
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct RecordingLLM {
        reply: std::result::Result<String, String>,
        requests: Mutex<Vec<ChatRequest>>,
    }

    impl RecordingLLM {
        fn replying(reply: &str) -> Self {
            Self {
                reply: Ok(reply.to_string()),
                requests: Mutex::new(Vec::new()),
            }
        }

        fn failing(reason: &str) -> Self {
            Self {
                reply: Err(reason.to_string()),
                requests: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl LLM for RecordingLLM {
        async fn chat(&self, request: ChatRequest) -> Result<LLMResponse> {
            self.requests.lock().unwrap().push(request);
            match &self.reply {
                Ok(content) => Ok(LLMResponse {
                    content: content.clone(),
                    tokens_used: Some(12),
                }),
                Err(reason) => Err(SummarizerError::SummarizationFailed(reason.clone())),
            }
        }

        fn provider_type(&self) -> LLMProvider {
            LLMProvider::OpenAI
        }
    }

    fn summarizer(llm: Arc<RecordingLLM>) -> Summarizer {
        Summarizer::new(llm, &LLMConfig::default(), PromptBuilder::default())
    }

    #[tokio::test]
    async fn test_summary_request_shape() {
        let llm = Arc::new(RecordingLLM::replying("Intro 0:10"));
        let summary = summarizer(llm.clone())
            .summarize(
                "hello",
                "https://youtu.be/abc",
                &ChatModel::Gpt4o,
                SummaryStyle::Brief,
                LinkStyle::Plain,
            )
            .await
            .unwrap();

        assert_eq!(summary.raw, "Intro 0:10");
        assert!(summary.text.ends_with("&t=10s"));
        assert_eq!(summary.model, "gpt-4o");
        assert_eq!(summary.tokens_used, Some(12));

        let requests = llm.requests.lock().unwrap();
        assert_eq!(requests.len(), 1);
        let request = &requests[0];
        assert_eq!(request.model, "gpt-4o");
        assert_eq!(request.max_tokens, 2000);
        assert_eq!(request.temperature, Some(0.3));
        assert_eq!(request.messages[0], ChatMessage::system(SYSTEM_PROMPT));
        assert_eq!(request.messages[1].role, "user");
        assert!(request.messages[1].content.contains("hello"));
    }

    #[tokio::test]
    async fn test_empty_transcript_is_rejected_before_request() {
        let llm = Arc::new(RecordingLLM::replying("unused"));
        let err = summarizer(llm.clone())
            .summarize("  ", "u", &ChatModel::default(), SummaryStyle::Detailed, LinkStyle::Plain)
            .await
            .unwrap_err();
        assert!(matches!(err, SummarizerError::NoTranscriptLoaded));
        assert!(llm.requests.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_failure_is_reported() {
        let llm = Arc::new(RecordingLLM::failing("connection refused"));
        let err = summarizer(llm)
            .summarize("hello", "u", &ChatModel::default(), SummaryStyle::Detailed, LinkStyle::Plain)
            .await
            .unwrap_err();
        assert!(matches!(err, SummarizerError::SummarizationFailed(_)));
        assert!(err.to_string().contains("connection refused"));
    }

    #[tokio::test]
    async fn test_verify_credential_sends_tiny_request() {
        let llm = Arc::new(RecordingLLM::replying("OK"));
        verify_credential(llm.as_ref()).await.unwrap();

        let requests = llm.requests.lock().unwrap();
        assert_eq!(requests[0].model, "gpt-4o-mini");
        assert_eq!(requests[0].max_tokens, 5);
        assert_eq!(requests[0].messages[0].content, VERIFY_PROMPT);
    }

    #[test]
    fn test_unwrap_code_fence() {
        assert_eq!(unwrap_code_fence("```markdown\n# Summary\n- a\n```"), "# Summary\n- a");
        assert_eq!(unwrap_code_fence("  # Summary  "), "# Summary");
        assert_eq!(unwrap_code_fence("use `x` here"), "use `x` here");
    }
}
