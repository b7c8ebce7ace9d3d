#![allow(dead_code)]

use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

use yt_summarizer::credentials::MemoryCredentialStore;
use yt_summarizer::llm::{ChatRequest, LLMConfig, LLMProvider, LLMResponse, LLM};
use yt_summarizer::youtube::RawSnippet;
use yt_summarizer::{
    Pipeline, Result, SessionController, SessionSettings, SummarizerError, TranscriptProvider, VideoId,
};

/// Transcript provider that replays canned entries or a canned error
pub struct MockTranscripts {
    reply: Mutex<std::result::Result<Vec<RawSnippet>, String>>,
    pub calls: Mutex<Vec<String>>,
}

impl MockTranscripts {
    pub fn with_snippets(snippets: Vec<RawSnippet>) -> Self {
        Self {
            reply: Mutex::new(Ok(snippets)),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn hello() -> Self {
        Self::with_snippets(vec![RawSnippet::new("hello", 0.0, 1.0)])
    }

    pub fn failing(message: &str) -> Self {
        Self {
            reply: Mutex::new(Err(message.to_string())),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn set_snippets(&self, snippets: Vec<RawSnippet>) {
        *self.reply.lock().unwrap() = Ok(snippets);
    }

    pub fn set_failure(&self, message: &str) {
        *self.reply.lock().unwrap() = Err(message.to_string());
    }
}

#[async_trait]
impl TranscriptProvider for MockTranscripts {
    async fn fetch(&self, video_id: &VideoId) -> Result<Vec<RawSnippet>> {
        self.calls.lock().unwrap().push(video_id.to_string());
        let reply = self.reply.lock().unwrap().clone();
        reply.map_err(|message| yt_summarizer::youtube::transcript::classify_provider_error(&message))
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}

/// Chat model that answers every request with the same content
pub struct MockLLM {
    reply: Mutex<std::result::Result<String, String>>,
    pub requests: Mutex<Vec<ChatRequest>>,
}

impl MockLLM {
    pub fn replying(content: &str) -> Self {
        Self {
            reply: Mutex::new(Ok(content.to_string())),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(reason: &str) -> Self {
        Self {
            reply: Mutex::new(Err(reason.to_string())),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn set_failure(&self, reason: &str) {
        *self.reply.lock().unwrap() = Err(reason.to_string());
    }
}

#[async_trait]
impl LLM for MockLLM {
    async fn chat(&self, request: ChatRequest) -> Result<LLMResponse> {
        self.requests.lock().unwrap().push(request);
        let reply = self.reply.lock().unwrap().clone();
        match reply {
            Ok(content) => Ok(LLMResponse {
                content,
                tokens_used: Some(10),
            }),
            Err(reason) => Err(SummarizerError::SummarizationFailed(reason)),
        }
    }

    fn provider_type(&self) -> LLMProvider {
        LLMProvider::OpenAI
    }
}

pub struct Harness {
    pub transcripts: Arc<MockTranscripts>,
    pub llm: Arc<MockLLM>,
    pub credentials: Arc<MemoryCredentialStore>,
    pub export_dir: TempDir,
}

impl Harness {
    pub fn new(transcripts: MockTranscripts, llm: MockLLM) -> Self {
        Self {
            transcripts: Arc::new(transcripts),
            llm: Arc::new(llm),
            credentials: Arc::new(MemoryCredentialStore::with_secret("sk-test")),
            export_dir: TempDir::new().unwrap(),
        }
    }

    pub fn pipeline(&self) -> Pipeline {
        Pipeline::new(self.transcripts.clone(), LLMConfig::default(), self.credentials.clone())
            .with_llm(self.llm.clone())
    }

    pub fn controller(&self) -> SessionController {
        SessionController::new(
            Arc::new(self.pipeline()),
            SessionSettings::default(),
            self.export_dir.path().to_path_buf(),
        )
    }
}
