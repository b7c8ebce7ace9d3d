use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

use crate::config::Config;
use crate::credentials::CredentialStore;
use crate::error::{Result, SummarizerError};
use crate::export::{export_session, ExportOptions, ExportReport};
use crate::llm::{create_llm, ChatModel, GeneratedSummary, LLMConfig, Summarizer, LLM};
use crate::session::TranscriptSession;
use crate::summary::{linkify, LinkStyle, PromptBuilder, SummaryStyle};
use crate::tasks::BackgroundTask;
use crate::youtube::{
    fetch_transcript, require_video_id, FetchedTranscript, TranscriptProvider, VideoId,
    YouTubeTranscriptProvider,
};

/// Capabilities shared by every front end
#[async_trait]
pub trait TranscriptWorkflow: Send + Sync {
    fn extract_id(&self, url: &str) -> Result<VideoId>;

    /// Fetch and decode the transcript for `url`
    async fn fetch_transcript(&self, url: &str) -> Result<FetchedTranscript>;

    fn build_prompt(&self, transcript: &str, style: SummaryStyle) -> String;

    /// Summarizer bound to the current credential.
    ///
    /// Fails with `MissingCredential` when the provider needs a key and none
    /// is stored, so callers learn about it before any request is made.
    fn summarizer(&self) -> Result<Summarizer>;

    fn linkify(&self, summary: &str, video_url: &str, style: LinkStyle) -> String;

    async fn export(&self, session: &TranscriptSession, dir: &Path) -> Result<ExportReport>;
}

/// Default workflow: YouTube captions, OpenAI-compatible summaries, file export
pub struct Pipeline {
    transcripts: Arc<dyn TranscriptProvider>,
    llm_config: LLMConfig,
    credentials: Arc<dyn CredentialStore>,
    llm: Option<Arc<dyn LLM>>,
    prompts: PromptBuilder,
    export_options: ExportOptions,
}

impl Pipeline {
    pub fn new(
        transcripts: Arc<dyn TranscriptProvider>,
        llm_config: LLMConfig,
        credentials: Arc<dyn CredentialStore>,
    ) -> Self {
        Self {
            transcripts,
            llm_config,
            credentials,
            llm: None,
            prompts: PromptBuilder::default(),
            export_options: ExportOptions::default(),
        }
    }

    /// Build the pipeline described by `config`
    pub async fn from_config(config: &Config, credentials: Arc<dyn CredentialStore>) -> Result<Self> {
        let transcripts = YouTubeTranscriptProvider::new(
            config.transcript.languages.clone(),
            config.transcript.preserve_formatting,
        )?;

        Ok(Self::new(Arc::new(transcripts), config.llm.clone(), credentials)
            .with_prompts(config.prompt_builder().await)
            .with_export_options(ExportOptions {
                write_json: config.output.write_json,
            }))
    }

    /// Use `llm` for every request instead of building one from the credential
    pub fn with_llm(mut self, llm: Arc<dyn LLM>) -> Self {
        self.llm = Some(llm);
        self
    }

    pub fn with_prompts(mut self, prompts: PromptBuilder) -> Self {
        self.prompts = prompts;
        self
    }

    pub fn with_export_options(mut self, options: ExportOptions) -> Self {
        self.export_options = options;
        self
    }

    fn llm(&self) -> Result<Arc<dyn LLM>> {
        match &self.llm {
            Some(llm) => Ok(llm.clone()),
            None => create_llm(&self.llm_config, self.credentials.load()?),
        }
    }
}

#[async_trait]
impl TranscriptWorkflow for Pipeline {
    fn extract_id(&self, url: &str) -> Result<VideoId> {
        require_video_id(url)
    }

    async fn fetch_transcript(&self, url: &str) -> Result<FetchedTranscript> {
        let video_id = self.extract_id(url)?;
        fetch_transcript(self.transcripts.as_ref(), &video_id, url).await
    }

    fn build_prompt(&self, transcript: &str, style: SummaryStyle) -> String {
        self.prompts.build(transcript, style)
    }

    fn summarizer(&self) -> Result<Summarizer> {
        Ok(Summarizer::new(self.llm()?, &self.llm_config, self.prompts.clone()))
    }

    fn linkify(&self, summary: &str, video_url: &str, style: LinkStyle) -> String {
        linkify(summary, video_url, style)
    }

    async fn export(&self, session: &TranscriptSession, dir: &Path) -> Result<ExportReport> {
        export_session(session, dir, self.export_options).await
    }
}

/// Per-session choices passed into prompt building and completion calls
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionSettings {
    pub model: ChatModel,
    pub style: SummaryStyle,
    pub link_style: LinkStyle,
}

impl SessionSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            model: config.llm.model.clone(),
            style: config.summary.style,
            link_style: config.summary.link_style,
        }
    }
}

/// Owns the session and applies background results to it.
///
/// Workers only produce values; the session changes solely inside
/// `apply_fetch` / `apply_summary` / `clear`, called from the owning context.
pub struct SessionController {
    workflow: Arc<dyn TranscriptWorkflow>,
    session: TranscriptSession,
    settings: SessionSettings,
    export_dir: PathBuf,
}

impl SessionController {
    pub fn new(workflow: Arc<dyn TranscriptWorkflow>, settings: SessionSettings, export_dir: PathBuf) -> Self {
        Self {
            workflow,
            session: TranscriptSession::new(),
            settings,
            export_dir,
        }
    }

    pub fn session(&self) -> &TranscriptSession {
        &self.session
    }

    pub fn settings(&self) -> &SessionSettings {
        &self.settings
    }

    pub fn settings_mut(&mut self) -> &mut SessionSettings {
        &mut self.settings
    }

    pub fn export_dir(&self) -> &Path {
        &self.export_dir
    }

    pub fn set_export_dir(&mut self, dir: PathBuf) {
        self.export_dir = dir;
    }

    pub fn workflow(&self) -> &Arc<dyn TranscriptWorkflow> {
        &self.workflow
    }

    /// Validate `url` and start fetching its transcript in the background
    pub fn start_fetch(&self, url: &str) -> Result<BackgroundTask<Result<FetchedTranscript>>> {
        let video_id = self.workflow.extract_id(url)?;
        info!("🎬 Video ID: {}", video_id);

        let workflow = self.workflow.clone();
        let url = url.to_string();
        Ok(BackgroundTask::submit("fetch", async move {
            workflow.fetch_transcript(&url).await
        }))
    }

    /// Apply a finished fetch. A failure leaves the current session as it was.
    pub fn apply_fetch(&mut self, outcome: Result<FetchedTranscript>) -> Result<&TranscriptSession> {
        match outcome {
            Ok(fetched) => {
                self.session.apply_fetch(fetched);
                Ok(&self.session)
            }
            Err(e) => {
                warn!("Transcript fetch failed: {}", e);
                Err(e)
            }
        }
    }

    /// Start summarizing the loaded transcript in the background
    pub fn start_summarize(&self) -> Result<BackgroundTask<Result<GeneratedSummary>>> {
        if !self.session.has_transcript() {
            return Err(SummarizerError::NoTranscriptLoaded);
        }

        let summarizer = self.workflow.summarizer()?;
        let transcript = self.session.transcript_text().to_string();
        let video_url = self.session.video_url().to_string();
        let settings = self.settings.clone();

        Ok(BackgroundTask::submit("summarize", async move {
            summarizer
                .summarize(
                    &transcript,
                    &video_url,
                    &settings.model,
                    settings.style,
                    settings.link_style,
                )
                .await
        }))
    }

    /// Apply a finished summary. A failure keeps the transcript and leaves the
    /// summary empty.
    pub fn apply_summary(&mut self, outcome: Result<GeneratedSummary>) -> Result<&TranscriptSession> {
        match outcome {
            Ok(summary) => {
                self.session.apply_summary(summary.text, summary.model);
                Ok(&self.session)
            }
            Err(e) => {
                warn!("Summarization failed: {}", e);
                self.session.discard_summary();
                Err(e)
            }
        }
    }

    /// Fetch and apply in one step
    pub async fn fetch(&mut self, url: &str) -> Result<&TranscriptSession> {
        let mut task = self.start_fetch(url)?;
        let outcome = task.completion().await?;
        self.apply_fetch(outcome)
    }

    /// Summarize and apply in one step
    pub async fn summarize(&mut self) -> Result<&TranscriptSession> {
        let mut task = self.start_summarize()?;
        let outcome = task.completion().await?;
        self.apply_summary(outcome)
    }

    /// Export the session to the configured directory
    pub async fn export(&self) -> Result<ExportReport> {
        self.export_to(&self.export_dir).await
    }

    /// Export into `dir` without changing the configured export directory
    pub async fn export_to(&self, dir: &Path) -> Result<ExportReport> {
        self.workflow.export(&self.session, dir).await
    }

    pub fn clear(&mut self) {
        self.session.clear();
        info!("🧹 Session cleared");
    }
}
