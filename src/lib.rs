/// YouTube transcript fetcher and AI summarizer
///
/// Pulls the caption transcript of a YouTube video, asks an OpenAI-compatible
/// chat model for a structured summary, turns every timestamp in it into a
/// deep link back into the video and exports the results to disk.

pub mod config;
pub mod credentials;
pub mod error;
pub mod export;
pub mod interactive;
pub mod llm;
pub mod session;
pub mod summary;
pub mod tasks;
pub mod workflow;
pub mod youtube;

// Re-export main types for easy access
pub use crate::config::{Config, ConfigBuilder};
pub use crate::credentials::{CredentialStore, FileCredentialStore, MemoryCredentialStore};
pub use crate::error::{Result, SummarizerError};
pub use crate::export::{export_session, ExportOptions, ExportReport};
pub use crate::interactive::InteractiveSession;
pub use crate::llm::{ChatModel, GeneratedSummary, LLMConfig, LLMProvider, Summarizer};
pub use crate::session::{CaptionSnippet, TranscriptSession};
pub use crate::summary::{linkify, LinkStyle, PromptBuilder, SummaryStyle};
pub use crate::tasks::BackgroundTask;
pub use crate::workflow::{Pipeline, SessionController, SessionSettings, TranscriptWorkflow};
pub use crate::youtube::{extract_video_id, FetchedTranscript, TranscriptProvider, VideoId};
