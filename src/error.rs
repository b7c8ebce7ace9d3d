use std::path::PathBuf;

/// Result type for summarizer operations
pub type Result<T> = std::result::Result<T, SummarizerError>;

/// Error types for the fetch / summarize / export workflow.
///
/// Every variant is terminal to the action that raised it; none of them leave
/// a session half-updated.
#[derive(thiserror::Error, Debug)]
pub enum SummarizerError {
    #[error("Invalid YouTube URL: {0}")]
    InvalidUrl(String),

    #[error("{0}")]
    NoTranscript(String),

    #[error("Transcript provider error: {0}")]
    Provider(String),

    #[error("AI summarization failed: {0}")]
    SummarizationFailed(String),

    #[error("No API key configured for {provider}. Set one with `yt-summarizer key set` or the OPENAI_API_KEY environment variable")]
    MissingCredential { provider: String },

    #[error("No transcript available to summarize")]
    NoTranscriptLoaded,

    #[error("No content to save")]
    NothingToExport,

    #[error("Failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Credential store error: {0}")]
    Credential(#[source] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Background task was discarded before it completed")]
    TaskDiscarded,
}

impl SummarizerError {
    /// Message for the transcript-unavailable case, shared by providers.
    pub fn no_transcript() -> Self {
        SummarizerError::NoTranscript(
            "This video doesn't have transcripts available.\n\n\
             Try a different video that has captions enabled."
                .to_string(),
        )
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        SummarizerError::Io {
            path: path.into(),
            source,
        }
    }
}
