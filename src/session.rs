use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::youtube::{FetchedTranscript, VideoId};

/// One caption entry: text plus its position in the video
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaptionSnippet {
    pub text: String,
    /// Start offset in seconds
    pub start: f64,
    /// Duration in seconds
    pub duration: f64,
}

/// State for one fetch / summarize / export cycle.
///
/// Only the interactive context mutates a session, and only by applying a
/// completed fetch or summary as a whole.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TranscriptSession {
    video_id: Option<VideoId>,
    video_url: String,
    snippets: Vec<CaptionSnippet>,
    transcript_text: String,
    summary_text: String,
    summary_model: Option<String>,
    skipped_snippets: usize,
}

impl TranscriptSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole session with a freshly fetched transcript.
    pub fn apply_fetch(&mut self, fetched: FetchedTranscript) {
        debug!("Replacing session with transcript for {}", fetched.video_id);
        *self = Self {
            video_id: Some(fetched.video_id),
            video_url: fetched.video_url,
            snippets: fetched.snippets,
            transcript_text: fetched.transcript_text,
            summary_text: String::new(),
            summary_model: None,
            skipped_snippets: fetched.skipped,
        };
    }

    /// Store a linkified summary produced by `model`.
    pub fn apply_summary(&mut self, summary_text: String, model: impl Into<String>) {
        self.summary_text = summary_text;
        self.summary_model = Some(model.into());
    }

    /// Drop the summary after a failed summarization, keeping the transcript
    pub fn discard_summary(&mut self) {
        self.summary_text.clear();
        self.summary_model = None;
    }

    /// Reset every field to its initial value
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn video_id(&self) -> Option<&VideoId> {
        self.video_id.as_ref()
    }

    pub fn video_url(&self) -> &str {
        &self.video_url
    }

    pub fn snippets(&self) -> &[CaptionSnippet] {
        &self.snippets
    }

    pub fn transcript_text(&self) -> &str {
        &self.transcript_text
    }

    pub fn summary_text(&self) -> &str {
        &self.summary_text
    }

    pub fn summary_model(&self) -> Option<&str> {
        self.summary_model.as_deref()
    }

    pub fn skipped_snippets(&self) -> usize {
        self.skipped_snippets
    }

    pub fn has_transcript(&self) -> bool {
        !self.transcript_text.is_empty()
    }

    pub fn has_summary(&self) -> bool {
        !self.summary_text.is_empty()
    }

    /// Approximate video length from the last caption
    pub fn duration_seconds(&self) -> f64 {
        self.snippets
            .last()
            .map(|s| s.start + s.duration)
            .unwrap_or(0.0)
    }
}
