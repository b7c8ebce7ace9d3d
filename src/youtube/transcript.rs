use async_trait::async_trait;
use tracing::{debug, info, warn};
use yt_transcript_rs::api::YouTubeTranscriptApi;

use super::video_id::VideoId;
use crate::error::{Result, SummarizerError};
use crate::session::CaptionSnippet;

/// Caption entry as delivered by a transcript provider, before decoding.
///
/// Text stays as raw bytes so that a single bad caption can be dropped
/// without failing the whole transcript.
#[derive(Debug, Clone, PartialEq)]
pub struct RawSnippet {
    pub text: Vec<u8>,
    pub start: f64,
    pub duration: f64,
}

impl RawSnippet {
    pub fn new(text: impl Into<Vec<u8>>, start: f64, duration: f64) -> Self {
        Self {
            text: text.into(),
            start,
            duration,
        }
    }

    /// Decode into a caption snippet, or `None` when the entry is unreadable.
    pub fn decode(self) -> Option<CaptionSnippet> {
        if !self.start.is_finite() || !self.duration.is_finite() {
            return None;
        }
        let text = String::from_utf8(self.text).ok()?;
        Some(CaptionSnippet {
            text,
            start: self.start,
            duration: self.duration,
        })
    }
}

/// Trait for caption transcript sources
#[async_trait]
pub trait TranscriptProvider: Send + Sync {
    /// Fetch the ordered caption entries for a video.
    async fn fetch(&self, video_id: &VideoId) -> Result<Vec<RawSnippet>>;

    fn name(&self) -> &'static str;
}

/// Transcript produced by one successful fetch, ready to replace a session
#[derive(Debug, Clone, PartialEq)]
pub struct FetchedTranscript {
    pub video_id: VideoId,
    pub video_url: String,
    pub snippets: Vec<CaptionSnippet>,
    pub transcript_text: String,
    /// Entries dropped because their text could not be decoded
    pub skipped: usize,
}

/// Decode raw entries in order, skipping the unreadable ones.
///
/// Returns the decoded snippets, their space-joined text and the skip count.
pub fn decode_snippets(raw: Vec<RawSnippet>) -> (Vec<CaptionSnippet>, String, usize) {
    let total = raw.len();
    let snippets: Vec<CaptionSnippet> = raw.into_iter().filter_map(RawSnippet::decode).collect();
    let skipped = total - snippets.len();

    let text = snippets
        .iter()
        .map(|s| s.text.as_str())
        .collect::<Vec<_>>()
        .join(" ");

    (snippets, text, skipped)
}

/// Fetch and decode the transcript for `video_id`.
///
/// `video_url` is the user's original input and is carried through verbatim.
pub async fn fetch_transcript(
    provider: &dyn TranscriptProvider,
    video_id: &VideoId,
    video_url: &str,
) -> Result<FetchedTranscript> {
    info!("📝 Fetching transcript for {} via {}", video_id, provider.name());

    let raw = provider.fetch(video_id).await?;
    debug!("Provider returned {} caption entries", raw.len());

    let (snippets, transcript_text, skipped) = decode_snippets(raw);

    if skipped > 0 {
        warn!("Skipped {} caption entries that could not be decoded", skipped);
    }

    if transcript_text.trim().is_empty() {
        return Err(SummarizerError::NoTranscript(
            "No transcript text could be extracted.".to_string(),
        ));
    }

    info!(
        "✅ Transcript fetched: {} snippets, {} characters",
        snippets.len(),
        transcript_text.chars().count()
    );

    Ok(FetchedTranscript {
        video_id: video_id.clone(),
        video_url: video_url.trim().to_string(),
        snippets,
        transcript_text,
        skipped,
    })
}

/// Transcript provider backed by YouTube's public caption tracks
#[derive(Clone)]
pub struct YouTubeTranscriptProvider {
    api: YouTubeTranscriptApi,
    languages: Vec<String>,
    preserve_formatting: bool,
}

impl YouTubeTranscriptProvider {
    pub fn new(languages: Vec<String>, preserve_formatting: bool) -> Result<Self> {
        let api = YouTubeTranscriptApi::new(None, None, None).map_err(|e| {
            SummarizerError::Provider(format!("Failed to create transcript client: {e}"))
        })?;

        Ok(Self {
            api,
            languages,
            preserve_formatting,
        })
    }
}

#[async_trait]
impl TranscriptProvider for YouTubeTranscriptProvider {
    async fn fetch(&self, video_id: &VideoId) -> Result<Vec<RawSnippet>> {
        let languages: Vec<&str> = self.languages.iter().map(String::as_str).collect();

        let transcript = self
            .api
            .fetch_transcript(video_id.as_str(), &languages, self.preserve_formatting)
            .await
            .map_err(|e| classify_provider_error(&e.to_string()))?;

        Ok(transcript
            .snippets
            .into_iter()
            .map(|s| RawSnippet::new(s.text, s.start, s.duration))
            .collect())
    }

    fn name(&self) -> &'static str {
        "YouTube"
    }
}

/// Map a provider failure message onto the error taxonomy
pub fn classify_provider_error(message: &str) -> SummarizerError {
    let lower = message.to_lowercase();

    if lower.contains("unavailable") || lower.contains("no longer available") {
        SummarizerError::Provider("This video is unavailable or private.".to_string())
    } else if lower.contains("no transcript")
        || lower.contains("notranscript")
        || lower.contains("transcriptsdisabled")
        || lower.contains("transcripts disabled")
        || lower.contains("subtitles are disabled")
        || lower.contains("could not retrieve a transcript")
    {
        SummarizerError::no_transcript()
    } else {
        SummarizerError::Provider(message.to_string())
    }
}
