use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

use crate::error::{Result, SummarizerError};

/// Length of every YouTube video identifier
pub const VIDEO_ID_LEN: usize = 11;

/// A validated 11-character YouTube video identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct VideoId(String);

impl VideoId {
    /// Validate a bare identifier.
    pub fn parse(raw: &str) -> Result<Self> {
        if raw.len() == VIDEO_ID_LEN && raw.chars().all(is_id_char) {
            Ok(Self(raw.to_string()))
        } else {
            Err(SummarizerError::InvalidUrl(format!(
                "'{}' is not an 11-character video id",
                raw
            )))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VideoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for VideoId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for VideoId {
    type Error = SummarizerError;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<VideoId> for String {
    fn from(id: VideoId) -> Self {
        id.0
    }
}

fn is_id_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '-'
}

/// Recognizers in acceptance order. The `v=` / any-segment form is the most
/// permissive and goes last so it cannot shadow the embed and short-link forms.
fn recognizers() -> &'static [Regex; 3] {
    static PATTERNS: OnceLock<[Regex; 3]> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        [
            Regex::new(r"embed/([0-9A-Za-z_-]{11})").expect("embed pattern"),
            Regex::new(r"youtu\.be/([0-9A-Za-z_-]{11})").expect("short-link pattern"),
            Regex::new(r"(?:v=|/)([0-9A-Za-z_-]{11})").expect("watch pattern"),
        ]
    })
}

/// Extract the video id from any accepted YouTube URL shape.
///
/// Returns `None` when no recognizer matches.
pub fn extract_video_id(url: &str) -> Option<VideoId> {
    let url = url.trim();
    recognizers()
        .iter()
        .find_map(|re| re.captures(url))
        .and_then(|caps| caps.get(1))
        .map(|m| VideoId(m.as_str().to_string()))
}

/// Like [`extract_video_id`] but reports a user-facing error.
pub fn require_video_id(url: &str) -> Result<VideoId> {
    if url.trim().is_empty() {
        return Err(SummarizerError::InvalidUrl(
            "Please enter a YouTube URL".to_string(),
        ));
    }

    extract_video_id(url).ok_or_else(|| SummarizerError::InvalidUrl(url.trim().to_string()))
}
