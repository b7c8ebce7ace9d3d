use std::path::Path;
use tracing::{debug, info, warn};

use super::SummaryStyle;

/// Character budget applied to the transcript before it is embedded
pub const DEFAULT_MAX_TRANSCRIPT_CHARS: usize = 8000;

/// System instruction sent with every summarization request
pub const SYSTEM_PROMPT: &str =
    "You are a helpful assistant that creates structured summaries of YouTube video transcripts.";

/// Placeholder replaced by the (truncated) transcript
pub const TRANSCRIPT_PLACEHOLDER: &str = "{transcript}";

const DETAILED_TEMPLATE: &str = r#"
Please create a detailed structured summary of this YouTube video transcript.

TRANSCRIPT:
{transcript}

Please format your response as:

# Video Summary

## Section 1: [Title] (START_TIME - END_TIME)
- Key point 1
- Key point 2
- Key point 3

## Section 2: [Title] (START_TIME - END_TIME)
- Key point 1
- Key point 2
- Key point 3

Continue this pattern for the entire transcript.

For timestamps, estimate reasonable sections (like every 2-5 minutes) and use format like "2:30 - 5:45" based on the content flow. Make sure each section has a clear, descriptive title and 2-4 bullet points summarizing the key information discussed in that timeframe.
"#;

const BRIEF_TEMPLATE: &str = r#"
Create a brief overview summary of this YouTube video transcript in 3-5 sections:

TRANSCRIPT:
{transcript}

Format as:
# Brief Video Summary

## Introduction (0:00 - X:XX)
- Brief summary

## Main Content (X:XX - X:XX)
- Brief summary

## Conclusion (X:XX - END)
- Brief summary

Keep each section to 1-2 bullet points maximum.
"#;

const KEY_POINTS_TEMPLATE: &str = r#"
Extract only the most important key points from this YouTube video transcript:

TRANSCRIPT:
{transcript}

Format as:
# Key Points Summary

• Point 1 (around X:XX)
• Point 2 (around X:XX)
• Point 3 (around X:XX)
• Point 4 (around X:XX)
• Point 5 (around X:XX)

List 5-10 most important points with approximate timestamps.
"#;

/// One template per summary style
#[derive(Debug, Clone, PartialEq)]
pub struct PromptTemplates {
    pub detailed: String,
    pub brief: String,
    pub key_points: String,
}

impl Default for PromptTemplates {
    fn default() -> Self {
        Self {
            detailed: DETAILED_TEMPLATE.to_string(),
            brief: BRIEF_TEMPLATE.to_string(),
            key_points: KEY_POINTS_TEMPLATE.to_string(),
        }
    }
}

impl PromptTemplates {
    pub fn get(&self, style: SummaryStyle) -> &str {
        match style {
            SummaryStyle::Detailed => &self.detailed,
            SummaryStyle::Brief => &self.brief,
            SummaryStyle::KeyPoints => &self.key_points,
        }
    }

    fn slot_mut(&mut self, style: SummaryStyle) -> &mut String {
        match style {
            SummaryStyle::Detailed => &mut self.detailed,
            SummaryStyle::Brief => &mut self.brief,
            SummaryStyle::KeyPoints => &mut self.key_points,
        }
    }

    /// Load per-style overrides (`detailed.txt`, `brief.txt`, `key_points.txt`)
    /// from `dir`, keeping the built-in template for anything missing or invalid.
    pub async fn load_overrides(dir: &Path) -> Self {
        let mut templates = Self::default();

        for style in SummaryStyle::ALL {
            let path = dir.join(format!("{}.txt", style.key()));
            if !path.exists() {
                debug!("No prompt override at {}", path.display());
                continue;
            }

            match tokio::fs::read_to_string(&path).await {
                Ok(content) if content.contains(TRANSCRIPT_PLACEHOLDER) => {
                    info!("📄 Loaded {} prompt from {}", style.key(), path.display());
                    *templates.slot_mut(style) = content;
                }
                Ok(_) => {
                    warn!(
                        "Prompt file {} has no {} placeholder, using default prompt",
                        path.display(),
                        TRANSCRIPT_PLACEHOLDER
                    );
                }
                Err(e) => {
                    warn!("Failed to read prompt file {}: {}, using default prompt", path.display(), e);
                }
            }
        }

        templates
    }
}

/// Builds the user prompt for a transcript and summary style
#[derive(Debug, Clone)]
pub struct PromptBuilder {
    max_chars: usize,
    templates: PromptTemplates,
}

impl Default for PromptBuilder {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_TRANSCRIPT_CHARS)
    }
}

impl PromptBuilder {
    pub fn new(max_chars: usize) -> Self {
        Self {
            max_chars,
            templates: PromptTemplates::default(),
        }
    }

    pub fn with_templates(mut self, templates: PromptTemplates) -> Self {
        self.templates = templates;
        self
    }

    pub fn max_chars(&self) -> usize {
        self.max_chars
    }

    /// Render the prompt. The transcript is cut to the first `max_chars`
    /// characters; no attempt is made to end on a sentence boundary.
    pub fn build(&self, transcript: &str, style: SummaryStyle) -> String {
        let excerpt = truncate_chars(transcript, self.max_chars);
        if excerpt.len() < transcript.len() {
            debug!(
                "Transcript truncated to {} characters for the {} prompt",
                self.max_chars,
                style.key()
            );
        }

        self.templates
            .get(style)
            .replacen(TRANSCRIPT_PLACEHOLDER, excerpt, 1)
    }
}

/// Prefix of `text` holding at most `max_chars` characters
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => &text[..byte_idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_truncates_long_transcript_for_every_style() {
        let transcript = "a".repeat(DEFAULT_MAX_TRANSCRIPT_CHARS + 500);
        let builder = PromptBuilder::default();

        for style in SummaryStyle::ALL {
            let prompt = builder.build(&transcript, style);
            let expected = "a".repeat(DEFAULT_MAX_TRANSCRIPT_CHARS);
            assert!(prompt.contains(&format!("\n{}\n", expected)));
            assert!(!prompt.contains(&"a".repeat(DEFAULT_MAX_TRANSCRIPT_CHARS + 1)));
        }
    }

    #[test]
    fn test_short_transcript_embedded_unmodified() {
        let builder = PromptBuilder::default();
        let transcript = "we talk about rust ownership at 2:30";

        for style in SummaryStyle::ALL {
            let prompt = builder.build(transcript, style);
            assert!(prompt.contains(transcript));
            assert!(!prompt.contains(TRANSCRIPT_PLACEHOLDER));
        }
    }

    #[test]
    fn test_style_specific_structure() {
        let builder = PromptBuilder::default();
        assert!(builder.build("x", SummaryStyle::Detailed).contains("2-4 bullet points"));
        assert!(builder.build("x", SummaryStyle::Brief).contains("3-5 sections"));
        assert!(builder.build("x", SummaryStyle::KeyPoints).contains("5-10 most important points"));
    }

    #[test]
    fn test_truncate_counts_characters_not_bytes() {
        assert_eq!(truncate_chars("héllo wörld", 4), "héll");
        assert_eq!(truncate_chars("abc", 10), "abc");
        assert_eq!(truncate_chars("abc", 0), "");
    }

    #[test]
    fn test_custom_budget() {
        let builder = PromptBuilder::new(5);
        let prompt = builder.build("0123456789", SummaryStyle::Brief);
        assert!(prompt.contains("\n01234\n"));
        assert!(!prompt.contains("012345"));
    }

    #[tokio::test]
    async fn test_load_overrides() {
        let temp_dir = TempDir::new().unwrap();
        tokio::fs::write(
            temp_dir.path().join("brief.txt"),
            "Summarize briefly:\n{transcript}\n",
        )
        .await
        .unwrap();
        tokio::fs::write(temp_dir.path().join("detailed.txt"), "no placeholder here")
            .await
            .unwrap();

        let templates = PromptTemplates::load_overrides(temp_dir.path()).await;
        assert_eq!(templates.brief, "Summarize briefly:\n{transcript}\n");
        assert_eq!(templates.detailed, PromptTemplates::default().detailed);
        assert_eq!(templates.key_points, PromptTemplates::default().key_points);

        let prompt = PromptBuilder::new(3)
            .with_templates(templates)
            .build("abcdef", SummaryStyle::Brief);
        assert_eq!(prompt, "Summarize briefly:\nabc\n");
    }
}
