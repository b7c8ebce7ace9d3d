/// Summary generation helpers: prompt templates and timestamp deep links.

pub mod linker;
pub mod prompt;

pub use linker::{linkify, strip_link_markup, timestamp_to_seconds, LinkStyle};
pub use prompt::{PromptBuilder, PromptTemplates, DEFAULT_MAX_TRANSCRIPT_CHARS, SYSTEM_PROMPT};

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Output structure requested from the model
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum SummaryStyle {
    /// Numbered sections with time ranges and 2-4 bullets each
    #[default]
    Detailed,
    /// 3-5 sections with 1-2 bullets each
    Brief,
    /// 5-10 bullets with one approximate timestamp each
    KeyPoints,
}

impl SummaryStyle {
    pub const ALL: [SummaryStyle; 3] = [
        SummaryStyle::Detailed,
        SummaryStyle::Brief,
        SummaryStyle::KeyPoints,
    ];

    /// Stable identifier used in config files and template file names
    pub fn key(&self) -> &'static str {
        match self {
            SummaryStyle::Detailed => "detailed",
            SummaryStyle::Brief => "brief",
            SummaryStyle::KeyPoints => "key_points",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SummaryStyle::Detailed => "Detailed with timestamps",
            SummaryStyle::Brief => "Brief overview",
            SummaryStyle::KeyPoints => "Key points only",
        }
    }
}

impl fmt::Display for SummaryStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for SummaryStyle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "detailed" => Ok(SummaryStyle::Detailed),
            "brief" => Ok(SummaryStyle::Brief),
            "key_points" | "keypoints" => Ok(SummaryStyle::KeyPoints),
            other => Err(format!(
                "unknown summary style '{}' (expected detailed, brief or key_points)",
                other
            )),
        }
    }
}
