use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// How deep links are rendered inside a summary
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum LinkStyle {
    /// Bare URL on its own line
    #[default]
    Plain,
    /// Markdown link, clickable in rich viewers
    Markdown,
}

impl LinkStyle {
    fn render(&self, timestamp: &str, url: &str) -> String {
        match self {
            LinkStyle::Plain => format!("{}\n🔗 {}", timestamp, url),
            LinkStyle::Markdown => format!("{}\n🔗 [{}]({})", timestamp, url, url),
        }
    }
}

fn timestamp_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"[0-9]{1,2}:[0-9]{2}(?::[0-9]{2})?").expect("timestamp pattern"))
}

fn markdown_link_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"\[(?P<label>[^\]\s]+)\]\((?P<href>[^)\s]+)\)").expect("markdown link pattern")
    })
}

/// Convert `M:SS` or `H:MM:SS` to whole seconds.
///
/// Anything else, including unparsable components, maps to 0.
pub fn timestamp_to_seconds(timestamp: &str) -> u64 {
    let parts: Option<Vec<u64>> = timestamp
        .split(':')
        .map(|p| p.trim().parse::<u64>().ok())
        .collect();

    match parts.as_deref() {
        Some(&[minutes, seconds]) => minutes.saturating_mul(60).saturating_add(seconds),
        Some(&[hours, minutes, seconds]) => hours
            .saturating_mul(3600)
            .saturating_add(minutes.saturating_mul(60))
            .saturating_add(seconds),
        _ => 0,
    }
}

/// Deep link that seeks `video_url` to `seconds`
pub fn deep_link(video_url: &str, seconds: u64) -> String {
    format!("{}&t={}s", video_url, seconds)
}

/// Follow every timestamp in `summary` with a deep link into `video_url`.
///
/// Matches are replaced left to right in a single pass; inserted links are
/// never rescanned.
pub fn linkify(summary: &str, video_url: &str, style: LinkStyle) -> String {
    timestamp_pattern()
        .replace_all(summary, |caps: &Captures| {
            let timestamp = &caps[0];
            let url = deep_link(video_url, timestamp_to_seconds(timestamp));
            style.render(timestamp, &url)
        })
        .into_owned()
}

/// Turn `[url](url)` links back into bare URLs for plain-text export
pub fn strip_link_markup(text: &str) -> String {
    markdown_link_pattern()
        .replace_all(text, |caps: &Captures| {
            if caps["label"] == caps["href"] {
                caps["href"].to_string()
            } else {
                caps[0].to_string()
            }
        })
        .into_owned()
}
