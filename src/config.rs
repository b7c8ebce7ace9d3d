use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::SummarizerError;
use crate::llm::{ChatModel, LLMConfig, LLMProvider};
use crate::summary::{LinkStyle, PromptBuilder, PromptTemplates, SummaryStyle, DEFAULT_MAX_TRANSCRIPT_CHARS};

const APP_DIR: &str = "yt-summarizer";

/// Configuration for the YouTube summarizer
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Chat-completion settings
    pub llm: LLMConfig,

    /// Prompt and summary settings
    pub summary: SummaryConfig,

    /// Caption retrieval settings
    pub transcript: TranscriptConfig,

    /// Export and logging settings
    pub output: OutputConfig,

    /// API key storage
    pub credentials: CredentialsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SummaryConfig {
    /// Style used when none is given on the command line
    pub style: SummaryStyle,

    /// How timestamp links are rendered
    pub link_style: LinkStyle,

    /// Transcript characters embedded in the prompt
    pub max_transcript_chars: usize,

    /// Directory holding detailed.txt / brief.txt / key_points.txt overrides
    pub prompt_dir: Option<PathBuf>,
}

impl Default for SummaryConfig {
    fn default() -> Self {
        Self {
            style: SummaryStyle::Detailed,
            link_style: LinkStyle::Plain,
            max_transcript_chars: DEFAULT_MAX_TRANSCRIPT_CHARS,
            prompt_dir: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TranscriptConfig {
    /// Caption languages in order of preference
    pub languages: Vec<String>,

    /// Keep HTML formatting tags in caption text
    pub preserve_formatting: bool,
}

impl Default for TranscriptConfig {
    fn default() -> Self {
        Self {
            languages: vec!["en".to_string()],
            preserve_formatting: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Export destination (documents directory when unset)
    pub export_dir: Option<PathBuf>,

    /// Also write the `_data.json` record
    pub write_json: bool,

    /// Logging level
    pub log_level: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            export_dir: None,
            write_json: true,
            log_level: "info".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CredentialsConfig {
    /// Key file location (`<config dir>/yt-summarizer/api_key.txt` when unset)
    pub key_file: Option<PathBuf>,
}

impl Config {
    /// Locations searched by [`Config::load`], in order
    pub fn search_paths() -> Vec<PathBuf> {
        let mut paths = vec![
            PathBuf::from("yt-summarizer.toml"),
            PathBuf::from("config/yt-summarizer.toml"),
        ];
        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join(APP_DIR).join("config.toml"));
        }
        paths
    }

    /// Default location for `config init`
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .map(|dir| dir.join(APP_DIR).join("config.toml"))
            .unwrap_or_else(|| PathBuf::from("yt-summarizer.toml"))
    }

    /// Load configuration from the first existing file in [`Config::search_paths`],
    /// falling back to defaults. Environment overrides apply either way.
    pub fn load() -> Result<Self> {
        Self::load_first(&Self::search_paths())
    }

    /// Load the first of `paths` that exists. A file that exists but cannot be
    /// read or parsed is an error.
    pub fn load_first(paths: &[PathBuf]) -> Result<Self> {
        match paths.iter().find(|path| path.exists()) {
            Some(path) => Self::load_from(path),
            None => Self::from_env(),
        }
    }

    /// Load one specific file, then apply environment overrides
    pub fn load_from(path: &Path) -> Result<Self> {
        let config_str = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let mut config: Config = toml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        tracing::info!("📄 Loaded configuration from: {}", path.display());

        config.apply_env_overrides(|name| std::env::var(name).ok());
        Ok(config)
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        config.apply_env_overrides(|name| std::env::var(name).ok());
        Ok(config)
    }

    /// Apply `YT_SUMMARIZER_*` overrides read through `lookup`
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(model) = lookup("YT_SUMMARIZER_MODEL") {
            self.llm.model = ChatModel::from(model);
        }

        if let Some(style) = lookup("YT_SUMMARIZER_STYLE") {
            match style.parse() {
                Ok(style) => self.summary.style = style,
                Err(e) => tracing::warn!("Ignoring YT_SUMMARIZER_STYLE: {}", e),
            }
        }

        if let Some(export_dir) = lookup("YT_SUMMARIZER_EXPORT_DIR") {
            self.output.export_dir = Some(PathBuf::from(export_dir));
        }

        if let Some(log_level) = lookup("YT_SUMMARIZER_LOG_LEVEL") {
            self.output.log_level = log_level;
        }

        if let Some(endpoint) = lookup("YT_SUMMARIZER_ENDPOINT") {
            self.llm.endpoint = Some(endpoint);
        }
    }

    /// Save configuration to file
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Cannot create config directory {}", parent.display()))?;
        }
        let config_str = toml::to_string_pretty(self)?;
        std::fs::write(path, config_str)?;
        tracing::info!("💾 Configuration saved to: {}", path.display());
        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> crate::Result<()> {
        if self.summary.max_transcript_chars == 0 {
            return Err(invalid("max_transcript_chars must be greater than 0"));
        }

        if self.llm.max_tokens == 0 {
            return Err(invalid("max_tokens must be greater than 0"));
        }

        if !(0.0..=2.0).contains(&self.llm.temperature) {
            return Err(invalid(format!(
                "temperature must be between 0.0 and 2.0, got {}",
                self.llm.temperature
            )));
        }

        if let Some(endpoint) = &self.llm.endpoint {
            if !endpoint.starts_with("http://") && !endpoint.starts_with("https://") {
                return Err(invalid(format!("endpoint must be an http(s) URL, got {}", endpoint)));
            }
        }

        if self.transcript.languages.iter().all(|l| l.trim().is_empty()) {
            return Err(invalid("at least one transcript language is required"));
        }

        if let Some(prompt_dir) = &self.summary.prompt_dir {
            if !prompt_dir.is_dir() {
                return Err(invalid(format!("prompt_dir {} is not a directory", prompt_dir.display())));
            }
        }

        tracing::debug!("Configuration validation passed");
        Ok(())
    }

    /// Where exports go: configured directory, else the documents directory,
    /// else `./exports`
    pub fn export_dir(&self) -> PathBuf {
        self.output
            .export_dir
            .clone()
            .or_else(dirs::document_dir)
            .unwrap_or_else(|| PathBuf::from("exports"))
    }

    pub fn key_file(&self) -> PathBuf {
        self.credentials.key_file.clone().unwrap_or_else(|| {
            dirs::config_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(APP_DIR)
                .join("api_key.txt")
        })
    }

    /// Prompt builder with this configuration's budget and template overrides
    pub async fn prompt_builder(&self) -> PromptBuilder {
        let builder = PromptBuilder::new(self.summary.max_transcript_chars);
        match &self.summary.prompt_dir {
            Some(dir) => builder.with_templates(PromptTemplates::load_overrides(dir).await),
            None => builder,
        }
    }

    /// Get runtime configuration summary
    pub fn summary(&self) -> String {
        format!(
            "YouTube Summarizer Configuration:\n\
            - Provider: {}\n\
            - Endpoint: {}\n\
            - Model: {}\n\
            - Summary Style: {}\n\
            - Link Style: {:?}\n\
            - Transcript Budget: {} characters\n\
            - Transcript Languages: {}\n\
            - Export Directory: {}\n\
            - JSON Export: {}\n\
            - Key File: {}",
            self.llm.provider.name(),
            self.llm.endpoint(),
            self.llm.model,
            self.summary.style,
            self.summary.link_style,
            self.summary.max_transcript_chars,
            self.transcript.languages.join(", "),
            self.export_dir().display(),
            self.output.write_json,
            self.key_file().display()
        )
    }
}

fn invalid(message: impl Into<String>) -> SummarizerError {
    SummarizerError::Config(message.into())
}

/// Configuration builder for programmatic config creation
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    pub fn with_provider(mut self, provider: LLMProvider) -> Self {
        self.config.llm.provider = provider;
        self
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.config.llm.endpoint = Some(endpoint.into());
        self
    }

    pub fn with_model(mut self, model: ChatModel) -> Self {
        self.config.llm.model = model;
        self
    }

    pub fn with_style(mut self, style: SummaryStyle) -> Self {
        self.config.summary.style = style;
        self
    }

    pub fn with_link_style(mut self, link_style: LinkStyle) -> Self {
        self.config.summary.link_style = link_style;
        self
    }

    pub fn with_max_transcript_chars(mut self, max_chars: usize) -> Self {
        self.config.summary.max_transcript_chars = max_chars;
        self
    }

    pub fn with_export_dir(mut self, dir: PathBuf) -> Self {
        self.config.output.export_dir = Some(dir);
        self
    }

    pub fn write_json(mut self, enable: bool) -> Self {
        self.config.output.write_json = enable;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
