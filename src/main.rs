use anyhow::{anyhow, Result};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use yt_summarizer::credentials::{CredentialStore, FileCredentialStore};
use yt_summarizer::llm::{create_llm, summarizer::verify_credential, ChatModel, LLMProvider};
use yt_summarizer::{
    Config, InteractiveSession, LinkStyle, Pipeline, SessionController, SessionSettings, SummaryStyle,
};

#[derive(Parser)]
#[command(
    name = "yt-summarizer",
    version,
    author = "TigreRoll",
    about = "Fetch YouTube transcripts and turn them into timestamped AI summaries"
)]
struct Cli {
    /// Configuration file (searched in the usual locations when omitted)
    #[arg(short, long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch, summarize and export one video
    Run {
        /// YouTube video URL
        url: String,

        #[command(flatten)]
        summary: SummaryArgs,

        /// Print the summary without writing any files
        #[arg(long)]
        no_export: bool,

        /// Skip the JSON data file
        #[arg(long)]
        no_json: bool,
    },

    /// Fetch a transcript and print it
    Fetch {
        /// YouTube video URL
        url: String,

        /// Also write the transcript files
        #[arg(long)]
        export: bool,

        /// Export directory
        #[arg(short, long, value_name = "DIR")]
        output: Option<PathBuf>,
    },

    /// Interactive session: fetch, summarize, export and clear on demand
    Interactive {
        #[command(flatten)]
        summary: SummaryArgs,
    },

    /// Manage the stored API key
    Key {
        #[command(subcommand)]
        action: KeyCommand,
    },

    /// Manage the configuration file
    Config {
        #[command(subcommand)]
        action: ConfigCommand,
    },
}

#[derive(Args)]
struct SummaryArgs {
    /// Chat model (gpt-4o-mini, gpt-4o, gpt-3.5-turbo or any name the endpoint accepts)
    #[arg(short, long)]
    model: Option<String>,

    /// Summary style
    #[arg(short, long, value_enum)]
    style: Option<SummaryStyle>,

    /// How timestamp links are rendered
    #[arg(long, value_enum)]
    links: Option<LinkStyle>,

    /// Chat-completion provider
    #[arg(long, value_enum)]
    provider: Option<LLMProvider>,

    /// Chat-completions endpoint URL
    #[arg(long)]
    endpoint: Option<String>,

    /// Export directory
    #[arg(short, long, value_name = "DIR")]
    output: Option<PathBuf>,
}

impl SummaryArgs {
    fn apply(&self, config: &mut Config) {
        if let Some(model) = &self.model {
            config.llm.model = ChatModel::from(model.as_str());
        }
        if let Some(style) = self.style {
            config.summary.style = style;
        }
        if let Some(links) = self.links {
            config.summary.link_style = links;
        }
        if let Some(provider) = self.provider {
            config.llm.provider = provider;
        }
        if let Some(endpoint) = &self.endpoint {
            config.llm.endpoint = Some(endpoint.clone());
        }
        if let Some(output) = &self.output {
            config.output.export_dir = Some(output.clone());
        }
    }
}

#[derive(Subcommand)]
enum KeyCommand {
    /// Store an API key (read from stdin when omitted)
    Set {
        key: Option<String>,

        /// Only store the key after a successful test request
        #[arg(long)]
        verify: bool,
    },
    /// Check that the stored key works
    Test,
    /// Remove the stored key
    Clear,
}

#[derive(Subcommand)]
enum ConfigCommand {
    /// Write a default configuration file
    Init {
        /// Destination (user config directory when omitted)
        path: Option<PathBuf>,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Print the effective configuration
    Show,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let apply_log_level = init_logging(cli.verbose);

    let mut config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    apply_log_level(&config);

    match cli.command {
        Commands::Run {
            url,
            summary,
            no_export,
            no_json,
        } => {
            summary.apply(&mut config);
            if no_json {
                config.output.write_json = false;
            }
            run(config, &url, !no_export).await
        }
        Commands::Fetch { url, export, output } => {
            if let Some(output) = output {
                config.output.export_dir = Some(output);
            }
            fetch(config, &url, export).await
        }
        Commands::Interactive { summary } => {
            summary.apply(&mut config);
            interactive(config).await
        }
        Commands::Key { action } => key(config, action).await,
        Commands::Config { action } => config_command(config, action),
    }
}

/// Install the subscriber before the config file is read. The returned hook
/// switches to the configured level unless `RUST_LOG` or `--verbose` decided it.
fn init_logging(verbose: bool) -> impl FnOnce(&Config) {
    let from_env = EnvFilter::try_from_default_env().ok();
    let fixed = verbose || from_env.is_some();
    let level = if verbose {
        "debug".to_string()
    } else {
        std::env::var("YT_SUMMARIZER_LOG_LEVEL").unwrap_or_else(|_| "info".to_string())
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(from_env.unwrap_or_else(|| crate_filter(&level)))
        .with_writer(std::io::stderr)
        .with_filter_reloading();
    let handle = builder.reload_handle();
    builder.init();

    if verbose {
        info!("Verbose logging enabled");
    }

    move |config: &Config| {
        if fixed || config.output.log_level == level {
            return;
        }
        if let Err(e) = handle.reload(crate_filter(&config.output.log_level)) {
            warn!("Cannot apply log level {}: {}", config.output.log_level, e);
        }
    }
}

fn crate_filter(level: &str) -> EnvFilter {
    EnvFilter::new(format!("yt_summarizer={},warn", level))
}

async fn controller(config: &Config) -> Result<(SessionController, Arc<dyn CredentialStore>)> {
    config.validate()?;

    let credentials: Arc<dyn CredentialStore> = Arc::new(FileCredentialStore::new(config.key_file()));
    let pipeline = Pipeline::from_config(config, credentials.clone()).await?;
    let controller = SessionController::new(
        Arc::new(pipeline),
        SessionSettings::from_config(config),
        config.export_dir(),
    );
    Ok((controller, credentials))
}

async fn run(config: Config, url: &str, export: bool) -> Result<()> {
    info!("🚀 YouTube summarizer starting...");
    let (mut controller, _) = controller(&config).await?;

    let session = controller.fetch(url).await?;
    if session.skipped_snippets() > 0 {
        warn!(
            "⚠️ {} caption entries could not be decoded and were skipped",
            session.skipped_snippets()
        );
    }

    let session = controller.summarize().await?;
    println!("{}", session.summary_text());

    if export {
        let report = controller.export().await?;
        for file in &report.files {
            info!("📄 {}", file.display());
        }
    }

    Ok(())
}

async fn fetch(config: Config, url: &str, export: bool) -> Result<()> {
    let (mut controller, _) = controller(&config).await?;

    let session = controller.fetch(url).await?;
    println!("{}", session.transcript_text());
    if session.skipped_snippets() > 0 {
        warn!(
            "⚠️ {} caption entries could not be decoded and were skipped",
            session.skipped_snippets()
        );
    }

    if export {
        let report = controller.export().await?;
        for file in &report.files {
            info!("📄 {}", file.display());
        }
    }

    Ok(())
}

async fn interactive(config: Config) -> Result<()> {
    let (controller, credentials) = controller(&config).await?;
    let input = BufReader::new(tokio::io::stdin());
    let mut session = InteractiveSession::new(controller, credentials, input, tokio::io::stdout());
    session.run().await
}

async fn key(config: Config, action: KeyCommand) -> Result<()> {
    let store = FileCredentialStore::new(config.key_file());

    match action {
        KeyCommand::Set { key, verify } => {
            let key = match key {
                Some(key) => key,
                None => {
                    eprintln!("Enter API key:");
                    let mut line = String::new();
                    BufReader::new(tokio::io::stdin()).read_line(&mut line).await?;
                    line
                }
            };
            let key = key.trim().to_string();
            if key.is_empty() {
                return Err(anyhow!("API key is empty"));
            }

            if verify {
                let llm = create_llm(&config.llm, Some(key.clone()))?;
                verify_credential(llm.as_ref()).await?;
                info!("✅ API key is working");
            }

            store.save(&key)?;
            println!("API key saved to {}", store.path().display());
        }
        KeyCommand::Test => {
            let llm = create_llm(&config.llm, store.load()?)?;
            verify_credential(llm.as_ref()).await?;
            println!("✅ API key is working");
        }
        KeyCommand::Clear => {
            store.delete()?;
            println!("API key removed");
        }
    }

    Ok(())
}

fn config_command(config: Config, action: ConfigCommand) -> Result<()> {
    match action {
        ConfigCommand::Init { path, force } => {
            let path = path.unwrap_or_else(Config::default_path);
            if path.exists() && !force {
                return Err(anyhow!(
                    "{} already exists (use --force to overwrite)",
                    path.display()
                ));
            }
            Config::default().save(&path)?;
            println!("Configuration written to {}", path.display());
        }
        ConfigCommand::Show => {
            println!("{}", config.summary());
            println!();
            println!("{}", toml::to_string_pretty(&config)?);
        }
    }

    Ok(())
}
