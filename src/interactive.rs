use anyhow::Result;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, Lines};
use tracing::debug;

use crate::credentials::CredentialStore;
use crate::error::SummarizerError;
use crate::llm::{ChatModel, GeneratedSummary};
use crate::summary::{LinkStyle, SummaryStyle};
use crate::tasks::BackgroundTask;
use crate::workflow::SessionController;
use crate::youtube::FetchedTranscript;

const PREVIEW_CHARS: usize = 300;

const HELP: &str = "\
Commands:
  fetch <url>          Fetch the transcript (a bare URL works too)
  summarize            Generate an AI summary of the loaded transcript
  export [dir]         Save transcript, summary and data files
  clear                Reset the session
  model [name]         Show or select the chat model
  style [name]         Show or select the summary style
  links plain|markdown Choose how timestamp links are rendered
  show transcript|summary
  status               Show session and settings
  key set <secret>     Store the API key
  key test             Check the stored API key
  key clear            Remove the stored API key
  cancel               Discard the running task
  help                 Show this help
  quit                 Leave
";

enum Pending {
    Fetch(BackgroundTask<crate::Result<FetchedTranscript>>),
    Summarize(BackgroundTask<crate::Result<GeneratedSummary>>),
    Verify(BackgroundTask<crate::Result<()>>),
}

enum Finished {
    Fetch(crate::Result<FetchedTranscript>),
    Summarize(crate::Result<GeneratedSummary>),
    Verify(crate::Result<()>),
}

impl Pending {
    fn label(&self) -> &'static str {
        match self {
            Pending::Fetch(task) => task.label(),
            Pending::Summarize(task) => task.label(),
            Pending::Verify(task) => task.label(),
        }
    }

    async fn completion(&mut self) -> Finished {
        match self {
            Pending::Fetch(task) => Finished::Fetch(task.completion().await.and_then(|r| r)),
            Pending::Summarize(task) => Finished::Summarize(task.completion().await.and_then(|r| r)),
            Pending::Verify(task) => Finished::Verify(task.completion().await.and_then(|r| r)),
        }
    }

    fn discard(self) {
        match self {
            Pending::Fetch(task) => task.discard(),
            Pending::Summarize(task) => task.discard(),
            Pending::Verify(task) => task.discard(),
        }
    }
}

async fn next_completion(pending: &mut Option<Pending>) -> Finished {
    match pending {
        Some(task) => task.completion().await,
        None => std::future::pending().await,
    }
}

/// Line-oriented console over a [`SessionController`].
///
/// Input keeps being read while a fetch or summary runs; results are applied
/// to the session when they arrive.
pub struct InteractiveSession<R, W> {
    controller: SessionController,
    credentials: Arc<dyn CredentialStore>,
    lines: Lines<R>,
    output: W,
    pending: Option<Pending>,
}

impl<R, W> InteractiveSession<R, W>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    pub fn new(controller: SessionController, credentials: Arc<dyn CredentialStore>, input: R, output: W) -> Self {
        Self {
            controller,
            credentials,
            lines: input.lines(),
            output,
            pending: None,
        }
    }

    pub fn controller(&self) -> &SessionController {
        &self.controller
    }

    /// Give back the controller and the output sink
    pub fn into_parts(self) -> (SessionController, W) {
        (self.controller, self.output)
    }

    /// Run until `quit` or end of input. A task still running at that point
    /// is awaited so its result is not lost.
    pub async fn run(&mut self) -> Result<()> {
        self.say("🎬 YouTube transcript summarizer. Type `help` for commands.").await?;
        self.prompt().await?;

        loop {
            tokio::select! {
                line = self.lines.next_line() => {
                    match line? {
                        Some(line) => {
                            if !self.handle_line(line.trim()).await? {
                                break;
                            }
                        }
                        None => break,
                    }
                    self.prompt().await?;
                }
                finished = next_completion(&mut self.pending) => {
                    self.pending = None;
                    self.finish(finished).await?;
                    self.prompt().await?;
                }
            }
        }

        if let Some(mut task) = self.pending.take() {
            self.say(&format!("⏳ Waiting for {} to finish...", task.label())).await?;
            let finished = task.completion().await;
            self.finish(finished).await?;
        }

        Ok(())
    }

    /// Handle one command line. Returns `false` when the user quits.
    pub async fn handle_line(&mut self, line: &str) -> Result<bool> {
        if line.is_empty() {
            return Ok(true);
        }

        let (command, rest) = match line.split_once(char::is_whitespace) {
            Some((command, rest)) => (command, rest.trim()),
            None => (line, ""),
        };
        debug!("Command: {} {}", command, rest);

        match command.to_lowercase().as_str() {
            "quit" | "exit" | "q" => return Ok(false),
            "help" | "?" => self.say(HELP).await?,
            "fetch" => self.fetch(rest).await?,
            "summarize" | "summary" => self.summarize().await?,
            "export" | "save" => self.export(rest).await?,
            "clear" => {
                self.controller.clear();
                self.say("🧹 Session cleared.").await?;
            }
            "model" => self.select_model(rest).await?,
            "style" => self.select_style(rest).await?,
            "links" => self.select_links(rest).await?,
            "show" => self.show(rest).await?,
            "status" => self.status().await?,
            "key" => self.key(rest).await?,
            "cancel" => match self.pending.take() {
                Some(task) => {
                    let label = task.label();
                    task.discard();
                    self.say(&format!("🛑 Discarded {}.", label)).await?;
                }
                None => self.say("Nothing is running.").await?,
            },
            _ if line.contains("youtu") => self.fetch(line).await?,
            other => {
                self.say(&format!("Unknown command '{}'. Type `help` for commands.", other))
                    .await?
            }
        }

        Ok(true)
    }

    async fn busy(&mut self) -> Result<bool> {
        match &self.pending {
            Some(task) => {
                let message = format!(
                    "⏳ Busy: {} is still running. Wait for it or type `cancel`.",
                    task.label()
                );
                self.say(&message).await?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn fetch(&mut self, url: &str) -> Result<()> {
        if self.busy().await? {
            return Ok(());
        }

        match self.controller.start_fetch(url) {
            Ok(task) => {
                self.pending = Some(Pending::Fetch(task));
                self.say("📝 Fetching transcript...").await
            }
            Err(e) => self.report(&e).await,
        }
    }

    async fn summarize(&mut self) -> Result<()> {
        if self.busy().await? {
            return Ok(());
        }

        match self.controller.start_summarize() {
            Ok(task) => {
                self.pending = Some(Pending::Summarize(task));
                let message = format!(
                    "🤖 Generating {} summary with {}...",
                    self.controller.settings().style.label(),
                    self.controller.settings().model
                );
                self.say(&message).await
            }
            Err(e) => self.report(&e).await,
        }
    }

    /// A directory given here becomes the default only once an export to it succeeds
    async fn export(&mut self, dir: &str) -> Result<()> {
        let outcome = if dir.is_empty() {
            self.controller.export().await
        } else {
            let dir = PathBuf::from(dir);
            let outcome = self.controller.export_to(&dir).await;
            if outcome.is_ok() {
                self.controller.set_export_dir(dir);
            }
            outcome
        };

        match outcome {
            Ok(report) => {
                let mut message = format!("💾 Files saved to {}:", report.directory.display());
                for name in report.file_names() {
                    message.push_str("\n  ");
                    message.push_str(&name);
                }
                self.say(&message).await
            }
            Err(e) => self.report(&e).await,
        }
    }

    async fn select_model(&mut self, name: &str) -> Result<()> {
        if name.is_empty() {
            let current = self.controller.settings().model.clone();
            let mut message = format!("Current model: {}\nAvailable:", current);
            for model in ChatModel::KNOWN {
                message.push_str(&format!("\n  {:<14} {}", model.as_str(), model.description()));
            }
            return self.say(&message).await;
        }

        let model = ChatModel::from(name);
        self.controller.settings_mut().model = model.clone();
        self.say(&format!("Model set to {}.", model)).await
    }

    async fn select_style(&mut self, name: &str) -> Result<()> {
        if name.is_empty() {
            let current = self.controller.settings().style;
            let mut message = format!("Current style: {}\nAvailable:", current);
            for style in SummaryStyle::ALL {
                message.push_str(&format!("\n  {:<11} {}", style.key(), style.label()));
            }
            return self.say(&message).await;
        }

        match name.parse::<SummaryStyle>() {
            Ok(style) => {
                self.controller.settings_mut().style = style;
                self.say(&format!("Style set to {}.", style.label())).await
            }
            Err(e) => self.say(&format!("❌ {}", e)).await,
        }
    }

    async fn select_links(&mut self, name: &str) -> Result<()> {
        let link_style = match name.to_lowercase().as_str() {
            "plain" => LinkStyle::Plain,
            "markdown" | "md" => LinkStyle::Markdown,
            _ => return self.say("Usage: links plain|markdown").await,
        };
        self.controller.settings_mut().link_style = link_style;
        self.say(&format!("Links will be rendered as {:?}.", link_style)).await
    }

    async fn show(&mut self, what: &str) -> Result<()> {
        let session = self.controller.session();
        let text = match what {
            "transcript" if session.has_transcript() => session.transcript_text().to_string(),
            "summary" if session.has_summary() => session.summary_text().to_string(),
            "transcript" => "No transcript loaded.".to_string(),
            "summary" => "No summary yet.".to_string(),
            _ => "Usage: show transcript|summary".to_string(),
        };
        self.say(&text).await
    }

    async fn status(&mut self) -> Result<()> {
        let session = self.controller.session();
        let settings = self.controller.settings();

        let video = match session.video_id() {
            Some(id) => format!(
                "{} ({} snippets, {} characters, ~{:.0}s)",
                id,
                session.snippets().len(),
                session.transcript_text().chars().count(),
                session.duration_seconds()
            ),
            None => "none".to_string(),
        };

        let message = format!(
            "Video: {}\nSummary: {}\nModel: {}\nStyle: {}\nLinks: {:?}\nExport dir: {}\nRunning: {}",
            video,
            if session.has_summary() { "yes" } else { "no" },
            settings.model,
            settings.style.label(),
            settings.link_style,
            self.controller.export_dir().display(),
            self.pending.as_ref().map(Pending::label).unwrap_or("nothing")
        );
        self.say(&message).await
    }

    async fn key(&mut self, args: &str) -> Result<()> {
        let (action, secret) = match args.split_once(char::is_whitespace) {
            Some((action, secret)) => (action, secret.trim()),
            None => (args, ""),
        };

        match action {
            "set" if !secret.is_empty() => match self.credentials.save(secret) {
                Ok(()) => self.say("🔑 API key saved.").await,
                Err(e) => self.report(&e).await,
            },
            "clear" => match self.credentials.delete() {
                Ok(()) => self.say("🗑️ API key removed.").await,
                Err(e) => self.report(&e).await,
            },
            "test" => {
                if self.busy().await? {
                    return Ok(());
                }
                match self.controller.workflow().summarizer() {
                    Ok(summarizer) => {
                        let task = BackgroundTask::submit("key test", async move {
                            summarizer.verify_credential().await
                        });
                        self.pending = Some(Pending::Verify(task));
                        self.say("🔑 Testing API key...").await
                    }
                    Err(e) => self.report(&e).await,
                }
            }
            _ => self.say("Usage: key set <secret> | key test | key clear").await,
        }
    }

    async fn finish(&mut self, finished: Finished) -> Result<()> {
        match finished {
            Finished::Fetch(outcome) => match self.controller.apply_fetch(outcome) {
                Ok(session) => {
                    let mut message = format!(
                        "✅ Transcript loaded: {} snippets, {} characters.",
                        session.snippets().len(),
                        session.transcript_text().chars().count()
                    );
                    if session.skipped_snippets() > 0 {
                        message.push_str(&format!(
                            "\n⚠️ {} caption entries could not be decoded and were skipped.",
                            session.skipped_snippets()
                        ));
                    }
                    message.push_str("\n\n");
                    message.push_str(&preview(session.transcript_text()));
                    self.say(&message).await
                }
                Err(e) => self.report(&e).await,
            },
            Finished::Summarize(outcome) => match self.controller.apply_summary(outcome) {
                Ok(session) => {
                    let message = format!("✅ Summary ready:\n\n{}", session.summary_text());
                    self.say(&message).await
                }
                Err(e) => self.report(&e).await,
            },
            Finished::Verify(Ok(())) => self.say("✅ API key is working.").await,
            Finished::Verify(Err(e)) => self.report(&e).await,
        }
    }

    async fn report(&mut self, error: &SummarizerError) -> Result<()> {
        self.say(&format!("❌ {}", error)).await
    }

    async fn prompt(&mut self) -> Result<()> {
        self.output.write_all(b"> ").await?;
        self.output.flush().await?;
        Ok(())
    }

    async fn say(&mut self, message: &str) -> Result<()> {
        self.output.write_all(message.trim_end().as_bytes()).await?;
        self.output.write_all(b"\n").await?;
        self.output.flush().await?;
        Ok(())
    }
}

fn preview(text: &str) -> String {
    let mut preview: String = text.chars().take(PREVIEW_CHARS).collect();
    if text.chars().count() > PREVIEW_CHARS {
        preview.push_str("...");
    }
    preview
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preview() {
        assert_eq!(preview("short"), "short");
        let long = "x".repeat(PREVIEW_CHARS + 10);
        assert_eq!(preview(&long).chars().count(), PREVIEW_CHARS + 3);
    }
}
