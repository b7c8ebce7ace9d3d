mod common;

use common::{Harness, MockLLM, MockTranscripts};

use yt_summarizer::credentials::CredentialStore;
use yt_summarizer::{InteractiveSession, SessionController, SummaryStyle};

const URL: &str = "https://www.youtube.com/watch?v=dQw4w9WgXcQ";

async fn run_script(harness: &Harness, controller: SessionController, script: &str) -> (SessionController, String) {
    let mut session = InteractiveSession::new(controller, harness.credentials.clone(), script.as_bytes(), Vec::new());
    session.run().await.unwrap();
    let (controller, output) = session.into_parts();
    (controller, String::from_utf8(output).unwrap())
}

#[tokio::test]
async fn test_fetch_then_summarize_then_export() {
    let harness = Harness::new(MockTranscripts::hello(), MockLLM::replying("Intro 0:10"));

    // End of input waits for the running task, so each script is deterministic
    let (controller, output) = run_script(&harness, harness.controller(), &format!("{}\n", URL)).await;
    assert!(output.contains("Fetching transcript"));
    assert!(output.contains("Transcript loaded: 1 snippets, 5 characters"));
    assert_eq!(controller.session().transcript_text(), "hello");

    let (controller, output) = run_script(&harness, controller, "summarize\n").await;
    assert!(output.contains("Summary ready"));
    assert!(output.contains("&t=10s"));
    assert!(controller.session().has_summary());

    let (controller, output) = run_script(&harness, controller, "export\nquit\n").await;
    assert!(output.contains("Files saved to"));
    assert!(output.contains("_summary.md"));
    assert_eq!(std::fs::read_dir(controller.export_dir()).unwrap().count(), 3);
}

#[tokio::test]
async fn test_failed_export_keeps_export_dir() {
    let harness = Harness::new(MockTranscripts::hello(), MockLLM::replying("ok"));
    let blocker = harness.export_dir.path().join("file");
    std::fs::write(&blocker, "not a directory").unwrap();
    let (controller, _) = run_script(&harness, harness.controller(), &format!("fetch {}\n", URL)).await;
    let original = controller.export_dir().to_path_buf();

    let script = format!("export {}\n", blocker.join("sub").display());
    let (controller, output) = run_script(&harness, controller, &script).await;
    assert!(output.contains("❌"));
    assert!(!output.contains("Files saved to"));
    assert_eq!(controller.export_dir(), original.as_path());

    let elsewhere = harness.export_dir.path().join("elsewhere");
    let script = format!("export {}\n", elsewhere.display());
    let (controller, output) = run_script(&harness, controller, &script).await;
    assert!(output.contains("Files saved to"));
    assert_eq!(controller.export_dir(), elsewhere.as_path());
}

#[tokio::test]
async fn test_second_request_while_busy_is_refused() {
    let harness = Harness::new(MockTranscripts::hello(), MockLLM::replying("ok"));
    let mut session = InteractiveSession::new(
        harness.controller(),
        harness.credentials.clone(),
        "".as_bytes(),
        Vec::new(),
    );

    assert!(session.handle_line(&format!("fetch {}", URL)).await.unwrap());
    assert!(session.handle_line("summarize").await.unwrap());
    assert!(session.handle_line("cancel").await.unwrap());

    let (controller, output) = session.into_parts();
    let output = String::from_utf8(output).unwrap();
    assert!(output.contains("Busy: fetch is still running"));
    assert!(output.contains("Discarded fetch"));
    assert!(!controller.session().has_transcript());
}

#[tokio::test]
async fn test_errors_are_reported_and_session_continues() {
    let harness = Harness::new(MockTranscripts::failing("Video unavailable"), MockLLM::replying("ok"));

    let (controller, output) = run_script(
        &harness,
        harness.controller(),
        "fetch https://example.com\nsummarize\nexport\nbogus\n",
    )
    .await;

    assert!(output.contains("Invalid YouTube URL"));
    assert!(output.contains("No transcript available to summarize"));
    assert!(output.contains("No content to save"));
    assert!(output.contains("Unknown command 'bogus'"));
    assert!(!controller.session().has_transcript());

    let (_, output) = run_script(&harness, controller, &format!("fetch {}\n", URL)).await;
    assert!(output.contains("This video is unavailable or private."));
}

#[tokio::test]
async fn test_settings_commands() {
    let harness = Harness::new(MockTranscripts::hello(), MockLLM::replying("ok"));

    let (controller, output) = run_script(
        &harness,
        harness.controller(),
        "model\nmodel gpt-4o\nstyle brief\nstyle verbose\nlinks markdown\nstatus\n",
    )
    .await;

    assert!(output.contains("gpt-3.5-turbo"));
    assert!(output.contains("Model set to gpt-4o."));
    assert!(output.contains("Style set to Brief overview."));
    assert!(output.contains("unknown summary style"));
    assert!(output.contains("Video: none"));

    let settings = controller.settings();
    assert_eq!(settings.model.as_str(), "gpt-4o");
    assert_eq!(settings.style, SummaryStyle::Brief);
    assert_eq!(settings.link_style, yt_summarizer::LinkStyle::Markdown);
}

#[tokio::test]
async fn test_key_commands() {
    let harness = Harness::new(MockTranscripts::hello(), MockLLM::replying("OK"));

    let (_, output) = run_script(&harness, harness.controller(), "key clear\nkey set sk-new\nkey test\n").await;
    assert!(output.contains("API key removed."));
    assert!(output.contains("API key saved."));
    assert!(output.contains("API key is working."));
    assert_eq!(harness.credentials.load().unwrap(), Some("sk-new".to_string()));
}

#[tokio::test]
async fn test_clear_command() {
    let harness = Harness::new(MockTranscripts::hello(), MockLLM::replying("ok"));
    let (controller, _) = run_script(&harness, harness.controller(), &format!("fetch {}\n", URL)).await;
    assert!(controller.session().has_transcript());

    let (controller, output) = run_script(&harness, controller, "clear\n").await;
    assert!(output.contains("Session cleared."));
    assert!(!controller.session().has_transcript());
}
