use chrono::{DateTime, Local};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::error::{Result, SummarizerError};
use crate::session::{CaptionSnippet, TranscriptSession};
use crate::summary::strip_link_markup;

const HEADER_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const FILENAME_TIME_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Which optional files an export writes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExportOptions {
    pub write_json: bool,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self { write_json: true }
    }
}

/// Files written by one export, in write order
#[derive(Debug, Clone, PartialEq)]
pub struct ExportReport {
    pub directory: PathBuf,
    pub base_name: String,
    pub files: Vec<PathBuf>,
}

impl ExportReport {
    pub fn file_names(&self) -> Vec<String> {
        self.files
            .iter()
            .filter_map(|p| p.file_name())
            .map(|n| n.to_string_lossy().into_owned())
            .collect()
    }
}

#[derive(Serialize)]
struct ExportRecord<'a> {
    video_url: &'a str,
    video_id: &'a str,
    transcript_data: &'a [CaptionSnippet],
    ai_summary: String,
    generated_at: String,
}

/// `youtube_<id>_<YYYYMMDD_HHMMSS>`
pub fn base_name(video_id: &str, at: &DateTime<Local>) -> String {
    format!("youtube_{}_{}", video_id, at.format(FILENAME_TIME_FORMAT))
}

/// Export the session into `dir` using the current local time
pub async fn export_session(
    session: &TranscriptSession,
    dir: &Path,
    options: ExportOptions,
) -> Result<ExportReport> {
    export_at(session, dir, Local::now(), options).await
}

/// Export the session into `dir` stamped with `now`.
///
/// Writes the transcript, then the summary and the JSON record when a
/// summary exists. The JSON record can be switched off. A failure stops the export; files already written
/// are left in place.
pub async fn export_at(
    session: &TranscriptSession,
    dir: &Path,
    now: DateTime<Local>,
    options: ExportOptions,
) -> Result<ExportReport> {
    let video_id = match session.video_id() {
        Some(id) if !session.snippets().is_empty() => id,
        _ => return Err(SummarizerError::NothingToExport),
    };

    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|e| SummarizerError::io(dir, e))?;

    let base = base_name(video_id.as_str(), &now);
    let stamp = now.format(HEADER_TIME_FORMAT).to_string();
    let mut files = Vec::new();

    let transcript_path = dir.join(format!("{}_transcript.txt", base));
    let transcript = format!(
        "YouTube Video: {}\nTranscript extracted on: {}\n\n{}",
        session.video_url(),
        stamp,
        session.transcript_text()
    );
    write_file(&transcript_path, &transcript).await?;
    files.push(transcript_path);

    let plain_summary = strip_link_markup(session.summary_text());

    if session.has_summary() {
        let summary_path = dir.join(format!("{}_summary.md", base));
        let summary = format!(
            "# AI Summary\n\n**Video:** {}\n**Generated:** {}\n**Model:** {}\n\n{}",
            session.video_url(),
            stamp,
            session.summary_model().unwrap_or("unknown"),
            plain_summary
        );
        write_file(&summary_path, &summary).await?;
        files.push(summary_path);
    }

    if options.write_json && session.has_summary() {
        let json_path = dir.join(format!("{}_data.json", base));
        let record = ExportRecord {
            video_url: session.video_url(),
            video_id: video_id.as_str(),
            transcript_data: session.snippets(),
            ai_summary: plain_summary,
            generated_at: now.to_rfc3339(),
        };
        let json = serde_json::to_string_pretty(&record)?;
        write_file(&json_path, &json).await?;
        files.push(json_path);
    }

    info!("💾 Saved {} file(s) to {}", files.len(), dir.display());

    Ok(ExportReport {
        directory: dir.to_path_buf(),
        base_name: base,
        files,
    })
}

async fn write_file(path: &Path, content: &str) -> Result<()> {
    debug!("Writing {}", path.display());
    tokio::fs::write(path, content)
        .await
        .map_err(|e| SummarizerError::io(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::youtube::{FetchedTranscript, VideoId};
    use chrono::TimeZone;
    use tempfile::TempDir;

    fn session_with_transcript() -> TranscriptSession {
        let mut session = TranscriptSession::new();
        session.apply_fetch(FetchedTranscript {
            video_id: VideoId::parse("dQw4w9WgXcQ").unwrap(),
            video_url: "https://www.youtube.com/watch?v=dQw4w9WgXcQ".to_string(),
            snippets: vec![CaptionSnippet {
                text: "hello".to_string(),
                start: 0.0,
                duration: 1.0,
            }],
            transcript_text: "hello".to_string(),
            skipped: 0,
        });
        session
    }

    fn at(h: u32, m: u32, s: u32) -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 3, 9, h, m, s).unwrap()
    }

    #[test]
    fn test_base_name() {
        assert_eq!(
            base_name("dQw4w9WgXcQ", &at(14, 5, 9)),
            "youtube_dQw4w9WgXcQ_20240309_140509"
        );
    }

    #[tokio::test]
    async fn test_empty_session_has_nothing_to_export() {
        let temp_dir = TempDir::new().unwrap();
        let err = export_at(&TranscriptSession::new(), temp_dir.path(), at(10, 0, 0), ExportOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, SummarizerError::NothingToExport));
    }

    #[tokio::test]
    async fn test_transcript_only_export() {
        let temp_dir = TempDir::new().unwrap();
        let session = session_with_transcript();

        let report = export_at(&session, temp_dir.path(), at(10, 0, 0), ExportOptions::default())
            .await
            .unwrap();

        assert_eq!(report.file_names(), vec!["youtube_dQw4w9WgXcQ_20240309_100000_transcript.txt"]);
        let content = std::fs::read_to_string(&report.files[0]).unwrap();
        assert_eq!(
            content,
            "YouTube Video: https://www.youtube.com/watch?v=dQw4w9WgXcQ\n\
             Transcript extracted on: 2024-03-09 10:00:00\n\nhello"
        );
    }

    #[tokio::test]
    async fn test_full_export_with_summary_and_json() {
        let temp_dir = TempDir::new().unwrap();
        let out_dir = temp_dir.path().join("created").join("on-demand");
        let mut session = session_with_transcript();
        session.apply_summary(
            "Intro 0:10\n🔗 [https://youtu.be/x&t=10s](https://youtu.be/x&t=10s)".to_string(),
            "gpt-4o-mini",
        );

        let report = export_at(&session, &out_dir, at(10, 0, 0), ExportOptions::default())
            .await
            .unwrap();

        assert_eq!(
            report.file_names(),
            vec![
                "youtube_dQw4w9WgXcQ_20240309_100000_transcript.txt",
                "youtube_dQw4w9WgXcQ_20240309_100000_summary.md",
                "youtube_dQw4w9WgXcQ_20240309_100000_data.json",
            ]
        );

        let summary = std::fs::read_to_string(&report.files[1]).unwrap();
        assert!(summary.starts_with(
            "# AI Summary\n\n**Video:** https://www.youtube.com/watch?v=dQw4w9WgXcQ\n\
             **Generated:** 2024-03-09 10:00:00\n**Model:** gpt-4o-mini\n\n"
        ));
        assert!(summary.ends_with("Intro 0:10\n🔗 https://youtu.be/x&t=10s"));

        let json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&report.files[2]).unwrap()).unwrap();
        assert_eq!(json["video_id"], "dQw4w9WgXcQ");
        assert_eq!(json["transcript_data"][0]["text"], "hello");
        assert!(json["ai_summary"].as_str().unwrap().contains("&t=10s"));
        assert!(json["generated_at"].as_str().unwrap().starts_with("2024-03-09T10:00:00"));
    }

    #[tokio::test]
    async fn test_json_can_be_switched_off() {
        let temp_dir = TempDir::new().unwrap();
        let mut session = session_with_transcript();
        session.apply_summary("Intro".to_string(), "gpt-4o-mini");

        let report = export_at(&session, temp_dir.path(), at(10, 0, 0), ExportOptions { write_json: false })
            .await
            .unwrap();
        assert_eq!(report.files.len(), 2);
        assert!(report.file_names()[1].ends_with("_summary.md"));
    }

    #[tokio::test]
    async fn test_exports_one_second_apart_do_not_collide() {
        let temp_dir = TempDir::new().unwrap();
        let session = session_with_transcript();
        let options = ExportOptions::default();

        let first = export_at(&session, temp_dir.path(), at(10, 0, 0), options).await.unwrap();
        let second = export_at(&session, temp_dir.path(), at(10, 0, 1), options).await.unwrap();

        assert_ne!(first.files, second.files);
        assert_eq!(std::fs::read_dir(temp_dir.path()).unwrap().count(), 2);
    }

    #[tokio::test]
    async fn test_unwritable_destination_reports_io_error() {
        let temp_dir = TempDir::new().unwrap();
        let blocker = temp_dir.path().join("file");
        std::fs::write(&blocker, "not a directory").unwrap();

        let err = export_at(
            &session_with_transcript(),
            &blocker.join("sub"),
            at(10, 0, 0),
            ExportOptions::default(),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, SummarizerError::Io { .. }));
    }
}
