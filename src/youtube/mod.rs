/// YouTube-facing pieces: video id recognition and caption retrieval.

pub mod transcript;
pub mod video_id;

pub use transcript::{
    decode_snippets, fetch_transcript, FetchedTranscript, RawSnippet, TranscriptProvider,
    YouTubeTranscriptProvider,
};
pub use video_id::{extract_video_id, require_video_id, VideoId};
