//! Vidsum - video transcripts and summaries
//!
//! Turns a video link into a readable summary and lists a channel's uploads.
//!
//! # Overview
//!
//! Vidsum allows you to:
//! - Download a video's audio and transcribe it with Whisper
//! - Polish short transcripts, or map-reduce long ones into a summary
//! - Find a channel from a URL, handle or name and list its latest videos
//!
//! # Architecture
//!
//! - `config` - Configuration and prompt templates
//! - `source` - Video references and platform search
//! - `audio` - Audio download, splitting and artifact lifecycle
//! - `transcription` - Speech-to-text
//! - `chunking` - Sentence-based text chunking
//! - `summarize` - Direct and map-reduce summarization
//! - `channel` - Channel resolution cascade
//! - `orchestrator` - Pipeline coordination
//!
//! # Example
//!
//! ```rust,no_run
//! use vidsum::config::Settings;
//! use vidsum::orchestrator::Orchestrator;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load()?;
//!     let orchestrator = Orchestrator::new(settings)?;
//!
//!     let result = orchestrator
//!         .process_video("https://www.youtube.com/watch?v=dQw4w9WgXcQ", false)
//!         .await?;
//!     println!("{}", result.summary.text);
//!
//!     Ok(())
//! }
//! ```

pub mod audio;
pub mod channel;
pub mod chunking;
pub mod cli;
pub mod config;
pub mod error;
pub mod openai;
pub mod orchestrator;
pub mod source;
pub mod summarize;
pub mod transcription;

#[cfg(test)]
pub(crate) mod testing;

pub use error::{Result, VidsumError};
