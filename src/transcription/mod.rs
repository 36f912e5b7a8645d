//! Speech-to-text for acquired audio.
//!
//! [`Transcriber`] is the stage adapter used by the pipeline: it checks the
//! artifact is still on disk, calls a [`SpeechToText`] backend with the fixed
//! recognition language, and rejects empty results.

mod whisper;

pub use whisper::WhisperTranscriber;

use crate::audio::AudioArtifact;
use crate::error::{Result, VidsumError};
use async_trait::async_trait;
use serde::Serialize;
use std::fmt;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, instrument};

/// Speech-to-text capability.
#[async_trait]
pub trait SpeechToText: Send + Sync {
    /// Recognize speech in the audio file at `audio_path`.
    async fn transcribe(&self, audio_path: &Path, model: &str, language: &str) -> Result<String>;
}

/// Raw text produced by transcription.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct TranscriptText(String);

impl TranscriptText {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for TranscriptText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for TranscriptText {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Transcription stage over a [`SpeechToText`] backend.
pub struct Transcriber {
    backend: Arc<dyn SpeechToText>,
    language: String,
}

impl Transcriber {
    /// `language` is used for every call made by this transcriber.
    pub fn new(backend: Arc<dyn SpeechToText>, language: &str) -> Self {
        Self {
            backend,
            language: language.to_string(),
        }
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    /// Transcribe an acquired artifact.
    pub async fn transcribe(&self, artifact: &AudioArtifact, model: &str) -> Result<TranscriptText> {
        self.transcribe_file(artifact.path(), model).await
    }

    /// Transcribe an audio file by path.
    #[instrument(skip(self), fields(path = %audio_path.display(), language = %self.language))]
    pub async fn transcribe_file(&self, audio_path: &Path, model: &str) -> Result<TranscriptText> {
        if !audio_path.exists() {
            return Err(VidsumError::NotFound(audio_path.to_path_buf()));
        }

        let text = self
            .backend
            .transcribe(audio_path, model, &self.language)
            .await
            .map_err(|e| VidsumError::transcription("speech recognition failed", e))?;

        if text.trim().is_empty() {
            return Err(VidsumError::Transcription {
                message: "no speech recognized".to_string(),
                source: None,
            });
        }

        info!("Transcribed {} characters", text.chars().count());
        Ok(TranscriptText(text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::StubSpeechToText;

    #[tokio::test]
    async fn test_transcribe_passes_model_and_language() {
        let tmp = tempfile::tempdir().unwrap();
        let audio = tmp.path().join("clip.mp3");
        std::fs::write(&audio, b"audio").unwrap();

        let backend = Arc::new(StubSpeechToText::returning("你好，世界。"));
        let transcriber = Transcriber::new(backend.clone(), "zh");

        let text = transcriber.transcribe_file(&audio, "whisper-1").await.unwrap();

        assert_eq!(text.as_str(), "你好，世界。");
        assert_eq!(
            backend.calls(),
            vec![(audio.clone(), "whisper-1".to_string(), "zh".to_string())]
        );
    }

    #[tokio::test]
    async fn test_missing_file_is_not_found() {
        let backend = Arc::new(StubSpeechToText::returning("text"));
        let transcriber = Transcriber::new(backend.clone(), "zh");

        let err = transcriber
            .transcribe_file(Path::new("/nonexistent/vidsum/clip.mp3"), "whisper-1")
            .await
            .unwrap_err();

        assert!(matches!(err, VidsumError::NotFound(_)));
        assert!(backend.calls().is_empty());
    }

    #[tokio::test]
    async fn test_blank_text_is_error() {
        let tmp = tempfile::tempdir().unwrap();
        let audio = tmp.path().join("clip.mp3");
        std::fs::write(&audio, b"audio").unwrap();

        let transcriber = Transcriber::new(Arc::new(StubSpeechToText::returning(" \n ")), "zh");
        let err = transcriber.transcribe_file(&audio, "whisper-1").await.unwrap_err();

        assert!(matches!(err, VidsumError::Transcription { source: None, .. }));
    }

    #[tokio::test]
    async fn test_backend_failure_is_wrapped() {
        let tmp = tempfile::tempdir().unwrap();
        let audio = tmp.path().join("clip.mp3");
        std::fs::write(&audio, b"audio").unwrap();

        let transcriber = Transcriber::new(Arc::new(StubSpeechToText::failing()), "zh");
        let err = transcriber.transcribe_file(&audio, "whisper-1").await.unwrap_err();

        assert!(matches!(err, VidsumError::Transcription { source: Some(_), .. }));
    }
}
