//! OpenAI Whisper speech-to-text backend.

use super::SpeechToText;
use crate::audio::{split_audio, AudioSegment};
use crate::config::TranscriptionSettings;
use crate::error::{Result, VidsumError};
use crate::openai::create_client;
use async_openai::types::{AudioInput, AudioResponseFormat, CreateTranscriptionRequestArgs};
use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use std::path::Path;
use tracing::{debug, info, instrument};

/// Whisper transcriber that splits long audio before upload.
pub struct WhisperTranscriber {
    client: async_openai::Client<async_openai::config::OpenAIConfig>,
    chunk_duration_seconds: u32,
    max_concurrent_chunks: usize,
}

impl WhisperTranscriber {
    pub fn new(settings: &TranscriptionSettings) -> Result<Self> {
        Ok(Self {
            client: create_client()?,
            chunk_duration_seconds: settings.chunk_duration_seconds,
            max_concurrent_chunks: settings.max_concurrent_chunks.max(1),
        })
    }

    /// Upload one file and return its text.
    #[instrument(skip(self), fields(audio_path = %audio_path.display()))]
    async fn transcribe_single(&self, audio_path: &Path, model: &str, language: &str) -> Result<String> {
        debug!("Uploading audio for transcription");

        let file_bytes = tokio::fs::read(audio_path).await?;
        let file_name = audio_path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("audio.mp3")
            .to_string();

        let request = CreateTranscriptionRequestArgs::default()
            .file(AudioInput::from_vec_u8(file_name, file_bytes))
            .model(model)
            .language(language)
            .response_format(AudioResponseFormat::Json)
            .build()
            .map_err(|e| VidsumError::OpenAI(format!("Failed to build request: {e}")))?;

        let response = self
            .client
            .audio()
            .transcribe(request)
            .await
            .map_err(|e| VidsumError::OpenAI(format!("Whisper API error: {e}")))?;

        Ok(response.text.trim().to_string())
    }
}

#[async_trait]
impl SpeechToText for WhisperTranscriber {
    async fn transcribe(&self, audio_path: &Path, model: &str, language: &str) -> Result<String> {
        let scratch = tempfile::tempdir()?;
        let segments = split_audio(audio_path, scratch.path(), self.chunk_duration_seconds).await?;

        if segments.len() == 1 {
            return self.transcribe_single(audio_path, model, language).await;
        }

        let total = segments.len();
        info!("Transcribing {} segments with {}", total, model);

        let mut stream = stream::iter(segments.into_iter().enumerate())
            .map(|(idx, segment)| async move {
                let result = self.transcribe_single(&segment.path, model, language).await;
                (idx, segment, result)
            })
            .buffer_unordered(self.max_concurrent_chunks);

        let mut texts: Vec<(usize, String)> = Vec::with_capacity(total);
        while let Some((idx, segment, result)) = stream.next().await {
            let text = result.map_err(|e| segment_error(idx, total, &segment, e))?;
            debug!("Segment {}/{} done", idx + 1, total);
            texts.push((idx, text));
        }

        Ok(join_in_order(texts))
    }
}

fn segment_error(idx: usize, total: usize, segment: &AudioSegment, cause: VidsumError) -> VidsumError {
    VidsumError::transcription(
        format!("segment {}/{} at {:.0}s failed", idx + 1, total, segment.offset),
        cause,
    )
}

/// Join segment texts by segment index, skipping empty ones.
fn join_in_order(mut texts: Vec<(usize, String)>) -> String {
    texts.sort_by_key(|(idx, _)| *idx);
    texts
        .into_iter()
        .map(|(_, text)| text)
        .filter(|text| !text.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}
