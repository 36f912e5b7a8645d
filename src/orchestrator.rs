//! Pipeline orchestrator for Vidsum.
//!
//! Runs one video through acquisition, transcription and summarization, and
//! owns the audio artifact for the length of the run.

use crate::audio::{AudioAcquirer, AudioArtifact, MediaDownloader, ReleaseOutcome, YtDlpDownloader};
use crate::config::{Prompts, Settings};
use crate::error::{Result, VidsumError};
use crate::source::VideoReference;
use crate::summarize::{OpenAiGenerator, SummaryResult, Summarizer, TextGenerator};
use crate::transcription::{SpeechToText, Transcriber, TranscriptText, WhisperTranscriber};
use serde::Serialize;
use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::error::Elapsed;
use tracing::{debug, info, instrument, warn};

/// Outcome of one pipeline run.
#[derive(Debug, Clone, Serialize)]
pub struct ProcessResult {
    pub video_id: String,
    pub url: String,
    pub transcript: TranscriptText,
    pub summary: SummaryResult,
    /// Where the audio was left, when retention was requested.
    pub audio_path: Option<PathBuf>,
}

/// The main orchestrator for the Vidsum pipeline.
pub struct Orchestrator {
    settings: Settings,
    acquirer: AudioAcquirer,
    transcriber: Transcriber,
    summarizer: Summarizer,
}

impl Orchestrator {
    /// Create an orchestrator backed by yt-dlp, Whisper and OpenAI chat.
    pub fn new(settings: Settings) -> Result<Self> {
        let downloader = Arc::new(YtDlpDownloader::new(
            &settings.audio.audio_format,
            &settings.audio.audio_quality,
        ));
        let speech = Arc::new(WhisperTranscriber::new(&settings.transcription)?);
        let generator = Arc::new(OpenAiGenerator::new()?);

        Self::with_components(settings, downloader, speech, generator)
    }

    /// Create an orchestrator with custom capabilities.
    pub fn with_components(
        settings: Settings,
        downloader: Arc<dyn MediaDownloader>,
        speech: Arc<dyn SpeechToText>,
        generator: Arc<dyn TextGenerator>,
    ) -> Result<Self> {
        let prompts = Prompts::load(
            settings.prompts.custom_dir.as_deref(),
            Some(&settings.prompts.variables),
        )?;

        let acquirer = AudioAcquirer::new(downloader, &settings.audio.audio_format);
        let transcriber = Transcriber::new(speech, &settings.transcription.language);
        let summarizer =
            Summarizer::new(generator, settings.summarization.clone()).with_prompts(prompts);

        Ok(Self {
            settings,
            acquirer,
            transcriber,
            summarizer,
        })
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Download, transcribe and summarize one video.
    ///
    /// The audio file is released when the run ends, successful or not; it
    /// stays on disk when `retain_audio` or `audio.keep_audio` is set.
    #[instrument(skip(self))]
    pub async fn process_video(&self, url: &str, retain_audio: bool) -> Result<ProcessResult> {
        let reference = VideoReference::parse(url)?;
        let retain = retain_audio || self.settings.audio.keep_audio;
        let output_dir = self.settings.audio_dir();

        info!("Acquiring audio for {}", reference.id());
        let artifact = within(
            self.stage_timeout(),
            "audio acquisition",
            self.acquirer.acquire_audio(&reference, &output_dir),
            VidsumError::acquisition,
        )
        .await?;

        let outcome = self.transcribe_and_summarize(&artifact).await;

        let audio_path = artifact.path().to_path_buf();
        match artifact.release(retain) {
            ReleaseOutcome::Retained => info!("Audio kept at {}", audio_path.display()),
            ReleaseOutcome::InUse => debug!("Audio still in use by another run"),
            ReleaseOutcome::Deleted | ReleaseOutcome::Abandoned => {}
        }

        let (transcript, summary) = outcome?;
        Ok(ProcessResult {
            video_id: reference.id().to_string(),
            url: reference.url().to_string(),
            transcript,
            summary,
            audio_path: retain.then_some(audio_path),
        })
    }

    async fn transcribe_and_summarize(
        &self,
        artifact: &AudioArtifact,
    ) -> Result<(TranscriptText, SummaryResult)> {
        let timeout = self.stage_timeout();

        info!("Transcribing {}", artifact.video_id());
        let transcript = within(
            timeout,
            "transcription",
            self.transcriber
                .transcribe(artifact, &self.settings.transcription.model),
            VidsumError::transcription,
        )
        .await?;

        info!("Summarizing transcript");
        let summary = within(
            timeout,
            "summarization",
            self.summarizer.summarize(transcript.as_str()),
            VidsumError::summarization,
        )
        .await?;

        Ok((transcript, summary))
    }

    fn stage_timeout(&self) -> Option<Duration> {
        self.settings.pipeline.stage_timeout()
    }
}

/// Run `fut` under an optional time budget, mapping an elapsed budget
/// through `on_timeout`.
async fn within<T, F, E>(limit: Option<Duration>, stage: &str, fut: F, on_timeout: E) -> Result<T>
where
    F: Future<Output = Result<T>>,
    E: FnOnce(String, Elapsed) -> VidsumError,
{
    let Some(limit) = limit else {
        return fut.await;
    };

    match tokio::time::timeout(limit, fut).await {
        Ok(result) => result,
        Err(elapsed) => {
            warn!("{} exceeded {}s", stage, limit.as_secs());
            Err(on_timeout(format!("{stage} timed out after {}s", limit.as_secs()), elapsed))
        }
    }
}
