//! Configuration settings for Vidsum.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Root configuration structure.
///
/// Built once at process start and handed to each component; nothing below
/// the CLI reads the environment.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Settings {
    pub general: GeneralSettings,
    pub audio: AudioSettings,
    pub transcription: TranscriptionSettings,
    pub summarization: SummarizationSettings,
    pub channel: ChannelSettings,
    pub pipeline: PipelineSettings,
    pub prompts: PromptSettings,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            log_level: "warn".to_string(),
        }
    }
}

/// Audio acquisition settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioSettings {
    /// Directory where downloaded audio is written.
    pub output_dir: String,
    /// Keep audio files after a run unless the caller says otherwise.
    pub keep_audio: bool,
    /// Target audio codec/container produced by the downloader.
    pub audio_format: String,
    /// Quality passed to the extractor (bitrate like `192K`, or VBR `0`-`10`).
    pub audio_quality: String,
}

impl Default for AudioSettings {
    fn default() -> Self {
        Self {
            output_dir: "/tmp/vidsum/audio".to_string(),
            keep_audio: false,
            audio_format: "mp3".to_string(),
            audio_quality: "192K".to_string(),
        }
    }
}

/// Speech-to-text settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TranscriptionSettings {
    /// Whisper model name.
    pub model: String,
    /// Recognition language (ISO-639-1). Fixed for every run.
    pub language: String,
    /// Duration in seconds for splitting long audio files before upload.
    pub chunk_duration_seconds: u32,
    /// Maximum concurrent segment uploads.
    pub max_concurrent_chunks: usize,
}

impl Default for TranscriptionSettings {
    fn default() -> Self {
        Self {
            model: WHISPER_API_MODEL.to_string(),
            language: "zh".to_string(),
            chunk_duration_seconds: 600,
            max_concurrent_chunks: 3,
        }
    }
}

/// Hosted Whisper model used in place of a local model size.
const WHISPER_API_MODEL: &str = "whisper-1";

/// Local Whisper checkpoint sizes, optionally with an `.en` suffix.
const LOCAL_WHISPER_SIZES: &[&str] = &["tiny", "base", "small", "medium", "large", "turbo"];

/// Map a `WHISPER_MODEL_SIZE` value to an API model name.
///
/// Local sizes (`base`, `small.en`, `large-v3`...) all run on the hosted
/// model; anything else is taken as an API model name.
fn whisper_api_model(value: &str) -> String {
    let size = value.to_ascii_lowercase();
    let size = size.strip_suffix(".en").unwrap_or(&size);
    let family = size.split('-').next().unwrap_or(size);

    if LOCAL_WHISPER_SIZES.contains(&family) {
        WHISPER_API_MODEL.to_string()
    } else {
        value.to_string()
    }
}

/// Sampling parameters for one kind of generation call.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GenerationParams {
    pub temperature: f32,
    pub max_tokens: u32,
}

/// Summarization settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SummarizationSettings {
    /// Chat model used for every generation call.
    pub model: String,
    /// Texts up to this many characters are polished in a single call.
    pub direct_threshold: usize,
    /// Maximum characters per chunk when map-reducing.
    pub max_chunk_size: usize,
    /// Parameters for the single-call polish.
    pub direct: GenerationParams,
    /// Parameters for each per-chunk summary.
    pub fragment: GenerationParams,
    /// Parameters for the final combining rewrite.
    pub combine: GenerationParams,
}

impl Default for SummarizationSettings {
    fn default() -> Self {
        Self {
            model: "gpt-4o-mini".to_string(),
            direct_threshold: 4000,
            max_chunk_size: 4000,
            direct: GenerationParams {
                temperature: 0.5,
                max_tokens: 1000,
            },
            fragment: GenerationParams {
                temperature: 0.5,
                max_tokens: 500,
            },
            combine: GenerationParams {
                temperature: 0.5,
                max_tokens: 1000,
            },
        }
    }
}

/// Channel discovery settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChannelSettings {
    /// Videos returned when the caller doesn't ask for a count.
    pub default_max_results: usize,
    /// Search entries scanned when looking for a channel endpoint.
    pub search_candidates: usize,
}

impl Default for ChannelSettings {
    fn default() -> Self {
        Self {
            default_max_results: 20,
            search_candidates: 5,
        }
    }
}

/// Pipeline execution settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineSettings {
    /// Budget for each external call in a run, in seconds (0 = unbounded).
    pub stage_timeout_seconds: u64,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            stage_timeout_seconds: 1800,
        }
    }
}

impl PipelineSettings {
    /// Stage budget, if one is configured.
    pub fn stage_timeout(&self) -> Option<Duration> {
        (self.stage_timeout_seconds > 0).then(|| Duration::from_secs(self.stage_timeout_seconds))
    }
}

/// Prompt customization settings.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct PromptSettings {
    /// Directory for custom prompts (overrides defaults).
    pub custom_dir: Option<String>,
    /// Custom variables available in all prompts as {{variable_name}}.
    pub variables: std::collections::HashMap<String, String>,
}

impl Settings {
    /// Load settings from the default configuration file.
    pub fn load() -> crate::error::Result<Self> {
        Self::load_from(None)
    }

    /// Load settings from a specific path, or default location if None.
    ///
    /// Recognised environment variables are applied on top of the file.
    pub fn load_from(path: Option<&PathBuf>) -> crate::error::Result<Self> {
        let config_path = match path {
            Some(p) => p.clone(),
            None => Self::default_config_path(),
        };

        let mut settings = if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            toml::from_str(&content)?
        } else {
            Settings::default()
        };

        settings.apply_overrides(|key| std::env::var(key).ok());
        Ok(settings)
    }

    /// Apply `AUDIO_OUTPUT_DIR`, `WHISPER_MODEL_SIZE`, `OPENAI_MODEL` and
    /// `KEEP_AUDIO_FILES` from the given lookup.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        if let Some(dir) = get("AUDIO_OUTPUT_DIR") {
            self.audio.output_dir = dir;
        }
        if let Some(model) = get("WHISPER_MODEL_SIZE") {
            self.transcription.model = whisper_api_model(&model);
        }
        if let Some(model) = get("OPENAI_MODEL") {
            self.summarization.model = model;
        }
        if let Some(keep) = get("KEEP_AUDIO_FILES") {
            self.audio.keep_audio = keep.eq_ignore_ascii_case("true");
        }
    }

    /// Save settings to the default configuration file.
    pub fn save(&self) -> crate::error::Result<()> {
        self.save_to(&Self::default_config_path())
    }

    /// Save settings to a specific path.
    pub fn save_to(&self, path: &PathBuf) -> crate::error::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| crate::error::VidsumError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get the default configuration file path.
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("vidsum")
            .join("config.toml")
    }

    /// Expand shell variables in paths (e.g., ~).
    pub fn expand_path(path: &str) -> PathBuf {
        PathBuf::from(shellexpand::tilde(path).to_string())
    }

    /// Get the expanded audio output directory.
    pub fn audio_dir(&self) -> PathBuf {
        Self::expand_path(&self.audio.output_dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let settings: Settings = toml::from_str(
            r#"
            [summarization]
            model = "gpt-4.1"
            max_chunk_size = 1200
            "#,
        )
        .unwrap();

        assert_eq!(settings.summarization.model, "gpt-4.1");
        assert_eq!(settings.summarization.max_chunk_size, 1200);
        assert_eq!(settings.summarization.direct_threshold, 4000);
        assert_eq!(settings.summarization.fragment.max_tokens, 500);
        assert_eq!(settings.transcription.language, "zh");
        assert!(!settings.audio.keep_audio);
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            ("AUDIO_OUTPUT_DIR", "/srv/audio"),
            ("WHISPER_MODEL_SIZE", "whisper-large"),
            ("OPENAI_MODEL", " gpt-4.1-mini "),
            ("KEEP_AUDIO_FILES", "TRUE"),
        ]
        .into_iter()
        .collect();

        let mut settings = Settings::default();
        settings.apply_overrides(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(settings.audio_dir(), PathBuf::from("/srv/audio"));
        assert_eq!(settings.transcription.model, "whisper-large");
        assert_eq!(settings.summarization.model, "gpt-4.1-mini");
        assert!(settings.audio.keep_audio);
    }

    #[test]
    fn test_local_whisper_size_maps_to_api_model() {
        for size in ["base", "small.en", "large-v3", "Medium"] {
            let mut settings = Settings::default();
            settings.transcription.model = "custom".to_string();
            settings.apply_overrides(|key| (key == "WHISPER_MODEL_SIZE").then(|| size.to_string()));
            assert_eq!(settings.transcription.model, "whisper-1", "size {size}");
        }
    }

    #[test]
    fn test_empty_override_is_ignored() {
        let mut settings = Settings::default();
        settings.apply_overrides(|key| (key == "OPENAI_MODEL").then(String::new));
        assert_eq!(settings.summarization.model, "gpt-4o-mini");
    }

    #[test]
    fn test_stage_timeout_zero_disables() {
        let mut pipeline = PipelineSettings::default();
        assert_eq!(pipeline.stage_timeout(), Some(Duration::from_secs(1800)));
        pipeline.stage_timeout_seconds = 0;
        assert_eq!(pipeline.stage_timeout(), None);
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut settings = Settings::default();
        settings.channel.default_max_results = 7;
        settings.save_to(&path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let reloaded: Settings = toml::from_str(&content).unwrap();
        assert_eq!(reloaded.channel.default_max_results, 7);
    }
}
