//! Configuration module for Vidsum.
//!
//! Handles loading and managing application settings and prompt templates.

mod prompts;
mod settings;

pub use prompts::{PromptPair, Prompts, SummaryPrompts};
pub use settings::{
    AudioSettings, ChannelSettings, GeneralSettings, GenerationParams, PipelineSettings,
    PromptSettings, Settings, SummarizationSettings, TranscriptionSettings,
};
