//! Transcript summarization.
//!
//! Short transcripts get a single readability rewrite. Long transcripts are
//! map-reduced: each chunk is summarized in order, the partial summaries are
//! joined with blank lines, and one final call rewrites the joined text.
//! Any failed call aborts the whole summary.

mod openai;

pub use openai::OpenAiGenerator;

use crate::chunking::{char_len, chunk_text};
use crate::config::{GenerationParams, PromptPair, Prompts, SummarizationSettings};
use crate::error::{Result, VidsumError};
use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// Separator placed between per-chunk summaries before the final rewrite.
pub const PARTIAL_SEPARATOR: &str = "\n\n";

/// One text-generation call.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub system_prompt: String,
    pub user_prompt: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

/// Text-generation capability (chat completion or similar).
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Generate a completion for the request.
    async fn generate(&self, request: &GenerationRequest) -> Result<String>;
}

/// How a summary was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum SummaryStrategy {
    /// One rewrite call over the whole text.
    Direct,
    /// Per-chunk summaries reduced by a final rewrite.
    MapReduce { chunks: usize },
}

/// Final summary text.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryResult {
    pub text: String,
    pub strategy: SummaryStrategy,
}

/// Applies direct or map-reduce summarization over a [`TextGenerator`].
pub struct Summarizer {
    generator: Arc<dyn TextGenerator>,
    settings: SummarizationSettings,
    prompts: Prompts,
}

impl Summarizer {
    pub fn new(generator: Arc<dyn TextGenerator>, settings: SummarizationSettings) -> Self {
        Self {
            generator,
            settings,
            prompts: Prompts::default(),
        }
    }

    /// Set custom prompts (with user-defined variables).
    pub fn with_prompts(mut self, prompts: Prompts) -> Self {
        self.prompts = prompts;
        self
    }

    /// Summarize with the configured model.
    pub async fn summarize(&self, text: &str) -> Result<SummaryResult> {
        self.summarize_with_model(text, None).await
    }

    /// Summarize, optionally overriding the configured model.
    #[instrument(skip(self, text), fields(text_len = char_len(text)))]
    pub async fn summarize_with_model(
        &self,
        text: &str,
        model: Option<&str>,
    ) -> Result<SummaryResult> {
        let model = model.unwrap_or(&self.settings.model);

        if char_len(text) <= self.settings.direct_threshold {
            info!("Text within single-call budget, polishing directly");
            let summary = self
                .call(&self.prompts.summarize.polish, text, model, self.settings.direct)
                .await
                .map_err(|e| VidsumError::summarization("direct rewrite failed", e))?;

            return Ok(SummaryResult {
                text: summary,
                strategy: SummaryStrategy::Direct,
            });
        }

        let chunks = chunk_text(text, self.settings.max_chunk_size);
        let total = chunks.len();
        info!("Text too long, summarizing {} chunks", total);

        let mut partials = Vec::with_capacity(total);
        for (idx, chunk) in chunks.iter().enumerate() {
            debug!("Summarizing chunk {}/{}", idx + 1, total);
            let partial = self
                .call(&self.prompts.summarize.fragment, chunk, model, self.settings.fragment)
                .await
                .map_err(|e| {
                    VidsumError::summarization(format!("chunk {}/{} failed", idx + 1, total), e)
                })?;
            partials.push(partial);
        }

        let combined = partials.join(PARTIAL_SEPARATOR);
        info!("Combining {} partial summaries", partials.len());

        let summary = self
            .call(&self.prompts.summarize.combine, &combined, model, self.settings.combine)
            .await
            .map_err(|e| VidsumError::summarization("final rewrite failed", e))?;

        info!("Final summary created, length: {}", char_len(&summary));

        Ok(SummaryResult {
            text: summary,
            strategy: SummaryStrategy::MapReduce { chunks: total },
        })
    }

    /// Issue one generation call and reject blank output.
    async fn call(
        &self,
        pair: &PromptPair,
        text: &str,
        model: &str,
        params: GenerationParams,
    ) -> Result<String> {
        let (system_prompt, user_prompt) = self.prompts.render_pair(pair, text);

        let request = GenerationRequest {
            system_prompt,
            user_prompt,
            model: model.to_string(),
            temperature: params.temperature,
            max_tokens: params.max_tokens,
        };

        let output = self.generator.generate(&request).await?;
        if output.trim().is_empty() {
            return Err(VidsumError::OpenAI("Empty response from LLM".to_string()));
        }
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::StubGenerator;
    use std::error::Error as _;

    fn settings(threshold: usize, max_chunk: usize) -> SummarizationSettings {
        SummarizationSettings {
            direct_threshold: threshold,
            max_chunk_size: max_chunk,
            ..SummarizationSettings::default()
        }
    }

    fn prompts() -> Prompts {
        let mut prompts = Prompts::default();
        prompts.summarize.polish.user = "POLISH:{{text}}".to_string();
        prompts.summarize.fragment.user = "FRAGMENT:{{text}}".to_string();
        prompts.summarize.combine.user = "COMBINE:{{text}}".to_string();
        prompts
    }

    #[tokio::test]
    async fn test_short_text_single_call() {
        let generator = Arc::new(StubGenerator::echo_with_prefix("polished:"));
        let summarizer = Summarizer::new(generator.clone(), settings(100, 100)).with_prompts(prompts());

        let result = summarizer.summarize("Short text.").await.unwrap();

        assert_eq!(result.strategy, SummaryStrategy::Direct);
        assert_eq!(result.text, "polished:POLISH:Short text.");

        let calls = generator.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].model, "gpt-4o-mini");
        assert_eq!(calls[0].max_tokens, 1000);
    }

    #[tokio::test]
    async fn test_model_override() {
        let generator = Arc::new(StubGenerator::echo_with_prefix(""));
        let summarizer = Summarizer::new(generator.clone(), settings(100, 100));

        summarizer.summarize_with_model("Hi.", Some("gpt-4.1")).await.unwrap();
        assert_eq!(generator.calls()[0].model, "gpt-4.1");
    }

    #[tokio::test]
    async fn test_map_reduce_preserves_chunk_order() {
        let generator = Arc::new(StubGenerator::echo_with_prefix("S:"));
        let summarizer = Summarizer::new(generator.clone(), settings(10, 12)).with_prompts(prompts());

        let result = summarizer.summarize("aaaa. bbbb. cccc. dddd. eeee. ffff.").await.unwrap();

        assert_eq!(result.strategy, SummaryStrategy::MapReduce { chunks: 3 });

        let calls = generator.calls();
        assert_eq!(calls.len(), 4);
        assert_eq!(calls[0].user_prompt, "FRAGMENT:aaaa. bbbb. ");
        assert_eq!(calls[1].user_prompt, "FRAGMENT:cccc. dddd. ");
        assert_eq!(calls[2].user_prompt, "FRAGMENT:eeee. ffff.");
        assert_eq!(calls[0].max_tokens, 500);

        let expected_combined =
            "S:FRAGMENT:aaaa. bbbb. \n\nS:FRAGMENT:cccc. dddd. \n\nS:FRAGMENT:eeee. ffff.";
        assert_eq!(calls[3].user_prompt, format!("COMBINE:{expected_combined}"));
        assert_eq!(calls[3].max_tokens, 1000);
        assert_eq!(result.text, format!("S:COMBINE:{expected_combined}"));
    }

    #[tokio::test]
    async fn test_failed_chunk_aborts_without_final_call() {
        let generator = Arc::new(StubGenerator::echo_with_prefix("S:").failing_on_call(2));
        let summarizer = Summarizer::new(generator.clone(), settings(10, 12)).with_prompts(prompts());

        let err = summarizer
            .summarize("aaaa. bbbb. cccc. dddd. eeee. ffff.")
            .await
            .unwrap_err();

        assert!(matches!(err, VidsumError::Summarization { .. }));
        assert!(err.to_string().contains("chunk 2/3"));
        assert!(err.source().is_some());
        assert_eq!(generator.calls().len(), 2);
    }

    #[tokio::test]
    async fn test_blank_output_is_error() {
        let generator = Arc::new(StubGenerator::fixed("   "));
        let summarizer = Summarizer::new(generator, settings(100, 100));

        let err = summarizer.summarize("Hello.").await.unwrap_err();
        assert!(matches!(err, VidsumError::Summarization { .. }));
    }

    #[tokio::test]
    async fn test_threshold_is_inclusive() {
        let generator = Arc::new(StubGenerator::fixed("ok"));
        let summarizer = Summarizer::new(generator.clone(), settings(6, 3));

        let result = summarizer.summarize("Hello.").await.unwrap();
        assert_eq!(result.strategy, SummaryStrategy::Direct);
        assert_eq!(generator.calls().len(), 1);
    }
}
