//! Summarize command implementation.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::orchestrator::{Orchestrator, ProcessResult};
use crate::summarize::SummaryStrategy;
use anyhow::Result;

/// Run the summarize command.
pub async fn run_summarize(url: &str, keep_audio: bool, json: bool, settings: Settings) -> Result<()> {
    if let Err(e) = preflight::check(Operation::Summarize) {
        Output::error(&format!("{}", e));
        Output::info("Run 'vidsum doctor' for detailed diagnostics.");
        return Err(e.into());
    }

    let orchestrator = Orchestrator::new(settings)?;

    let spinner = Output::spinner(&format!("Processing {}", url));
    let result = orchestrator.process_video(url, keep_audio).await;
    spinner.finish_and_clear();

    let result = match result {
        Ok(result) => result,
        Err(e) => {
            Output::error(&format!("{}", e));
            return Err(e.into());
        }
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print_result(&result);
    }

    Ok(())
}

fn print_result(result: &ProcessResult) {
    let strategy = match result.summary.strategy {
        SummaryStrategy::Direct => "single pass".to_string(),
        SummaryStrategy::MapReduce { chunks } => format!("{} chunks", chunks),
    };

    Output::header("Summary");
    Output::kv("Video", &result.url);
    Output::kv("Transcript", &format!("{} characters", result.transcript.as_str().chars().count()));
    Output::kv("Strategy", &strategy);
    if let Some(path) = &result.audio_path {
        Output::kv("Audio", &path.display().to_string());
    }
    println!();
    println!("{}", result.summary.text.trim());

    Output::success("Done.");
}
