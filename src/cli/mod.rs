//! CLI module for Vidsum.

pub mod commands;
mod output;
pub mod preflight;

pub use output::Output;

use clap::{Parser, Subcommand};

/// Vidsum - video summaries from the command line
///
/// Downloads a video's audio, transcribes it and writes a readable summary,
/// or lists a channel's latest uploads.
#[derive(Parser, Debug)]
#[command(name = "vidsum")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true, env = "VIDSUM_CONFIG")]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Transcribe and summarize a video
    Summarize {
        /// Video URL or 11-character video id
        url: String,

        /// Keep the downloaded audio file
        #[arg(short, long)]
        keep_audio: bool,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },

    /// List a channel's videos, newest first
    Channel {
        /// Channel URL, @handle or channel name
        query: String,

        /// Maximum number of videos (defaults to channel.default_max_results)
        #[arg(short, long)]
        limit: Option<usize>,

        /// Print the listing as JSON
        #[arg(long)]
        json: bool,
    },

    /// Check system requirements and configuration
    Doctor,

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Open configuration file in editor
    Edit,

    /// Show configuration file path
    Path,
}
