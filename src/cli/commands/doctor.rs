//! Doctor command - verify system requirements and configuration.

use crate::cli::preflight::version_arg;
use crate::cli::Output;
use crate::config::Settings;
use console::style;
use std::path::Path;
use std::process::Command;

/// Check result for a single item.
#[derive(Debug)]
pub struct CheckResult {
    pub name: String,
    pub status: CheckStatus,
    pub message: String,
    pub hint: Option<String>,
}

#[derive(Debug, PartialEq)]
pub enum CheckStatus {
    Ok,
    Warning,
    Error,
}

impl CheckResult {
    fn ok(name: &str, message: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Ok,
            message: message.to_string(),
            hint: None,
        }
    }

    fn warning(name: &str, message: &str, hint: &str) -> Self {
        Self {
            status: CheckStatus::Warning,
            hint: Some(hint.to_string()),
            ..Self::ok(name, message)
        }
    }

    fn error(name: &str, message: &str, hint: &str) -> Self {
        Self {
            status: CheckStatus::Error,
            hint: Some(hint.to_string()),
            ..Self::ok(name, message)
        }
    }

    fn print(&self) {
        let icon = match self.status {
            CheckStatus::Ok => style("✓").green(),
            CheckStatus::Warning => style("!").yellow(),
            CheckStatus::Error => style("✗").red(),
        };

        println!("  {} {} - {}", icon, style(&self.name).bold(), self.message);

        if let Some(hint) = &self.hint {
            println!("    {} {}", style("→").dim(), style(hint).dim());
        }
    }
}

/// Run all diagnostic checks.
pub fn run_doctor(settings: &Settings) -> anyhow::Result<()> {
    Output::header("Vidsum Doctor");
    println!();

    let sections = [
        (
            "External Tools",
            vec![
                check_tool("yt-dlp", install_hint_ytdlp()),
                check_tool("ffmpeg", install_hint_ffmpeg()),
                check_tool("ffprobe", install_hint_ffmpeg()),
            ],
        ),
        ("API Configuration", vec![check_openai_api_key()]),
        ("Directories", vec![check_output_dir(&settings.audio_dir())]),
        ("Configuration", vec![check_config_file()]),
    ];

    for (title, checks) in &sections {
        println!("{}", style(title).bold());
        for check in checks {
            check.print();
        }
        println!();
    }

    let checks: Vec<&CheckResult> = sections.iter().flat_map(|(_, c)| c).collect();
    let errors = checks.iter().filter(|c| c.status == CheckStatus::Error).count();
    let warnings = checks.iter().filter(|c| c.status == CheckStatus::Warning).count();

    if errors > 0 {
        Output::error(&format!(
            "{} error(s) found. Please fix them before using Vidsum.",
            errors
        ));
        anyhow::bail!("{} doctor check(s) failed", errors);
    } else if warnings > 0 {
        Output::warning(&format!("All checks passed with {} warning(s).", warnings));
    } else {
        Output::success("All checks passed! Vidsum is ready to use.");
    }

    Ok(())
}

/// Check if an external tool is available.
fn check_tool(name: &str, hint: &str) -> CheckResult {
    match Command::new(name).arg(version_arg(name)).output() {
        Ok(output) if output.status.success() => {
            let version = String::from_utf8_lossy(&output.stdout)
                .lines()
                .next()
                .unwrap_or("installed")
                .trim()
                .chars()
                .take(50)
                .collect::<String>();
            CheckResult::ok(name, &version)
        }
        Ok(_) => CheckResult::error(name, "installed but not working", hint),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            CheckResult::error(name, "not found", hint)
        }
        Err(e) => CheckResult::error(name, &format!("error: {}", e), hint),
    }
}

/// Check if OpenAI API key is configured.
fn check_openai_api_key() -> CheckResult {
    classify_api_key(std::env::var("OPENAI_API_KEY").ok().as_deref())
}

fn classify_api_key(key: Option<&str>) -> CheckResult {
    const NAME: &str = "OPENAI_API_KEY";
    const HINT: &str = "Set with: export OPENAI_API_KEY='sk-...'";

    match key {
        Some(key) if key.starts_with("sk-") && key.len() > 20 => {
            let masked = format!("{}...{}", &key[..7], &key[key.len() - 4..]);
            CheckResult::ok(NAME, &format!("configured ({})", masked))
        }
        Some("") => CheckResult::error(NAME, "empty", HINT),
        Some(_) => CheckResult::warning(
            NAME,
            "set but format looks unusual",
            "Expected format: sk-... (OpenAI API key)",
        ),
        None => CheckResult::error(NAME, "not set", HINT),
    }
}

/// Check the audio output directory can be created and written.
fn check_output_dir(dir: &Path) -> CheckResult {
    const NAME: &str = "Audio directory";

    if !dir.exists() {
        return CheckResult::warning(
            NAME,
            &format!("{} (will be created)", dir.display()),
            "Directory will be created on first use",
        );
    }

    match tempfile::Builder::new().prefix(".vidsum-probe").tempfile_in(dir) {
        Ok(_) => CheckResult::ok(NAME, &dir.display().to_string()),
        Err(e) => CheckResult::error(
            NAME,
            &format!("{} is not writable: {}", dir.display(), e),
            "Fix permissions or set audio.output_dir / AUDIO_OUTPUT_DIR",
        ),
    }
}

/// Check if config file exists.
fn check_config_file() -> CheckResult {
    let config_path = Settings::default_config_path();
    if config_path.exists() {
        CheckResult::ok("Config file", &format!("{}", config_path.display()))
    } else {
        CheckResult::warning("Config file", "using defaults", "Create with: vidsum config edit")
    }
}

/// Platform-specific install hint for yt-dlp.
fn install_hint_ytdlp() -> &'static str {
    if cfg!(target_os = "macos") {
        "Install with: brew install yt-dlp"
    } else if cfg!(target_os = "linux") {
        "Install with: pip install yt-dlp (or your package manager)"
    } else {
        "Install from: https://github.com/yt-dlp/yt-dlp"
    }
}

/// Platform-specific install hint for ffmpeg.
fn install_hint_ffmpeg() -> &'static str {
    if cfg!(target_os = "macos") {
        "Install with: brew install ffmpeg"
    } else if cfg!(target_os = "linux") {
        "Install with: sudo apt install ffmpeg (or your package manager)"
    } else {
        "Install from: https://ffmpeg.org/download.html"
    }
}
