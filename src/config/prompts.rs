//! Prompt templates for Vidsum.
//!
//! Prompts can be customized by placing a `summarize.toml` file in the custom prompts directory.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// Collection of all prompt templates.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Prompts {
    pub summarize: SummaryPrompts,
    /// Custom variables from config, available in all prompts.
    #[serde(skip)]
    pub variables: HashMap<String, String>,
}

/// A system/user prompt pair. The user template receives `{{text}}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptPair {
    pub system: String,
    pub user: String,
}

/// Prompts for the three kinds of summarization calls.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SummaryPrompts {
    /// Single-call readability rewrite for short transcripts.
    pub polish: PromptPair,
    /// Summary of one fragment of a long transcript.
    pub fragment: PromptPair,
    /// Final rewrite of the joined fragment summaries.
    pub combine: PromptPair,
}

const REWRITE_INSTRUCTIONS: &str = "Rewrite the following text so it reads well. \
Do not summarize or drop content; only turn it into fluent, readable prose. \
Fix typos and mis-transcribed words, and repair sentences that don't flow. \
Answer in the same language as the text.";

impl Default for SummaryPrompts {
    fn default() -> Self {
        Self {
            polish: PromptPair {
                system: "You are an assistant that works with transcripts of spoken video content."
                    .to_string(),
                user: format!("{REWRITE_INSTRUCTIONS}\n\n{{{{text}}}}"),
            },
            fragment: PromptPair {
                system: "You are an assistant that summarizes transcripts of video content. \
                         Briefly summarize the fragment you are given, in its own language."
                    .to_string(),
                user: "Summarize this fragment of a video transcript:\n{{text}}".to_string(),
            },
            combine: PromptPair {
                system: "You are an assistant that summarizes transcripts of video content. \
                         Merge the partial summaries you are given into one coherent text."
                    .to_string(),
                user: format!("{REWRITE_INSTRUCTIONS}\n\n{{{{text}}}}"),
            },
        }
    }
}

impl Prompts {
    /// Load prompts from the default location, with optional custom directory and variables.
    pub fn load(
        custom_dir: Option<&str>,
        custom_variables: Option<&HashMap<String, String>>,
    ) -> crate::error::Result<Self> {
        let mut prompts = Prompts::default();

        if let Some(vars) = custom_variables {
            prompts.variables = vars.clone();
        }

        if let Some(dir) = custom_dir {
            let custom_path = PathBuf::from(shellexpand::tilde(dir).to_string());

            let summarize_path = custom_path.join("summarize.toml");
            if summarize_path.exists() {
                let content = std::fs::read_to_string(&summarize_path)?;
                prompts.summarize = toml::from_str(&content)?;
            }
        }

        Ok(prompts)
    }

    /// Render a prompt template with the given variables.
    pub fn render(template: &str, vars: &HashMap<String, String>) -> String {
        let mut result = template.to_string();
        for (key, value) in vars {
            result = result.replace(&format!("{{{{{}}}}}", key), value);
        }
        result
    }

    /// Render a pair's user template around `text`, returning (system, user).
    ///
    /// Custom variables are filled in first and `text` last, so placeholders
    /// inside the text itself are left alone.
    pub fn render_pair(&self, pair: &PromptPair, text: &str) -> (String, String) {
        let mut custom = self.variables.clone();
        custom.remove("text");

        let system = Self::render(&pair.system, &custom);
        let user = Self::render(&pair.user, &custom).replace("{{text}}", text);
        (system, user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_prompts_take_text() {
        let prompts = Prompts::default();
        for pair in [
            &prompts.summarize.polish,
            &prompts.summarize.fragment,
            &prompts.summarize.combine,
        ] {
            assert!(!pair.system.is_empty());
            assert!(pair.user.contains("{{text}}"));
        }
    }

    #[test]
    fn test_render_template() {
        let template = "Hello {{name}}, you have {{count}} messages.";
        let mut vars = HashMap::new();
        vars.insert("name".to_string(), "Alice".to_string());
        vars.insert("count".to_string(), "5".to_string());

        let result = Prompts::render(template, &vars);
        assert_eq!(result, "Hello Alice, you have 5 messages.");
    }

    #[test]
    fn test_render_pair_uses_custom_variables() {
        let mut prompts = Prompts::default();
        prompts.variables.insert("audience".to_string(), "students".to_string());
        let pair = PromptPair {
            system: "Write for {{audience}}.".to_string(),
            user: "Text: {{text}}".to_string(),
        };

        let (system, user) = prompts.render_pair(&pair, "hello");
        assert_eq!(system, "Write for students.");
        assert_eq!(user, "Text: hello");
    }

    #[test]
    fn test_render_pair_leaves_placeholders_in_text() {
        let mut prompts = Prompts::default();
        prompts.variables.insert("audience".to_string(), "students".to_string());
        prompts.variables.insert("text".to_string(), "ignored".to_string());
        let pair = PromptPair {
            system: "Write for {{audience}}.".to_string(),
            user: "For {{audience}}: {{text}}".to_string(),
        };

        let (_, user) = prompts.render_pair(&pair, "He said {{audience}} and {{text}}.");
        assert_eq!(user, "For students: He said {{audience}} and {{text}}.");
    }

    #[test]
    fn test_load_custom_dir() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("summarize.toml"),
            r#"
            [fragment]
            system = "custom"
            user = "F: {{text}}"
            "#,
        )
        .unwrap();

        let prompts = Prompts::load(dir.path().to_str(), None).unwrap();
        assert_eq!(prompts.summarize.fragment.system, "custom");
        assert_eq!(prompts.summarize.polish.system, SummaryPrompts::default().polish.system);
    }
}
