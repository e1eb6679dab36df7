// src/prompt/mod.rs — Evaluation prompt: template loading and input insertion

use chrono::{SecondsFormat, Utc};
use std::path::{Path, PathBuf};

use crate::infra::config::ReviewConfig;
use crate::infra::paths;

const BUILTIN_TEMPLATE: &str = include_str!("../../templates/outfit_prompt.md");

/// Used when a configured template cannot be read.
pub const FALLBACK_PROMPT: &str = "Review the outfit in the photo. Return a JSON object with \
fit, color, and step_out_readiness scores and comments.";

/// The input section goes right after the first occurrence of this marker.
pub const MARKER: &str = "---";

#[derive(Debug, Clone)]
pub struct PromptTemplate {
    pub raw: String,
    pub source: TemplateSource,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TemplateSource {
    /// Delivered by the remote config service
    Remote,
    /// `[review].prompt_file`
    ConfigFile(PathBuf),
    /// ~/.mirrors/prompt.md
    UserFile(PathBuf),
    /// Shipped with the binary
    BuiltIn,
    /// Minimal instruction after a failed load
    Fallback,
}

impl std::fmt::Display for TemplateSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Remote => write!(f, "remote"),
            Self::ConfigFile(p) => write!(f, "config:{}", p.display()),
            Self::UserFile(p) => write!(f, "user:{}", p.display()),
            Self::BuiltIn => write!(f, "built-in"),
            Self::Fallback => write!(f, "fallback"),
        }
    }
}

impl PromptTemplate {
    pub fn builtin() -> Self {
        Self {
            raw: BUILTIN_TEMPLATE.to_string(),
            source: TemplateSource::BuiltIn,
        }
    }

    pub fn fallback() -> Self {
        Self {
            raw: FALLBACK_PROMPT.to_string(),
            source: TemplateSource::Fallback,
        }
    }

    /// Final prompt for a request made at `time_of_day`.
    pub fn build(&self, time_of_day: &str) -> String {
        build_prompt(time_of_day, &self.raw)
    }
}

/// Load with priority: remote > config file > user file > built-in.
pub fn load_template(config: &ReviewConfig) -> PromptTemplate {
    load_template_from(config, &paths::prompt_path())
}

pub fn load_template_from(config: &ReviewConfig, user_path: &Path) -> PromptTemplate {
    if let Some(remote) = &config.remote_prompt {
        return PromptTemplate {
            raw: remote.clone(),
            source: TemplateSource::Remote,
        };
    }

    if let Some(file) = &config.prompt_file {
        let path = PathBuf::from(file);
        return read_template(&path)
            .map(|raw| PromptTemplate {
                raw,
                source: TemplateSource::ConfigFile(path.clone()),
            })
            .unwrap_or_else(PromptTemplate::fallback);
    }

    if user_path.exists() {
        return read_template(user_path)
            .map(|raw| PromptTemplate {
                raw,
                source: TemplateSource::UserFile(user_path.to_path_buf()),
            })
            .unwrap_or_else(PromptTemplate::fallback);
    }

    PromptTemplate::builtin()
}

fn read_template(path: &Path) -> Option<String> {
    match std::fs::read_to_string(path) {
        Ok(content) if !content.trim().is_empty() => Some(content),
        Ok(_) => {
            tracing::warn!("Prompt template {} is empty, using fallback", path.display());
            None
        }
        Err(e) => {
            tracing::warn!(
                "Could not read prompt template {}: {}, using fallback",
                path.display(),
                e
            );
            None
        }
    }
}

/// Insert the input section after the first `---`; append it when there is no marker.
pub fn build_prompt(time_of_day: &str, template: &str) -> String {
    let input = input_section(time_of_day);
    match template.split_once(MARKER) {
        Some((before, after)) => {
            let mut prompt = String::with_capacity(template.len() + input.len() + 1);
            prompt.push_str(before);
            prompt.push_str(MARKER);
            prompt.push('\n');
            prompt.push_str(&input);
            prompt.push_str(after);
            prompt
        }
        None => format!("{template}\n{input}"),
    }
}

fn input_section(time_of_day: &str) -> String {
    format!("\n**Input:**\n\n- Image: [attach image]\n- Time of day: ({time_of_day})\n")
}

/// RFC 3339 UTC timestamp with milliseconds, e.g. `2026-10-19T08:30:00.123Z`.
pub fn current_time_of_day() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}
