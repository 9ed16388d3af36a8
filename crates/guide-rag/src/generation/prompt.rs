//! Prompt assembly for full-corpus generation

use std::fmt;
use std::path::Path;

use crate::config::PromptConfig;

/// Used when no guidelines file is present
pub const DEFAULT_GUIDELINES: &str =
    "You are a helpful assistant who only answers questions based on the provided context.";

/// A fully assembled prompt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub guidelines: String,
    /// Joined chunk texts, already truncated
    pub context: String,
    pub question: String,
}

impl Prompt {
    /// Rough token estimate used for logging (four characters per token)
    pub fn estimated_tokens(&self) -> usize {
        self.to_string().chars().count() / 4
    }
}

impl fmt::Display for Prompt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}\n\nContext:\n{}\n\nQuestion:\n{}\n\nAnswer:",
            self.guidelines, self.context, self.question
        )
    }
}

/// Builds prompts from ranked chunk texts
#[derive(Debug, Clone)]
pub struct PromptBuilder {
    guidelines: String,
    max_context_length: usize,
}

impl PromptBuilder {
    pub fn new(guidelines: impl Into<String>, max_context_length: usize) -> Self {
        Self {
            guidelines: guidelines.into(),
            max_context_length,
        }
    }

    /// Load guidelines from the configured file once, falling back to the built-in text
    pub fn from_config(config: &PromptConfig) -> Self {
        Self::new(load_guidelines(&config.guidelines_path), config.max_context_length)
    }

    pub fn guidelines(&self) -> &str {
        &self.guidelines
    }

    /// Join chunks with a blank line and hard-cut the context to the character limit
    pub fn build<S: AsRef<str>>(&self, question: &str, chunk_texts: &[S]) -> Prompt {
        let context = chunk_texts
            .iter()
            .map(AsRef::as_ref)
            .collect::<Vec<_>>()
            .join("\n\n");

        let context = if context.chars().count() > self.max_context_length {
            context.chars().take(self.max_context_length).collect()
        } else {
            context
        };

        Prompt {
            guidelines: self.guidelines.clone(),
            context,
            question: question.to_string(),
        }
    }
}

fn load_guidelines(path: &Path) -> String {
    match std::fs::read_to_string(path) {
        Ok(text) => {
            tracing::info!("Loaded guidelines from {}", path.display());
            text.trim().to_string()
        }
        Err(_) => {
            tracing::warn!("Guidelines not found at {}, using default", path.display());
            DEFAULT_GUIDELINES.to_string()
        }
    }
}
