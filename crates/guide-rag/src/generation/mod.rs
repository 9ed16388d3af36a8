//! Answer generation: prompt assembly

pub mod prompt;

pub use prompt::{Prompt, PromptBuilder, DEFAULT_GUIDELINES};
