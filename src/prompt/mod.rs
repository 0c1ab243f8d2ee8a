//! Prompt construction from a game definition and the player's selection.

pub mod builder;
pub mod format;
pub mod template;

pub use builder::{build_evaluation_prompt, build_output_prompt};
pub use template::{render, Replacements};
