//! Placeholder substitution for prompt templates.
//!
//! A placeholder is a complete `{name}` unit. The template is scanned once,
//! left to right; each placeholder whose name is known is replaced by its value,
//! and substituted text is never scanned again. Matching whole units means a
//! token can never be partially replaced by another token that happens to be
//! its prefix (`{output}` vs `{outputType}`).

use std::collections::HashMap;

/// Values for the placeholders of one template, keyed by bare name (without braces)
#[derive(Debug, Clone, Default)]
pub struct Replacements {
    values: HashMap<String, String>,
}

impl Replacements {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: &str, value: impl Into<String>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: &str, value: impl Into<String>) {
        let name = name.trim_start_matches('{').trim_end_matches('}');
        self.values.insert(name.to_string(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }
}

/// Replace every known `{name}` in `template`; unknown placeholders and stray braces are kept as is
pub fn render(template: &str, replacements: &Replacements) -> String {
    let mut output = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        output.push_str(&rest[..open]);
        let after_open = &rest[open + 1..];

        // the name runs to the next '}' unless another '{' starts first
        let close = after_open
            .find(['{', '}'])
            .filter(|&i| after_open.as_bytes()[i] == b'}');

        match close.and_then(|i| replacements.get(&after_open[..i]).map(|v| (i, v))) {
            Some((i, value)) => {
                output.push_str(value);
                rest = &after_open[i + 1..];
            }
            None => {
                output.push('{');
                rest = after_open;
            }
        }
    }

    output.push_str(rest);
    output
}
