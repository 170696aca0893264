//! Context assembly for generation prompts.
//!
//! Joins retrieved chunk texts with single spaces in ranked order, bounded
//! by a character budget. Lengths are counted in Unicode scalar values.

use std::collections::HashSet;

use crate::domain::models::{RetrievalConfig, SimilarityResult};

/// Context used when retrieval found nothing.
pub const NO_CONTEXT_SENTINEL: &str = "No relevant context found.";

/// Default context budget in characters.
pub const DEFAULT_MAX_CONTEXT_CHARS: usize = 8_000;

const SEPARATOR: &str = " ";

/// Bounds applied while assembling context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextPolicy {
    /// Maximum context length; `None` disables the bound.
    pub max_chars: Option<usize>,
    /// Skip chunks whose text already appeared.
    pub deduplicate: bool,
}

impl Default for ContextPolicy {
    fn default() -> Self {
        Self {
            max_chars: Some(DEFAULT_MAX_CONTEXT_CHARS),
            deduplicate: false,
        }
    }
}

impl ContextPolicy {
    /// No length cap and no deduplication.
    pub const fn unbounded() -> Self {
        Self {
            max_chars: None,
            deduplicate: false,
        }
    }
}

impl From<&RetrievalConfig> for ContextPolicy {
    fn from(config: &RetrievalConfig) -> Self {
        Self {
            max_chars: config.max_context_chars,
            deduplicate: config.deduplicate,
        }
    }
}

/// Joins retrieved chunks into the context block for generation.
#[derive(Debug, Clone, Default)]
pub struct ContextAssembler {
    policy: ContextPolicy,
}

impl ContextAssembler {
    /// Assembler applying `policy`.
    pub const fn new(policy: ContextPolicy) -> Self {
        Self { policy }
    }

    /// Active policy.
    pub const fn policy(&self) -> &ContextPolicy {
        &self.policy
    }

    /// Build the context string for `results`.
    ///
    /// Whole chunks are kept while they fit the budget. A first chunk that
    /// alone exceeds it is cut at a character boundary.
    pub fn assemble(&self, results: &[SimilarityResult]) -> String {
        let mut context = String::new();
        let mut used = 0usize;
        let mut seen = HashSet::new();

        for result in results {
            let text = result.text.as_str();
            if self.policy.deduplicate && !seen.insert(text) {
                continue;
            }

            let len = text.chars().count();
            if context.is_empty() {
                match self.policy.max_chars {
                    Some(max) if len > max => {
                        context.extend(text.chars().take(max));
                        break;
                    }
                    _ => {
                        context.push_str(text);
                        used = len;
                    }
                }
                continue;
            }

            let next = used + SEPARATOR.len() + len;
            if self.policy.max_chars.is_some_and(|max| next > max) {
                break;
            }
            context.push_str(SEPARATOR);
            context.push_str(text);
            used = next;
        }

        if context.is_empty() {
            NO_CONTEXT_SENTINEL.to_string()
        } else {
            context
        }
    }
}
