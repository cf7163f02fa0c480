/*!
 * Provider-specific fan-out tuning.
 *
 * The word stage runs one call per token; this module decides how many of
 * those calls may be awaiting a reply at the same time.
 */

use crate::app_config::CompletionProvider;

/// Provider-specific concurrency profile with tuned defaults
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProviderProfile {
    /// Maximum simultaneous word lookups
    pub max_concurrent_requests: usize,
}

impl ProviderProfile {
    /// Get the default profile for a given provider
    pub fn for_provider(provider: CompletionProvider) -> Self {
        match provider {
            // Hosted, rate limited per minute rather than per connection
            CompletionProvider::OpenAI => Self {
                max_concurrent_requests: 10,
            },
            // Local model, requests queue on one GPU
            CompletionProvider::Ollama => Self {
                max_concurrent_requests: 4,
            },
        }
    }

    /// Effective bound for a sentence of `token_count` words
    ///
    /// `Some(0)` lifts the bound: every word gets its own slot.
    pub fn effective_concurrent_requests(&self, user_override: Option<usize>, token_count: usize) -> usize {
        match user_override {
            Some(0) => token_count.max(1),
            Some(limit) => limit,
            None => self.max_concurrent_requests,
        }
    }
}
