/*!
 * Per-word enrichment stage.
 *
 * One call per token, all conditioned on the same vocalized sentence. Calls
 * run concurrently up to the fan-out bound and are joined before returning.
 * A failed word leaves an empty slot at its position; it never fails the
 * sentence.
 */

use futures::stream::{self, StreamExt};
use log::{debug, warn};
use serde_json::json;
use std::sync::Arc;

use super::call::structured_call;
use super::concurrency::ProviderProfile;
use super::core::TokenUsageStats;
use super::models::{Token, WordEnrichment};
use crate::providers::{CompletionRequest, Provider};

/// Fans out dictionary lookups for every token of a sentence
#[derive(Debug, Clone)]
pub struct WordEnrichmentStage {
    provider: Arc<dyn Provider>,
    prompt: String,
    max_tokens: Option<u32>,
    profile: ProviderProfile,
    limit_override: Option<usize>,
}

impl WordEnrichmentStage {
    pub fn new(
        provider: Arc<dyn Provider>,
        prompt: impl Into<String>,
        max_tokens: Option<u32>,
        profile: ProviderProfile,
        limit_override: Option<usize>,
    ) -> Self {
        Self {
            provider,
            prompt: prompt.into(),
            max_tokens,
            profile,
            limit_override,
        }
    }

    /// Number of calls allowed in flight for a sentence of `token_count` words
    pub fn fan_out_limit(&self, token_count: usize) -> usize {
        self.profile
            .effective_concurrent_requests(self.limit_override, token_count)
            .max(1)
    }

    /// Enrich every token; `result[i]` belongs to `tokens[i]`
    pub async fn enrich(
        &self,
        tokens: &[Token],
        context: &str,
        stats: &mut TokenUsageStats,
    ) -> Vec<Option<WordEnrichment>> {
        let limit = self.fan_out_limit(tokens.len());
        debug!("Enriching {} words with up to {} concurrent calls", tokens.len(), limit);

        let calls: Vec<_> = tokens
            .iter()
            .enumerate()
            .map(|(slot, token)| {
                let payload = json!({ "input": token.text, "context": context }).to_string();
                let request = CompletionRequest::new(self.prompt.clone(), payload).with_max_tokens(self.max_tokens);
                let provider = Arc::clone(&self.provider);

                async move {
                    let report = structured_call::<WordEnrichment>(provider.as_ref(), request, "word").await;
                    (slot, report)
                }
            })
            .collect();

        let outcomes: Vec<_> = stream::iter(calls).buffer_unordered(limit).collect().await;

        let mut slots: Vec<Option<WordEnrichment>> = vec![None; tokens.len()];
        for (slot, report) in outcomes {
            stats.record(report.usage.as_ref(), report.elapsed);
            match report.result {
                Ok(entry) => slots[slot] = Some(entry),
                Err(e) => warn!("Word {} ({}) left empty: {}", tokens[slot].index, tokens[slot].text, e),
            }
        }

        slots
    }
}
