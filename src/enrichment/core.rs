/*!
 * Core enrichment service implementation.
 *
 * This module contains the `EnrichmentService`, which gates input, runs the
 * sentence pipeline and serves single-word lookups against one completion
 * provider.
 */

use anyhow::Result;
use log::{debug, error, info, warn};
use serde_json::json;
use std::sync::Arc;
use std::time::{Duration, Instant};

use super::aggregate::ResultAggregator;
use super::call::structured_call;
use super::concurrency::ProviderProfile;
use super::gate::LanguageGate;
use super::models::{PipelineState, SentenceEnrichmentResult, SentenceLookupPayload, WordEnrichment, tokenize};
use super::prompts::PromptSet;
use super::sentence::TranslationStage;
use super::words::WordEnrichmentStage;
use crate::app_config::Config;
use crate::errors::{LookupError, SchemaError};
use crate::providers::{self, CompletionRequest, Provider, TokenUsage};

/// Token usage statistics for one request
#[derive(Debug, Clone)]
pub struct TokenUsageStats {
    /// Number of input (prompt) tokens
    pub input_tokens: u64,

    /// Number of output (completion) tokens
    pub output_tokens: u64,

    /// Number of input tokens served from the provider's prompt cache
    pub cached_tokens: u64,

    /// Total number of tokens
    pub total_tokens: u64,

    /// Number of calls recorded
    pub calls: usize,

    /// Start time of token tracking
    pub start_time: Instant,

    /// Summed latency of all calls
    pub api_duration: Duration,

    /// Provider name
    pub provider: String,

    /// Model name
    pub model: String,
}

impl Default for TokenUsageStats {
    fn default() -> Self {
        Self::new()
    }
}

impl TokenUsageStats {
    /// Create a new empty token usage stats instance
    pub fn new() -> Self {
        Self::with_provider_info(String::new(), String::new())
    }

    /// Create new token usage stats with provider info
    pub fn with_provider_info(provider: String, model: String) -> Self {
        Self {
            input_tokens: 0,
            output_tokens: 0,
            cached_tokens: 0,
            total_tokens: 0,
            calls: 0,
            start_time: Instant::now(),
            api_duration: Duration::from_secs(0),
            provider,
            model,
        }
    }

    /// Record one finished call
    pub fn record(&mut self, usage: Option<&TokenUsage>, elapsed: Duration) {
        self.calls += 1;
        self.api_duration += elapsed;
        if let Some(usage) = usage {
            self.input_tokens += usage.input_tokens;
            self.output_tokens += usage.output_tokens;
            self.cached_tokens += usage.cached_tokens;
            self.total_tokens += usage.total_tokens;
        }
    }

    /// One-line summary of token usage
    pub fn summary(&self) -> String {
        format!(
            "Token usage ({} / {}): {} calls, Input {}, Output {}, Cached {}, Total {}, API time {:.2}s, wall time {:.2}s",
            self.provider,
            self.model,
            self.calls,
            self.input_tokens,
            self.output_tokens,
            self.cached_tokens,
            self.total_tokens,
            self.api_duration.as_secs_f64(),
            self.start_time.elapsed().as_secs_f64()
        )
    }
}

/// Limits for the lookup operations
#[derive(Debug, Clone)]
pub struct EnrichmentOptions {
    /// Output token ceiling for single-word lookups
    pub word_max_tokens: Option<u32>,

    /// Output token ceiling for the single-call sentence lookup
    pub sentence_max_tokens: Option<u32>,

    /// Output token ceiling for the translation call
    pub translation_max_tokens: Option<u32>,

    /// Output token ceiling for each word call of a sentence
    pub enrichment_max_tokens: Option<u32>,

    /// Fan-out defaults for the provider
    pub profile: ProviderProfile,

    /// Fan-out override (`Some(0)` = one slot per word)
    pub max_concurrent_requests: Option<usize>,

    /// Deadline for one sentence request
    pub request_timeout: Duration,
}

impl Default for EnrichmentOptions {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

impl EnrichmentOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            word_max_tokens: config.lookup.word_max_tokens,
            sentence_max_tokens: config.lookup.sentence_max_tokens,
            translation_max_tokens: config.lookup.translation_max_tokens,
            enrichment_max_tokens: config.lookup.enrichment_max_tokens,
            profile: ProviderProfile::for_provider(config.provider),
            max_concurrent_requests: config.concurrent_requests(),
            request_timeout: Duration::from_secs(config.lookup.request_timeout_secs),
        }
    }
}

/// Main lookup service
#[derive(Debug, Clone)]
pub struct EnrichmentService {
    provider: Arc<dyn Provider>,
    gate: LanguageGate,
    prompts: PromptSet,
    translation: TranslationStage,
    words: WordEnrichmentStage,
    options: EnrichmentOptions,
}

impl EnrichmentService {
    pub fn new(provider: Arc<dyn Provider>, gate: LanguageGate, prompts: PromptSet, options: EnrichmentOptions) -> Self {
        let translation = TranslationStage::new(
            Arc::clone(&provider),
            prompts.translation.clone(),
            options.translation_max_tokens,
        );
        let words = WordEnrichmentStage::new(
            Arc::clone(&provider),
            prompts.lookup.clone(),
            options.enrichment_max_tokens,
            options.profile,
            options.max_concurrent_requests,
        );

        Self {
            provider,
            gate,
            prompts,
            translation,
            words,
            options,
        }
    }

    /// Build the service and its provider from the configuration
    pub fn from_config(config: &Config) -> Result<Self> {
        let provider = providers::create_provider(config)?;
        Self::with_provider(config, provider)
    }

    /// Build the service around an existing provider
    pub fn with_provider(config: &Config, provider: Arc<dyn Provider>) -> Result<Self> {
        let gate = LanguageGate::from_script_name(&config.source_script)?;
        let prompts = PromptSet::load(config)?;
        Ok(Self::new(provider, gate, prompts, EnrichmentOptions::from_config(config)))
    }

    pub fn provider(&self) -> &Arc<dyn Provider> {
        &self.provider
    }

    pub fn gate(&self) -> &LanguageGate {
        &self.gate
    }

    pub fn options(&self) -> &EnrichmentOptions {
        &self.options
    }

    /// Check that the completion service answers
    pub async fn check_connection(&self) -> Result<(), LookupError> {
        self.provider.test_connection().await.map_err(|e| {
            warn!("{} connection check failed: {}", self.provider.name(), e);
            LookupError::from(e)
        })
    }

    fn new_stats(&self) -> TokenUsageStats {
        TokenUsageStats::with_provider_info(self.provider.name().to_string(), self.provider.model().to_string())
    }

    /// Dictionary entry for a single word
    ///
    /// A reply carrying an `error` field means the service rejected the
    /// word and is reported as invalid input.
    pub async fn lookup_word(&self, input: &str) -> Result<WordEnrichment, LookupError> {
        self.gate.check(input)?;

        let request = CompletionRequest::new(self.prompts.lookup.clone(), input.trim())
            .with_max_tokens(self.options.word_max_tokens);
        let report = structured_call::<WordEnrichment>(self.provider.as_ref(), request, "word lookup").await;

        let mut stats = self.new_stats();
        stats.record(report.usage.as_ref(), report.elapsed);
        debug!("{}", stats.summary());

        report.result.map_err(|e| match e {
            LookupError::Schema(SchemaError::ServiceReported(reason)) => LookupError::InvalidInput(reason),
            other => {
                error!("Word lookup failed: {}", other);
                other
            }
        })
    }

    /// Translation and every dictionary entry of a sentence in a single call
    ///
    /// A reply carrying an `error` field is reported as invalid input, and a
    /// reply without any word entries as a schema error.
    pub async fn lookup_sentence_single(&self, input: &str) -> Result<SentenceEnrichmentResult, LookupError> {
        self.gate.check(input)?;

        let payload = json!({ "sentence": input.trim() }).to_string();
        let request = CompletionRequest::new(self.prompts.sentence.clone(), payload)
            .with_max_tokens(self.options.sentence_max_tokens);
        let report = self
            .with_deadline(structured_call::<SentenceLookupPayload>(
                self.provider.as_ref(),
                request,
                "sentence lookup",
            ))
            .await?;

        let mut stats = self.new_stats();
        stats.record(report.usage.as_ref(), report.elapsed);
        debug!("{}", stats.summary());

        let payload = report.result.map_err(|e| match e {
            LookupError::Schema(SchemaError::ServiceReported(reason)) => LookupError::InvalidInput(reason),
            other => {
                error!("Sentence lookup failed: {}", other);
                other
            }
        })?;
        if payload.words.is_empty() {
            error!("Sentence lookup returned no word entries");
            return Err(SchemaError::MissingField("words".to_string()).into());
        }

        Ok(SentenceEnrichmentResult::from(payload))
    }

    /// Translate a sentence and enrich each of its words
    ///
    /// The whole pipeline runs under the request deadline; when it expires
    /// every outstanding call is dropped and the request ends `Cancelled`.
    pub async fn lookup_sentence(&self, input: &str) -> Result<SentenceEnrichmentResult, LookupError> {
        let mut state = PipelineState::Idle;
        let outcome = self.with_deadline(self.run_pipeline(input, &mut state)).await;
        if outcome.is_err() && !state.is_terminal() {
            advance(&mut state, PipelineState::Cancelled);
        }
        outcome?
    }

    /// Run `call` under the request deadline
    async fn with_deadline<T>(&self, call: impl Future<Output = T>) -> Result<T, LookupError> {
        tokio::time::timeout(self.options.request_timeout, call).await.map_err(|_| {
            error!("Lookup exceeded {:?}", self.options.request_timeout);
            LookupError::ServiceUnavailable(format!(
                "request did not complete within {}s",
                self.options.request_timeout.as_secs()
            ))
        })
    }

    async fn run_pipeline(
        &self,
        input: &str,
        state: &mut PipelineState,
    ) -> Result<SentenceEnrichmentResult, LookupError> {
        let mut stats = self.new_stats();

        if let Err(e) = self.gate.check(input) {
            advance(state, PipelineState::Failed);
            return Err(e);
        }
        advance(state, PipelineState::LanguageChecked);

        advance(state, PipelineState::Translating);
        let report = self.translation.translate(input).await;
        stats.record(report.usage.as_ref(), report.elapsed);
        let translation = match report.result {
            Ok(translation) => translation,
            Err(e) => {
                advance(state, PipelineState::Failed);
                return Err(e);
            }
        };

        let tokens = tokenize(input);
        advance(state, PipelineState::WordEnrichmentInFlight(tokens.len()));
        let words = self.words.enrich(&tokens, &translation.context, &mut stats).await;

        advance(state, PipelineState::Aggregating);
        let result = ResultAggregator::aggregate(translation, words);
        advance(state, PipelineState::Complete);

        info!(
            "Sentence of {} words enriched ({} empty). {}",
            result.words.len(),
            result.placeholder_count(),
            stats.summary()
        );
        Ok(result)
    }
}

fn advance(state: &mut PipelineState, next: PipelineState) {
    debug_assert!(state.can_transition_to(next), "illegal transition {} -> {}", state, next);
    debug!("Pipeline state: {} -> {}", state, next);
    *state = next;
}
