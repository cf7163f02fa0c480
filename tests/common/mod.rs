/*!
 * Common test utilities for the qamus test suite
 */

use std::sync::Arc;

use qamus::app_config::{CompletionProvider, Config};
use qamus::enrichment::EnrichmentService;
use qamus::providers::CompletionRequest;
use qamus::providers::mock::{MockProvider, payload_field};

/// Install a test logger once; repeated calls are no-ops
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Default configuration with a dummy OpenAI key and a short request deadline
pub fn test_config() -> Config {
    let mut config = Config::default();
    config.provider_config_mut(CompletionProvider::OpenAI).api_key = "sk-test".to_string();
    config.lookup.request_timeout_secs = 5;
    config
}

/// Enrichment service backed by a clone of `provider`
pub fn service_with(provider: &MockProvider) -> EnrichmentService {
    service_with_config(&test_config(), provider)
}

/// Enrichment service for `config` backed by a clone of `provider`
pub fn service_with_config(config: &Config, provider: &MockProvider) -> EnrichmentService {
    init_logging();
    EnrichmentService::with_provider(config, Arc::new(provider.clone()))
        .expect("test config should build a service")
}

/// Whether `request` is a per-word call of the sentence pipeline
pub fn is_word_call(request: &CompletionRequest) -> bool {
    payload_field(&request.user_payload, "context").is_some()
}

/// The word a per-word call asks about
pub fn word_of(request: &CompletionRequest) -> String {
    payload_field(&request.user_payload, "input").unwrap_or_default()
}
