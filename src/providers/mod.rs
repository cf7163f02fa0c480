/*!
 * Provider implementations for completion services.
 *
 * This module contains client implementations for the supported LLM providers:
 * - OpenAI: OpenAI chat completions and speech API
 * - Ollama: Local LLM server
 * - Mock: scripted provider used by the test suite
 */

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use bytes::Bytes;
use std::fmt::Debug;
use std::sync::Arc;

use crate::app_config::{CompletionProvider, Config};
use crate::errors::ProviderError;

pub mod mock;
pub mod ollama;
pub mod openai;

/// A single structured completion call
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    /// Instruction prompt sent as the system message
    pub system_prompt: String,
    /// User payload
    pub user_payload: String,
    /// Output token ceiling, if any
    pub max_tokens: Option<u32>,
}

impl CompletionRequest {
    pub fn new(system_prompt: impl Into<String>, user_payload: impl Into<String>) -> Self {
        Self {
            system_prompt: system_prompt.into(),
            user_payload: user_payload.into(),
            max_tokens: None,
        }
    }

    /// Set the output token ceiling
    pub fn with_max_tokens(mut self, max_tokens: Option<u32>) -> Self {
        self.max_tokens = max_tokens;
        self
    }
}

/// Token usage reported for one call
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TokenUsage {
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub cached_tokens: u64,
    pub total_tokens: u64,
}

/// Raw completion text plus usage metrics
#[derive(Debug, Clone)]
pub struct Completion {
    /// Raw text, expected to be a JSON object
    pub text: String,
    /// Usage counters, when the provider reports them
    pub usage: Option<TokenUsage>,
}

/// Common trait for all completion providers
///
/// Implementations always request strict JSON-object output and report a
/// generation that stopped at the token ceiling as
/// `ProviderError::TokenLimitExceeded`.
#[async_trait]
pub trait Provider: Send + Sync + Debug {
    /// Short provider name used in logs
    fn name(&self) -> &str;

    /// Model used for completions
    fn model(&self) -> &str;

    /// Complete a request using this provider
    async fn complete(&self, request: CompletionRequest) -> Result<Completion, ProviderError>;

    /// Test the connection to the provider
    async fn test_connection(&self) -> Result<(), ProviderError>;
}

/// Text-to-speech capability
#[async_trait]
pub trait SpeechProvider: Send + Sync + Debug {
    /// Synthesize `text` and return encoded audio (mp3)
    async fn synthesize(&self, text: &str) -> Result<Bytes, ProviderError>;
}

/// Build the completion client for the active provider
pub fn create_provider(config: &Config) -> Result<Arc<dyn Provider>> {
    let timeout_secs = config.timeout_secs();
    match config.provider {
        CompletionProvider::OpenAI => {
            let api_key = config.get_api_key();
            if api_key.is_empty() {
                return Err(anyhow!("An API key is required for the OpenAI provider"));
            }
            Ok(Arc::new(openai::OpenAI::new(
                api_key,
                config.get_endpoint(),
                config.get_model(),
                timeout_secs,
            )))
        }
        CompletionProvider::Ollama => Ok(Arc::new(
            ollama::Ollama::from_url(&config.get_endpoint(), config.get_model(), timeout_secs)?,
        )),
    }
}

/// Build the speech client, if the active provider offers one
pub fn create_speech_provider(config: &Config) -> Option<Arc<dyn SpeechProvider>> {
    match config.provider {
        CompletionProvider::OpenAI => {
            let api_key = config.get_api_key();
            if api_key.is_empty() {
                return None;
            }
            let client = openai::OpenAI::new(
                api_key,
                config.get_endpoint(),
                config.get_model(),
                config.timeout_secs(),
            )
            .with_speech(&config.speech.model, &config.speech.voice);
            Some(Arc::new(client))
        }
        CompletionProvider::Ollama => None,
    }
}
