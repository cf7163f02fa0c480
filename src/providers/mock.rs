/*!
 * Mock provider implementations for testing.
 *
 * This module provides a mock provider that simulates different behaviors:
 * - `MockProvider::working()` - Always succeeds with well-formed lookup JSON
 * - `MockProvider::failing()` - Always fails with an API error
 * - `MockProvider::rate_limited()` - Always fails with a quota error
 * - `MockProvider::scripted(f)` - Replies chosen per request by a closure
 *
 * Every request is recorded so tests can assert on call counts and payloads.
 */

use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::Mutex;
use serde_json::{Value, json};
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use crate::errors::ProviderError;
use crate::providers::{Completion, CompletionRequest, Provider, SpeechProvider, TokenUsage};

/// Scripted reply for one request
#[derive(Debug, Clone)]
pub enum MockReply {
    /// Return this raw text
    Text(String),
    /// Fail with this error
    Error(ProviderError),
    /// Wait, then produce the inner reply
    Delayed { delay_ms: u64, reply: Box<MockReply> },
}

impl MockReply {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    pub fn delayed(delay_ms: u64, reply: MockReply) -> Self {
        Self::Delayed {
            delay_ms,
            reply: Box::new(reply),
        }
    }
}

/// Behavior mode for the mock provider
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MockBehavior {
    /// Always succeeds with a lookup-shaped JSON object
    Working,
    /// Always fails with an API error
    Failing,
    /// Always fails with a quota error
    RateLimited,
    /// Always fails to connect
    Unreachable,
}

type Responder = Arc<dyn Fn(&CompletionRequest) -> MockReply + Send + Sync>;

/// Mock provider for testing lookup behavior
#[derive(Clone)]
pub struct MockProvider {
    /// Behavior mode
    behavior: MockBehavior,
    /// Custom reply generator (overrides behavior)
    responder: Option<Responder>,
    /// Every request received, in arrival order
    requests: Arc<Mutex<Vec<CompletionRequest>>>,
    /// Calls currently awaiting a reply
    in_flight: Arc<AtomicUsize>,
    /// Highest number of simultaneous calls observed
    peak_in_flight: Arc<AtomicUsize>,
}

impl fmt::Debug for MockProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MockProvider")
            .field("behavior", &self.behavior)
            .field("scripted", &self.responder.is_some())
            .field("request_count", &self.request_count())
            .finish()
    }
}

impl MockProvider {
    /// Create a new mock provider with the specified behavior
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            responder: None,
            requests: Arc::new(Mutex::new(Vec::new())),
            in_flight: Arc::new(AtomicUsize::new(0)),
            peak_in_flight: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Create a working mock provider that always succeeds
    pub fn working() -> Self {
        Self::new(MockBehavior::Working)
    }

    /// Create a failing mock provider that always errors
    pub fn failing() -> Self {
        Self::new(MockBehavior::Failing)
    }

    /// Create a mock provider that always reports exhausted quota
    pub fn rate_limited() -> Self {
        Self::new(MockBehavior::RateLimited)
    }

    /// Create a mock provider that cannot be reached
    pub fn unreachable() -> Self {
        Self::new(MockBehavior::Unreachable)
    }

    /// Create a mock provider whose replies are chosen per request
    pub fn scripted(responder: impl Fn(&CompletionRequest) -> MockReply + Send + Sync + 'static) -> Self {
        Self {
            responder: Some(Arc::new(responder)),
            ..Self::working()
        }
    }

    /// Number of requests received so far
    pub fn request_count(&self) -> usize {
        self.requests.lock().len()
    }

    /// Snapshot of all received requests
    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().clone()
    }

    /// Requests whose user payload carries a `context` field (word enrichment calls)
    pub fn word_requests(&self) -> Vec<CompletionRequest> {
        self.requests()
            .into_iter()
            .filter(|r| payload_field(&r.user_payload, "context").is_some())
            .collect()
    }

    /// Highest number of simultaneous in-flight calls observed
    pub fn peak_in_flight(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }

    /// Calls currently awaiting a reply
    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// A well-formed dictionary entry for `word`
    pub fn word_json(word: &str) -> String {
        Self::word_value(word).to_string()
    }

    fn word_value(word: &str) -> Value {
        json!({
            "word": word,
            "language": "Arabic",
            "pos": "noun",
            "lemma": word,
            "english_meaning": format!("meaning of {}", word),
            "base_meaning": format!("base of {}", word),
            "transliteration": format!("translit-{}", word.chars().count()),
            "attributes": {"gender": "masculine", "number": "singular"}
        })
    }

    /// A well-formed single-call sentence lookup with one entry per word
    pub fn sentence_lookup_json(sentence: &str) -> String {
        let words: Vec<Value> = sentence.split_whitespace().map(Self::word_value).collect();
        json!({
            "translation": format!("[EN] {}", sentence),
            "words": words,
        })
        .to_string()
    }

    /// A well-formed sentence translation
    pub fn translation_json(translation: &str, vocalized: &str) -> String {
        json!({
            "translation": translation,
            "vocalized_sentence": vocalized,
        })
        .to_string()
    }

    /// Default reply for the working behavior
    ///
    /// Payloads carrying `context` get a dictionary entry for their `input`,
    /// payloads with `sentence` get a full sentence lookup, other JSON
    /// payloads with `input` get a translation, and plain text payloads get a
    /// dictionary entry for the text itself.
    pub fn default_reply(request: &CompletionRequest) -> String {
        if payload_field(&request.user_payload, "context").is_some() {
            let word = payload_field(&request.user_payload, "input").unwrap_or_default();
            return Self::word_json(&word);
        }
        if let Some(sentence) = payload_field(&request.user_payload, "sentence") {
            return Self::sentence_lookup_json(&sentence);
        }
        match payload_field(&request.user_payload, "input") {
            Some(sentence) => Self::translation_json(&format!("[EN] {}", sentence), &sentence),
            None => Self::word_json(request.user_payload.trim()),
        }
    }

    fn reply_for(&self, request: &CompletionRequest) -> MockReply {
        if let Some(responder) = &self.responder {
            return responder(request);
        }
        match self.behavior {
            MockBehavior::Working => MockReply::Text(Self::default_reply(request)),
            MockBehavior::Failing => MockReply::Error(ProviderError::ApiError {
                status_code: 500,
                message: "Simulated provider failure".to_string(),
            }),
            MockBehavior::RateLimited => {
                MockReply::Error(ProviderError::RateLimitExceeded("Simulated quota exhaustion".to_string()))
            }
            MockBehavior::Unreachable => {
                MockReply::Error(ProviderError::ConnectionError("Simulated connection refused".to_string()))
            }
        }
    }
}

/// Read a string field from a JSON user payload
pub fn payload_field(payload: &str, field: &str) -> Option<String> {
    let value: Value = serde_json::from_str(payload).ok()?;
    value.get(field)?.as_str().map(str::to_string)
}

struct InFlightGuard<'a>(&'a AtomicUsize);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl Provider for MockProvider {
    fn name(&self) -> &str {
        "mock"
    }

    fn model(&self) -> &str {
        "mock-model"
    }

    async fn complete(&self, request: CompletionRequest) -> Result<Completion, ProviderError> {
        self.requests.lock().push(request.clone());
        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(current, Ordering::SeqCst);
        let _guard = InFlightGuard(&self.in_flight);

        let mut reply = self.reply_for(&request);
        loop {
            match reply {
                MockReply::Delayed { delay_ms, reply: inner } => {
                    tokio::time::sleep(Duration::from_millis(delay_ms)).await;
                    reply = *inner;
                }
                MockReply::Error(error) => return Err(error),
                MockReply::Text(text) => {
                    let input_tokens = (request.system_prompt.len() + request.user_payload.len()) as u64;
                    let output_tokens = text.len() as u64;
                    return Ok(Completion {
                        text,
                        usage: Some(TokenUsage {
                            input_tokens,
                            output_tokens,
                            cached_tokens: 0,
                            total_tokens: input_tokens + output_tokens,
                        }),
                    });
                }
            }
        }
    }

    async fn test_connection(&self) -> Result<(), ProviderError> {
        match self.behavior {
            MockBehavior::Unreachable => Err(ProviderError::ConnectionError("Simulated connection refused".to_string())),
            _ => Ok(()),
        }
    }
}

#[async_trait]
impl SpeechProvider for MockProvider {
    async fn synthesize(&self, text: &str) -> Result<Bytes, ProviderError> {
        match self.behavior {
            MockBehavior::Failing => Err(ProviderError::ApiError {
                status_code: 500,
                message: "Simulated speech failure".to_string(),
            }),
            MockBehavior::RateLimited => Err(ProviderError::RateLimitExceeded("Simulated quota exhaustion".to_string())),
            _ => Ok(Bytes::from(format!("ID3mock:{}", text))),
        }
    }
}
