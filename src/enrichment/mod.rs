/*!
 * Word and sentence enrichment.
 *
 * A sentence request flows through four stages:
 *
 * 1. `gate`: script check, before any call is made
 * 2. `sentence`: one call for the English translation and the vocalized
 *    sentence
 * 3. `words`: one concurrent call per whitespace token, conditioned on the
 *    vocalized sentence; failures leave an empty slot
 * 4. `aggregate`: ordered join of the two
 *
 * `core::EnrichmentService` wires the stages together and also serves
 * single-word lookups.
 */

pub mod aggregate;
pub mod call;
pub mod concurrency;
pub mod core;
pub mod gate;
pub mod models;
pub mod prompts;
pub mod sentence;
pub mod words;

// Re-export main types
pub use self::core::{EnrichmentOptions, EnrichmentService, TokenUsageStats};
pub use gate::LanguageGate;
pub use models::{EnrichmentRequest, SentenceEnrichmentResult, Token, TranslationResult, WordEnrichment};
