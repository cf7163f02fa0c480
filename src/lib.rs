/*!
 * # qamus - AI-backed Arabic dictionary and sentence reader
 *
 * A Rust library that enriches Arabic text with translations and per-word
 * dictionary entries produced by a language-model completion service.
 *
 * ## Features
 *
 * - Single-word dictionary lookup (part of speech, lemma, meanings,
 *   transliteration, grammatical attributes)
 * - Sentence lookup: one translation call, then one concurrent lookup per
 *   word, conditioned on the vocalized sentence
 * - Single-call sentence lookup for short sentences
 * - Per-word failure isolation with order-preserving results
 * - Completion providers:
 *   - OpenAI API
 *   - Ollama (local LLM)
 * - Text-to-speech output to mp3
 * - HTTP API (axum) and CLI
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `app_config`: Configuration management
 * - `enrichment`: Lookup pipeline:
 *   - `enrichment::gate`: Script check before any call
 *   - `enrichment::sentence`: Sentence translation stage
 *   - `enrichment::words`: Concurrent per-word enrichment
 *   - `enrichment::aggregate`: Ordered result assembly
 *   - `enrichment::core`: The `EnrichmentService`
 * - `validation`: Schema validation of completion payloads
 * - `providers`: Client implementations for completion services:
 *   - `providers::openai`: OpenAI API client
 *   - `providers::ollama`: Ollama API client
 *   - `providers::mock`: Scriptable provider for tests
 * - `speech`: Text-to-speech file output
 * - `server`: HTTP routes
 * - `language_utils`: ISO language code utilities
 * - `logging`: Coloured stderr logger with an optional log file
 * - `errors`: Custom error types for the application
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod enrichment;
pub mod errors;
pub mod language_utils;
pub mod logging;
pub mod providers;
pub mod server;
pub mod speech;
pub mod validation;

// Re-export main types for easier usage
pub use app_config::Config;
pub use enrichment::{EnrichmentService, SentenceEnrichmentResult, WordEnrichment};
pub use errors::{AppError, LookupError, ProviderError, SchemaError};
pub use language_utils::get_language_name;
pub use speech::SpeechService;
