/*!
 * Data model for lookup requests and results.
 *
 * All values are request-scoped: they are created while a request runs and
 * dropped with it.
 */

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::validation::ResponseSchema;
use crate::validation::schema::string_map;

/// Incoming lookup request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrichmentRequest {
    pub input: String,
}

/// A whitespace-delimited word with its position in the input
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub index: usize,
    pub text: String,
}

/// Split `text` on whitespace, keeping order and positions
pub fn tokenize(text: &str) -> Vec<Token> {
    text.split_whitespace()
        .enumerate()
        .map(|(index, word)| Token {
            index,
            text: word.to_string(),
        })
        .collect()
}

/// Dictionary entry for one word
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WordEnrichment {
    pub word: String,
    pub language: String,
    pub pos: String,
    pub lemma: String,
    pub english_meaning: String,
    pub base_meaning: String,
    pub transliteration: String,
    #[serde(default, deserialize_with = "string_map")]
    pub attributes: BTreeMap<String, String>,
}

impl ResponseSchema for WordEnrichment {
    const NAME: &'static str = "dictionary entry";
    const REQUIRED_FIELDS: &'static [&'static str] = &[
        "word",
        "language",
        "pos",
        "lemma",
        "english_meaning",
        "base_meaning",
        "transliteration",
    ];
    const NON_EMPTY_FIELDS: &'static [&'static str] = &["word"];
}

/// Raw translation-stage payload
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct TranslationPayload {
    pub translation: String,
    pub vocalized_sentence: String,
}

impl ResponseSchema for TranslationPayload {
    const NAME: &'static str = "sentence translation";
    const REQUIRED_FIELDS: &'static [&'static str] = &["translation", "vocalized_sentence"];
    const NON_EMPTY_FIELDS: &'static [&'static str] = &["translation"];
}

/// Sentence-level translation plus the context shared with every word call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationResult {
    /// English gloss of the whole sentence
    pub translation: String,
    /// Fully vocalized sentence, used to condition word lookups
    pub context: String,
}

impl From<TranslationPayload> for TranslationResult {
    fn from(payload: TranslationPayload) -> Self {
        Self {
            translation: payload.translation,
            context: payload.vocalized_sentence,
        }
    }
}

/// Raw payload of the single-call sentence lookup
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct SentenceLookupPayload {
    pub translation: String,
    pub words: Vec<WordEnrichment>,
}

impl ResponseSchema for SentenceLookupPayload {
    const NAME: &'static str = "sentence lookup";
    const REQUIRED_FIELDS: &'static [&'static str] = &["translation", "words"];
    const NON_EMPTY_FIELDS: &'static [&'static str] = &["translation"];
}

/// Final sentence response; `words[i]` belongs to the i-th whitespace token
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentenceEnrichmentResult {
    pub translation: String,
    pub words: Vec<Option<WordEnrichment>>,
}

impl SentenceEnrichmentResult {
    /// Number of words that were enriched
    pub fn enriched_count(&self) -> usize {
        self.words.iter().filter(|w| w.is_some()).count()
    }

    /// Number of placeholder slots
    pub fn placeholder_count(&self) -> usize {
        self.words.len() - self.enriched_count()
    }
}

impl From<SentenceLookupPayload> for SentenceEnrichmentResult {
    fn from(payload: SentenceLookupPayload) -> Self {
        Self {
            translation: payload.translation,
            words: payload.words.into_iter().map(Some).collect(),
        }
    }
}

/// Lifecycle of one sentence request
///
/// `Failed` is only reachable before the word stage starts. `Cancelled`
/// records a deadline or a dropped request and is reachable from any
/// non-terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Idle,
    LanguageChecked,
    Translating,
    WordEnrichmentInFlight(usize),
    Aggregating,
    Complete,
    Failed,
    Cancelled,
}

impl PipelineState {
    /// Whether `next` is a legal successor of this state
    pub fn can_transition_to(&self, next: PipelineState) -> bool {
        use PipelineState::*;
        matches!(
            (self, next),
            (Idle, LanguageChecked)
                | (LanguageChecked, Translating)
                | (Translating, WordEnrichmentInFlight(_))
                | (WordEnrichmentInFlight(_), Aggregating)
                | (Aggregating, Complete)
                | (Idle | LanguageChecked | Translating, Failed)
        ) || (next == Cancelled && !self.is_terminal())
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Complete | Self::Failed | Self::Cancelled)
    }
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::WordEnrichmentInFlight(n) => write!(f, "WordEnrichmentInFlight({})", n),
            other => write!(f, "{:?}", other),
        }
    }
}
