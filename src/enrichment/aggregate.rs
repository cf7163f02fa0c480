use super::models::{SentenceEnrichmentResult, TranslationResult, WordEnrichment};

/// Joins the translation and the per-word slots into the response
pub struct ResultAggregator;

impl ResultAggregator {
    /// Combine without reordering or dropping slots
    pub fn aggregate(translation: TranslationResult, words: Vec<Option<WordEnrichment>>) -> SentenceEnrichmentResult {
        SentenceEnrichmentResult {
            translation: translation.translation,
            words,
        }
    }
}
