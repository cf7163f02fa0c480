/*!
 * Whole-sentence translation stage.
 */

use log::error;
use serde_json::json;
use std::sync::Arc;

use super::call::{CallReport, structured_call};
use super::models::{TranslationPayload, TranslationResult};
use crate::providers::{CompletionRequest, Provider};

/// Produces the English translation and the vocalized context
#[derive(Debug, Clone)]
pub struct TranslationStage {
    provider: Arc<dyn Provider>,
    prompt: String,
    max_tokens: Option<u32>,
}

impl TranslationStage {
    pub fn new(provider: Arc<dyn Provider>, prompt: impl Into<String>, max_tokens: Option<u32>) -> Self {
        Self {
            provider,
            prompt: prompt.into(),
            max_tokens,
        }
    }

    /// Translate `text`; any failure is fatal to the request
    pub async fn translate(&self, text: &str) -> CallReport<TranslationResult> {
        let payload = json!({ "input": text }).to_string();
        let request = CompletionRequest::new(self.prompt.clone(), payload).with_max_tokens(self.max_tokens);

        let report = structured_call::<TranslationPayload>(self.provider.as_ref(), request, "translation").await;
        if let Err(e) = &report.result {
            error!("Sentence translation failed: {}", e);
        }

        CallReport {
            result: report.result.map(TranslationResult::from),
            usage: report.usage,
            elapsed: report.elapsed,
        }
    }
}
