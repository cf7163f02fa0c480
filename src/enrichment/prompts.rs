/*!
 * Instruction prompts sent as the system message of each call.
 */

use anyhow::{Context, Result};
use std::path::Path;

use crate::app_config::Config;
use crate::language_utils;

/// Instruction template with a `{source_language}` placeholder
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTemplate {
    template: String,
}

impl PromptTemplate {
    /// Dictionary entry for one word, optionally disambiguated by a sentence
    pub const DICTIONARY_LOOKUP: &'static str = r#"You are a {source_language} dictionary. The user sends either a single {source_language} word, or a JSON object {"input": word, "context": sentence} where the sentence is the fully vocalized sentence the word was taken from.
Analyse the word as it is used in the context when one is given.
Respond with a single JSON object and nothing else, using exactly these fields:
{"word": the word fully vocalized,
 "language": "{source_language}",
 "pos": part of speech,
 "lemma": dictionary form, vocalized,
 "english_meaning": meaning of this form in English,
 "base_meaning": English meaning of the lemma,
 "transliteration": Latin transliteration of the word,
 "attributes": an object of grammatical features such as gender, number, case, tense, root}
If the input is not a {source_language} word, respond with {"error": "<short reason>"} instead."#;

    /// Whole-sentence translation plus vocalization
    pub const SENTENCE_TRANSLATION: &'static str = r#"Translate into English and fully vocalize the following {source_language} sentence. The user sends {"input": sentence}. Return in valid JSON format only: {"translation": "The lark nested by the road", "vocalized_sentence": "عَشَّشَتْ قُبَّرَةٌ عَلَى طَرِيقٍ"}"#;

    /// Translation and every dictionary entry of a sentence in one reply
    pub const SENTENCE_LOOKUP: &'static str = r#"You are a {source_language} dictionary. The user sends {"sentence": text} where the text is a {source_language} sentence.
Respond with a single JSON object and nothing else:
{"translation": English translation of the whole sentence,
 "words": an array with one entry per whitespace-separated word, in the order they appear, each entry being
   {"word": the word fully vocalized,
    "language": "{source_language}",
    "pos": part of speech,
    "lemma": dictionary form, vocalized,
    "english_meaning": meaning of this form in English,
    "base_meaning": English meaning of the lemma,
    "transliteration": Latin transliteration of the word,
    "attributes": an object of grammatical features such as gender, number, case, tense, root}}
If the text is not {source_language}, respond with {"error": "<short reason>"} instead."#;

    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
        }
    }

    /// Read a template from disk
    pub fn from_file(path: &Path) -> Result<Self> {
        let template = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read prompt file: {}", path.display()))?;
        Ok(Self::new(template.trim().to_string()))
    }

    /// Substitute the language name
    pub fn render(&self, source_language: &str) -> String {
        self.template.replace("{source_language}", source_language)
    }
}

/// Rendered prompts for every call site
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptSet {
    pub lookup: String,
    pub translation: String,
    pub sentence: String,
}

impl PromptSet {
    /// Built-in prompts for `language_name`
    pub fn defaults(language_name: &str) -> Self {
        Self {
            lookup: PromptTemplate::new(PromptTemplate::DICTIONARY_LOOKUP).render(language_name),
            translation: PromptTemplate::new(PromptTemplate::SENTENCE_TRANSLATION).render(language_name),
            sentence: PromptTemplate::new(PromptTemplate::SENTENCE_LOOKUP).render(language_name),
        }
    }

    /// Prompts for the configured language, honouring file overrides
    pub fn load(config: &Config) -> Result<Self> {
        let language_name = language_utils::get_language_name(&config.source_language)?;

        let lookup = match &config.prompts.lookup_prompt_path {
            Some(path) => PromptTemplate::from_file(path)?,
            None => PromptTemplate::new(PromptTemplate::DICTIONARY_LOOKUP),
        };
        let translation = match &config.prompts.translation_prompt_path {
            Some(path) => PromptTemplate::from_file(path)?,
            None => PromptTemplate::new(PromptTemplate::SENTENCE_TRANSLATION),
        };
        let sentence = match &config.prompts.sentence_prompt_path {
            Some(path) => PromptTemplate::from_file(path)?,
            None => PromptTemplate::new(PromptTemplate::SENTENCE_LOOKUP),
        };

        Ok(Self {
            lookup: lookup.render(&language_name),
            translation: translation.render(&language_name),
            sentence: sentence.render(&language_name),
        })
    }
}
