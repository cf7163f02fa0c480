/*!
 * Text-to-speech output.
 *
 * Synthesized audio is written as mp3 to the configured directory under a
 * name that is unique per call: `{unix_seconds}_{uuid}.mp3`.
 */

use log::{error, info};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use uuid::Uuid;

use crate::app_config::Config;
use crate::errors::{AppError, LookupError};
use crate::providers::{self, SpeechProvider};

/// A written audio file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SpeechFile {
    /// File name relative to the output directory
    pub filename: String,
    /// Full path of the written file
    #[serde(skip)]
    pub path: PathBuf,
}

/// Synthesizes text and stores the audio
#[derive(Debug, Clone)]
pub struct SpeechService {
    provider: Arc<dyn SpeechProvider>,
    output_dir: PathBuf,
}

impl SpeechService {
    pub fn new(provider: Arc<dyn SpeechProvider>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            provider,
            output_dir: output_dir.into(),
        }
    }

    /// Speech service for the active provider, if it supports speech
    pub fn from_config(config: &Config) -> Option<Self> {
        providers::create_speech_provider(config).map(|provider| Self::new(provider, config.speech.output_dir.clone()))
    }

    pub fn output_dir(&self) -> &PathBuf {
        &self.output_dir
    }

    /// Synthesize `text` and write it to a new mp3 file
    pub async fn synthesize(&self, text: &str) -> Result<SpeechFile, AppError> {
        if text.trim().is_empty() {
            return Err(LookupError::InvalidInput("input is empty".to_string()).into());
        }

        let audio = self.provider.synthesize(text).await.map_err(|e| {
            error!("Speech synthesis failed: {}", e);
            AppError::Lookup(LookupError::from(e))
        })?;

        let filename = unique_filename();
        let path = self.output_dir.join(&filename);

        tokio::fs::create_dir_all(&self.output_dir)
            .await
            .map_err(|e| AppError::File(format!("Failed to create {}: {}", self.output_dir.display(), e)))?;
        tokio::fs::write(&path, &audio)
            .await
            .map_err(|e| AppError::File(format!("Failed to write {}: {}", path.display(), e)))?;

        info!("Wrote {} bytes of speech to {}", audio.len(), path.display());
        Ok(SpeechFile { filename, path })
    }
}

/// `{unix_seconds}_{uuid_v4}.mp3`
pub fn unique_filename() -> String {
    format!("{}_{}.mp3", chrono::Utc::now().timestamp(), Uuid::new_v4())
}
