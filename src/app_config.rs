use anyhow::{Context, Result, anyhow};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::default::Default;
use std::path::{Path, PathBuf};

/// Application configuration module
/// This module handles loading, validating and saving the `conf.json`
/// settings: the source language and script, the completion providers,
/// lookup limits, speech output, prompt overrides and the HTTP server.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// Source language code (ISO)
    #[serde(default = "default_source_language")]
    pub source_language: String,

    /// Script the language gate expects (whatlang script name)
    #[serde(default = "default_source_script")]
    pub source_script: String,

    /// Completion provider to use
    #[serde(default)]
    pub provider: CompletionProvider,

    /// Available completion providers
    #[serde(default = "default_available_providers")]
    pub available_providers: Vec<ProviderConfig>,

    /// Lookup limits
    #[serde(default)]
    pub lookup: LookupConfig,

    /// Text-to-speech settings
    #[serde(default)]
    pub speech: SpeechConfig,

    /// Instruction prompt overrides
    #[serde(default)]
    pub prompts: PromptConfig,

    /// HTTP server settings
    #[serde(default)]
    pub server: ServerConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,

    /// Also append log lines to this file
    #[serde(default)]
    pub log_file: Option<PathBuf>,
}

/// Completion provider type
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum CompletionProvider {
    // @provider: OpenAI
    #[default]
    OpenAI,
    // @provider: Ollama
    Ollama,
}

impl CompletionProvider {
    // @returns: Capitalized provider name
    pub fn display_name(&self) -> &str {
        match self {
            Self::OpenAI => "OpenAI",
            Self::Ollama => "Ollama",
        }
    }

    // @returns: Lowercase provider identifier
    pub fn to_lowercase_string(&self) -> String {
        match self {
            Self::OpenAI => "openai".to_string(),
            Self::Ollama => "ollama".to_string(),
        }
    }
}

impl std::fmt::Display for CompletionProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_lowercase_string())
    }
}

impl std::str::FromStr for CompletionProvider {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "openai" => Ok(Self::OpenAI),
            "ollama" => Ok(Self::Ollama),
            _ => Err(anyhow!("Invalid provider type: {}", s)),
        }
    }
}

/// Provider configuration wrapper
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ProviderConfig {
    // @field: Provider type identifier
    #[serde(rename = "type")]
    pub provider_type: String,

    // @field: Model name
    #[serde(default = "String::new")]
    pub model: String,

    // @field: API key
    #[serde(default = "String::new")]
    pub api_key: String,

    // @field: Service URL
    #[serde(default = "String::new")]
    pub endpoint: String,

    // @field: Max concurrent word lookups per sentence (0 = one per word)
    #[serde(default)]
    pub concurrent_requests: Option<usize>,

    // @field: Timeout seconds per call
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl ProviderConfig {
    // @param provider_type: Provider enum
    // @returns: Provider config with defaults
    pub fn new(provider_type: CompletionProvider) -> Self {
        match provider_type {
            CompletionProvider::OpenAI => Self {
                provider_type: "openai".to_string(),
                model: default_openai_model(),
                api_key: String::new(),
                endpoint: default_openai_endpoint(),
                concurrent_requests: None,
                timeout_secs: default_timeout_secs(),
            },
            CompletionProvider::Ollama => Self {
                provider_type: "ollama".to_string(),
                model: default_ollama_model(),
                api_key: String::new(),
                endpoint: default_ollama_endpoint(),
                concurrent_requests: None,
                timeout_secs: default_ollama_timeout_secs(),
            },
        }
    }
}

/// Limits applied to lookups
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct LookupConfig {
    /// Output token ceiling for single-word lookups
    #[serde(default = "default_word_max_tokens")]
    pub word_max_tokens: Option<u32>,

    /// Output token ceiling for the single-call sentence lookup
    #[serde(default = "default_sentence_max_tokens")]
    pub sentence_max_tokens: Option<u32>,

    /// Output token ceiling for the sentence translation call
    #[serde(default)]
    pub translation_max_tokens: Option<u32>,

    /// Output token ceiling for each word call of a sentence
    #[serde(default)]
    pub enrichment_max_tokens: Option<u32>,

    /// Deadline for a whole sentence request
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for LookupConfig {
    fn default() -> Self {
        Self {
            word_max_tokens: default_word_max_tokens(),
            sentence_max_tokens: default_sentence_max_tokens(),
            translation_max_tokens: None,
            enrichment_max_tokens: None,
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

/// Text-to-speech settings
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SpeechConfig {
    /// Speech model name
    #[serde(default = "default_speech_model")]
    pub model: String,

    /// Voice name
    #[serde(default = "default_speech_voice")]
    pub voice: String,

    /// Directory the mp3 files are written to
    #[serde(default = "default_speech_output_dir")]
    pub output_dir: PathBuf,
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            model: default_speech_model(),
            voice: default_speech_voice(),
            output_dir: default_speech_output_dir(),
        }
    }
}

/// Prompt file overrides
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct PromptConfig {
    /// Dictionary lookup instruction file
    #[serde(default)]
    pub lookup_prompt_path: Option<PathBuf>,

    /// Sentence translation instruction file
    #[serde(default)]
    pub translation_prompt_path: Option<PathBuf>,

    /// Single-call sentence lookup instruction file
    #[serde(default)]
    pub sentence_prompt_path: Option<PathBuf>,
}

/// HTTP server settings
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ServerConfig {
    /// Address the server listens on
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
        }
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn to_level_filter(self) -> log::LevelFilter {
        match self {
            Self::Error => log::LevelFilter::Error,
            Self::Warn => log::LevelFilter::Warn,
            Self::Info => log::LevelFilter::Info,
            Self::Debug => log::LevelFilter::Debug,
            Self::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Environment variables checked for the OpenAI key, in order
pub const API_KEY_ENV_VARS: &[&str] = &["OPEN_API_KEY", "OPENAI_API_KEY"];

fn default_source_language() -> String {
    "ar".to_string()
}

fn default_source_script() -> String {
    "Arabic".to_string()
}

fn default_available_providers() -> Vec<ProviderConfig> {
    vec![
        ProviderConfig::new(CompletionProvider::OpenAI),
        ProviderConfig::new(CompletionProvider::Ollama),
    ]
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_ollama_timeout_secs() -> u64 {
    120
}

fn default_word_max_tokens() -> Option<u32> {
    Some(300)
}

fn default_sentence_max_tokens() -> Option<u32> {
    Some(6000)
}

fn default_request_timeout_secs() -> u64 {
    120
}

fn default_openai_endpoint() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_ollama_endpoint() -> String {
    "http://localhost:11434".to_string()
}

fn default_openai_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_ollama_model() -> String {
    "llama3.1".to_string()
}

fn default_speech_model() -> String {
    "tts-1".to_string()
}

fn default_speech_voice() -> String {
    "alloy".to_string()
}

fn default_speech_output_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_bind_address() -> String {
    "127.0.0.1:8000".to_string()
}

impl Config {
    /// Load the configuration from `path`, writing the defaults there first if
    /// the file does not exist
    pub fn load_or_create(path: &Path) -> Result<Self> {
        if !path.exists() {
            warn!("Config file not found at {}, creating default", path.display());
            let config = Config::default();
            config.save(path)?;
            return Ok(config);
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Config = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Write the configuration as pretty JSON
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {}", parent.display()))?;
        }
        let content = serde_json::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(path, content).with_context(|| format!("Failed to write config file: {}", path.display()))
    }

    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        crate::language_utils::get_language_name(&self.source_language)?;

        if crate::enrichment::gate::find_script(&self.source_script).is_none() {
            return Err(anyhow!("Unknown source script: {}", self.source_script));
        }

        if self.provider == CompletionProvider::OpenAI && self.get_api_key().is_empty() {
            return Err(anyhow!(
                "API key is required for OpenAI provider (config or {})",
                API_KEY_ENV_VARS.join(" / ")
            ));
        }

        if self.lookup.request_timeout_secs == 0 {
            return Err(anyhow!("lookup.request_timeout_secs must be greater than zero"));
        }

        Ok(())
    }

    /// Get the active provider configuration from the available_providers array
    pub fn get_active_provider_config(&self) -> Option<&ProviderConfig> {
        self.get_provider_config(&self.provider)
    }

    /// Get a specific provider configuration by type
    pub fn get_provider_config(&self, provider_type: &CompletionProvider) -> Option<&ProviderConfig> {
        let provider_str = provider_type.to_lowercase_string();
        self.available_providers.iter().find(|p| p.provider_type == provider_str)
    }

    /// Mutable access to a provider configuration, inserting the defaults if absent
    pub fn provider_config_mut(&mut self, provider_type: CompletionProvider) -> &mut ProviderConfig {
        let provider_str = provider_type.to_lowercase_string();
        let position = match self.available_providers.iter().position(|p| p.provider_type == provider_str) {
            Some(position) => position,
            None => {
                self.available_providers.push(ProviderConfig::new(provider_type));
                self.available_providers.len() - 1
            }
        };
        &mut self.available_providers[position]
    }

    /// Get the model for the active provider
    pub fn get_model(&self) -> String {
        if let Some(provider_config) = self.get_active_provider_config() {
            if !provider_config.model.is_empty() {
                return provider_config.model.clone();
            }
        }

        match self.provider {
            CompletionProvider::OpenAI => default_openai_model(),
            CompletionProvider::Ollama => default_ollama_model(),
        }
    }

    /// Get the API key for the active provider
    ///
    /// Falls back to the environment for OpenAI when the config has none.
    pub fn get_api_key(&self) -> String {
        if let Some(provider_config) = self.get_active_provider_config() {
            if !provider_config.api_key.is_empty() {
                return provider_config.api_key.clone();
            }
        }

        if self.provider == CompletionProvider::OpenAI {
            for var in API_KEY_ENV_VARS {
                if let Ok(key) = std::env::var(var) {
                    if !key.trim().is_empty() {
                        return key.trim().to_string();
                    }
                }
            }
        }

        String::new()
    }

    /// Get the endpoint for the active provider
    pub fn get_endpoint(&self) -> String {
        if let Some(provider_config) = self.get_active_provider_config() {
            if !provider_config.endpoint.is_empty() {
                return provider_config.endpoint.clone();
            }
        }

        match self.provider {
            CompletionProvider::OpenAI => default_openai_endpoint(),
            CompletionProvider::Ollama => default_ollama_endpoint(),
        }
    }

    /// Configured word fan-out bound for the active provider, if any
    pub fn concurrent_requests(&self) -> Option<usize> {
        self.get_active_provider_config()
            .and_then(|p| p.concurrent_requests)
    }

    /// Per-call timeout for the active provider
    pub fn timeout_secs(&self) -> u64 {
        match self.get_active_provider_config() {
            Some(provider_config) if provider_config.timeout_secs > 0 => provider_config.timeout_secs,
            _ => match self.provider {
                CompletionProvider::OpenAI => default_timeout_secs(),
                CompletionProvider::Ollama => default_ollama_timeout_secs(),
            },
        }
    }
}

/// Default implementation for Config
impl Default for Config {
    fn default() -> Self {
        Config {
            source_language: default_source_language(),
            source_script: default_source_script(),
            provider: CompletionProvider::default(),
            available_providers: default_available_providers(),
            lookup: LookupConfig::default(),
            speech: SpeechConfig::default(),
            prompts: PromptConfig::default(),
            server: ServerConfig::default(),
            log_level: LogLevel::default(),
            log_file: None,
        }
    }
}
