// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{Context, Result, anyhow};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{Shell, generate};
use log::{LevelFilter, info, warn};
use serde::Serialize;
use std::path::PathBuf;

use qamus::app_config::{self, CompletionProvider, Config};
use qamus::enrichment::EnrichmentService;
use qamus::logging::{self, CustomLogger};
use qamus::server::{self, AppContext};
use qamus::speech::SpeechService;

/// CLI Wrapper for CompletionProvider to implement ValueEnum
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliCompletionProvider {
    #[value(name = "openai")]
    OpenAI,
    Ollama,
}

impl From<CliCompletionProvider> for CompletionProvider {
    fn from(cli_provider: CliCompletionProvider) -> Self {
        match cli_provider {
            CliCompletionProvider::OpenAI => CompletionProvider::OpenAI,
            CliCompletionProvider::Ollama => CompletionProvider::Ollama,
        }
    }
}

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for app_config::LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => app_config::LogLevel::Error,
            CliLogLevel::Warn => app_config::LogLevel::Warn,
            CliLogLevel::Info => app_config::LogLevel::Info,
            CliLogLevel::Debug => app_config::LogLevel::Debug,
            CliLogLevel::Trace => app_config::LogLevel::Trace,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Look up a single word
    Word {
        /// Word to look up
        input: String,
    },

    /// Translate a sentence and look up each of its words
    Sentence {
        /// Sentence to look up
        input: String,

        /// Ask for the whole sentence in one call instead of one call per word
        #[arg(long)]
        single: bool,
    },

    /// Synthesize speech to an mp3 file
    Speak {
        /// Text to speak
        input: String,
    },

    /// Run the HTTP API
    Serve {
        /// Listen address (overrides server.bind_address)
        #[arg(short, long)]
        bind: Option<String>,
    },

    /// Generate shell completions for qamus
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// qamus - AI-backed Arabic dictionary
///
/// Looks up Arabic words and sentences through a language-model completion
/// service and returns structured dictionary entries.
#[derive(Parser, Debug)]
#[command(name = "qamus")]
#[command(version)]
#[command(about = "AI-backed Arabic dictionary and sentence reader")]
#[command(long_about = "qamus looks up Arabic words and sentences using a completion service.

EXAMPLES:
    qamus word كتاب                              # Dictionary entry for one word
    qamus sentence \"ذهب الولد إلى المدرسة\"        # Translation plus per-word entries
    qamus sentence --single \"ذهب الولد\"          # Same, in a single completion call
    qamus speak \"مرحبا\"                          # Write an mp3 file
    qamus serve --bind 0.0.0.0:8000              # Run the HTTP API
    qamus -p ollama -m llama3.1 word كتاب        # Use a local model
    qamus completions bash > qamus.bash          # Generate bash completions

CONFIGURATION:
    Configuration is stored in conf.json by default. If the file doesn't exist,
    a default one is created. The OpenAI key may also be given through the
    OPEN_API_KEY or OPENAI_API_KEY environment variables.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Commands,

    /// Completion provider to use
    #[arg(short, long, value_enum, global = true)]
    provider: Option<CliCompletionProvider>,

    /// Model name to use
    #[arg(short, long, global = true)]
    model: Option<String>,

    /// Configuration file path
    #[arg(short, long, default_value = "conf.json", global = true)]
    config_path: PathBuf,

    /// Set logging level
    #[arg(short, long, value_enum, global = true)]
    log_level: Option<CliLogLevel>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Start at trace so the configured level can be applied with set_max_level alone
    CustomLogger::init(LevelFilter::Trace)?;
    log::set_max_level(LevelFilter::Info);

    let cli = CommandLineOptions::parse();

    if let Commands::Completions { shell } = cli.command {
        let mut cmd = CommandLineOptions::command();
        generate(shell, &mut cmd, "qamus", &mut std::io::stdout());
        return Ok(());
    }

    let config = load_config(&cli)?;

    match cli.command {
        Commands::Word { input } => {
            let service = EnrichmentService::from_config(&config)?;
            let entry = service.lookup_word(&input).await?;
            print_json(&entry)
        }
        Commands::Sentence { input, single } => {
            let service = EnrichmentService::from_config(&config)?;
            let result = if single {
                service.lookup_sentence_single(&input).await?
            } else {
                service.lookup_sentence(&input).await?
            };
            print_json(&result)
        }
        Commands::Speak { input } => {
            let speech = SpeechService::from_config(&config)
                .ok_or_else(|| anyhow!("Speech synthesis is not available for {}", config.provider.display_name()))?;
            let file = speech.synthesize(&input).await?;
            print_json(&file)
        }
        Commands::Serve { bind } => {
            let bind_address = bind.unwrap_or_else(|| config.server.bind_address.clone());
            let enrichment = EnrichmentService::from_config(&config)?;
            let speech = SpeechService::from_config(&config);
            info!(
                "Serving {} lookups with {} ({})",
                qamus::get_language_name(&config.source_language)?,
                config.provider.display_name(),
                config.get_model()
            );
            if enrichment.check_connection().await.is_err() {
                warn!("Lookups will fail until {} is reachable", config.provider.display_name());
            }
            match &speech {
                Some(speech) => info!("Speech files are written to {}", speech.output_dir().display()),
                None => info!("Speech synthesis is disabled for {}", config.provider.display_name()),
            }
            server::run(AppContext::new(enrichment, speech), &bind_address).await
        }
        Commands::Completions { .. } => Ok(()),
    }
}

/// Load the config file, apply CLI overrides and validate
fn load_config(cli: &CommandLineOptions) -> Result<Config> {
    if let Some(level) = cli.log_level {
        log::set_max_level(app_config::LogLevel::from(level).to_level_filter());
    }

    let mut config = Config::load_or_create(&cli.config_path)?;

    if let Some(provider) = cli.provider {
        config.provider = provider.into();
    }
    if let Some(model) = &cli.model {
        config.provider_config_mut(config.provider).model = model.clone();
    }
    if let Some(level) = cli.log_level {
        config.log_level = level.into();
    }

    config.validate().context("Configuration validation failed")?;

    if cli.log_level.is_none() {
        log::set_max_level(config.log_level.to_level_filter());
    }
    if let Some(path) = &config.log_file {
        logging::attach_log_file(path)?;
        info!("Logging to {}", path.display());
    }

    Ok(config)
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialize result")?;
    println!("{}", json);
    Ok(())
}
