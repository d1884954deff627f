use crate::defaults;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Config {
    pub audio: AudioConfig,
    pub streaming: StreamingConfig,
    pub enrichment: EnrichmentConfig,
}

/// Audio conversion configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AudioConfig {
    /// Target sample rate for outbound PCM.
    pub sample_rate: u32,
    /// Samples per outbound chunk.
    pub chunk_samples: usize,
    /// Capacity of the outbound chunk queue.
    pub queue_capacity: usize,
}

/// Streaming transcription service configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StreamingConfig {
    /// WebSocket endpoint of the transcription service.
    pub endpoint: String,
    /// HTTP endpoint that issues temporary streaming tokens.
    pub token_endpoint: String,
    /// API key for the transcription service (prefer the env override).
    pub api_key: String,
    /// Ask the service for formatted, immutable turns.
    pub format_turns: bool,
    /// Confidence above which a turn may end early.
    pub end_of_turn_confidence: f32,
    /// Minimum silence (ms) to end a turn when confident.
    pub min_end_of_turn_silence_ms: u32,
    /// Maximum silence (ms) before a turn is force-ended.
    pub max_turn_silence_ms: u32,
}

/// Post-session enrichment configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EnrichmentConfig {
    /// Chat-completions endpoint of the language-model service.
    pub endpoint: String,
    /// API key for the language-model service (prefer the env override).
    pub api_key: String,
    /// Completion model name.
    pub model: String,
    /// Output token cap per call.
    pub max_tokens: u32,
    /// Sampling temperature.
    pub temperature: f32,
    /// Per-call timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            sample_rate: defaults::TARGET_SAMPLE_RATE,
            chunk_samples: defaults::CHUNK_SAMPLES,
            queue_capacity: defaults::QUEUE_CAPACITY,
        }
    }
}

impl Default for StreamingConfig {
    fn default() -> Self {
        Self {
            endpoint: defaults::STT_ENDPOINT.to_string(),
            token_endpoint: defaults::STT_TOKEN_ENDPOINT.to_string(),
            api_key: String::new(),
            format_turns: true,
            end_of_turn_confidence: defaults::END_OF_TURN_CONFIDENCE,
            min_end_of_turn_silence_ms: defaults::MIN_END_OF_TURN_SILENCE_MS,
            max_turn_silence_ms: defaults::MAX_TURN_SILENCE_MS,
        }
    }
}

impl Default for EnrichmentConfig {
    fn default() -> Self {
        Self {
            endpoint: defaults::LLM_ENDPOINT.to_string(),
            api_key: String::new(),
            model: defaults::LLM_MODEL.to_string(),
            max_tokens: defaults::LLM_MAX_TOKENS,
            temperature: defaults::LLM_TEMPERATURE,
            timeout_secs: defaults::LLM_TIMEOUT_SECS,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// Returns an error if the file contains invalid TOML.
    /// Missing fields will use default values.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Load configuration from a file or return defaults if file doesn't exist
    ///
    /// Only returns defaults if the file is missing.
    /// Returns errors for invalid TOML.
    pub fn load_or_default(path: &Path) -> anyhow::Result<Self> {
        match Self::load(path) {
            Ok(config) => Ok(config),
            Err(e) => {
                if e.downcast_ref::<std::io::Error>()
                    .map(|io_err| io_err.kind() == std::io::ErrorKind::NotFound)
                    .unwrap_or(false)
                {
                    Ok(Self::default())
                } else {
                    Err(e)
                }
            }
        }
    }

    /// Apply environment variable overrides
    ///
    /// Supported environment variables:
    /// - MEDSCRIBE_STT_API_KEY → streaming.api_key
    /// - MEDSCRIBE_STT_ENDPOINT → streaming.endpoint
    /// - MEDSCRIBE_LLM_API_KEY → enrichment.api_key
    /// - MEDSCRIBE_LLM_ENDPOINT → enrichment.endpoint
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(key) = std::env::var("MEDSCRIBE_STT_API_KEY")
            && !key.is_empty()
        {
            self.streaming.api_key = key;
        }

        if let Ok(endpoint) = std::env::var("MEDSCRIBE_STT_ENDPOINT")
            && !endpoint.is_empty()
        {
            self.streaming.endpoint = endpoint;
        }

        if let Ok(key) = std::env::var("MEDSCRIBE_LLM_API_KEY")
            && !key.is_empty()
        {
            self.enrichment.api_key = key;
        }

        if let Ok(endpoint) = std::env::var("MEDSCRIBE_LLM_ENDPOINT")
            && !endpoint.is_empty()
        {
            self.enrichment.endpoint = endpoint;
        }

        self
    }

    /// Get the default configuration file path
    ///
    /// Returns ~/.config/medscribe/config.toml on Linux
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("medscribe")
            .join("config.toml")
    }
}
