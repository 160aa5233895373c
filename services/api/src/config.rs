//! services/api/src/config.rs
//!
//! Defines the application's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;
use tracing::Level;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing the environment variable {0}")]
    MissingVar(String),
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Holds all configuration loaded from the environment at startup.
///
/// The API keys are optional on purpose: a missing key disables the
/// dependent feature with a "not configured" error at call time instead of
/// failing startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub bind_address: SocketAddr,
    pub log_level: Level,
    pub llm_api_key: Option<String>,
    pub llm_api_base: String,
    pub llm_model: String,
    pub youtube_api_key: Option<String>,
    pub google_search_api_key: Option<String>,
    pub search_engine_id: Option<String>,
    pub ocr_model_dir: PathBuf,
    pub session_ttl: Duration,
    /// The only timeout in the system, applied at the HTTP client boundary.
    pub http_timeout: Duration,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for development,
    /// but this is skipped in test environments to ensure tests are hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Only load from .env in non-test mode to avoid contamination.
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }

        // --- Load Server Settings ---
        let bind_address_str =
            std::env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0:8080".to_string());
        let bind_address = bind_address_str
            .parse::<SocketAddr>()
            .map_err(|e| ConfigError::InvalidValue("BIND_ADDRESS".to_string(), e.to_string()))?;

        let log_level_str = std::env::var("RUST_LOG").unwrap_or_else(|_| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        // --- Load API Keys (as optional) ---
        let llm_api_key = std::env::var("LLM_API_KEY").ok();
        let youtube_api_key = std::env::var("YOUTUBE_API_KEY").ok();
        let google_search_api_key = std::env::var("GOOGLE_SEARCH_API_KEY").ok();
        let search_engine_id = std::env::var("SEARCH_ENGINE_ID").ok();

        // --- Load Adapter-specific Settings ---
        let llm_api_base = std::env::var("LLM_API_BASE")
            .unwrap_or_else(|_| "https://api.groq.com/openai/v1".to_string());
        let llm_model =
            std::env::var("LLM_MODEL").unwrap_or_else(|_| "llama-3.1-8b-instant".to_string());

        let ocr_model_dir = std::env::var("OCR_MODEL_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("./models"));

        let session_ttl = parse_secs("SESSION_TTL_SECS", 1800)?;
        let http_timeout = parse_secs("HTTP_TIMEOUT_SECS", 30)?;

        Ok(Self {
            bind_address,
            log_level,
            llm_api_key,
            llm_api_base,
            llm_model,
            youtube_api_key,
            google_search_api_key,
            search_engine_id,
            ocr_model_dir,
            session_ttl,
            http_timeout,
        })
    }
}

fn parse_secs(var: &str, default: u64) -> Result<Duration, ConfigError> {
    match std::env::var(var) {
        Ok(raw) => raw
            .parse::<u64>()
            .map(Duration::from_secs)
            .map_err(|e| ConfigError::InvalidValue(var.to_string(), e.to_string())),
        Err(_) => Ok(Duration::from_secs(default)),
    }
}
