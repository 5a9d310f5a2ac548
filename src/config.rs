use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use crate::error::RecognizerError;

/// Environment variable holding the Gemini API key.
pub const API_KEY_VAR: &str = "GOOGLE_API_KEY";

const DEFAULT_API_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Bounded retry settings for rate-limited requests.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    /// Total attempts, including the first one.
    pub max_attempts: u32,
    /// Wait used when the error carries no "retry in" hint.
    pub default_wait_secs: u64,
    /// Added on top of a server-suggested delay.
    pub hint_margin_secs: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            default_wait_secs: 20,
            hint_margin_secs: 2,
        }
    }
}

/// Top-level application configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_base_url: String,
    /// Models whose name contains this (case-insensitive) are preferred.
    pub preferred_model_keyword: String,
    pub retry: RetryPolicy,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.into(),
            preferred_model_keyword: "flash".into(),
            retry: RetryPolicy::default(),
        }
    }
}

impl Config {
    /// Directory: ~/.config/song-recognizer/
    fn dir() -> PathBuf {
        let mut p = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
        p.push("song-recognizer");
        p
    }

    fn path() -> PathBuf {
        Self::dir().join("config.json")
    }

    /// Load from disk, returning defaults if the file doesn't exist or is invalid.
    pub fn load() -> Self {
        let path = Self::path();
        match fs::read_to_string(&path) {
            Ok(data) => Self::parse(&data).unwrap_or_else(|e| {
                log::warn!("Ignoring invalid config at {}: {e}", path.display());
                Self::default()
            }),
            Err(_) => Self::default(),
        }
    }

    fn parse(data: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(data)
    }
}

/// The Gemini API key. Read once at startup, then handed to the client.
#[derive(Clone)]
pub struct ApiCredential(String);

impl ApiCredential {
    pub fn new(key: impl Into<String>) -> Result<Self, RecognizerError> {
        let key = key.into();
        if key.trim().is_empty() {
            return Err(RecognizerError::MissingCredential);
        }
        Ok(Self(key.trim().to_string()))
    }

    /// Load `.env` if present, then read the key from the environment.
    pub fn from_env() -> Result<Self, RecognizerError> {
        if let Ok(path) = dotenvy::dotenv() {
            log::info!("Loaded environment from {}", path.display());
        }
        let key = std::env::var(API_KEY_VAR).map_err(|_| RecognizerError::MissingCredential)?;
        Self::new(key)
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for ApiCredential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("ApiCredential(***)")
    }
}
