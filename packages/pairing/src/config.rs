use anyhow::{Context, Result};
use dotenvy::dotenv;
use std::env;

use crate::domains::matching::EngineConfig;

const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";
const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub max_commit_attempts: u32,
    pub escalate_on_urgent: bool,
    pub openai_api_key: Option<String>,
    pub openai_model: String,
    pub openai_base_url: String,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        let max_commit_attempts: u32 = env::var("PAIRING_MAX_COMMIT_ATTEMPTS")
            .unwrap_or_else(|_| "3".to_string())
            .parse()
            .context("PAIRING_MAX_COMMIT_ATTEMPTS must be a positive number")?;
        if max_commit_attempts == 0 {
            anyhow::bail!("PAIRING_MAX_COMMIT_ATTEMPTS must be at least 1");
        }

        Ok(Self {
            max_commit_attempts,
            escalate_on_urgent: env::var("PAIRING_ESCALATE_ON_URGENT")
                .unwrap_or_else(|_| "true".to_string())
                .parse()
                .context("PAIRING_ESCALATE_ON_URGENT must be true or false")?,
            openai_api_key: env::var("OPENAI_API_KEY").ok().filter(|k| !k.is_empty()),
            openai_model: env::var("OPENAI_MODEL")
                .unwrap_or_else(|_| DEFAULT_OPENAI_MODEL.to_string()),
            openai_base_url: env::var("OPENAI_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_OPENAI_BASE_URL.to_string()),
        })
    }

    /// The subset of settings the matching engine and coordinator read.
    pub fn engine(&self) -> EngineConfig {
        EngineConfig {
            max_commit_attempts: self.max_commit_attempts,
            escalate_on_urgent: self.escalate_on_urgent,
        }
    }
}
