//! Assistant directory configuration (OpenAI)

use serde::Deserialize;
use std::time::Duration;

/// OpenAI credentials used to list assistants for the registry editor.
#[derive(Debug, Clone, Deserialize)]
pub struct AiConfig {
    /// Without a key the directory is served from memory.
    pub openai_api_key: Option<String>,

    #[serde(default = "default_base_url")]
    pub openai_base_url: String,

    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Maximum retries on transient failures
    #[serde(default = "default_retries")]
    pub max_retries: u32,
}

impl AiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn openai_api_key(&self) -> Option<&str> {
        self.openai_api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
    }
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            openai_api_key: None,
            openai_base_url: default_base_url(),
            timeout_secs: default_timeout(),
            max_retries: default_retries(),
        }
    }
}

fn default_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_timeout() -> u64 {
    30
}

fn default_retries() -> u32 {
    2
}
