//! Engine configuration read from the environment.

use std::net::SocketAddr;

/// Default OpenAI-compatible endpoint (ModelScope inference).
pub const DEFAULT_LLM_BASE_URL: &str = "https://api-inference.modelscope.cn/v1";

/// Default hosted model.
pub const DEFAULT_LLM_MODEL: &str = "Qwen/Qwen3-235B-A22B-Instruct-2507";

pub const DEFAULT_LLM_TIMEOUT_SECS: u64 = 120;
pub const DEFAULT_SERVER_HOST: &str = "0.0.0.0";
pub const DEFAULT_SERVER_PORT: u16 = 7860;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{key} has invalid value '{value}': {reason}")]
    InvalidValue {
        key: &'static str,
        value: String,
        reason: String,
    },
    #[error("failed to build HTTP client: {0}")]
    HttpClient(String),
}

impl ConfigError {
    fn invalid(key: &'static str, value: &str, reason: impl ToString) -> Self {
        Self::InvalidValue {
            key,
            value: value.to_string(),
            reason: reason.to_string(),
        }
    }
}

/// Connection settings for the hosted completion API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LlmConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// `None` when no credential is configured; every endpoint then runs in fallback mode.
    pub llm: Option<LlmConfig>,
    pub server_host: String,
    pub server_port: u16,
    /// Raw `CORS_ALLOWED_ORIGINS`; `None` disables the CORS layer.
    pub cors_allowed_origins: Option<String>,
}

impl EngineConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. Blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let timeout_secs = match get("LLM_TIMEOUT_SECS") {
            Some(raw) => raw
                .parse::<u64>()
                .map_err(|e| ConfigError::invalid("LLM_TIMEOUT_SECS", &raw, e))?,
            None => DEFAULT_LLM_TIMEOUT_SECS,
        };

        let llm = get("MODELSCOPE_API_KEY").map(|api_key| LlmConfig {
            api_key,
            base_url: get("LLM_BASE_URL").unwrap_or_else(|| DEFAULT_LLM_BASE_URL.to_string()),
            model: get("LLM_MODEL").unwrap_or_else(|| DEFAULT_LLM_MODEL.to_string()),
            timeout_secs,
        });

        let server_port = match get("SERVER_PORT").or_else(|| get("PORT")) {
            Some(raw) => raw
                .parse::<u16>()
                .map_err(|e| ConfigError::invalid("SERVER_PORT", &raw, e))?,
            None => DEFAULT_SERVER_PORT,
        };

        Ok(Self {
            llm,
            server_host: get("SERVER_HOST").unwrap_or_else(|| DEFAULT_SERVER_HOST.to_string()),
            server_port,
            cors_allowed_origins: get("CORS_ALLOWED_ORIGINS"),
        })
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        let raw = format!("{}:{}", self.server_host, self.server_port);
        raw.parse()
            .map_err(|e| ConfigError::invalid("SERVER_HOST", &self.server_host, e))
    }

    pub fn ai_available(&self) -> bool {
        self.llm.is_some()
    }
}
