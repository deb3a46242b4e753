use std::env;
use url::Url;

pub const DEFAULT_API_URL: &str = "https://data.orc.org/public/WPub.dll";

/// Runtime configuration for the ORC data service client.
/// Values are sourced from environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    pub api_url: Url,
    pub user_agent: String,
    /// Whole-request timeout; `None` waits for the service indefinitely.
    pub timeout_secs: Option<u64>,
}

impl Config {
    /// Load configuration from environment.
    ///
    /// Env vars:
    /// - ORC_API_URL (default: https://data.orc.org/public/WPub.dll)
    /// - ORC_HTTP_TIMEOUT_SECS (default: unset, no timeout)
    /// - ORC_USER_AGENT (default: orc-rms/<version>)
    pub fn from_env() -> Result<Self, String> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, String>
    where
        F: Fn(&str) -> Option<String>,
    {
        let raw_url = lookup("ORC_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string());
        let api_url = Url::parse(&raw_url)
            .map_err(|e| format!("Invalid ORC_API_URL {:?}: {}", raw_url, e))?;
        let timeout_secs = lookup("ORC_HTTP_TIMEOUT_SECS")
            .and_then(|s| s.parse::<u64>().ok());
        let user_agent = lookup("ORC_USER_AGENT")
            .unwrap_or_else(|| format!("orc-rms/{}", env!("CARGO_PKG_VERSION")));

        Ok(Self {
            api_url,
            user_agent,
            timeout_secs,
        })
    }
}
