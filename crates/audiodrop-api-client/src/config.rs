use anyhow::{Context, Result};
use audiodrop_core::constants::UPLOAD_PATH;
use std::time::Duration;

const DEFAULT_API_URL: &str = "http://localhost:8080";
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_ACCEPT: &str = ".mp3";

/// Client-side settings.
#[derive(Clone, Debug)]
pub struct ClientConfig {
    /// Base URL of the ingestion endpoint, without trailing slash
    pub api_url: String,
    /// Upper bound on one transfer; expiry counts as a transport failure
    pub timeout: Duration,
    /// Extensions the file picker offers, lowercased and without the dot
    pub accept: Vec<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            accept: parse_accept(DEFAULT_ACCEPT),
        }
    }
}

impl ClientConfig {
    pub fn new(api_url: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into().trim_end_matches('/').to_string(),
            ..Self::default()
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Read `AUDIODROP_API_URL`, `AUDIODROP_UPLOAD_TIMEOUT_SECS` and `AUDIODROP_ACCEPT`.
    pub fn from_env() -> Result<Self> {
        let api_url =
            std::env::var("AUDIODROP_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string());

        let timeout_secs = match std::env::var("AUDIODROP_UPLOAD_TIMEOUT_SECS") {
            Ok(value) => value
                .parse::<u64>()
                .context("AUDIODROP_UPLOAD_TIMEOUT_SECS must be a whole number of seconds")?,
            Err(_) => DEFAULT_TIMEOUT_SECS,
        };
        if timeout_secs == 0 {
            anyhow::bail!("AUDIODROP_UPLOAD_TIMEOUT_SECS must be greater than zero");
        }

        let accept = parse_accept(
            &std::env::var("AUDIODROP_ACCEPT").unwrap_or_else(|_| DEFAULT_ACCEPT.to_string()),
        );
        if accept.is_empty() {
            anyhow::bail!("AUDIODROP_ACCEPT must list at least one extension");
        }

        Ok(Self {
            api_url: api_url.trim_end_matches('/').to_string(),
            timeout: Duration::from_secs(timeout_secs),
            accept,
        })
    }

    pub fn upload_url(&self) -> String {
        format!("{}{}", self.api_url, UPLOAD_PATH)
    }
}

/// Parse an `accept` list such as `.mp3,.WAV` into `["mp3", "wav"]`.
pub fn parse_accept(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|s| s.trim().trim_start_matches('.').to_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = ClientConfig::default();
        assert_eq!(config.upload_url(), "http://localhost:8080/upload");
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert_eq!(config.accept, vec!["mp3"]);
    }

    #[test]
    fn trailing_slash_is_trimmed() {
        assert_eq!(
            ClientConfig::new("http://api.example.com/").upload_url(),
            "http://api.example.com/upload"
        );
    }

    #[test]
    fn accept_list_is_normalized() {
        assert_eq!(parse_accept(".mp3, .WAV,,flac"), vec!["mp3", "wav", "flac"]);
    }
}
