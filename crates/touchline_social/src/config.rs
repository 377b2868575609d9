//! Social platform settings (`[social]`).

use serde::{Deserialize, Serialize};

/// X API client configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SocialConfig {
    /// API base URL
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// `max_results` for mention and timeline fetches (5..=100)
    #[serde(default = "default_page_size")]
    pub page_size: u32,

    /// Per-request timeout
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Retries for transient HTTP failures
    #[serde(default = "default_max_retries")]
    pub max_retries: usize,

    /// First retry delay
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,
}

fn default_base_url() -> String {
    "https://api.twitter.com/2".to_string()
}

fn default_page_size() -> u32 {
    10
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_max_retries() -> usize {
    2
}

fn default_retry_backoff_ms() -> u64 {
    1000
}

impl Default for SocialConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            page_size: default_page_size(),
            timeout_secs: default_timeout_secs(),
            max_retries: default_max_retries(),
            retry_backoff_ms: default_retry_backoff_ms(),
        }
    }
}

impl SocialConfig {
    /// Check the values the API would reject.
    pub fn validate(&self) -> Result<(), String> {
        if !(5..=100).contains(&self.page_size) {
            return Err(format!(
                "page_size must be between 5 and 100, got {}",
                self.page_size
            ));
        }
        if self.base_url.trim().is_empty() {
            return Err("base_url must not be empty".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_size_bounds() {
        assert!(SocialConfig::default().validate().is_ok());
        let config = SocialConfig {
            page_size: 3,
            ..SocialConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
