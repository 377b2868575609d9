//! API credentials.

use touchline_error::ConfigError;

/// Environment variable holding the X user access token.
pub const X_TOKEN_VAR: &str = "X_USER_ACCESS_TOKEN";

/// Environment variable holding the Gemini API key.
pub const GEMINI_KEY_VAR: &str = "GEMINI_API_KEY";

/// Secrets for the two external clients.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    /// OAuth 2.0 user access token for the X API
    pub x_access_token: String,
    /// Gemini API key
    pub gemini_api_key: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("x_access_token", &"<redacted>")
            .field("gemini_api_key", &"<redacted>")
            .finish()
    }
}

impl Credentials {
    /// Read both secrets from the process environment.
    ///
    /// # Errors
    ///
    /// A [`ConfigError`] naming the first missing or blank variable.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read both secrets through `lookup`.
    ///
    /// # Examples
    ///
    /// ```
    /// use touchline_bot::Credentials;
    ///
    /// let err = Credentials::from_lookup(|name| {
    ///     (name == "GEMINI_API_KEY").then(|| "key".to_string())
    /// })
    /// .unwrap_err();
    /// assert!(err.message.contains("X_USER_ACCESS_TOKEN"));
    /// ```
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let require = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .ok_or_else(|| ConfigError::new(format!("Missing required credential {name}")))
        };
        Ok(Self {
            x_access_token: require(X_TOKEN_VAR)?,
            gemini_api_key: require(GEMINI_KEY_VAR)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_both_present() {
        let credentials = Credentials::from_lookup(|name| Some(format!("{name}-value"))).unwrap();
        assert_eq!(credentials.x_access_token, "X_USER_ACCESS_TOKEN-value");
        assert!(!format!("{credentials:?}").contains("value"));
    }

    #[test]
    fn test_blank_is_missing() {
        let err = Credentials::from_lookup(|name| {
            Some(if name == GEMINI_KEY_VAR { "  ".into() } else { "token".into() })
        })
        .unwrap_err();
        assert!(err.message.contains(GEMINI_KEY_VAR));
    }
}
