//! Configuration error types.

/// Invalid or missing configuration.
///
/// Fatal: the binary aborts before entering the event loop when one is
/// returned. Validation failures name the TOML section they came from.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Configuration Error: {} at line {} in {}", message, line, file)]
pub struct ConfigError {
    /// Section of `touchline.toml` at fault, when known
    pub section: Option<String>,
    /// Error message, prefixed with `[section]` when the section is known
    pub message: String,
    /// Line number where the error occurred
    pub line: u32,
    /// File where the error occurred
    pub file: &'static str,
}

impl ConfigError {
    /// Error not tied to one section (missing credential, unreadable file).
    ///
    /// # Examples
    ///
    /// ```
    /// use touchline_error::ConfigError;
    ///
    /// let err = ConfigError::new("Missing required credential X_USER_ACCESS_TOKEN");
    /// assert!(err.message.contains("X_USER_ACCESS_TOKEN"));
    /// assert_eq!(err.section, None);
    /// ```
    #[track_caller]
    pub fn new(message: impl Into<String>) -> Self {
        let location = std::panic::Location::caller();
        Self {
            section: None,
            message: message.into(),
            line: location.line(),
            file: location.file(),
        }
    }

    /// Validation failure in `[section]`.
    #[track_caller]
    pub fn in_section(section: impl Into<String>, message: impl AsRef<str>) -> Self {
        let section = section.into();
        let mut err = Self::new(format!("[{section}] {}", message.as_ref()));
        err.section = Some(section);
        err
    }
}
