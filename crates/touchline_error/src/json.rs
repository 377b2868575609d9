//! JSON error types.

/// Serialization failure outside the state store, tagged with what was being encoded.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("JSON Error ({}): {} at line {} in {}", context, message, line, file)]
pub struct JsonError {
    /// What was being serialized, e.g. "state report"
    pub context: &'static str,
    /// serde_json message
    pub message: String,
    /// Line number where the error occurred
    pub line: u32,
    /// File where the error occurred
    pub file: &'static str,
}

impl JsonError {
    /// Wrap a serde_json failure while encoding `context`.
    ///
    /// # Examples
    ///
    /// ```
    /// use touchline_error::JsonError;
    ///
    /// let err = JsonError::new("state report", "key must be a string");
    /// assert!(err.to_string().starts_with("JSON Error (state report): key must be a string"));
    /// ```
    #[track_caller]
    pub fn new(context: &'static str, message: impl Into<String>) -> Self {
        let location = std::panic::Location::caller();
        Self {
            context,
            message: message.into(),
            line: location.line(),
            file: location.file(),
        }
    }
}
