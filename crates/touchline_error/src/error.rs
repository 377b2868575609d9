//! Top-level error wrapper types.

use crate::{ConfigError, GenerationError, JsonError, PlatformError, StorageError};

/// Every error a touchline operation can surface.
///
/// # Examples
///
/// ```
/// use touchline_error::{ConfigError, TouchlineError};
///
/// let err: TouchlineError = ConfigError::in_section("bot", "skip_rate must be below 1").into();
/// assert!(format!("{}", err).contains("[bot] skip_rate"));
/// ```
#[derive(Debug, derive_more::From, derive_more::Display, derive_more::Error)]
pub enum TouchlineErrorKind {
    /// JSON serialization/deserialization error
    #[from(JsonError)]
    Json(JsonError),
    /// Configuration error
    #[from(ConfigError)]
    Config(ConfigError),
    /// State storage error
    #[from(StorageError)]
    Storage(StorageError),
    /// Social platform error
    #[from(PlatformError)]
    Platform(PlatformError),
    /// Text generator error
    #[from(GenerationError)]
    Generation(GenerationError),
}

/// Touchline error with kind discrimination.
#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("Touchline Error: {}", _0)]
pub struct TouchlineError(Box<TouchlineErrorKind>);

impl TouchlineError {
    /// Create a new error from a kind.
    pub fn new(kind: TouchlineErrorKind) -> Self {
        Self(Box::new(kind))
    }

    /// Get the error kind.
    pub fn kind(&self) -> &TouchlineErrorKind {
        &self.0
    }

    /// The platform error kind, when this error came from the social platform.
    pub fn platform_kind(&self) -> Option<&crate::PlatformErrorKind> {
        match self.kind() {
            TouchlineErrorKind::Platform(e) => Some(e.kind()),
            _ => None,
        }
    }
}

impl<T> From<T> for TouchlineError
where
    T: Into<TouchlineErrorKind>,
{
    fn from(err: T) -> Self {
        Self::new(err.into())
    }
}

/// Result type for touchline operations.
pub type TouchlineResult<T> = std::result::Result<T, TouchlineError>;
