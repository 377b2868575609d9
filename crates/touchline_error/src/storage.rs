//! State storage error types.

/// Kinds of state storage errors.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum StorageErrorKind {
    /// Failed to create the state directory
    #[display("Failed to create state directory: {}", _0)]
    DirectoryCreation(String),
    /// Failed to write the state file
    #[display("Failed to write file: {}", _0)]
    FileWrite(String),
    /// Failed to read the state file
    #[display("Failed to read file: {}", _0)]
    FileRead(String),
    /// State file is not valid JSON or does not match the schema
    #[display("Failed to parse state: {}", _0)]
    Parse(String),
    /// State was written by a newer release
    #[display("Unsupported state schema version {} (newest known is {})", found, supported)]
    UnsupportedVersion {
        /// Version recorded in the file
        found: u64,
        /// Newest version this build understands
        supported: u32,
    },
    /// A migration step could not transform the record
    #[display("Migration from schema v{} failed: {}", from, reason)]
    Migration {
        /// Version the failing step migrates from
        from: u32,
        /// Why the step failed
        reason: String,
    },
}

/// Storage error with location tracking.
///
/// # Examples
///
/// ```
/// use touchline_error::{StorageError, StorageErrorKind};
///
/// let err = StorageError::new(StorageErrorKind::FileRead("/data/state.json".to_string()));
/// assert!(format!("{}", err).contains("Failed to read"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Storage Error: {} at line {} in {}", kind, line, file)]
pub struct StorageError {
    /// The kind of error that occurred
    pub kind: StorageErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl StorageError {
    /// Create a new storage error with automatic location tracking.
    #[track_caller]
    pub fn new(kind: StorageErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }

    /// Get the error kind.
    pub fn kind(&self) -> &StorageErrorKind {
        &self.kind
    }
}
