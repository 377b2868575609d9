//! Identifier newtypes.

use serde::{Deserialize, Serialize};

/// Platform identifier of a post.
#[derive(
    Debug,
    Clone,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    derive_more::Display,
)]
#[serde(transparent)]
#[display("{}", _0)]
pub struct ItemId(pub String);

impl ItemId {
    /// Borrow the raw identifier.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for ItemId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for ItemId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// Platform identifier of an account.
#[derive(
    Debug,
    Clone,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    derive_more::Display,
)]
#[serde(transparent)]
#[display("{}", _0)]
pub struct UserId(pub String);

impl UserId {
    /// Borrow the raw identifier.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for UserId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for UserId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// An event source with its own polling cursor.
///
/// # Examples
///
/// ```
/// use touchline_core::{SourceKey, UserId};
///
/// assert_eq!(SourceKey::Mentions.to_string(), "mentions");
/// let timeline = SourceKey::Timeline(UserId::from("19672628"));
/// assert_eq!(timeline.to_string(), "timeline:19672628");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum SourceKey {
    /// Mentions of the authenticated account
    #[display("mentions")]
    Mentions,
    /// Posts published by a target account
    #[display("timeline:{}", _0)]
    Timeline(UserId),
}
