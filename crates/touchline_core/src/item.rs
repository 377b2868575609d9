//! Items fetched from event sources.

use crate::{ItemId, UserId};
use derive_builder::Builder;
use serde::{Deserialize, Serialize};

/// A post fetched from mentions or a target timeline.
///
/// # Examples
///
/// ```
/// use touchline_core::SourceItemBuilder;
///
/// let item = SourceItemBuilder::default()
///     .id("1790")
///     .text("Derby day, who wins?")
///     .author_id("42")
///     .build()
///     .unwrap();
///
/// assert!(!item.is_retweet);
/// assert!(item.in_reply_to.is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Builder)]
#[builder(setter(into))]
pub struct SourceItem {
    /// Platform post id
    pub id: ItemId,
    /// Post text
    pub text: String,
    /// Author account id
    pub author_id: UserId,
    /// Post is a repost of someone else's post
    #[builder(default)]
    #[serde(default)]
    pub is_retweet: bool,
    /// Post quotes another post
    #[builder(default)]
    #[serde(default)]
    pub is_quote: bool,
    /// Post this one replies to, if any
    #[builder(default)]
    #[serde(default)]
    pub in_reply_to: Option<ItemId>,
}

/// One page of new items from a source, newest id included.
///
/// `newest_id` comes from the source's own metadata and is present even when
/// every item in `items` is later filtered out.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceBatch {
    /// Items newer than the cursor, oldest first
    pub items: Vec<SourceItem>,
    /// Newest id the source reported
    pub newest_id: Option<ItemId>,
}

impl SourceBatch {
    /// An empty batch with no cursor movement.
    pub fn empty() -> Self {
        Self::default()
    }
}
