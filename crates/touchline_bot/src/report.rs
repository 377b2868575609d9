//! What a cycle did.

use touchline_content::{Ineligible, RejectReason};
use touchline_core::{ItemId, SourceKey};
use touchline_error::PlatformErrorKind;
use touchline_generation::TextSource;
use touchline_rate_limit::DenyReason;

/// Fate of one source item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemOutcome {
    /// Reply published
    Replied {
        /// Id of the reply
        reply_id: ItemId,
        /// Model text or the fallback
        source: TextSource,
    },
    /// Item was handled in an earlier cycle
    AlreadySeen,
    /// Posted by the bot itself
    OwnPost,
    /// Failed the timeline filter
    Ineligible(Ineligible),
    /// Dropped by the random skip
    RandomSkip,
    /// Governor closed the window; the rest of the source waits
    Denied(DenyReason),
    /// Every candidate was rejected by the gate
    Exhausted(Vec<RejectReason>),
    /// The platform refused the reply in a way that settles the item
    Refused(PlatformErrorKind),
    /// The reply failed and the item was left unmarked
    Failed(PlatformErrorKind),
}

impl ItemOutcome {
    /// Whether a publish happened.
    pub fn is_published(&self) -> bool {
        matches!(self, Self::Replied { .. })
    }
}

/// Summary of one dispatcher cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleReport {
    /// Items fetched across all sources
    pub fetched: usize,
    /// Outcome per processed item, in processing order
    pub outcomes: Vec<(SourceKey, ItemId, ItemOutcome)>,
}

impl CycleReport {
    /// Number of replies published.
    pub fn published(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|(_, _, outcome)| outcome.is_published())
            .count()
    }

    /// Outcome recorded for `item`, if it was processed.
    pub fn outcome_for(&self, item: &ItemId) -> Option<&ItemOutcome> {
        self.outcomes
            .iter()
            .find(|(_, id, _)| id == item)
            .map(|(_, _, outcome)| outcome)
    }
}

/// Result of a manual status post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PostOutcome {
    /// Published with this id
    Published(ItemId),
    /// The gate rejected the text
    Rejected(RejectReason),
    /// The governor closed the window
    Denied(DenyReason),
}
