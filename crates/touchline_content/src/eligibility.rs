//! Per-item eligibility for target timelines.

use regex::Regex;
use serde::Serialize;
use touchline_core::SourceItem;
use tracing::{debug, instrument};

use crate::EligibilityConfig;

/// Why a source post is not worth replying to.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, strum::Display, strum::AsRefStr,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Ineligible {
    /// A repost of someone else's post
    Retweet,
    /// Itself a reply
    Reply,
    /// A quote post
    Quote,
    /// Carries more links than allowed
    TooManyLinks,
    /// Carries more @-mentions than allowed
    TooManyMentions,
}

/// Filters target-timeline posts before any generation is spent on them.
#[derive(Debug, Clone)]
pub struct EligibilityFilter {
    config: EligibilityConfig,
    url_regex: Regex,
    mention_regex: Regex,
}

impl EligibilityFilter {
    /// Filter with the configured limits.
    pub fn new(config: EligibilityConfig) -> Self {
        let url_regex = Regex::new(r"https?://\S+").expect("Valid URL regex");
        let mention_regex = Regex::new(r"(?:^|[^\w])@\w{1,15}").expect("Valid mention regex");
        Self {
            config,
            url_regex,
            mention_regex,
        }
    }

    /// Check `item`, returning the first rule it breaks.
    #[instrument(skip(self, item), fields(item_id = %item.id))]
    pub fn check(&self, item: &SourceItem) -> Result<(), Ineligible> {
        let result = self.evaluate(item);
        if let Err(reason) = result {
            debug!(reason = %reason, "Item not eligible");
        }
        result
    }

    fn evaluate(&self, item: &SourceItem) -> Result<(), Ineligible> {
        if item.is_retweet || item.text.starts_with("RT @") {
            return Err(Ineligible::Retweet);
        }
        if item.in_reply_to.is_some() {
            return Err(Ineligible::Reply);
        }
        if item.is_quote {
            return Err(Ineligible::Quote);
        }
        if self.url_regex.find_iter(&item.text).count() > self.config.max_links {
            return Err(Ineligible::TooManyLinks);
        }
        if self.mention_regex.find_iter(&item.text).count() > self.config.max_mentions {
            return Err(Ineligible::TooManyMentions);
        }
        Ok(())
    }
}
