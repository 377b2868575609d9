//! Content rules for the touchline bot.
//!
//! - [`ContentClassifier`] - the deterministic gate every candidate reply must
//!   pass before it is published
//! - [`EventClassifier`] - decides whether a source post is a high-salience
//!   event (derby, rivalry) that the burst cap applies to
//! - [`EligibilityFilter`] - per-item rules for target timelines (no retweets,
//!   replies, quotes, link spam or mention spam)
//!
//! All three are pure functions of their input and configuration.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod classifier;
mod config;
mod eligibility;
mod events;

pub use classifier::{Assessment, ContentClassifier, RejectReason};
pub use config::{ClassifierConfig, EligibilityConfig, EventsConfig, Subject};
pub use eligibility::{EligibilityFilter, Ineligible};
pub use events::{EventClassifier, KeywordEventClassifier};
