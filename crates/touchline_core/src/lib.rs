//! Core data types for the touchline banter bot.
//!
//! This crate provides the types shared by the state store, the governor, the
//! classifier, the orchestrator and the dispatcher.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod clock;
mod ids;
mod item;
mod language;
mod request;

pub use clock::{Clock, ManualClock, SystemClock, Timestamp};
pub use ids::{ItemId, SourceKey, UserId};
pub use item::{SourceBatch, SourceItem, SourceItemBuilder};
pub use language::Language;
pub use request::{GenerateRequest, GenerateRequestBuilder};
