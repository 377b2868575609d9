//! Durable state for the touchline bot.
//!
//! The state record holds everything that must survive a restart:
//!
//! - **Action log** - publish timestamps consulted by the rate governor
//! - **Dedupe set** - bounded, most-recent-N set of handled item keys
//! - **Cursors** - per-source "last seen id", advanced only forward
//! - **Recent techniques** - bounded list of metaphor keywords already used
//!
//! Records carry an explicit `schema_version`. Older layouts are upgraded on
//! load by a chain of pure migration steps (`v1 -> v2 -> v3`), and saves go
//! through a temp file plus rename so a crash never leaves a torn file behind.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod migrate;
mod persistent;
mod record;
mod store;

pub use migrate::{CURRENT_SCHEMA_VERSION, detect_version, migrate, v1_to_v2, v2_to_v3};
pub use persistent::PersistentState;
pub use record::{
    ActionLog, Cursors, DEFAULT_DEDUPE_CAPACITY, DEFAULT_TECHNIQUE_CAPACITY, DedupeSet,
    RecentTechniques, StateRecord,
};
pub use store::{JsonStateStore, MemoryStateStore, StateResult, StateStore};
