//! Event loop for the touchline banter bot.
//!
//! [`Dispatcher`] runs one polling cycle: fetch mentions and target timelines,
//! filter, ask the [`Governor`](touchline_rate_limit::Governor), generate a
//! gated reply and publish it. [`BotRunner`] repeats cycles forever with
//! randomized sleeps, a fixed backoff after failures and a long cooldown when
//! the platform reports exhausted credits.
//!
//! All collaborators are built once from [`TouchlineConfig`] and handed to the
//! dispatcher; there is no process-wide state.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod collaborators;
mod config;
mod credentials;
mod dispatcher;
mod report;
mod runner;

pub use collaborators::{build_generator, build_platform, build_store};
pub use config::{BotConfig, TouchlineConfig};
pub use credentials::Credentials;
pub use dispatcher::Dispatcher;
pub use report::{CycleReport, ItemOutcome, PostOutcome};
pub use runner::{BotRunner, CycleDelay};
