//! Generation orchestrator for the touchline bot.
//!
//! The [`Orchestrator`] drives a [`TextGenerator`](touchline_interface::TextGenerator)
//! through a bounded number of attempts. Each attempt varies the style seed,
//! raises the temperature, normalises the output and runs it through the
//! [`ContentClassifier`](touchline_content::ContentClassifier).
//!
//! The exhausted case is deliberately asymmetric:
//!
//! - every attempt failed in the generator: return the pre-vetted fallback text
//! - any attempt was rejected by the gate: return nothing, the item is skipped

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod normalize;
mod orchestrator;
mod prompt;

pub use config::GenerationConfig;
pub use normalize::normalize;
pub use orchestrator::{AttemptFailure, Exhausted, Orchestrator, PassingText, TextSource};
pub use prompt::PromptBuilder;
