//! Collaborator traits consumed by the touchline control loop.
//!
//! The bot core never talks HTTP directly. It drives two collaborators:
//!
//! - [`SocialPlatform`] - fetch mentions and timelines, publish replies
//! - [`TextGenerator`] - turn a prompt into candidate text
//!
//! Concrete implementations live in `touchline_social` and `touchline_models`;
//! tests substitute scripted fakes.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod traits;

pub use traits::{GenerationResult, PlatformResult, SocialPlatform, TextGenerator};
