//! Social platform implementations.
//!
//! - [`XClient`] talks to the X v2 REST API with a user access token.
//! - [`DryRunPlatform`] reads through a real platform but only logs writes.
//!
//! Both implement [`SocialPlatform`](touchline_interface::SocialPlatform).

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod dry_run;
mod types;
mod x;

pub use config::SocialConfig;
pub use dry_run::{DryRunPlatform, DryRunPost};
pub use types::{TweetPage, classify_status};
pub use x::XClient;
