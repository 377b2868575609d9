//! Posting governor for the touchline bot.
//!
//! The governor decides whether a new publish action is allowed right now.
//! Every constraint must pass at once:
//!
//! - **Humanized gate** - a jittered not-before mark set after each publish
//! - **Minimum gap** - seconds since the previous publish
//! - **Hourly cap** - publishes in the trailing 3600 s
//! - **Daily cap** - publishes in the trailing day window
//! - **Burst cap** - publishes in a short trailing window, high-salience events only
//!
//! The governor holds no state of its own; it reads and appends to the
//! [`ActionLog`](touchline_state::ActionLog) kept in the persisted state record.
//!
//! # Example
//!
//! ```
//! use rand::SeedableRng;
//! use rand::rngs::StdRng;
//! use touchline_rate_limit::{DenyReason, Governor, GovernorConfig, Verdict};
//! use touchline_state::ActionLog;
//!
//! let governor = Governor::new(GovernorConfig::default());
//! let mut log = ActionLog::default();
//! let mut rng = StdRng::seed_from_u64(7);
//!
//! assert_eq!(governor.allow(&log, 1_000, false), Verdict::Allowed);
//! governor.record(&mut log, 1_000, &mut rng);
//! assert_eq!(
//!     governor.allow(&log, 1_010, false),
//!     Verdict::Denied(DenyReason::HumanizedDelay)
//! );
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod governor;

pub use config::GovernorConfig;
pub use governor::{DenyReason, Governor, Headroom, Verdict};
