//! Rolling-window governor.

use rand::Rng;
use serde::Serialize;
use touchline_core::Timestamp;
use touchline_state::ActionLog;
use tracing::{debug, instrument};

use crate::GovernorConfig;

const HOUR_SECS: i64 = 3600;

/// Which constraint closed the window.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    strum::Display,
    strum::AsRefStr,
    strum::EnumIter,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum DenyReason {
    /// The jittered not-before mark has not elapsed
    HumanizedDelay,
    /// Too soon after the previous publish
    MinimumGap,
    /// Hourly cap reached
    HourlyCap,
    /// Daily cap reached
    DailyCap,
    /// Burst cap reached for a high-salience event
    BurstCap,
}

/// Outcome of a governor check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Publishing now is allowed
    Allowed,
    /// Publishing now is not allowed
    Denied(DenyReason),
}

impl Verdict {
    /// Whether the check passed.
    pub fn is_allowed(&self) -> bool {
        matches!(self, Verdict::Allowed)
    }

    /// The denial reason, if any.
    pub fn reason(&self) -> Option<DenyReason> {
        match self {
            Verdict::Allowed => None,
            Verdict::Denied(reason) => Some(*reason),
        }
    }
}

/// Current usage of each window, for status output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Headroom {
    /// Publishes in the trailing hour
    pub last_hour: usize,
    /// Publishes in the trailing day window
    pub last_day: usize,
    /// Publishes in the trailing burst window
    pub in_burst_window: usize,
    /// Remaining publishes before the hourly cap
    pub hourly_remaining: usize,
    /// Remaining publishes before the daily cap
    pub daily_remaining: usize,
    /// Earliest time the next publish may happen
    pub next_action_after: Option<Timestamp>,
}

/// Decides whether a publish may happen now and records the ones that do.
#[derive(Debug, Clone)]
pub struct Governor {
    config: GovernorConfig,
}

impl Governor {
    /// Governor over `config`.
    pub fn new(config: GovernorConfig) -> Self {
        Self { config }
    }

    /// The thresholds in force.
    pub fn config(&self) -> &GovernorConfig {
        &self.config
    }

    /// Check every constraint against `log` at `now`.
    ///
    /// The burst cap applies only when `high_salience` is set. Checks stop at
    /// the first failure, which names the constraint in the verdict.
    #[instrument(skip(self, log), fields(logged = log.timestamps().len()))]
    pub fn allow(&self, log: &ActionLog, now: Timestamp, high_salience: bool) -> Verdict {
        let verdict = self.check(log, now, high_salience);
        match verdict {
            Verdict::Allowed => debug!("Governor allows publish"),
            Verdict::Denied(reason) => debug!(reason = %reason, "Governor denies publish"),
        }
        verdict
    }

    fn check(&self, log: &ActionLog, now: Timestamp, high_salience: bool) -> Verdict {
        if log.next_action_after().is_some_and(|after| now < after) {
            return Verdict::Denied(DenyReason::HumanizedDelay);
        }
        if log
            .last_action_at()
            .is_some_and(|last| now - last < self.config.min_gap_secs as i64)
        {
            return Verdict::Denied(DenyReason::MinimumGap);
        }
        if log.count_since(now - HOUR_SECS) >= self.config.max_per_hour as usize {
            return Verdict::Denied(DenyReason::HourlyCap);
        }
        if log.count_since(now - self.config.day_window_secs as i64)
            >= self.config.max_per_day as usize
        {
            return Verdict::Denied(DenyReason::DailyCap);
        }
        if high_salience
            && log.count_since(now - self.config.burst_window_secs as i64)
                >= self.config.burst_max as usize
        {
            return Verdict::Denied(DenyReason::BurstCap);
        }
        Verdict::Allowed
    }

    /// Record one successful publish at `now`.
    ///
    /// Sets the next not-before mark to `now + min_gap + extra`, with `extra`
    /// drawn uniformly from the humanize range. Returns that mark.
    #[instrument(skip(self, log, rng))]
    pub fn record<R: Rng>(
        &self,
        log: &mut ActionLog,
        now: Timestamp,
        rng: &mut R,
    ) -> Timestamp {
        let extra = rng.gen_range(self.config.humanize_min_secs..=self.config.humanize_max_secs);
        let next = now + self.config.min_gap_secs as i64 + extra as i64;
        log.push(now, next);
        debug!(next_action_after = next, extra_secs = extra, "Recorded publish");
        next
    }

    /// Usage of each window at `now`.
    pub fn headroom(&self, log: &ActionLog, now: Timestamp) -> Headroom {
        let last_hour = log.count_since(now - HOUR_SECS);
        let last_day = log.count_since(now - self.config.day_window_secs as i64);
        Headroom {
            last_hour,
            last_day,
            in_burst_window: log.count_since(now - self.config.burst_window_secs as i64),
            hourly_remaining: (self.config.max_per_hour as usize).saturating_sub(last_hour),
            daily_remaining: (self.config.max_per_day as usize).saturating_sub(last_day),
            next_action_after: log.next_action_after(),
        }
    }

    /// Seconds of action history the governor needs.
    pub fn retention_secs(&self) -> i64 {
        self.config.retention_secs()
    }
}
