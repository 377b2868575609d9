//! Governor thresholds.

use serde::{Deserialize, Serialize};

/// Immutable per-process governor configuration.
///
/// Loaded from the `[governor]` table of `touchline.toml`:
///
/// ```toml
/// [governor]
/// min_gap_secs = 600
/// max_per_hour = 6
/// max_per_day = 25
/// burst_max = 3
/// burst_window_secs = 1800
/// humanize_min_secs = 15
/// humanize_max_secs = 45
/// day_window_secs = 86400
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GovernorConfig {
    /// Minimum seconds between two publishes
    #[serde(default = "default_min_gap_secs")]
    pub min_gap_secs: u64,

    /// Publishes allowed in any trailing hour
    #[serde(default = "default_max_per_hour")]
    pub max_per_hour: u32,

    /// Publishes allowed in any trailing day window
    #[serde(default = "default_max_per_day")]
    pub max_per_day: u32,

    /// Publishes allowed in the burst window for high-salience events
    #[serde(default = "default_burst_max")]
    pub burst_max: u32,

    /// Length of the burst window
    #[serde(default = "default_burst_window_secs")]
    pub burst_window_secs: u64,

    /// Lower bound of the random extra delay added after each publish
    #[serde(default = "default_humanize_min_secs")]
    pub humanize_min_secs: u64,

    /// Upper bound of the random extra delay added after each publish
    #[serde(default = "default_humanize_max_secs")]
    pub humanize_max_secs: u64,

    /// Length of the daily window; also how long action timestamps are kept
    #[serde(default = "default_day_window_secs")]
    pub day_window_secs: u64,
}

fn default_min_gap_secs() -> u64 {
    600
}

fn default_max_per_hour() -> u32 {
    6
}

fn default_max_per_day() -> u32 {
    25
}

fn default_burst_max() -> u32 {
    3
}

fn default_burst_window_secs() -> u64 {
    1800
}

fn default_humanize_min_secs() -> u64 {
    15
}

fn default_humanize_max_secs() -> u64 {
    45
}

fn default_day_window_secs() -> u64 {
    86_400
}

impl Default for GovernorConfig {
    fn default() -> Self {
        Self {
            min_gap_secs: default_min_gap_secs(),
            max_per_hour: default_max_per_hour(),
            max_per_day: default_max_per_day(),
            burst_max: default_burst_max(),
            burst_window_secs: default_burst_window_secs(),
            humanize_min_secs: default_humanize_min_secs(),
            humanize_max_secs: default_humanize_max_secs(),
            day_window_secs: default_day_window_secs(),
        }
    }
}

impl GovernorConfig {
    /// Check that the thresholds are usable together.
    ///
    /// # Errors
    ///
    /// Returns a description of the first inconsistent value.
    pub fn validate(&self) -> Result<(), String> {
        if self.max_per_hour == 0 || self.max_per_day == 0 || self.burst_max == 0 {
            return Err("governor caps must be at least 1".to_string());
        }
        if self.max_per_day < self.max_per_hour {
            return Err(format!(
                "max_per_day ({}) is below max_per_hour ({})",
                self.max_per_day, self.max_per_hour
            ));
        }
        if self.humanize_min_secs > self.humanize_max_secs {
            return Err(format!(
                "humanize range is inverted: {}..{}",
                self.humanize_min_secs, self.humanize_max_secs
            ));
        }
        if self.burst_window_secs == 0 || self.day_window_secs < 3600 {
            return Err("burst window must be positive and the day window at least an hour"
                .to_string());
        }
        Ok(())
    }

    /// Seconds of action history that must be retained.
    pub fn retention_secs(&self) -> i64 {
        self.day_window_secs.max(self.burst_window_secs).max(3600) as i64
    }
}
