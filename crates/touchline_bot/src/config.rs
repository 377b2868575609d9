//! Layered configuration.

use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use touchline_content::{ClassifierConfig, EligibilityConfig, EventsConfig};
use touchline_error::{ConfigError, TouchlineResult};
use touchline_generation::GenerationConfig;
use touchline_models::ModelsConfig;
use touchline_rate_limit::GovernorConfig;
use touchline_social::SocialConfig;
use tracing::{debug, instrument};

/// Bundled defaults, the lowest-precedence layer.
const DEFAULT_CONFIG: &str = include_str!("../../../touchline.toml");

/// Control loop settings (`[bot]`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BotConfig {
    /// Probability of ignoring an otherwise eligible item
    #[serde(default = "default_skip_rate")]
    pub skip_rate: f64,

    /// Base sleep between cycles
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,

    /// Random +/- spread applied to the cycle sleep
    #[serde(default = "default_poll_jitter_secs")]
    pub poll_jitter_secs: u64,

    /// Lower bound of the pause after a publish within a cycle
    #[serde(default = "default_humanize_delay_min_secs")]
    pub humanize_delay_min_secs: u64,

    /// Upper bound of the pause after a publish within a cycle
    #[serde(default = "default_humanize_delay_max_secs")]
    pub humanize_delay_max_secs: u64,

    /// Sleep after a failed cycle
    #[serde(default = "default_error_backoff_secs")]
    pub error_backoff_secs: u64,

    /// Sleep after the platform reports exhausted credits
    #[serde(default = "default_quota_cooldown_secs")]
    pub quota_cooldown_secs: u64,

    /// Like the source post after replying to it
    #[serde(default)]
    pub like_after_reply: bool,

    /// Accounts whose timelines are polled (handles or numeric ids)
    #[serde(default)]
    pub target_accounts: Vec<String>,

    /// Log writes instead of publishing
    #[serde(default)]
    pub dry_run: bool,

    /// State file location
    #[serde(default = "default_state_path")]
    pub state_path: PathBuf,

    /// Item ids remembered for deduplication
    #[serde(default = "default_dedupe_capacity")]
    pub dedupe_capacity: usize,
}

fn default_skip_rate() -> f64 {
    0.15
}

fn default_poll_interval_secs() -> u64 {
    180
}

fn default_poll_jitter_secs() -> u64 {
    15
}

fn default_humanize_delay_min_secs() -> u64 {
    15
}

fn default_humanize_delay_max_secs() -> u64 {
    45
}

fn default_error_backoff_secs() -> u64 {
    60
}

fn default_quota_cooldown_secs() -> u64 {
    3600
}

fn default_state_path() -> PathBuf {
    PathBuf::from("data/state.json")
}

fn default_dedupe_capacity() -> usize {
    touchline_state::DEFAULT_DEDUPE_CAPACITY
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            skip_rate: default_skip_rate(),
            poll_interval_secs: default_poll_interval_secs(),
            poll_jitter_secs: default_poll_jitter_secs(),
            humanize_delay_min_secs: default_humanize_delay_min_secs(),
            humanize_delay_max_secs: default_humanize_delay_max_secs(),
            error_backoff_secs: default_error_backoff_secs(),
            quota_cooldown_secs: default_quota_cooldown_secs(),
            like_after_reply: false,
            target_accounts: Vec::new(),
            dry_run: false,
            state_path: default_state_path(),
            dedupe_capacity: default_dedupe_capacity(),
        }
    }
}

impl BotConfig {
    /// Check the loop settings.
    pub fn validate(&self) -> Result<(), String> {
        if !(0.0..1.0).contains(&self.skip_rate) {
            return Err(format!("skip_rate must be in [0, 1), got {}", self.skip_rate));
        }
        if self.poll_interval_secs == 0 {
            return Err("poll_interval_secs must be positive".to_string());
        }
        if self.poll_jitter_secs >= self.poll_interval_secs {
            return Err(format!(
                "poll_jitter_secs ({}) must be below poll_interval_secs ({})",
                self.poll_jitter_secs, self.poll_interval_secs
            ));
        }
        if self.humanize_delay_min_secs > self.humanize_delay_max_secs {
            return Err(format!(
                "humanize delay range is inverted: {}..{}",
                self.humanize_delay_min_secs, self.humanize_delay_max_secs
            ));
        }
        if self.dedupe_capacity == 0 {
            return Err("dedupe_capacity must be positive".to_string());
        }
        Ok(())
    }
}

/// Complete configuration, one section per component.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TouchlineConfig {
    /// Rate governor thresholds
    #[serde(default)]
    pub governor: GovernorConfig,
    /// Content gate tables
    #[serde(default)]
    pub classifier: ClassifierConfig,
    /// Derby and rivalry detection
    #[serde(default)]
    pub events: EventsConfig,
    /// Timeline item filter
    #[serde(default)]
    pub eligibility: EligibilityConfig,
    /// Generation retry loop and prompt
    #[serde(default)]
    pub generation: GenerationConfig,
    /// Control loop
    #[serde(default)]
    pub bot: BotConfig,
    /// Text model client
    #[serde(default)]
    pub models: ModelsConfig,
    /// Social platform client
    #[serde(default)]
    pub social: SocialConfig,
}

impl TouchlineConfig {
    /// Load configuration, later sources overriding earlier ones:
    ///
    /// 1. Bundled defaults (`touchline.toml` shipped with the crate)
    /// 2. `~/.config/touchline/touchline.toml` (optional)
    /// 3. `./touchline.toml` (optional)
    /// 4. `explicit`, when given (required)
    /// 5. `TOUCHLINE__SECTION__KEY` environment variables
    ///
    /// The result is validated.
    ///
    /// # Errors
    ///
    /// Fails when a source cannot be read or parsed, or validation fails.
    #[instrument(skip(explicit))]
    pub fn load(explicit: Option<&Path>) -> TouchlineResult<Self> {
        debug!("Loading configuration");

        let mut builder =
            Config::builder().add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml));

        if let Some(home) = dirs::home_dir() {
            let home_config = home.join(".config/touchline/touchline.toml");
            builder = builder.add_source(File::from(home_config).required(false));
        }

        builder = builder.add_source(File::with_name("touchline").required(false));

        if let Some(path) = explicit {
            debug!(path = %path.display(), "Adding explicit configuration file");
            builder = builder.add_source(File::from(path).required(true));
        }

        builder = builder.add_source(
            Environment::with_prefix("TOUCHLINE")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        let config: Self = builder
            .build()
            .map_err(|e| ConfigError::new(format!("Failed to build configuration: {e}")))?
            .try_deserialize()
            .map_err(|e| ConfigError::new(format!("Failed to parse configuration: {e}")))?;

        config.validate()?;
        Ok(config)
    }

    /// Parse a TOML document on top of the bundled defaults.
    ///
    /// # Errors
    ///
    /// Fails when the document does not parse or validation fails.
    pub fn from_toml_str(document: &str) -> TouchlineResult<Self> {
        let config: Self = Config::builder()
            .add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml))
            .add_source(File::from_str(document, FileFormat::Toml))
            .build()
            .map_err(|e| ConfigError::new(format!("Failed to build configuration: {e}")))?
            .try_deserialize()
            .map_err(|e| ConfigError::new(format!("Failed to parse configuration: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Check every section.
    ///
    /// # Errors
    ///
    /// A [`ConfigError`] naming the section of the first bad value.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let sections: [(&str, Result<(), String>); 5] = [
            ("governor", self.governor.validate()),
            ("classifier", self.classifier.validate()),
            ("generation", self.generation.validate()),
            ("bot", self.bot.validate()),
            ("social", self.social.validate()),
        ];
        for (section, result) in sections {
            result.map_err(|e| ConfigError::in_section(section, e))?;
        }
        Ok(())
    }

    /// Apply command line and environment overrides.
    pub fn apply_overrides(
        &mut self,
        dry_run: Option<bool>,
        state_path: Option<PathBuf>,
        target_accounts: Option<Vec<String>>,
        model: Option<String>,
    ) {
        if let Some(dry_run) = dry_run {
            self.bot.dry_run = dry_run;
        }
        if let Some(path) = state_path {
            self.bot.state_path = path;
        }
        if let Some(targets) = target_accounts {
            self.bot.target_accounts = targets
                .into_iter()
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty())
                .collect();
        }
        if let Some(model) = model {
            self.models.model = model;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bundled_defaults_match_code_defaults() {
        let bundled = TouchlineConfig::from_toml_str("").unwrap();
        assert_eq!(bundled.governor, GovernorConfig::default());
        assert_eq!(bundled.bot, BotConfig::default());
        assert_eq!(bundled.models, ModelsConfig::default());
        assert_eq!(bundled.social, SocialConfig::default());
    }

    #[test]
    fn test_document_overrides_defaults() {
        let config = TouchlineConfig::from_toml_str(
            r#"
            [governor]
            min_gap_secs = 900

            [bot]
            target_accounts = ["Alhilal_FC", "19672628"]
            "#,
        )
        .unwrap();
        assert_eq!(config.governor.min_gap_secs, 900);
        assert_eq!(config.governor.max_per_hour, 6);
        assert_eq!(config.bot.target_accounts.len(), 2);
    }

    #[test]
    fn test_inconsistent_caps_are_rejected() {
        let err = TouchlineConfig::from_toml_str(
            r#"
            [governor]
            max_per_hour = 10
            max_per_day = 5
            "#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("[governor]"));
    }

    #[test]
    fn test_overrides() {
        let mut config = TouchlineConfig::default();
        config.apply_overrides(
            Some(true),
            Some(PathBuf::from("/tmp/state.json")),
            Some(vec![" a ".into(), "".into(), "b".into()]),
            Some("gemini-2.0-flash".into()),
        );
        assert!(config.bot.dry_run);
        assert_eq!(config.bot.target_accounts, ["a", "b"]);
        assert_eq!(config.models.model, "gemini-2.0-flash");
    }
}
