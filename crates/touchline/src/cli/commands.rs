//! CLI command definitions.

use clap::builder::{BoolishValueParser, FalseyValueParser};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use touchline_bot::TouchlineConfig;

/// Touchline - football banter bot with a posting governor and a content gate
#[derive(Parser, Debug)]
#[command(name = "touchline")]
#[command(about = "Football banter bot with a posting governor and a content gate", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true, env = "TOUCHLINE_JSON_LOGS", value_parser = FalseyValueParser::new())]
    pub json_logs: bool,

    /// Extra configuration file, layered over the defaults
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Settings usually supplied through the environment
    #[command(flatten)]
    pub overrides: Overrides,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Poll mentions and target timelines until interrupted
    Run,

    /// Publish one standalone status
    Post {
        /// Text of the status
        text: String,
    },

    /// Validate configuration, credentials and state without posting
    Check,

    /// Print the stored state record and governor usage
    State,
}

/// Overrides for the configuration file values.
#[derive(Args, Debug, Default)]
pub struct Overrides {
    /// Log posts instead of publishing them
    #[arg(long, global = true, env = "DRY_RUN", value_parser = BoolishValueParser::new())]
    pub dry_run: Option<bool>,

    /// Path of the JSON state file
    #[arg(long, global = true, env = "STATE_FILE_PATH")]
    pub state_file: Option<PathBuf>,

    /// Handles or ids whose timelines are polled, comma separated
    #[arg(long, global = true, env = "TARGET_ACCOUNTS", value_delimiter = ',')]
    pub target_accounts: Option<Vec<String>>,

    /// Gemini model name
    #[arg(long, global = true, env = "GEMINI_MODEL")]
    pub model: Option<String>,
}

impl Overrides {
    /// Write the set values into `config`.
    pub fn apply(&self, config: &mut TouchlineConfig) {
        config.apply_overrides(
            self.dry_run,
            self.state_file.clone(),
            self.target_accounts.clone(),
            self.model.clone(),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_post_takes_text() {
        let cli = Cli::try_parse_from(["touchline", "post", "Spurs defence still buffering 😂"])
            .unwrap();
        match cli.command {
            Commands::Post { text } => assert_eq!(text, "Spurs defence still buffering 😂"),
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_overrides_reach_the_config() {
        let cli = Cli::try_parse_from([
            "touchline",
            "run",
            "--dry-run",
            "yes",
            "--target-accounts",
            "Alhilal_FC, 19672628",
            "--model",
            "gemini-1.5-pro",
        ])
        .unwrap();

        let mut config = TouchlineConfig::default();
        cli.overrides.apply(&mut config);

        assert!(config.bot.dry_run);
        assert_eq!(config.bot.target_accounts, ["Alhilal_FC", "19672628"]);
        assert_eq!(config.models.model, "gemini-1.5-pro");
    }
}
