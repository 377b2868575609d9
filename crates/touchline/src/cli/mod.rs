//! Command-line interface module.
//!
//! This module provides the CLI structure and command handlers for the touchline binary.

mod check;
mod commands;
mod run;
mod state;

pub use check::check;
pub use commands::{Cli, Commands, Overrides};
pub use run::{post_status, run_bot};
pub use state::show_state;

use rand::SeedableRng;
use rand::rngs::StdRng;
use std::sync::Arc;
use touchline_bot::{
    Credentials, Dispatcher, TouchlineConfig, build_generator, build_platform, build_store,
};
use touchline_core::SystemClock;
use touchline_error::TouchlineResult;

/// Layered configuration with the command line and environment overrides applied.
fn load_config(cli: &Cli) -> TouchlineResult<TouchlineConfig> {
    let mut config = TouchlineConfig::load(cli.config.as_deref())?;
    cli.overrides.apply(&mut config);
    config.validate()?;
    Ok(config)
}

/// Dispatcher over the live X and Gemini clients.
async fn open_dispatcher(
    config: &TouchlineConfig,
    credentials: &Credentials,
) -> TouchlineResult<Dispatcher> {
    let platform = build_platform(config, credentials)?;
    let generator = build_generator(config, credentials)?;
    Dispatcher::open(
        config,
        platform,
        generator,
        build_store(config),
        Arc::new(SystemClock),
        StdRng::from_entropy(),
    )
    .await
}
