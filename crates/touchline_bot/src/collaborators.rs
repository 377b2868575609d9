//! Construction of the production collaborators.

use std::sync::Arc;
use touchline_error::TouchlineResult;
use touchline_interface::{SocialPlatform, TextGenerator};
use touchline_models::GeminiGenerator;
use touchline_social::{DryRunPlatform, XClient};
use touchline_state::{JsonStateStore, StateStore};
use tracing::info;

use crate::{Credentials, TouchlineConfig};

/// The X client, wrapped in [`DryRunPlatform`] when `bot.dry_run` is set.
///
/// # Errors
///
/// Fails if the HTTP client cannot be built.
pub fn build_platform(
    config: &TouchlineConfig,
    credentials: &Credentials,
) -> TouchlineResult<Arc<dyn SocialPlatform>> {
    let client: Arc<dyn SocialPlatform> = Arc::new(XClient::new(
        credentials.x_access_token.clone(),
        config.social.clone(),
    )?);
    if config.bot.dry_run {
        info!("Dry run: posts will be logged, not published");
        return Ok(Arc::new(DryRunPlatform::new(client)));
    }
    Ok(client)
}

/// The Gemini text generator.
///
/// # Errors
///
/// Fails if the HTTP client cannot be built.
pub fn build_generator(
    config: &TouchlineConfig,
    credentials: &Credentials,
) -> TouchlineResult<Arc<dyn TextGenerator>> {
    Ok(Arc::new(GeminiGenerator::new(
        credentials.gemini_api_key.clone(),
        config.models.clone(),
    )?))
}

/// The JSON file store at `bot.state_path`.
pub fn build_store(config: &TouchlineConfig) -> Box<dyn StateStore> {
    Box::new(JsonStateStore::new(config.bot.state_path.clone()))
}
