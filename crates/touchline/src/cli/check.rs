//! Health check command handler.

use touchline_bot::Credentials;
use touchline_error::TouchlineResult;

use super::{Cli, load_config, open_dispatcher};

/// Handle the `check` command
///
/// Walks the startup path without posting: configuration, credentials, the
/// authenticated account, target resolution, state load and the fallback text.
pub async fn check(cli: &Cli) -> TouchlineResult<()> {
    let config = load_config(cli)?;
    println!("✓ Configuration valid");
    if config.bot.dry_run {
        println!("  Dry run: posts will be logged only");
    }

    let credentials = Credentials::from_env()?;
    println!("✓ Credentials present");

    let mut dispatcher = open_dispatcher(&config, &credentials).await?;
    println!("✓ State loaded from {}", dispatcher.state().describe_store());
    println!(
        "  Seen items: {}, logged actions: {}",
        dispatcher.state().record().seen.len(),
        dispatcher.state().record().actions.timestamps().len()
    );

    let me = dispatcher.prepare().await?;
    println!("✓ Authenticated as {me}");
    println!(
        "  Target timelines: {} of {} configured",
        dispatcher.targets().len(),
        config.bot.target_accounts.len()
    );

    let orchestrator = dispatcher.orchestrator();
    let classifier = orchestrator.classifier();
    match classifier.evaluate(&orchestrator.fallback().text, classifier.config().primary_language) {
        Ok(assessment) => println!("✓ Fallback text passes (score {})", assessment.score),
        Err(reason) => println!("✗ Fallback text rejected: {reason}"),
    }

    let headroom = dispatcher.headroom();
    println!(
        "  Governor: {} this hour ({} left), {} today ({} left), {} in burst window",
        headroom.last_hour,
        headroom.hourly_remaining,
        headroom.last_day,
        headroom.daily_remaining,
        headroom.in_burst_window
    );
    Ok(())
}
