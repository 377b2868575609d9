//! Bot loop and manual post command handlers.

use touchline_bot::{BotRunner, Credentials, PostOutcome};
use touchline_error::TouchlineResult;
use tracing::{info, warn};

use super::{Cli, load_config, open_dispatcher};

/// Resolves on Ctrl+C. Never resolves if the handler cannot be installed.
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Could not listen for Ctrl+C, run until killed");
        std::future::pending::<()>().await;
    }
}

/// Handle the `run` command
pub async fn run_bot(cli: &Cli) -> TouchlineResult<()> {
    let config = load_config(cli)?;
    let credentials = Credentials::from_env()?;
    let dispatcher = open_dispatcher(&config, &credentials).await?;

    info!("Touchline starting. Press Ctrl+C to stop.");
    BotRunner::new(dispatcher).run(shutdown_signal()).await;
    info!("Touchline stopped");
    Ok(())
}

/// Handle the `post` command
pub async fn post_status(cli: &Cli, text: &str) -> TouchlineResult<()> {
    let config = load_config(cli)?;
    let credentials = Credentials::from_env()?;
    let mut dispatcher = open_dispatcher(&config, &credentials).await?;

    match dispatcher.post_status(text).await? {
        PostOutcome::Published(id) => println!("✓ Published {id}"),
        PostOutcome::Rejected(reason) => println!("✗ Rejected by the content gate: {reason}"),
        PostOutcome::Denied(reason) => {
            let headroom = dispatcher.headroom();
            println!("✗ Held by the governor: {reason}");
            if let Some(after) = headroom.next_action_after {
                println!("  Next publish allowed after {after} (unix seconds)");
            }
        }
    }
    Ok(())
}
