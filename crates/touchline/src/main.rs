//! Touchline CLI binary.
//!
//! - `run` polls mentions and target timelines forever
//! - `post` publishes one standalone status through the gate and governor
//! - `check` validates configuration, credentials and state without posting
//! - `state` prints the stored state record

use clap::Parser;

mod cli;
mod logging;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    use cli::{Cli, Commands, check, post_status, run_bot, show_state};

    // Load .env before parsing so clap sees its variables
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    logging::init(cli.verbose, cli.json_logs);

    match &cli.command {
        Commands::Run => run_bot(&cli).await?,
        Commands::Post { text } => post_status(&cli, text).await?,
        Commands::Check => check(&cli).await?,
        Commands::State => show_state(&cli).await?,
    }

    Ok(())
}
