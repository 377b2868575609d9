//! State inspection command handler.

use serde::Serialize;
use touchline_bot::build_store;
use touchline_core::{Clock, SystemClock};
use touchline_error::{JsonError, TouchlineResult};
use touchline_rate_limit::{Governor, Headroom};
use touchline_state::{PersistentState, StateRecord};

use super::{Cli, load_config};

#[derive(Serialize)]
struct StateReport<'a> {
    store: String,
    headroom: Headroom,
    record: &'a StateRecord,
}

/// Handle the `state` command
///
/// Needs no credentials; the record is migrated in memory and not written back.
pub async fn show_state(cli: &Cli) -> TouchlineResult<()> {
    let config = load_config(cli)?;
    let governor = Governor::new(config.governor.clone());
    let state = PersistentState::open(
        build_store(&config),
        governor.retention_secs(),
        config.bot.dedupe_capacity,
    )
    .await?;

    let report = StateReport {
        store: state.describe_store(),
        headroom: governor.headroom(&state.record().actions, SystemClock.now()),
        record: state.record(),
    };
    let json = serde_json::to_string_pretty(&report)
        .map_err(|e| JsonError::new("state report", e.to_string()))?;
    println!("{json}");
    Ok(())
}
