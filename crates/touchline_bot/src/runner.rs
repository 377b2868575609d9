//! The forever loop around the dispatcher.

use std::future::Future;
use std::time::Duration;
use touchline_error::{PlatformErrorKind, TouchlineResult};
use tracing::{error, info, instrument, warn};

use crate::{CycleReport, Dispatcher};

/// Wait before the next cycle, and why.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleDelay {
    /// Normal jittered poll interval
    Poll(Duration),
    /// Fixed backoff after a failed cycle
    Backoff(Duration),
    /// Platform rate limit; waits until the window resets
    RateLimited(Duration),
    /// Credits exhausted; long cooldown
    QuotaCooldown(Duration),
}

impl CycleDelay {
    /// How long to sleep.
    pub fn duration(&self) -> Duration {
        match self {
            Self::Poll(d) | Self::Backoff(d) | Self::RateLimited(d) | Self::QuotaCooldown(d) => *d,
        }
    }
}

/// Runs dispatcher cycles until shutdown.
///
/// A failed cycle never ends the loop. Missing credentials are caught before
/// the runner is built; a rejected token at runtime backs off and retries.
#[derive(Debug)]
pub struct BotRunner {
    dispatcher: Dispatcher,
}

impl BotRunner {
    /// Runner over `dispatcher`.
    pub fn new(dispatcher: Dispatcher) -> Self {
        Self { dispatcher }
    }

    /// The wrapped dispatcher.
    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// Pick the sleep that follows a cycle result.
    pub fn delay_after(&mut self, result: &TouchlineResult<CycleReport>) -> CycleDelay {
        let bot = self.dispatcher.bot_config();
        let backoff = Duration::from_secs(bot.error_backoff_secs);
        let cooldown = Duration::from_secs(bot.quota_cooldown_secs);

        let error = match result {
            Ok(_) => return CycleDelay::Poll(self.dispatcher.next_poll_delay()),
            Err(error) => error,
        };
        match error.platform_kind() {
            Some(PlatformErrorKind::QuotaExhausted(_)) => CycleDelay::QuotaCooldown(cooldown),
            Some(PlatformErrorKind::RateLimited { retry_after_secs }) => {
                let reset = Duration::from_secs(retry_after_secs.unwrap_or(0));
                CycleDelay::RateLimited(reset.max(backoff))
            }
            _ => CycleDelay::Backoff(backoff),
        }
    }

    /// Loop until `shutdown` resolves.
    ///
    /// Shutdown is only observed between cycles, so a cycle in flight always
    /// finishes and persists its state.
    #[instrument(skip_all)]
    pub async fn run(mut self, shutdown: impl Future<Output = ()>) {
        tokio::pin!(shutdown);
        info!(
            poll_interval_secs = self.dispatcher.bot_config().poll_interval_secs,
            dry_run = self.dispatcher.bot_config().dry_run,
            "Bot loop starting"
        );

        let mut cycle: u64 = 0;
        loop {
            cycle += 1;
            let result = self.dispatcher.run_cycle().await;
            let delay = self.delay_after(&result);

            match result {
                Ok(report) => info!(
                    cycle,
                    fetched = report.fetched,
                    published = report.published(),
                    sleep_secs = delay.duration().as_secs(),
                    "Sleeping until next cycle"
                ),
                Err(e) if matches!(e.platform_kind(), Some(PlatformErrorKind::Unauthorized(_))) => {
                    error!(
                        cycle,
                        error = %e,
                        backoff_secs = delay.duration().as_secs(),
                        "Credentials rejected, check the access token"
                    )
                }
                Err(e) => match delay {
                    CycleDelay::QuotaCooldown(d) => {
                        warn!(cycle, error = %e, cooldown_secs = d.as_secs(), "Quota exhausted, cooling down")
                    }
                    CycleDelay::RateLimited(d) => {
                        warn!(cycle, error = %e, wait_secs = d.as_secs(), "Rate limited, pausing")
                    }
                    _ => error!(
                        cycle,
                        error = %e,
                        backoff_secs = delay.duration().as_secs(),
                        "Cycle failed"
                    ),
                },
            }

            tokio::select! {
                _ = tokio::time::sleep(delay.duration()) => {}
                _ = &mut shutdown => {
                    info!(cycle, "Shutdown requested");
                    return;
                }
            }
        }
    }
}
