//! Sleep selection and shutdown of the bot loop.

use async_trait::async_trait;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use touchline_bot::{BotRunner, CycleDelay, CycleReport, Dispatcher, TouchlineConfig};
use touchline_core::{GenerateRequest, ItemId, ManualClock, SourceBatch, UserId};
use touchline_error::{
    GenerationError, GenerationErrorKind, PlatformError, PlatformErrorKind, TouchlineError,
    TouchlineResult,
};
use touchline_interface::{GenerationResult, PlatformResult, SocialPlatform, TextGenerator};
use touchline_state::MemoryStateStore;

/// Answers every mention fetch with the next scripted result.
struct FlakyPlatform {
    mentions: Mutex<Vec<PlatformResult<SourceBatch>>>,
    fetches: AtomicUsize,
}

impl FlakyPlatform {
    fn new(mut script: Vec<PlatformResult<SourceBatch>>) -> Arc<Self> {
        script.reverse();
        Arc::new(Self {
            mentions: Mutex::new(script),
            fetches: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl SocialPlatform for FlakyPlatform {
    async fn authenticated_user_id(&self) -> PlatformResult<UserId> {
        Ok(UserId::from("1"))
    }

    async fn resolve_user_id(&self, handle: &str) -> PlatformResult<UserId> {
        Err(PlatformError::new(PlatformErrorKind::UserNotFound(
            handle.to_string(),
        )))
    }

    async fn fetch_mentions(
        &self,
        _user: &UserId,
        _since_id: Option<&ItemId>,
    ) -> PlatformResult<SourceBatch> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        self.mentions
            .lock()
            .unwrap()
            .pop()
            .unwrap_or_else(|| Ok(SourceBatch::empty()))
    }

    async fn fetch_timeline(
        &self,
        _user: &UserId,
        _since_id: Option<&ItemId>,
    ) -> PlatformResult<SourceBatch> {
        Ok(SourceBatch::empty())
    }

    async fn post_reply(&self, _text: &str, _parent: &ItemId) -> PlatformResult<ItemId> {
        Ok(ItemId::from("reply"))
    }

    async fn post_status(&self, _text: &str) -> PlatformResult<ItemId> {
        Ok(ItemId::from("status"))
    }

    async fn like(&self, _user: &UserId, _item: &ItemId) -> PlatformResult<()> {
        Ok(())
    }

    fn platform_name(&self) -> &str {
        "flaky"
    }
}

struct SilentGenerator;

#[async_trait]
impl TextGenerator for SilentGenerator {
    async fn generate(&self, _request: &GenerateRequest) -> GenerationResult<String> {
        Err(GenerationError::new(GenerationErrorKind::Empty))
    }

    fn provider_name(&self) -> &'static str {
        "silent"
    }

    fn model_name(&self) -> &str {
        "none"
    }
}

async fn runner(platform: Arc<FlakyPlatform>) -> BotRunner {
    let dispatcher = Dispatcher::open(
        &TouchlineConfig::default(),
        platform,
        Arc::new(SilentGenerator),
        Box::new(MemoryStateStore::new()),
        Arc::new(ManualClock::new(1_700_000_000)),
        StdRng::seed_from_u64(3),
    )
    .await
    .unwrap();
    BotRunner::new(dispatcher)
}

fn platform_failure(kind: PlatformErrorKind) -> TouchlineResult<CycleReport> {
    Err(TouchlineError::from(PlatformError::new(kind)))
}

#[tokio::test]
async fn test_successful_cycle_sleeps_the_jittered_interval() {
    let mut runner = runner(FlakyPlatform::new(vec![])).await;
    let bot = runner.dispatcher().bot_config().clone();

    for _ in 0..20 {
        let delay = runner.delay_after(&Ok(CycleReport::default()));
        let CycleDelay::Poll(d) = delay else {
            panic!("expected a poll delay, got {delay:?}");
        };
        let low = bot.poll_interval_secs - bot.poll_jitter_secs;
        let high = bot.poll_interval_secs + bot.poll_jitter_secs;
        assert!((low..=high).contains(&d.as_secs()));
    }
}

#[tokio::test]
async fn test_failures_pick_their_own_waits() {
    let mut runner = runner(FlakyPlatform::new(vec![])).await;
    let bot = runner.dispatcher().bot_config().clone();

    assert_eq!(
        runner.delay_after(&platform_failure(PlatformErrorKind::QuotaExhausted(
            "CreditsDepleted".into()
        ))),
        CycleDelay::QuotaCooldown(Duration::from_secs(bot.quota_cooldown_secs))
    );
    assert_eq!(
        runner.delay_after(&platform_failure(PlatformErrorKind::RateLimited {
            retry_after_secs: Some(900)
        })),
        CycleDelay::RateLimited(Duration::from_secs(900))
    );
    assert_eq!(
        runner.delay_after(&platform_failure(PlatformErrorKind::RateLimited {
            retry_after_secs: None
        })),
        CycleDelay::RateLimited(Duration::from_secs(bot.error_backoff_secs))
    );
    assert_eq!(
        runner.delay_after(&platform_failure(PlatformErrorKind::Transient(
            "connection reset".into()
        ))),
        CycleDelay::Backoff(Duration::from_secs(bot.error_backoff_secs))
    );
}

#[tokio::test(start_paused = true)]
async fn test_loop_survives_failures_until_shutdown() {
    let platform = FlakyPlatform::new(vec![
        Err(PlatformError::new(PlatformErrorKind::Transient(
            "timeout".into(),
        ))),
        Ok(SourceBatch::empty()),
    ]);
    let runner = runner(platform.clone()).await;

    let shutdown = tokio::time::sleep(Duration::from_secs(3 * 3600));
    runner.run(shutdown).await;

    assert!(platform.fetches.load(Ordering::SeqCst) > 2);
}

#[tokio::test]
async fn test_rejected_credentials_back_off() {
    let mut runner = runner(FlakyPlatform::new(vec![])).await;
    let backoff = Duration::from_secs(runner.dispatcher().bot_config().error_backoff_secs);

    assert_eq!(
        runner.delay_after(&platform_failure(PlatformErrorKind::Unauthorized(
            "invalid token".into()
        ))),
        CycleDelay::Backoff(backoff)
    );
}

#[tokio::test(start_paused = true)]
async fn test_loop_survives_rejected_credentials() {
    let platform = FlakyPlatform::new(vec![
        Err(PlatformError::new(PlatformErrorKind::Unauthorized(
            "invalid token".into(),
        ))),
        Err(PlatformError::new(PlatformErrorKind::Unauthorized(
            "invalid token".into(),
        ))),
    ]);
    let runner = runner(platform.clone()).await;

    let shutdown = tokio::time::sleep(Duration::from_secs(3600));
    runner.run(shutdown).await;

    assert!(platform.fetches.load(Ordering::SeqCst) > 2);
}
