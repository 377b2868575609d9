//! One polling cycle over every event source.

use rand::Rng;
use rand::rngs::StdRng;
use std::sync::Arc;
use std::time::Duration;
use touchline_content::{
    ContentClassifier, EligibilityFilter, EventClassifier, KeywordEventClassifier,
};
use touchline_core::{
    Clock, ItemId, Language, SourceBatch, SourceItem, SourceKey, Timestamp, UserId,
};
use touchline_error::{PlatformError, PlatformErrorKind, TouchlineResult};
use touchline_generation::{Orchestrator, TextSource};
use touchline_interface::{SocialPlatform, TextGenerator};
use touchline_rate_limit::{Governor, Headroom, Verdict};
use touchline_state::{PersistentState, StateStore};
use tracing::{debug, info, instrument, warn};

use crate::{BotConfig, CycleReport, ItemOutcome, PostOutcome, TouchlineConfig};

const DERBY_HINT: &str = "derby or rivalry fixture, the stakes are higher than usual";

/// Errors the loop itself must react to rather than skip past.
fn is_loop_level(kind: &PlatformErrorKind) -> bool {
    matches!(
        kind,
        PlatformErrorKind::QuotaExhausted(_)
            | PlatformErrorKind::RateLimited { .. }
            | PlatformErrorKind::Unauthorized(_)
    )
}

/// Polls the sources and publishes gated replies.
///
/// Holds every collaborator and the live state; nothing is shared with other
/// tasks. Cursor moves, dedupe marks and recorded techniques are flushed to
/// the store before the next generator or platform call.
pub struct Dispatcher {
    platform: Arc<dyn SocialPlatform>,
    orchestrator: Orchestrator,
    governor: Governor,
    events: Arc<dyn EventClassifier>,
    eligibility: EligibilityFilter,
    state: PersistentState,
    clock: Arc<dyn Clock>,
    rng: StdRng,
    bot: BotConfig,
    identity: Option<UserId>,
    targets: Vec<UserId>,
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("platform", &self.platform.platform_name())
            .field("identity", &self.identity)
            .field("targets", &self.targets)
            .finish_non_exhaustive()
    }
}

impl Dispatcher {
    /// Build the dispatcher from `config` and the external collaborators.
    ///
    /// Loads the state (running migrations) and writes it back once, so an
    /// unwritable state path fails here rather than mid-loop.
    ///
    /// # Errors
    ///
    /// Invalid configuration, a fallback text the classifier rejects, or a
    /// state store that cannot be read or written.
    #[instrument(skip_all, fields(platform = platform.platform_name(), generator = generator.provider_name()))]
    pub async fn open(
        config: &TouchlineConfig,
        platform: Arc<dyn SocialPlatform>,
        generator: Arc<dyn TextGenerator>,
        store: Box<dyn StateStore>,
        clock: Arc<dyn Clock>,
        rng: StdRng,
    ) -> TouchlineResult<Self> {
        config.validate()?;

        let classifier = Arc::new(ContentClassifier::new(config.classifier.clone()));
        let orchestrator = Orchestrator::new(generator, classifier, config.generation.clone())?;
        let governor = Governor::new(config.governor.clone());

        let mut state = PersistentState::open(
            store,
            governor.retention_secs(),
            config.bot.dedupe_capacity,
        )
        .await?;
        state.persist(clock.now()).await?;
        info!(
            store = %state.describe_store(),
            seen = state.record().seen.len(),
            logged_actions = state.record().actions.timestamps().len(),
            "State loaded"
        );

        Ok(Self {
            platform,
            orchestrator,
            governor,
            events: Arc::new(KeywordEventClassifier::new(config.events.clone())),
            eligibility: EligibilityFilter::new(config.eligibility.clone()),
            state,
            clock,
            rng,
            bot: config.bot.clone(),
            identity: None,
            targets: Vec::new(),
        })
    }

    /// Replace the keyword event classifier.
    pub fn with_event_classifier(mut self, events: Arc<dyn EventClassifier>) -> Self {
        self.events = events;
        self
    }

    /// Live state.
    pub fn state(&self) -> &PersistentState {
        &self.state
    }

    /// Loop settings.
    pub fn bot_config(&self) -> &BotConfig {
        &self.bot
    }

    /// Generation orchestrator, with its classifier and fallback.
    pub fn orchestrator(&self) -> &Orchestrator {
        &self.orchestrator
    }

    /// Timelines polled after mentions, resolved on the first cycle.
    pub fn targets(&self) -> &[UserId] {
        &self.targets
    }

    /// Governor window usage right now.
    pub fn headroom(&self) -> Headroom {
        self.governor
            .headroom(&self.state.record().actions, self.clock.now())
    }

    /// Sleep before the next cycle: the poll interval with random jitter.
    pub fn next_poll_delay(&mut self) -> Duration {
        let jitter = self.bot.poll_jitter_secs as i64;
        let offset = self.rng.gen_range(-jitter..=jitter);
        let secs = (self.bot.poll_interval_secs as i64 + offset).max(1);
        Duration::from_secs(secs as u64)
    }

    /// Resolve the bot's own account and the target timelines.
    ///
    /// Runs once; later calls return the cached id.
    ///
    /// # Errors
    ///
    /// Fails when the platform cannot identify the authenticated account.
    pub async fn prepare(&mut self) -> TouchlineResult<UserId> {
        if let Some(id) = &self.identity {
            return Ok(id.clone());
        }
        let id = self.platform.authenticated_user_id().await?;
        info!(user = %id, platform = self.platform.platform_name(), "Authenticated");
        self.targets = self.resolve_targets().await;
        info!(targets = self.targets.len(), "Target timelines resolved");
        self.identity = Some(id.clone());
        Ok(id)
    }

    async fn resolve_targets(&self) -> Vec<UserId> {
        let mut resolved: Vec<UserId> = Vec::new();
        for entry in &self.bot.target_accounts {
            let entry = entry.trim().trim_start_matches('@');
            if entry.is_empty() {
                continue;
            }
            let id = if entry.chars().all(|c| c.is_ascii_digit()) {
                UserId::from(entry)
            } else {
                match self.platform.resolve_user_id(entry).await {
                    Ok(id) => {
                        debug!(handle = entry, user = %id, "Resolved target");
                        id
                    }
                    Err(e) => {
                        warn!(handle = entry, error = %e, "Skipping unresolvable target");
                        continue;
                    }
                }
            };
            if !resolved.contains(&id) {
                resolved.push(id);
            }
        }
        resolved
    }

    /// Run one cycle: mentions first, then each target timeline.
    ///
    /// Every source's cursor moves to the newest fetched id whatever happens
    /// to its items. At most one item per source reaches the governor.
    ///
    /// # Errors
    ///
    /// Mention fetch failures, state write failures, and platform errors the
    /// loop must react to (exhausted quota, rate limit, bad credentials).
    #[instrument(skip(self), fields(platform = self.platform.platform_name()))]
    pub async fn run_cycle(&mut self) -> TouchlineResult<CycleReport> {
        let me = self.prepare().await?;
        let mut report = CycleReport::default();

        let mentions = SourceKey::Mentions;
        let batch = self
            .platform
            .fetch_mentions(&me, self.state.cursor(&mentions))
            .await?;
        self.process_source(mentions, batch, false, &me, &mut report)
            .await?;

        for target in self.targets.clone() {
            let source = SourceKey::Timeline(target.clone());
            let fetched = self
                .platform
                .fetch_timeline(&target, self.state.cursor(&source))
                .await;
            let batch = match fetched {
                Ok(batch) => batch,
                Err(e) if is_loop_level(&e.kind) => return Err(e.into()),
                Err(e) => {
                    warn!(source = %source, error = %e, "Timeline fetch failed, skipping source");
                    continue;
                }
            };
            self.process_source(source, batch, true, &me, &mut report)
                .await?;
        }

        info!(
            fetched = report.fetched,
            published = report.published(),
            "Cycle complete"
        );
        Ok(report)
    }

    async fn process_source(
        &mut self,
        source: SourceKey,
        batch: SourceBatch,
        filter: bool,
        me: &UserId,
        report: &mut CycleReport,
    ) -> TouchlineResult<()> {
        report.fetched += batch.items.len();
        if let Some(newest) = batch.newest_id {
            if self.state.advance_cursor(&source, newest) {
                self.state.persist(self.clock.now()).await?;
            }
        }

        for item in &batch.items {
            if let Some(outcome) = self.screen(item, filter, me) {
                debug!(source = %source, item_id = %item.id, outcome = ?outcome, "Item screened out");
                report
                    .outcomes
                    .push((source.clone(), item.id.clone(), outcome));
                continue;
            }

            // Screening marks must be durable before generation starts
            self.state.persist(self.clock.now()).await?;
            let outcome = self.handle(&source, item, me).await?;
            report
                .outcomes
                .push((source.clone(), item.id.clone(), outcome));
            break;
        }

        self.state.persist(self.clock.now()).await?;
        Ok(())
    }

    /// Checks that settle an item without consulting the governor.
    fn screen(&mut self, item: &SourceItem, filter: bool, me: &UserId) -> Option<ItemOutcome> {
        if &item.author_id == me {
            return Some(ItemOutcome::OwnPost);
        }
        if self.state.is_seen(item.id.as_str()) {
            return Some(ItemOutcome::AlreadySeen);
        }
        if filter {
            if let Err(reason) = self.eligibility.check(item) {
                self.state.mark_seen(item.id.as_str());
                return Some(ItemOutcome::Ineligible(reason));
            }
        }
        if self.rng.gen_bool(self.bot.skip_rate) {
            self.state.mark_seen(item.id.as_str());
            return Some(ItemOutcome::RandomSkip);
        }
        None
    }

    #[instrument(skip(self, item, me), fields(source = %source, item_id = %item.id))]
    async fn handle(
        &mut self,
        source: &SourceKey,
        item: &SourceItem,
        me: &UserId,
    ) -> TouchlineResult<ItemOutcome> {
        let now = self.clock.now();
        let salient = self.events.is_high_salience(&item.text);
        if let Verdict::Denied(reason) =
            self.governor
                .allow(&self.state.record().actions, now, salient)
        {
            info!(reason = %reason, high_salience = salient, "Governor closed the window");
            return Ok(ItemOutcome::Denied(reason));
        }

        let language = Language::detect(&item.text);
        let hints = if salient {
            vec![DERBY_HINT.to_string()]
        } else {
            Vec::new()
        };

        let produced = self
            .orchestrator
            .produce(
                &item.text,
                language,
                &hints,
                &mut self.state.record_mut().recent_techniques,
                &mut self.rng,
            )
            .await;
        let passing = match produced {
            Ok(passing) => passing,
            Err(exhausted) => {
                info!(reasons = ?exhausted.reasons(), "No passing reply, marking item seen");
                self.state.mark_seen(item.id.as_str());
                self.state.persist(now).await?;
                return Ok(ItemOutcome::Exhausted(exhausted.reasons()));
            }
        };

        let check_language = match passing.source {
            TextSource::Model => language,
            TextSource::Fallback => self.orchestrator.classifier().config().primary_language,
        };
        if let Err(reason) = self
            .orchestrator
            .classifier()
            .evaluate(&passing.text, check_language)
        {
            warn!(reason = %reason, "Reply failed the pre-publish check");
            self.state.mark_seen(item.id.as_str());
            self.state.persist(now).await?;
            return Ok(ItemOutcome::Exhausted(vec![reason]));
        }

        self.state.persist(now).await?;
        match self.platform.post_reply(&passing.text, &item.id).await {
            Ok(reply_id) => {
                let now = self.clock.now();
                let next = self.governor.record(
                    &mut self.state.record_mut().actions,
                    now,
                    &mut self.rng,
                );
                self.state.mark_seen(item.id.as_str());
                self.state.persist(now).await?;
                info!(
                    reply_id = %reply_id,
                    text_source = %passing.source,
                    attempts = passing.attempts,
                    next_action_after = next,
                    "Replied"
                );

                if self.bot.like_after_reply {
                    self.like(me, &item.id).await;
                }
                self.humanize_pause().await;

                Ok(ItemOutcome::Replied {
                    reply_id,
                    source: passing.source,
                })
            }
            Err(e) => self.reply_failed(item, e, now).await,
        }
    }

    async fn reply_failed(
        &mut self,
        item: &SourceItem,
        error: PlatformError,
        now: Timestamp,
    ) -> TouchlineResult<ItemOutcome> {
        if error.kind.marks_handled() {
            info!(reason = %error.kind, "Platform refused the reply, marking item handled");
            self.state.mark_seen(item.id.as_str());
            self.state.persist(now).await?;
            return Ok(ItemOutcome::Refused(error.kind));
        }
        if is_loop_level(&error.kind) {
            self.state.persist(now).await?;
            return Err(error.into());
        }
        warn!(error = %error, "Reply failed, leaving item unmarked");
        self.state.persist(now).await?;
        Ok(ItemOutcome::Failed(error.kind))
    }

    async fn like(&self, me: &UserId, item: &ItemId) {
        if let Err(e) = self.platform.like(me, item).await {
            warn!(item_id = %item, error = %e, "Like failed");
        }
    }

    async fn humanize_pause(&mut self) {
        let secs = self
            .rng
            .gen_range(self.bot.humanize_delay_min_secs..=self.bot.humanize_delay_max_secs);
        if secs > 0 {
            debug!(secs, "Pausing after publish");
            tokio::time::sleep(Duration::from_secs(secs)).await;
        }
    }

    /// Publish a standalone status through the same gate and governor.
    ///
    /// # Errors
    ///
    /// Platform failures and state write failures.
    #[instrument(skip(self, text))]
    pub async fn post_status(&mut self, text: &str) -> TouchlineResult<PostOutcome> {
        let text = text.trim();
        let language = Language::detect(text);
        if let Err(reason) = self.orchestrator.classifier().evaluate(text, language) {
            info!(reason = %reason, "Status rejected by the classifier");
            return Ok(PostOutcome::Rejected(reason));
        }

        let now = self.clock.now();
        if let Verdict::Denied(reason) =
            self.governor
                .allow(&self.state.record().actions, now, false)
        {
            info!(reason = %reason, "Governor closed the window");
            return Ok(PostOutcome::Denied(reason));
        }

        let id = self.platform.post_status(text).await?;
        let now = self.clock.now();
        self.governor
            .record(&mut self.state.record_mut().actions, now, &mut self.rng);
        self.state.persist(now).await?;
        info!(status_id = %id, "Status published");
        Ok(PostOutcome::Published(id))
    }
}
