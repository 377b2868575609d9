//! Read-through platform that never publishes.

use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use touchline_core::{ItemId, SourceBatch, UserId};
use touchline_interface::{PlatformResult, SocialPlatform};
use tracing::info;

/// A write the dry-run platform swallowed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DryRunPost {
    /// Synthetic id handed back to the caller
    pub id: ItemId,
    /// Post text
    pub text: String,
    /// Parent post for replies
    pub parent: Option<ItemId>,
}

/// Wraps a real platform: reads go through, writes are logged and recorded.
///
/// Governor, classifier and state updates still run against it, so a dry run
/// exercises everything except publishing.
pub struct DryRunPlatform {
    inner: Arc<dyn SocialPlatform>,
    next_id: AtomicU64,
    posts: Mutex<Vec<DryRunPost>>,
}

impl std::fmt::Debug for DryRunPlatform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DryRunPlatform")
            .field("inner", &self.inner.platform_name())
            .finish_non_exhaustive()
    }
}

impl DryRunPlatform {
    /// Dry-run wrapper around `inner`.
    pub fn new(inner: Arc<dyn SocialPlatform>) -> Self {
        Self {
            inner,
            next_id: AtomicU64::new(1),
            posts: Mutex::new(Vec::new()),
        }
    }

    /// Everything that would have been published, in order.
    pub fn posts(&self) -> Vec<DryRunPost> {
        self.posts
            .lock()
            .map(|posts| posts.clone())
            .unwrap_or_default()
    }

    fn record(&self, text: &str, parent: Option<&ItemId>) -> ItemId {
        let id = ItemId::from(format!(
            "dry-run-{}",
            self.next_id.fetch_add(1, Ordering::SeqCst)
        ));
        if let Ok(mut posts) = self.posts.lock() {
            posts.push(DryRunPost {
                id: id.clone(),
                text: text.to_string(),
                parent: parent.cloned(),
            });
        }
        id
    }
}

#[async_trait]
impl SocialPlatform for DryRunPlatform {
    async fn authenticated_user_id(&self) -> PlatformResult<UserId> {
        self.inner.authenticated_user_id().await
    }

    async fn resolve_user_id(&self, handle: &str) -> PlatformResult<UserId> {
        self.inner.resolve_user_id(handle).await
    }

    async fn fetch_mentions(
        &self,
        user: &UserId,
        since_id: Option<&ItemId>,
    ) -> PlatformResult<SourceBatch> {
        self.inner.fetch_mentions(user, since_id).await
    }

    async fn fetch_timeline(
        &self,
        user: &UserId,
        since_id: Option<&ItemId>,
    ) -> PlatformResult<SourceBatch> {
        self.inner.fetch_timeline(user, since_id).await
    }

    async fn post_reply(&self, text: &str, parent: &ItemId) -> PlatformResult<ItemId> {
        let id = self.record(text, Some(parent));
        info!(dry_run = true, parent = %parent, reply_id = %id, text, "Would post reply");
        Ok(id)
    }

    async fn post_status(&self, text: &str) -> PlatformResult<ItemId> {
        let id = self.record(text, None);
        info!(dry_run = true, status_id = %id, text, "Would post status");
        Ok(id)
    }

    async fn like(&self, _user: &UserId, item: &ItemId) -> PlatformResult<()> {
        info!(dry_run = true, item = %item, "Would like post");
        Ok(())
    }

    fn platform_name(&self) -> &str {
        "dry-run"
    }
}
