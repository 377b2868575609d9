//! Trait definitions for the external collaborators.

use async_trait::async_trait;
use touchline_core::{GenerateRequest, ItemId, SourceBatch, UserId};
use touchline_error::{GenerationError, PlatformError};

/// Result type for social platform operations.
pub type PlatformResult<T> = Result<T, PlatformError>;

/// Result type for text generation.
pub type GenerationResult<T> = Result<T, GenerationError>;

/// A social platform account the bot reads from and posts as.
#[async_trait]
pub trait SocialPlatform: Send + Sync {
    /// Id of the account the credentials belong to.
    async fn authenticated_user_id(&self) -> PlatformResult<UserId>;

    /// Resolve a handle (without `@`) to an account id.
    async fn resolve_user_id(&self, handle: &str) -> PlatformResult<UserId>;

    /// Mentions of `user` newer than `since_id`, oldest first.
    async fn fetch_mentions(
        &self,
        user: &UserId,
        since_id: Option<&ItemId>,
    ) -> PlatformResult<SourceBatch>;

    /// Posts by `user` newer than `since_id`, oldest first.
    async fn fetch_timeline(
        &self,
        user: &UserId,
        since_id: Option<&ItemId>,
    ) -> PlatformResult<SourceBatch>;

    /// Publish `text` as a reply to `parent`.
    ///
    /// # Errors
    ///
    /// Duplicate content, conversation-control denials and quota exhaustion
    /// are reported through distinct `PlatformErrorKind`s.
    async fn post_reply(&self, text: &str, parent: &ItemId) -> PlatformResult<ItemId>;

    /// Publish `text` as a standalone post.
    async fn post_status(&self, text: &str) -> PlatformResult<ItemId>;

    /// Like the post `item`.
    async fn like(&self, user: &UserId, item: &ItemId) -> PlatformResult<()>;

    /// Platform name for logs (e.g. "x", "dry-run").
    fn platform_name(&self) -> &str;
}

/// A text model that writes candidate replies.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Generate text for a single prompt.
    async fn generate(&self, request: &GenerateRequest) -> GenerationResult<String>;

    /// Provider name (e.g. "gemini").
    fn provider_name(&self) -> &'static str;

    /// Model identifier.
    fn model_name(&self) -> &str;
}
