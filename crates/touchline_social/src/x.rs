//! X v2 REST client.

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tokio_retry2::strategy::{ExponentialBackoff, jitter};
use tokio_retry2::{Retry, RetryError};
use touchline_core::{ItemId, SourceBatch, UserId};
use touchline_error::{PlatformError, PlatformErrorKind};
use touchline_interface::{PlatformResult, SocialPlatform};
use tracing::{debug, error, info, instrument, warn};

use crate::SocialConfig;
use crate::types::{
    CreateTweet, CreatedTweet, LikeTweet, ReplyTo, TweetPage, UserLookup, classify_status,
};

const TWEET_FIELDS: &str = "author_id,referenced_tweets,in_reply_to_user_id,created_at";

/// X API client authenticated with an OAuth 2.0 user access token.
#[derive(Clone)]
pub struct XClient {
    client: Client,
    token: String,
    config: SocialConfig,
}

impl std::fmt::Debug for XClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("XClient")
            .field("base_url", &self.config.base_url)
            .finish_non_exhaustive()
    }
}

impl XClient {
    /// Client for the account owning `token`.
    ///
    /// # Errors
    ///
    /// Fails if the HTTP client cannot be built.
    pub fn new(token: impl Into<String>, config: SocialConfig) -> PlatformResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| PlatformError::new(PlatformErrorKind::Transient(e.to_string())))?;
        debug!(base_url = %config.base_url, "Created X client");
        Ok(Self {
            client,
            token: token.into(),
            config,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.config.base_url.trim_end_matches('/'), path)
    }

    /// Send one request and decode the JSON body, retrying transient failures.
    async fn call<T, F>(&self, build: F) -> PlatformResult<T>
    where
        T: DeserializeOwned,
        F: Fn() -> RequestBuilder,
    {
        let strategy = ExponentialBackoff::from_millis(self.config.retry_backoff_ms)
            .factor(2)
            .max_delay(Duration::from_secs(30))
            .map(jitter)
            .take(self.config.max_retries);

        let build = &build;
        Retry::spawn(strategy, move || async move {
            match self.send_once(build()).await {
                Ok(value) => Ok(value),
                Err(e) if e.kind.is_retryable() => {
                    warn!(error = %e, "Transient X API failure, will retry");
                    Err(RetryError::Transient {
                        err: e,
                        retry_after: None,
                    })
                }
                Err(e) => Err(RetryError::Permanent(e)),
            }
        })
        .await
    }

    async fn send_once<T: DeserializeOwned>(&self, request: RequestBuilder) -> PlatformResult<T> {
        let response = request.bearer_auth(&self.token).send().await.map_err(|e| {
            error!(error = ?e, "Failed to send request to X API");
            PlatformError::new(PlatformErrorKind::Transient(e.to_string()))
        })?;

        if !response.status().is_success() {
            return Err(PlatformError::new(Self::error_kind(response).await));
        }

        response.json::<T>().await.map_err(|e| {
            error!(error = ?e, "Failed to parse X API response");
            PlatformError::new(PlatformErrorKind::MalformedResponse(e.to_string()))
        })
    }

    async fn error_kind(response: Response) -> PlatformErrorKind {
        let status = response.status().as_u16();
        let reset_at = response
            .headers()
            .get("x-rate-limit-reset")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<i64>().ok());
        let body = response.text().await.unwrap_or_default();
        let kind = classify_status(status, reset_at, chrono::Utc::now().timestamp(), &body);
        warn!(status, kind = %kind, "X API returned error");
        kind
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.client.request(method, self.url(path))
    }

    async fn fetch_page(
        &self,
        path: &str,
        owner: &UserId,
        since_id: Option<&ItemId>,
    ) -> PlatformResult<SourceBatch> {
        let mut query = vec![
            ("max_results", self.config.page_size.to_string()),
            ("tweet.fields", TWEET_FIELDS.to_string()),
            ("expansions", "referenced_tweets.id".to_string()),
        ];
        if let Some(since) = since_id {
            query.push(("since_id", since.to_string()));
        }

        let page: TweetPage = self
            .call(|| self.request(Method::GET, path).query(&query))
            .await?;
        let batch = page.into_batch(owner);
        debug!(
            count = batch.items.len(),
            newest_id = ?batch.newest_id,
            "Fetched page"
        );
        Ok(batch)
    }

    async fn create_tweet(&self, body: CreateTweet<'_>) -> PlatformResult<ItemId> {
        let created: CreatedTweet = self
            .call(|| self.request(Method::POST, "tweets").json(&body))
            .await?;
        Ok(ItemId::from(created.data.id))
    }
}

#[async_trait]
impl SocialPlatform for XClient {
    #[instrument(skip(self))]
    async fn authenticated_user_id(&self) -> PlatformResult<UserId> {
        let lookup: UserLookup = self.call(|| self.request(Method::GET, "users/me")).await?;
        lookup.data.map(|u| UserId::from(u.id)).ok_or_else(|| {
            PlatformError::new(PlatformErrorKind::MalformedResponse(
                "users/me returned no data".to_string(),
            ))
        })
    }

    #[instrument(skip(self))]
    async fn resolve_user_id(&self, handle: &str) -> PlatformResult<UserId> {
        let handle = handle.trim().trim_start_matches('@');
        let path = format!("users/by/username/{handle}");
        let lookup: UserLookup = match self.call(|| self.request(Method::GET, &path)).await {
            Ok(lookup) => lookup,
            Err(e) if matches!(e.kind, PlatformErrorKind::Rejected { status: 404, .. }) => {
                return Err(PlatformError::new(PlatformErrorKind::UserNotFound(
                    handle.to_string(),
                )));
            }
            Err(e) => return Err(e),
        };
        lookup
            .data
            .map(|u| UserId::from(u.id))
            .ok_or_else(|| PlatformError::new(PlatformErrorKind::UserNotFound(handle.to_string())))
    }

    #[instrument(skip(self, user), fields(user = %user))]
    async fn fetch_mentions(
        &self,
        user: &UserId,
        since_id: Option<&ItemId>,
    ) -> PlatformResult<SourceBatch> {
        self.fetch_page(&format!("users/{user}/mentions"), user, since_id)
            .await
    }

    #[instrument(skip(self, user), fields(user = %user))]
    async fn fetch_timeline(
        &self,
        user: &UserId,
        since_id: Option<&ItemId>,
    ) -> PlatformResult<SourceBatch> {
        self.fetch_page(&format!("users/{user}/tweets"), user, since_id)
            .await
    }

    #[instrument(skip(self, text, parent), fields(parent = %parent))]
    async fn post_reply(&self, text: &str, parent: &ItemId) -> PlatformResult<ItemId> {
        let id = self
            .create_tweet(CreateTweet {
                text,
                reply: Some(ReplyTo {
                    in_reply_to_tweet_id: parent.as_str(),
                }),
            })
            .await?;
        info!(reply_id = %id, "Posted reply");
        Ok(id)
    }

    #[instrument(skip(self, text))]
    async fn post_status(&self, text: &str) -> PlatformResult<ItemId> {
        let id = self.create_tweet(CreateTweet { text, reply: None }).await?;
        info!(status_id = %id, "Posted status");
        Ok(id)
    }

    #[instrument(skip(self, user, item), fields(user = %user, item = %item))]
    async fn like(&self, user: &UserId, item: &ItemId) -> PlatformResult<()> {
        let path = format!("users/{user}/likes");
        let body = LikeTweet {
            tweet_id: item.as_str(),
        };
        let _: serde_json::Value = self
            .call(|| self.request(Method::POST, &path).json(&body))
            .await?;
        debug!("Liked post");
        Ok(())
    }

    fn platform_name(&self) -> &str {
        "x"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_join() {
        let client = XClient::new(
            "token",
            SocialConfig {
                base_url: "https://api.example.test/2/".into(),
                ..SocialConfig::default()
            },
        )
        .unwrap();
        assert_eq!(client.url("users/me"), "https://api.example.test/2/users/me");
        assert_eq!(client.platform_name(), "x");
    }
}
