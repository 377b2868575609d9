//! X v2 wire types and status mapping.

use serde::{Deserialize, Serialize};
use touchline_core::{ItemId, SourceBatch, SourceItem, UserId};
use touchline_error::PlatformErrorKind;

/// `GET /users/me` and `GET /users/by/username/{handle}`.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct UserLookup {
    #[serde(default)]
    pub data: Option<UserData>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct UserData {
    pub id: String,
}

/// One page of `GET /users/{id}/mentions` or `GET /users/{id}/tweets`.
///
/// The API returns posts newest first; [`TweetPage::into_batch`] reverses them.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TweetPage {
    #[serde(default)]
    data: Vec<Tweet>,
    #[serde(default)]
    meta: Option<PageMeta>,
}

#[derive(Debug, Clone, Deserialize)]
struct Tweet {
    id: String,
    text: String,
    #[serde(default)]
    author_id: Option<String>,
    #[serde(default)]
    referenced_tweets: Vec<ReferencedTweet>,
}

#[derive(Debug, Clone, Deserialize)]
struct ReferencedTweet {
    #[serde(rename = "type")]
    kind: String,
    id: String,
}

#[derive(Debug, Clone, Deserialize)]
struct PageMeta {
    #[serde(default)]
    newest_id: Option<String>,
}

impl TweetPage {
    /// Convert to a batch, oldest first.
    ///
    /// `default_author` is used for posts that carry no `author_id`
    /// (a timeline fetch only returns the owner's posts).
    pub fn into_batch(self, default_author: &UserId) -> SourceBatch {
        let newest_id = self
            .meta
            .and_then(|m| m.newest_id)
            .or_else(|| self.data.first().map(|t| t.id.clone()))
            .map(ItemId::from);

        let items = self
            .data
            .into_iter()
            .rev()
            .map(|tweet| {
                let referenced = |kind: &str| {
                    tweet
                        .referenced_tweets
                        .iter()
                        .find(|r| r.kind == kind)
                        .map(|r| ItemId::from(r.id.as_str()))
                };
                SourceItem {
                    is_retweet: referenced("retweeted").is_some()
                        || tweet.text.starts_with("RT @"),
                    is_quote: referenced("quoted").is_some(),
                    in_reply_to: referenced("replied_to"),
                    author_id: tweet
                        .author_id
                        .clone()
                        .map(UserId::from)
                        .unwrap_or_else(|| default_author.clone()),
                    id: ItemId::from(tweet.id),
                    text: tweet.text,
                }
            })
            .collect();

        SourceBatch { items, newest_id }
    }
}

/// `POST /tweets` body.
#[derive(Debug, Clone, Serialize)]
pub(crate) struct CreateTweet<'a> {
    pub text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply: Option<ReplyTo<'a>>,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct ReplyTo<'a> {
    pub in_reply_to_tweet_id: &'a str,
}

/// `POST /tweets` response.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct CreatedTweet {
    pub data: CreatedTweetData,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct CreatedTweetData {
    pub id: String,
}

/// `POST /users/{id}/likes` body.
#[derive(Debug, Clone, Serialize)]
pub(crate) struct LikeTweet<'a> {
    pub tweet_id: &'a str,
}

/// Map a failed HTTP status to a platform error kind.
///
/// `reset_at` is the `x-rate-limit-reset` header (epoch seconds) when present.
///
/// # Examples
///
/// ```
/// use touchline_error::PlatformErrorKind;
/// use touchline_social::classify_status;
///
/// let kind = classify_status(429, Some(1_060), 1_000, "");
/// assert_eq!(kind, PlatformErrorKind::RateLimited { retry_after_secs: Some(60) });
/// ```
pub fn classify_status(status: u16, reset_at: Option<i64>, now: i64, body: &str) -> PlatformErrorKind {
    let message = body.to_string();
    let lowered = body.to_lowercase();
    match status {
        401 => PlatformErrorKind::Unauthorized(message),
        402 => PlatformErrorKind::QuotaExhausted(message),
        403 if lowered.contains("duplicate") => PlatformErrorKind::Duplicate(message),
        403 => PlatformErrorKind::Forbidden(message),
        429 if lowered.contains("usagecapexceeded") || lowered.contains("usage cap") => {
            PlatformErrorKind::QuotaExhausted(message)
        }
        429 => PlatformErrorKind::RateLimited {
            retry_after_secs: reset_at.map(|reset| reset.saturating_sub(now).max(0) as u64),
        },
        500..=599 => PlatformErrorKind::Transient(format!("HTTP {status}: {message}")),
        _ => PlatformErrorKind::Rejected { status, message },
    }
}
