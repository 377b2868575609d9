//! Tests for the target-timeline eligibility filter.

use touchline_content::{EligibilityConfig, EligibilityFilter, Ineligible};
use touchline_core::{ItemId, SourceItem, SourceItemBuilder};

fn post(text: &str) -> SourceItemBuilder {
    let mut builder = SourceItemBuilder::default();
    builder.id("1790").text(text).author_id("19672628");
    builder
}

fn build(builder: &SourceItemBuilder) -> SourceItem {
    builder.build().unwrap()
}

fn filter() -> EligibilityFilter {
    EligibilityFilter::new(EligibilityConfig::default())
}

#[test]
fn test_plain_post_is_eligible() {
    let item = build(&post("Full time: Liverpool 2-1 Everton https://t.co/abc"));
    assert_eq!(filter().check(&item), Ok(()));
}

#[test]
fn test_retweets_are_skipped() {
    let flagged = build(post("Matchday!").is_retweet(true));
    assert_eq!(filter().check(&flagged), Err(Ineligible::Retweet));

    let legacy = build(&post("RT @LFC: Matchday!"));
    assert_eq!(filter().check(&legacy), Err(Ineligible::Retweet));
}

#[test]
fn test_replies_and_quotes_are_skipped() {
    let reply = build(post("Thanks!").in_reply_to(Some(ItemId::from("1789"))));
    assert_eq!(filter().check(&reply), Err(Ineligible::Reply));

    let quote = build(post("Look at this").is_quote(true));
    assert_eq!(filter().check(&quote), Err(Ineligible::Quote));
}

#[test]
fn test_link_spam_is_skipped() {
    let item = build(&post("Tickets https://a.example/x and https://b.example/y"));
    assert_eq!(filter().check(&item), Err(Ineligible::TooManyLinks));
}

#[test]
fn test_mention_spam_is_skipped() {
    let item = build(&post("Shoutout @a @b @c @d"));
    assert_eq!(filter().check(&item), Err(Ineligible::TooManyMentions));

    let fine = build(&post("Shoutout @a @b @c, email me at x@example.com"));
    assert_eq!(filter().check(&fine), Ok(()));
}

#[test]
fn test_limits_are_configurable() {
    let strict = EligibilityFilter::new(EligibilityConfig {
        max_links: 0,
        max_mentions: 0,
    });
    let item = build(&post("Highlights https://t.co/abc"));
    assert_eq!(strict.check(&item), Err(Ineligible::TooManyLinks));
}
