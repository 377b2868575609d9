//! Tests for the content classifier.

use touchline_content::{ClassifierConfig, ContentClassifier, RejectReason, Subject};
use touchline_core::Language;

fn classifier() -> ContentClassifier {
    ContentClassifier::new(ClassifierConfig::default())
}

#[test]
fn test_generic_phrase_is_rejected() {
    assert_eq!(
        classifier().evaluate("Great match, well played both teams", Language::English),
        Err(RejectReason::GenericMatch)
    );
}

#[test]
fn test_generic_phrase_overrides_full_score() {
    // Flavor, subject with mock token and tone all present.
    let text = "Arsenal bottled it again, server lag everywhere 😂 well played";
    assert_eq!(
        classifier().evaluate(text, Language::English),
        Err(RejectReason::GenericMatch)
    );
    let without_cliche = "Arsenal bottled it again, server lag everywhere 😂";
    assert_eq!(
        classifier()
            .evaluate(without_cliche, Language::English)
            .map(|a| a.score),
        Ok(3)
    );
}

#[test]
fn test_generic_match_is_case_insensitive() {
    assert_eq!(
        classifier().evaluate("WHAT A GAME!!! server lag 😂", Language::English),
        Err(RejectReason::GenericMatch)
    );
}

#[test]
fn test_alias_without_mock_token_is_blocked_in_primary_language() {
    let text = "Arsenal defence buffering again 😂";
    assert_eq!(
        classifier().evaluate(text, Language::English),
        Err(RejectReason::MissingSignals)
    );
}

#[test]
fn test_unlisted_subject_waives_the_block() {
    let text = "Brentford defence buffering again 😂";
    let assessment = classifier().evaluate(text, Language::English).unwrap();
    assert_eq!(assessment.score, 2);
    assert_eq!(assessment.subject, None);
    assert_eq!(assessment.technique.as_deref(), Some("buffering"));
}

#[test]
fn test_block_only_applies_to_primary_language() {
    let text = "Arsenal defence buffering again 😂";
    let assessment = classifier().evaluate(text, Language::Arabic).unwrap();
    assert_eq!(assessment.subject.as_deref(), Some("Arsenal"));
    assert_eq!(assessment.score, 3);
}

#[test]
fn test_any_named_subject_token_satisfies_the_block() {
    // Two subjects named, only Chelsea's mock token present.
    let text = "Arsenal fans laughing while Chelsea's billion squad is still loading 😂";
    assert!(classifier().evaluate(text, Language::English).is_ok());
}

#[test]
fn test_classifier_is_deterministic() {
    let classifier = classifier();
    let texts = [
        "Arsenal defence buffering again 😂",
        "Great match, well played both teams",
        "🤖 Server lag detected: that defence needs a firmware update 😂",
        "ok",
    ];
    for text in texts {
        let first = classifier.evaluate(text, Language::English);
        for _ in 0..5 {
            assert_eq!(classifier.evaluate(text, Language::English), first);
        }
    }
}

#[test]
fn test_long_text_heuristic_is_off_by_default() {
    // Subject and tone, no flavor vocabulary.
    let text = "Madrid fans blaming the referee again after every single draw this season, imagine";
    let assessment = classifier().evaluate(text, Language::English).unwrap();
    assert_eq!(assessment.technique, None);
    assert_eq!(assessment.score, 2);
}

#[test]
fn test_long_text_heuristic_when_enabled() {
    let classifier = ContentClassifier::new(ClassifierConfig {
        long_text_generic_chars: Some(60),
        ..ClassifierConfig::default()
    });
    let bland = "Tottenham fans still waiting for a trophy, imagine the scenes at the parade lol";
    assert_eq!(
        classifier.evaluate(bland, Language::English),
        Err(RejectReason::GenericMatch)
    );
    let flavored = "Tottenham trophy cabinet still returns 404, imagine the scenes at the parade lol";
    assert!(classifier.evaluate(flavored, Language::English).is_ok());
}

#[test]
fn test_custom_subjects() {
    let classifier = ContentClassifier::new(ClassifierConfig {
        subjects: vec![Subject {
            name: "Tottenham".into(),
            aliases: vec!["Spurs".into()],
            mock_tokens: vec!["Lasagne".into()],
        }],
        ..ClassifierConfig::default()
    });
    assert_eq!(
        classifier.evaluate("Spurs wifi is down again 😂", Language::English),
        Err(RejectReason::MissingSignals)
    );
    let assessment = classifier
        .evaluate("Spurs wifi is down again, lasagne-gate 2.0 😂", Language::English)
        .unwrap();
    assert_eq!(assessment.subject.as_deref(), Some("Tottenham"));
}

#[test]
fn test_arabic_candidate() {
    let text = "الهلال يحتاج تحديث سيرفر 😂";
    let assessment = classifier().evaluate(text, Language::Arabic).unwrap();
    assert_eq!(assessment.subject.as_deref(), Some("Al Hilal"));
    assert!(assessment.technique.is_some());
}
