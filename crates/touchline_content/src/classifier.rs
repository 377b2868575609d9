//! Deterministic quality gate for candidate replies.

use serde::Serialize;
use touchline_core::Language;
use tracing::{debug, instrument};

use crate::ClassifierConfig;

/// Why a candidate was rejected.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, strum::Display, strum::AsRefStr,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum RejectReason {
    /// Matches a cliché phrase, or is long and carries no flavor vocabulary
    GenericMatch,
    /// Shorter than the minimum length
    TooShort,
    /// Names a subject without any of its mock tokens
    MissingSignals,
    /// Fewer core signals than required
    InsufficientScore,
    /// Reuses a technique from the most recent accepted replies
    RepeatedMetaphor,
}

/// What an accepted candidate contained.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Assessment {
    /// Core signals present, out of three
    pub score: u8,
    /// First recognised subject referenced
    pub subject: Option<String>,
    /// First flavor token in the text, used for anti-repetition
    pub technique: Option<String>,
}

struct SubjectTokens {
    name: String,
    aliases: Vec<String>,
    mock_tokens: Vec<String>,
}

/// Rule-based accept/reject gate.
///
/// # Examples
///
/// ```
/// use touchline_content::{ClassifierConfig, ContentClassifier, RejectReason};
/// use touchline_core::Language;
///
/// let classifier = ContentClassifier::new(ClassifierConfig::default());
///
/// let verdict = classifier.evaluate("Great match, well played both teams", Language::English);
/// assert_eq!(verdict, Err(RejectReason::GenericMatch));
///
/// let assessment = classifier
///     .evaluate("Spurs defence still buffering 😂", Language::English)
///     .unwrap();
/// assert_eq!(assessment.technique.as_deref(), Some("buffering"));
/// ```
pub struct ContentClassifier {
    config: ClassifierConfig,
    generic_phrases: Vec<String>,
    flavor: Vec<String>,
    tone: Vec<String>,
    subjects: Vec<SubjectTokens>,
}

impl std::fmt::Debug for ContentClassifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContentClassifier")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl ContentClassifier {
    /// Build a classifier, normalising every token to lowercase.
    pub fn new(config: ClassifierConfig) -> Self {
        let lower = |tokens: &[String]| -> Vec<String> {
            tokens
                .iter()
                .map(|t| t.trim().to_lowercase())
                .filter(|t| !t.is_empty())
                .collect()
        };
        let subjects = config
            .subjects
            .iter()
            .map(|s| SubjectTokens {
                name: s.name.clone(),
                aliases: lower(&s.aliases),
                mock_tokens: lower(&s.mock_tokens),
            })
            .collect();

        Self {
            generic_phrases: lower(&config.generic_phrases),
            flavor: lower(&config.flavor_vocabulary),
            tone: lower(&config.tone_markers),
            subjects,
            config,
        }
    }

    /// The configuration in force.
    pub fn config(&self) -> &ClassifierConfig {
        &self.config
    }

    /// Accept or reject `text` written in `language`.
    ///
    /// Checks run in a fixed order and the first failure wins: generic phrase,
    /// minimum length, the subject block for the primary language, then the
    /// three-signal score.
    #[instrument(skip(self, text), fields(chars = text.chars().count(), language = %language))]
    pub fn evaluate(&self, text: &str, language: Language) -> Result<Assessment, RejectReason> {
        let result = self.check(text, language);
        match &result {
            Ok(assessment) => debug!(
                score = assessment.score,
                technique = ?assessment.technique,
                "Candidate accepted"
            ),
            Err(reason) => debug!(reason = %reason, "Candidate rejected"),
        }
        result
    }

    fn check(&self, text: &str, language: Language) -> Result<Assessment, RejectReason> {
        let trimmed = text.trim();
        let lower = trimmed.to_lowercase();

        if self.generic_phrases.iter().any(|p| lower.contains(p.as_str())) {
            return Err(RejectReason::GenericMatch);
        }

        let technique = self.first_flavor_token(&lower);
        let too_long_and_bland = self
            .config
            .long_text_generic_chars
            .is_some_and(|limit| technique.is_none() && trimmed.chars().count() > limit);
        if too_long_and_bland {
            return Err(RejectReason::GenericMatch);
        }

        if trimmed.chars().count() < self.config.min_chars {
            return Err(RejectReason::TooShort);
        }

        let named: Vec<&SubjectTokens> = self
            .subjects
            .iter()
            .filter(|s| s.aliases.iter().any(|a| contains_token(&lower, a)))
            .collect();
        if language == self.config.primary_language
            && !named.is_empty()
            && !named
                .iter()
                .any(|s| s.mock_tokens.iter().any(|m| contains_token(&lower, m)))
        {
            return Err(RejectReason::MissingSignals);
        }

        let subject = self.subjects.iter().find(|s| {
            s.aliases
                .iter()
                .chain(&s.mock_tokens)
                .any(|t| contains_token(&lower, t))
        });
        let has_tone = self.tone.iter().any(|t| contains_token(&lower, t));
        let score = u8::from(technique.is_some()) + u8::from(subject.is_some()) + u8::from(has_tone);

        if score < self.config.accept_score {
            return Err(RejectReason::InsufficientScore);
        }

        Ok(Assessment {
            score,
            subject: subject.map(|s| s.name.clone()),
            technique,
        })
    }

    /// The flavor token that appears earliest in `lower`.
    fn first_flavor_token(&self, lower: &str) -> Option<String> {
        self.flavor
            .iter()
            .filter_map(|t| find_token(lower, t).map(|pos| (pos, t)))
            .min_by_key(|(pos, _)| *pos)
            .map(|(_, t)| t.clone())
    }
}

/// Whether `token` occurs in `haystack` (both lowercase).
fn contains_token(haystack: &str, token: &str) -> bool {
    find_token(haystack, token).is_some()
}

/// Byte offset of the first occurrence of `token` that starts a word.
///
/// Tokens starting with an ASCII letter or digit must not be preceded by one,
/// so "lag" does not match inside "flag". Longer tokens may carry any suffix
/// ("crashes"). Tokens of three characters or fewer must also end the word,
/// allowing only a plural "s", so "var" does not match inside "various" but
/// "bug" matches "bugs". Other tokens (emoji, Arabic) match as plain substrings.
fn find_token(haystack: &str, token: &str) -> Option<usize> {
    let needs_boundary = token
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_alphanumeric());
    let short = token.chars().count() <= SHORT_TOKEN_CHARS;
    haystack.match_indices(token).map(|(i, _)| i).find(|&i| {
        if !needs_boundary {
            return true;
        }
        let starts_word = haystack[..i]
            .chars()
            .next_back()
            .is_none_or(|c| !c.is_alphanumeric());
        starts_word && (!short || ends_word(&haystack[i + token.len()..]))
    })
}

const SHORT_TOKEN_CHARS: usize = 3;

/// Whether `rest` begins at a word end, optionally after a plural "s".
fn ends_word(rest: &str) -> bool {
    let rest = rest.strip_prefix('s').unwrap_or(rest);
    rest.chars().next().is_none_or(|c| !c.is_alphanumeric())
}
