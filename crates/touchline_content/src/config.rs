//! Vocabulary and thresholds for the content rules.

use serde::{Deserialize, Serialize};
use touchline_core::Language;

/// A club or person the bot recognises by name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subject {
    /// Display name
    pub name: String,
    /// Plain names the subject is referred to by
    pub aliases: Vec<String>,
    /// Tokens that mock this subject specifically
    #[serde(default)]
    pub mock_tokens: Vec<String>,
}

impl Subject {
    fn new(name: &str, aliases: &[&str], mock_tokens: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            aliases: aliases.iter().map(|s| s.to_string()).collect(),
            mock_tokens: mock_tokens.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Content classifier configuration (`[classifier]`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifierConfig {
    /// Cliché phrases that reject a candidate outright
    #[serde(default = "default_generic_phrases")]
    pub generic_phrases: Vec<String>,

    /// Brand-voice jargon; one hit scores a point and names the technique
    #[serde(default = "default_flavor_vocabulary")]
    pub flavor_vocabulary: Vec<String>,

    /// Sarcasm markers; one hit scores a point
    #[serde(default = "default_tone_markers")]
    pub tone_markers: Vec<String>,

    /// Recognised subjects
    #[serde(default = "default_subjects")]
    pub subjects: Vec<Subject>,

    /// Language for which naming a subject requires one of its mock tokens
    #[serde(default)]
    pub primary_language: Language,

    /// Shortest accepted text, in characters after trimming
    #[serde(default = "default_min_chars")]
    pub min_chars: usize,

    /// Signals required out of three
    #[serde(default = "default_accept_score")]
    pub accept_score: u8,

    /// When set, texts longer than this with no flavor token count as generic
    #[serde(default)]
    pub long_text_generic_chars: Option<usize>,
}

fn default_generic_phrases() -> Vec<String> {
    [
        "great match",
        "great game",
        "well played",
        "what a game",
        "both teams",
        "congratulations",
        "congrats to",
        "good luck",
        "amazing performance",
        "proud of the team",
        "hard luck",
        "مباراة رائعة",
        "مبروك",
        "بالتوفيق",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_flavor_vocabulary() -> Vec<String> {
    [
        "firmware",
        "server",
        "lag",
        "bug",
        "patch",
        "reboot",
        "wifi",
        "buffering",
        "404",
        "crash",
        "debug",
        "algorithm",
        "ctrl+z",
        "loading",
        "glitch",
        "hotfix",
        "cache",
        "bluetooth",
        "سيرفر",
        "تحديث",
        "هكر",
        "تعليق",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_tone_markers() -> Vec<String> {
    [
        "😂", "🤣", "💀", "🙃", "😭", "🤡", "🫠", "lol", "lmao", "imagine", "classic",
        "certified", "هههه", "يا حليله",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_subjects() -> Vec<Subject> {
    vec![
        Subject::new(
            "Arsenal",
            &["arsenal", "gunners"],
            &["bottle", "bottled", "trophyless", "fourth place", "almost"],
        ),
        Subject::new(
            "Manchester United",
            &["man utd", "manchester united", "man united"],
            &["rebuild", "glazers", "project", "fergie"],
        ),
        Subject::new(
            "Chelsea",
            &["chelsea"],
            &["spending spree", "billion", "loan army", "sack"],
        ),
        Subject::new(
            "Liverpool",
            &["liverpool"],
            &["slip", "next year", "this is anfield"],
        ),
        Subject::new(
            "Real Madrid",
            &["real madrid", "madrid"],
            &["ucl dna", "referee", "var"],
        ),
        Subject::new(
            "Barcelona",
            &["barcelona", "barca", "barça"],
            &["levers", "remontada", "debts"],
        ),
        Subject::new(
            "Manchester City",
            &["man city", "manchester city"],
            &["115", "charges", "oil money"],
        ),
        Subject::new("Al Hilal", &["hilal", "الهلال"], &["الزعيم", "بنك"]),
        Subject::new("Al Nassr", &["nassr", "النصر"], &["العالمي", "رونالدو"]),
        Subject::new("Al Ittihad", &["ittihad", "الاتحاد"], &["العميد", "النمور"]),
    ]
}

fn default_min_chars() -> usize {
    8
}

fn default_accept_score() -> u8 {
    2
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            generic_phrases: default_generic_phrases(),
            flavor_vocabulary: default_flavor_vocabulary(),
            tone_markers: default_tone_markers(),
            subjects: default_subjects(),
            primary_language: Language::default(),
            min_chars: default_min_chars(),
            accept_score: default_accept_score(),
            long_text_generic_chars: None,
        }
    }
}

impl ClassifierConfig {
    /// Check the configuration can ever accept a candidate.
    ///
    /// # Errors
    ///
    /// Returns a description of the first unusable value.
    pub fn validate(&self) -> Result<(), String> {
        if self.accept_score == 0 || self.accept_score > 3 {
            return Err(format!(
                "accept_score must be 1..=3, got {}",
                self.accept_score
            ));
        }
        if self.flavor_vocabulary.iter().all(|t| t.trim().is_empty()) {
            return Err("flavor_vocabulary must not be empty".to_string());
        }
        if let Some(subject) = self.subjects.iter().find(|s| s.aliases.is_empty()) {
            return Err(format!("subject '{}' has no aliases", subject.name));
        }
        Ok(())
    }
}

/// Derby and rivalry keywords (`[events]`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventsConfig {
    /// Keywords that mark a post as high salience on their own
    #[serde(default = "default_derby_keywords")]
    pub derby_keywords: Vec<String>,

    /// Name pairs that mark a post as high salience when both appear
    #[serde(default = "default_rivalry_pairs")]
    pub rivalry_pairs: Vec<[String; 2]>,
}

fn default_derby_keywords() -> Vec<String> {
    ["derby", "clasico", "clásico", "ديربي", "الكلاسيكو", "كلاسيكو"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_rivalry_pairs() -> Vec<[String; 2]> {
    [
        ("arsenal", "tottenham"),
        ("arsenal", "spurs"),
        ("liverpool", "everton"),
        ("man utd", "man city"),
        ("real madrid", "barcelona"),
        ("hilal", "nassr"),
        ("الهلال", "النصر"),
        ("ittihad", "ahli"),
        ("الاتحاد", "الأهلي"),
    ]
    .iter()
    .map(|(a, b)| [a.to_string(), b.to_string()])
    .collect()
}

impl Default for EventsConfig {
    fn default() -> Self {
        Self {
            derby_keywords: default_derby_keywords(),
            rivalry_pairs: default_rivalry_pairs(),
        }
    }
}

/// Per-item rules for target timelines (`[eligibility]`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EligibilityConfig {
    /// Most links a source post may carry
    #[serde(default = "default_max_links")]
    pub max_links: usize,

    /// Most @-mentions a source post may carry
    #[serde(default = "default_max_mentions")]
    pub max_mentions: usize,
}

fn default_max_links() -> usize {
    1
}

fn default_max_mentions() -> usize {
    3
}

impl Default for EligibilityConfig {
    fn default() -> Self {
        Self {
            max_links: default_max_links(),
            max_mentions: default_max_mentions(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        assert!(ClassifierConfig::default().validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_default_vocabulary() {
        let config: ClassifierConfig = toml::from_str(
            r#"
            min_chars = 12
            long_text_generic_chars = 160

            [[subjects]]
            name = "Tottenham"
            aliases = ["spurs", "tottenham"]
            mock_tokens = ["lasagne"]
            "#,
        )
        .unwrap();

        assert_eq!(config.min_chars, 12);
        assert_eq!(config.long_text_generic_chars, Some(160));
        assert_eq!(config.subjects.len(), 1);
        assert!(config.flavor_vocabulary.contains(&"firmware".to_string()));
    }

    #[test]
    fn test_subject_without_alias_is_rejected() {
        let config = ClassifierConfig {
            subjects: vec![Subject {
                name: "Nobody".into(),
                aliases: vec![],
                mock_tokens: vec![],
            }],
            ..ClassifierConfig::default()
        };
        assert!(config.validate().unwrap_err().contains("Nobody"));
    }

    #[test]
    fn test_rivalry_pairs_parse_from_arrays() {
        let config: EventsConfig =
            toml::from_str(r#"rivalry_pairs = [["celtic", "rangers"]]"#).unwrap();
        assert_eq!(config.rivalry_pairs[0][1], "rangers");
        assert!(!config.derby_keywords.is_empty());
    }
}
