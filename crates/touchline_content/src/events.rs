//! High-salience event detection.

use tracing::debug;

use crate::EventsConfig;

/// Decides whether a source post is a high-salience event.
///
/// High-salience posts are subject to the governor's burst cap.
pub trait EventClassifier: Send + Sync {
    /// Whether `text` describes a derby or rivalry event.
    fn is_high_salience(&self, text: &str) -> bool;
}

/// Keyword-table event classifier.
///
/// A post is high salience when it contains a derby keyword, or both names
/// of a rivalry pair.
///
/// # Examples
///
/// ```
/// use touchline_content::{EventClassifier, EventsConfig, KeywordEventClassifier};
///
/// let events = KeywordEventClassifier::new(EventsConfig::default());
/// assert!(events.is_high_salience("North London DERBY day"));
/// assert!(events.is_high_salience("Arsenal v Tottenham, 17:30"));
/// assert!(!events.is_high_salience("Arsenal v Brentford, 17:30"));
/// ```
#[derive(Debug, Clone)]
pub struct KeywordEventClassifier {
    keywords: Vec<String>,
    pairs: Vec<(String, String)>,
}

impl KeywordEventClassifier {
    /// Classifier over the configured tables.
    pub fn new(config: EventsConfig) -> Self {
        Self {
            keywords: config
                .derby_keywords
                .iter()
                .map(|k| k.to_lowercase())
                .collect(),
            pairs: config
                .rivalry_pairs
                .iter()
                .map(|[a, b]| (a.to_lowercase(), b.to_lowercase()))
                .collect(),
        }
    }
}

impl EventClassifier for KeywordEventClassifier {
    fn is_high_salience(&self, text: &str) -> bool {
        let lower = text.to_lowercase();
        if let Some(keyword) = self.keywords.iter().find(|k| lower.contains(k.as_str())) {
            debug!(keyword = %keyword, "Derby keyword found");
            return true;
        }
        if let Some((a, b)) = self
            .pairs
            .iter()
            .find(|(a, b)| lower.contains(a.as_str()) && lower.contains(b.as_str()))
        {
            debug!(home = %a, away = %b, "Rivalry pair found");
            return true;
        }
        false
    }
}
