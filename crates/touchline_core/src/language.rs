//! Language hints.

use serde::{Deserialize, Serialize};

/// Language of a source post and of the reply written for it.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Language {
    /// English
    #[default]
    English,
    /// Arabic (Gulf dialect)
    Arabic,
}

impl Language {
    /// Detect the language of a post from its script.
    ///
    /// Any Arabic-script character makes the post Arabic.
    ///
    /// # Examples
    ///
    /// ```
    /// use touchline_core::Language;
    ///
    /// assert_eq!(Language::detect("الهلال فاز"), Language::Arabic);
    /// assert_eq!(Language::detect("Hilal won again"), Language::English);
    /// ```
    pub fn detect(text: &str) -> Self {
        if text.chars().any(is_arabic_script) {
            Self::Arabic
        } else {
            Self::English
        }
    }
}

fn is_arabic_script(c: char) -> bool {
    matches!(
        c,
        '\u{0600}'..='\u{06FF}'
            | '\u{0750}'..='\u{077F}'
            | '\u{FB50}'..='\u{FDFF}'
            | '\u{FE70}'..='\u{FEFF}'
    )
}
