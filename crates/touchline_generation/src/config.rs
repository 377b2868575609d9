//! Orchestrator settings (`[generation]`).

use serde::{Deserialize, Serialize};

/// Generation orchestrator configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// Attempts per source item
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Temperature of the first attempt
    #[serde(default = "default_base_temperature")]
    pub base_temperature: f32,

    /// Temperature added per further attempt
    #[serde(default = "default_temperature_step")]
    pub temperature_step: f32,

    /// Output token ceiling
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Hard cap on the published text, in characters
    #[serde(default = "default_char_cap")]
    pub char_cap: usize,

    /// How many recent accepted techniques a new reply must not repeat
    #[serde(default = "default_technique_window")]
    pub technique_window: usize,

    /// Personas one of which is picked at random per attempt
    #[serde(default = "default_style_seeds")]
    pub style_seeds: Vec<String>,

    /// The fixed three-part shape every reply must follow
    #[serde(default = "default_structure_instruction")]
    pub structure_instruction: String,

    /// Brand voice
    #[serde(default = "default_system_prompt")]
    pub system_prompt: String,

    /// Reply used when the generator fails on every attempt
    #[serde(default = "default_fallback_text")]
    pub fallback_text: String,
}

fn default_max_attempts() -> u32 {
    3
}

fn default_base_temperature() -> f32 {
    0.9
}

fn default_temperature_step() -> f32 {
    0.1
}

fn default_max_tokens() -> u32 {
    100
}

fn default_char_cap() -> usize {
    240
}

fn default_technique_window() -> usize {
    3
}

fn default_style_seeds() -> Vec<String> {
    [
        "a deadpan sysadmin reading the incident report",
        "a smug esports caster",
        "a tired IT helpdesk agent on the night shift",
        "an overexcited gadget reviewer",
        "a release manager announcing yet another hotfix",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_structure_instruction() -> String {
    "Structure: a jab at the team or player, then one tech metaphor, then a punchline.".to_string()
}

fn default_system_prompt() -> String {
    "You are a sarcastic football fan account. Mock tactics, management, missed chances and \
     lazy players, never injuries. Mostly football sarcasm with a little tech humour. \
     Never repeat the post back, never congratulate, one short line only."
        .to_string()
}

fn default_fallback_text() -> String {
    "🤖 Server lag detected: that defence needs a firmware update 😂".to_string()
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            base_temperature: default_base_temperature(),
            temperature_step: default_temperature_step(),
            max_tokens: default_max_tokens(),
            char_cap: default_char_cap(),
            technique_window: default_technique_window(),
            style_seeds: default_style_seeds(),
            structure_instruction: default_structure_instruction(),
            system_prompt: default_system_prompt(),
            fallback_text: default_fallback_text(),
        }
    }
}

impl GenerationConfig {
    /// Temperature for the zero-based `attempt`, capped at 2.0.
    pub fn temperature_for(&self, attempt: u32) -> f32 {
        (self.base_temperature + self.temperature_step * attempt as f32).min(2.0)
    }

    /// Check the settings are usable.
    ///
    /// # Errors
    ///
    /// Returns a description of the first unusable value.
    pub fn validate(&self) -> Result<(), String> {
        if self.max_attempts == 0 {
            return Err("max_attempts must be at least 1".to_string());
        }
        if self.char_cap == 0 {
            return Err("char_cap must be positive".to_string());
        }
        if self.fallback_text.trim().is_empty() {
            return Err("fallback_text must not be empty".to_string());
        }
        if !(0.0..=2.0).contains(&self.base_temperature) || self.temperature_step < 0.0 {
            return Err(format!(
                "temperature settings out of range: base {} step {}",
                self.base_temperature, self.temperature_step
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_temperature_escalates() {
        let config = GenerationConfig::default();
        assert!((config.temperature_for(0) - 0.9).abs() < f32::EPSILON);
        assert!((config.temperature_for(2) - 1.1).abs() < 1e-6);
        assert_eq!(config.temperature_for(50), 2.0);
    }

    #[test]
    fn test_empty_fallback_is_rejected() {
        let config = GenerationConfig {
            fallback_text: "  ".into(),
            ..GenerationConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_table() {
        let config: GenerationConfig = toml::from_str("max_attempts = 5").unwrap();
        assert_eq!(config.max_attempts, 5);
        assert_eq!(config.char_cap, 240);
    }
}
