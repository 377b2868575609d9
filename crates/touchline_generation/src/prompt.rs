//! Prompt assembly.

use rand::Rng;
use rand::seq::SliceRandom;
use touchline_core::{GenerateRequest, Language};

use crate::GenerationConfig;

/// Builds the per-attempt request sent to the text generator.
#[derive(Debug, Clone)]
pub struct PromptBuilder {
    config: GenerationConfig,
}

impl PromptBuilder {
    /// Builder over the generation settings.
    pub fn new(config: GenerationConfig) -> Self {
        Self { config }
    }

    /// Request for attempt number `attempt` (zero based).
    ///
    /// A style seed is drawn from `rng`; the temperature rises with each
    /// attempt. `hints` are short context lines such as "derby day".
    pub fn build<R: Rng>(
        &self,
        source_text: &str,
        language: Language,
        hints: &[String],
        attempt: u32,
        rng: &mut R,
    ) -> GenerateRequest {
        let mut user = String::new();
        user.push_str("Post:\n");
        user.push_str(source_text.trim());
        user.push_str("\n\n");
        if let Some(seed) = self.config.style_seeds.choose(rng) {
            user.push_str(&format!("Voice: write it like {seed}.\n"));
        }
        user.push_str(&self.config.structure_instruction);
        user.push('\n');
        for hint in hints {
            user.push_str(&format!("Context: {hint}\n"));
        }
        user.push_str(language_instruction(language));
        user.push_str(&format!(
            "\nNo hashtags, no quotes, at most {} characters, one line only.",
            self.config.char_cap
        ));

        GenerateRequest::new(
            self.config.system_prompt.clone(),
            user,
            self.config.temperature_for(attempt),
            self.config.max_tokens,
        )
    }
}

fn language_instruction(language: Language) -> &'static str {
    match language {
        Language::English => "Reply in English.",
        Language::Arabic => "Reply in Saudi Gulf Arabic, the same language as the post.",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_prompt_carries_structure_and_language() {
        let builder = PromptBuilder::new(GenerationConfig::default());
        let mut rng = StdRng::seed_from_u64(3);
        let request = builder.build(
            "الهلال ضد النصر الليلة",
            Language::Arabic,
            &["derby day".to_string()],
            1,
            &mut rng,
        );

        assert!(request.user_prompt().contains("الهلال ضد النصر"));
        assert!(request.user_prompt().contains("tech metaphor"));
        assert!(request.user_prompt().contains("Context: derby day"));
        assert!(request.user_prompt().contains("Gulf Arabic"));
        assert!((*request.temperature() - 1.0).abs() < 1e-6);
        assert_eq!(*request.max_tokens(), 100);
    }

    #[test]
    fn test_style_seed_varies_with_rng() {
        let builder = PromptBuilder::new(GenerationConfig::default());
        let mut rng = StdRng::seed_from_u64(11);
        let prompts: std::collections::HashSet<String> = (0..20)
            .map(|_| {
                builder
                    .build("Derby", Language::English, &[], 0, &mut rng)
                    .user_prompt()
                    .clone()
            })
            .collect();
        assert!(prompts.len() > 1);
    }
}
