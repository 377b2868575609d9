//! Generate-and-gate retry loop.

use rand::Rng;
use std::sync::Arc;
use touchline_content::{Assessment, ContentClassifier, RejectReason};
use touchline_core::Language;
use touchline_error::{ConfigError, GenerationError, GenerationErrorKind};
use touchline_interface::TextGenerator;
use touchline_state::RecentTechniques;
use tracing::{debug, info, instrument, warn};

use crate::{GenerationConfig, PromptBuilder, normalize};

/// Where a passing text came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum TextSource {
    /// Written by the text generator and accepted by the gate
    Model,
    /// The pre-vetted fallback, used after every attempt failed in the generator
    Fallback,
}

/// Text that passed the gate and may be published.
#[derive(Debug, Clone, PartialEq)]
pub struct PassingText {
    /// Normalised text
    pub text: String,
    /// Origin of the text
    pub source: TextSource,
    /// What the classifier found
    pub assessment: Assessment,
    /// Attempts spent
    pub attempts: u32,
}

/// Why one attempt produced nothing usable.
#[derive(Debug, Clone)]
pub enum AttemptFailure {
    /// The generator call failed or returned nothing
    Generator(GenerationError),
    /// The gate rejected the candidate
    Rejected(RejectReason),
}

/// Every attempt failed and at least one candidate was rejected by the gate.
#[derive(Debug, Clone)]
pub struct Exhausted {
    /// One entry per attempt, in order
    pub failures: Vec<AttemptFailure>,
}

impl Exhausted {
    /// Gate rejection reasons, in attempt order.
    pub fn reasons(&self) -> Vec<RejectReason> {
        self.failures
            .iter()
            .filter_map(|f| match f {
                AttemptFailure::Rejected(reason) => Some(*reason),
                AttemptFailure::Generator(_) => None,
            })
            .collect()
    }
}

impl std::fmt::Display for Exhausted {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let reasons: Vec<String> = self
            .failures
            .iter()
            .map(|failure| match failure {
                AttemptFailure::Generator(e) => format!("generator: {}", e.kind),
                AttemptFailure::Rejected(reason) => reason.to_string(),
            })
            .collect();
        write!(
            f,
            "No passing text after {} attempts ({})",
            self.failures.len(),
            reasons.join(", ")
        )
    }
}

/// Drives the text generator through bounded attempts, gating every result.
pub struct Orchestrator {
    generator: Arc<dyn TextGenerator>,
    classifier: Arc<ContentClassifier>,
    prompts: PromptBuilder,
    config: GenerationConfig,
    fallback: PassingText,
}

impl std::fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("generator", &self.generator.provider_name())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Orchestrator {
    /// Orchestrator over `generator`, gated by `classifier`.
    ///
    /// # Errors
    ///
    /// Fails when the settings are unusable or the fallback text does not
    /// pass the classifier itself.
    pub fn new(
        generator: Arc<dyn TextGenerator>,
        classifier: Arc<ContentClassifier>,
        config: GenerationConfig,
    ) -> Result<Self, ConfigError> {
        config
            .validate()
            .map_err(|e| ConfigError::in_section("generation", e))?;

        let fallback_text = normalize(&config.fallback_text, config.char_cap);
        let language = classifier.config().primary_language;
        let assessment = classifier
            .evaluate(&fallback_text, language)
            .map_err(|reason| {
                ConfigError::new(format!(
                    "fallback text is rejected by the classifier ({reason}): {fallback_text}"
                ))
            })?;

        Ok(Self {
            prompts: PromptBuilder::new(config.clone()),
            fallback: PassingText {
                text: fallback_text,
                source: TextSource::Fallback,
                assessment,
                attempts: config.max_attempts,
            },
            generator,
            classifier,
            config,
        })
    }

    /// The gate every candidate passes through.
    pub fn classifier(&self) -> &ContentClassifier {
        &self.classifier
    }

    /// The fallback reply, already vetted by the classifier.
    pub fn fallback(&self) -> &PassingText {
        &self.fallback
    }

    /// Produce a reply to `source_text`.
    ///
    /// Accepted replies record their technique in `techniques`. Returns the
    /// fallback only when every attempt failed in the generator.
    ///
    /// # Errors
    ///
    /// [`Exhausted`] when attempts ran out and at least one candidate was
    /// rejected by the gate. The caller must skip the item.
    #[instrument(
        skip(self, source_text, hints, techniques, rng),
        fields(provider = self.generator.provider_name(), language = %language)
    )]
    pub async fn produce<R: Rng + Send>(
        &self,
        source_text: &str,
        language: Language,
        hints: &[String],
        techniques: &mut RecentTechniques,
        rng: &mut R,
    ) -> Result<PassingText, Exhausted> {
        let mut failures = Vec::with_capacity(self.config.max_attempts as usize);

        for attempt in 0..self.config.max_attempts {
            let request = self
                .prompts
                .build(source_text, language, hints, attempt, rng);
            debug!(attempt, temperature = *request.temperature(), "Requesting candidate");

            let raw = match self.generator.generate(&request).await {
                Ok(raw) => raw,
                Err(e) => {
                    warn!(attempt, error = %e, "Generator failed");
                    failures.push(AttemptFailure::Generator(e));
                    continue;
                }
            };

            let text = normalize(&raw, self.config.char_cap);
            if text.is_empty() {
                warn!(attempt, "Generator returned empty text");
                failures.push(AttemptFailure::Generator(GenerationError::new(
                    GenerationErrorKind::Empty,
                )));
                continue;
            }

            match self.gate(&text, language, techniques) {
                Ok(assessment) => {
                    if let Some(technique) = &assessment.technique {
                        techniques.push(technique.clone());
                    }
                    info!(
                        attempt,
                        score = assessment.score,
                        technique = ?assessment.technique,
                        "Candidate passed"
                    );
                    return Ok(PassingText {
                        text,
                        source: TextSource::Model,
                        assessment,
                        attempts: attempt + 1,
                    });
                }
                Err(reason) => {
                    info!(attempt, reason = %reason, candidate = %text, "Candidate rejected");
                    failures.push(AttemptFailure::Rejected(reason));
                }
            }
        }

        let generator_only = failures
            .iter()
            .all(|f| matches!(f, AttemptFailure::Generator(_)));
        if generator_only {
            warn!(attempts = failures.len(), "Generator failed on every attempt, using fallback");
            return Ok(self.fallback.clone());
        }

        let exhausted = Exhausted { failures };
        info!(reasons = ?exhausted.reasons(), "No passing candidate");
        Err(exhausted)
    }

    fn gate(
        &self,
        text: &str,
        language: Language,
        techniques: &RecentTechniques,
    ) -> Result<Assessment, RejectReason> {
        let assessment = self.classifier.evaluate(text, language)?;
        let repeated = assessment
            .technique
            .as_deref()
            .is_some_and(|t| techniques.used_recently(t, self.config.technique_window));
        if repeated {
            return Err(RejectReason::RepeatedMetaphor);
        }
        Ok(assessment)
    }
}
