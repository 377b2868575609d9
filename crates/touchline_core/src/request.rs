//! Text generation requests.

use derive_builder::Builder;
use derive_getters::Getters;
use serde::{Deserialize, Serialize};

/// A single prompt sent to the text generator.
///
/// # Examples
///
/// ```
/// use touchline_core::GenerateRequestBuilder;
///
/// let request = GenerateRequestBuilder::default()
///     .system_prompt("You are a sarcastic football fan.")
///     .user_prompt("Post: Derby tonight")
///     .temperature(0.9f32)
///     .max_tokens(100u32)
///     .build()
///     .unwrap();
///
/// assert_eq!(*request.max_tokens(), 100);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Builder, Getters)]
#[builder(setter(into))]
pub struct GenerateRequest {
    /// System instruction (brand voice)
    system_prompt: String,
    /// User turn (source post + structure instruction)
    user_prompt: String,
    /// Sampling temperature
    temperature: f32,
    /// Output token ceiling
    max_tokens: u32,
}

impl GenerateRequest {
    /// Request with every field given.
    pub fn new(
        system_prompt: impl Into<String>,
        user_prompt: impl Into<String>,
        temperature: f32,
        max_tokens: u32,
    ) -> Self {
        Self {
            system_prompt: system_prompt.into(),
            user_prompt: user_prompt.into(),
            temperature,
            max_tokens,
        }
    }
}
