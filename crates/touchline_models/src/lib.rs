//! Text generator implementations.
//!
//! [`GeminiGenerator`] calls the Gemini `generateContent` REST endpoint and
//! implements [`TextGenerator`](touchline_interface::TextGenerator).

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod gemini;
mod types;

pub use config::ModelsConfig;
pub use gemini::GeminiGenerator;
pub use types::{GeminiRequest, GeminiResponse};
