//! Generative model clients.
//!
//! Query expansion and answer generation both go through the
//! [`crate::traits::TextGenerator`] trait; Gemini is the only backend.

pub mod gemini;

pub use gemini::GeminiClient;
