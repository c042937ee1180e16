//! Query expansion.
//!
//! Widens recall by asking the generative model for paraphrases of the
//! user question before retrieval.

pub mod expander;

pub use expander::QueryExpander;
pub use expander::parse_paraphrases;
