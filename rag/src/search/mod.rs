//! Multi-query retrieval.
//!
//! Runs one vector search per query and merges the hits into a single
//! result set without duplicate passages.

pub mod dedup;
pub mod multi_query;

pub use dedup::merge_by_text;
pub use multi_query::MultiQueryRetriever;
