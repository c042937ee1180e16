//! Embedding providers for vector search.
//!
//! Provides implementations of the `EmbeddingProvider` trait for
//! embedding services.

pub mod openai;

pub use openai::OpenAIEmbeddings;

/// Scale `vector` to unit L2 norm in place. Zero vectors are left as is.
pub fn l2_normalize(vector: &mut [f32]) {
    let norm = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
    if norm > f32::EPSILON {
        for v in vector.iter_mut() {
            *v /= norm;
        }
    }
}
