//! Sentence embedding contract and client implementations.

pub mod openai;

use anyhow::Result;

/// Maps sentences to fixed-dimension embedding vectors.
///
/// Output is index-aligned with the input and deterministic for a fixed model
/// version. Whether an implementation batches requests internally is its own
/// business; callers hand over all sentences of a document at once.
pub trait Embedder {
    /// Embeds every sentence, preserving order.
    fn embed(&self, sentences: &[String]) -> Result<Vec<Vec<f32>>>;
}
