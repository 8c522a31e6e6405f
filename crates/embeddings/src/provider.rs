//! Trait definition for embedding providers

use async_trait::async_trait;
use vulnrag_core::error::Result;

/// Trait for embedding providers
///
/// This trait defines the interface that all embedding providers must implement,
/// whether they call a remote model or compute vectors locally.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Generate embeddings for a list of texts
    ///
    /// # Arguments
    /// * `texts` - List of text strings to embed
    ///
    /// # Returns
    /// A vector of Option embedding vectors, one for each input text.
    /// Returns None for texts that cannot be embedded (for example empty text,
    /// or text over `max_sequence_length` for providers that refuse it).
    async fn embed(&self, texts: Vec<String>) -> Result<Vec<Option<Vec<f32>>>>;

    /// Get the embedding dimension
    ///
    /// # Returns
    /// The size of the embedding vectors produced by this provider
    fn embedding_dimension(&self) -> usize;

    /// Get the maximum sequence length supported
    ///
    /// # Returns
    /// The maximum number of characters that can be processed in a single text
    fn max_sequence_length(&self) -> usize;
}

/// The longest prefix of `text` holding at most `max_chars` characters
///
/// Long code is cut to what the model can take rather than dropped, so every
/// snippet still gets a vector from its leading context.
pub fn truncate_to_max_length(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_offset, _)) => &text[..byte_offset],
        None => text,
    }
}
