//! Mock embedding provider for testing
//!
//! Produces deterministic vectors by hashing code tokens into fixed-dimension
//! buckets and L2-normalizing the counts, so identical text always embeds to the
//! identical vector and texts sharing identifiers land close together.

use crate::provider::EmbeddingProvider;
use async_trait::async_trait;
use vulnrag_core::error::Result;

/// Mock embedding provider that returns hashed bag-of-tokens embeddings
pub struct MockEmbeddingProvider {
    embedding_dim: usize,
}

impl MockEmbeddingProvider {
    /// Create a new mock provider with specified embedding dimension
    pub fn new(embedding_dim: usize) -> Self {
        Self { embedding_dim }
    }

    /// Hash a token into a bucket index using FNV-1a
    fn bucket(token: &str, dims: usize) -> usize {
        let mut h: u64 = 0xcbf29ce484222325;
        for b in token.as_bytes() {
            h ^= u64::from(*b);
            h = h.wrapping_mul(0x100000001b3);
        }
        (h % dims as u64) as usize
    }

    fn tokenize(text: &str) -> impl Iterator<Item = &str> {
        text.split(|c: char| !c.is_alphanumeric() && c != '_')
            .filter(|s| !s.is_empty())
    }

    /// Embed a single text; `None` when the text is empty or the dimension is 0
    pub fn embed_one(&self, text: &str) -> Option<Vec<f32>> {
        if text.is_empty() || self.embedding_dim == 0 {
            return None;
        }

        let mut vector = vec![0.0f32; self.embedding_dim];
        let mut any_token = false;
        for token in Self::tokenize(text) {
            vector[Self::bucket(token, self.embedding_dim)] += 1.0;
            any_token = true;
        }
        // Punctuation-only input still gets a stable, non-zero vector
        if !any_token {
            vector[Self::bucket(text, self.embedding_dim)] = 1.0;
        }

        let norm = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
        for v in &mut vector {
            *v /= norm;
        }
        Some(vector)
    }
}

#[async_trait]
impl EmbeddingProvider for MockEmbeddingProvider {
    async fn embed(&self, texts: Vec<String>) -> Result<Vec<Option<Vec<f32>>>> {
        Ok(texts.iter().map(|text| self.embed_one(text)).collect())
    }

    fn embedding_dimension(&self) -> usize {
        self.embedding_dim
    }

    fn max_sequence_length(&self) -> usize {
        usize::MAX
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_embeddings_are_deterministic_and_unit_length() {
        let provider = MockEmbeddingProvider::new(32);
        let texts = vec![
            "memcpy(dst, src, len);".to_string(),
            "memcpy(dst, src, len);".to_string(),
        ];
        let results = provider.embed(texts).await.unwrap();
        let first = results[0].as_ref().unwrap();
        let second = results[1].as_ref().unwrap();

        assert_eq!(first, second);
        assert_eq!(first.len(), 32);
        let norm: f32 = first.iter().map(|v| v * v).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-5);
    }

    #[tokio::test]
    async fn test_mock_embedding_of_empty_text_is_none() {
        let provider = MockEmbeddingProvider::new(8);
        let results = provider.embed(vec![String::new()]).await.unwrap();
        assert_eq!(results, vec![None]);
    }

    #[test]
    fn test_punctuation_only_text_still_embeds() {
        let provider = MockEmbeddingProvider::new(8);
        let vector = provider.embed_one("{};").unwrap();
        assert_eq!(vector.iter().filter(|v| **v != 0.0).count(), 1);
    }
}
