//! Embedding generation for vulnerable code snippets
//!
//! This crate provides remote and deterministic local embedding generation
//! used by the retrieval engine to place code in a shared vector space.

#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]

use std::sync::Arc;
use vulnrag_core::error::{Result, ResultExt};

mod api_provider;
pub mod config;
pub mod error;
mod mock_provider;
pub mod provider;

pub use api_provider::create_api_provider;
pub use config::{EmbeddingConfig, EmbeddingConfigBuilder, EmbeddingProviderType};
pub use error::EmbeddingError;
pub use mock_provider::MockEmbeddingProvider;
pub use provider::{truncate_to_max_length, EmbeddingProvider};

/// Helper function to parse provider type from string
fn parse_provider_type(provider: &str) -> EmbeddingProviderType {
    match provider.to_lowercase().as_str() {
        "localapi" | "api" => EmbeddingProviderType::LocalApi,
        "mock" => EmbeddingProviderType::Mock,
        _ => EmbeddingProviderType::LocalApi,
    }
}

/// Create an embedding manager from the vulnrag Config
///
/// Converts the main Config's EmbeddingsConfig to the embeddings crate's
/// EmbeddingConfig and creates an EmbeddingManager.
///
/// It also handles reading the API key from the EMBEDDING_API_KEY environment variable
/// if not specified in the config.
pub async fn create_embedding_manager_from_app_config(
    embeddings_config: &vulnrag_core::config::EmbeddingsConfig,
) -> Result<Arc<EmbeddingManager>> {
    let mut config_builder = EmbeddingConfigBuilder::default()
        .provider(parse_provider_type(&embeddings_config.provider))
        .model(embeddings_config.model.clone())
        .texts_per_api_request(embeddings_config.texts_per_api_request)
        .embedding_dimension(embeddings_config.embedding_dimension)
        .max_concurrent_api_requests(embeddings_config.max_concurrent_api_requests)
        .retry_attempts(embeddings_config.retry_attempts);

    if let Some(ref api_base_url) = embeddings_config.api_base_url {
        config_builder = config_builder.api_base_url(api_base_url.clone());
    }

    let api_key = embeddings_config
        .api_key
        .clone()
        .or_else(|| std::env::var("EMBEDDING_API_KEY").ok());
    if let Some(key) = api_key {
        config_builder = config_builder.api_key(key);
    }

    let embedding_config = config_builder.build();

    let embedding_manager = EmbeddingManager::from_config(embedding_config)
        .await
        .context("Failed to create embedding manager")?;

    Ok(Arc::new(embedding_manager))
}

/// Manager for handling embedding generation with immutable configuration
pub struct EmbeddingManager {
    provider: Arc<dyn EmbeddingProvider>,
    model_version: String,
}

impl EmbeddingManager {
    /// Creates a new embedding manager with the specified provider and model version
    pub fn new(provider: Arc<dyn EmbeddingProvider>, model_version: String) -> Self {
        Self {
            provider,
            model_version,
        }
    }

    /// Initialize manager from configuration
    pub async fn from_config(config: EmbeddingConfig) -> Result<Self> {
        let model_version = config.model.clone();

        let provider = match config.provider {
            EmbeddingProviderType::LocalApi => {
                let provider = create_api_provider(config).await?;
                Arc::from(provider)
            }
            EmbeddingProviderType::Mock => {
                let provider =
                    mock_provider::MockEmbeddingProvider::new(config.embedding_dimension);
                Arc::new(provider) as Arc<dyn EmbeddingProvider>
            }
        };

        Ok(Self {
            provider,
            model_version,
        })
    }

    /// Get a shared handle to the embedding provider
    pub fn provider(&self) -> Arc<dyn EmbeddingProvider> {
        Arc::clone(&self.provider)
    }

    /// Get the model version string recorded alongside built indexes
    pub fn model_version(&self) -> &str {
        &self.model_version
    }

    /// Generate embeddings for texts
    pub async fn embed(&self, texts: Vec<String>) -> Result<Vec<Option<Vec<f32>>>> {
        self.provider.embed(texts).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mock_app_config(api_key: Option<&str>) -> vulnrag_core::config::EmbeddingsConfig {
        vulnrag_core::config::EmbeddingsConfig {
            provider: "mock".to_string(),
            model: "test-model".to_string(),
            api_base_url: Some("http://localhost:8000".to_string()),
            api_key: api_key.map(str::to_string),
            embedding_dimension: 16,
            texts_per_api_request: 10,
            max_concurrent_api_requests: 4,
            retry_attempts: 3,
        }
    }

    #[tokio::test]
    async fn test_mock_manager_from_app_config() {
        let manager = create_embedding_manager_from_app_config(&mock_app_config(None))
            .await
            .unwrap();
        assert_eq!(manager.model_version(), "test-model");
        assert_eq!(manager.provider().embedding_dimension(), 16);

        let vectors = manager
            .embed(vec!["strcpy(buf, input);".to_string()])
            .await
            .unwrap();
        assert_eq!(vectors.len(), 1);
        assert_eq!(vectors[0].as_ref().map(Vec::len), Some(16));
    }

    #[tokio::test]
    async fn test_embedding_api_key_from_config() {
        let result =
            create_embedding_manager_from_app_config(&mock_app_config(Some("config-key"))).await;
        assert!(result.is_ok());
    }

    #[test]
    fn test_parse_provider_type() {
        assert_eq!(parse_provider_type("mock"), EmbeddingProviderType::Mock);
        assert_eq!(parse_provider_type("API"), EmbeddingProviderType::LocalApi);
        assert_eq!(
            parse_provider_type("unknown"),
            EmbeddingProviderType::LocalApi
        );
    }
}
