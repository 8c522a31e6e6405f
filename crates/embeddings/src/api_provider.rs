//! OpenAI-compatible API provider for embeddings (vLLM, OpenAI, etc.)

use crate::provider::{truncate_to_max_length, EmbeddingProvider};
use crate::{config::EmbeddingConfig, error::EmbeddingError};
use async_openai::types::{CreateEmbeddingRequest, EmbeddingInput};
use async_openai::{config::OpenAIConfig, Client};
use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use std::time::Duration;
use tracing::{debug, info, warn};
use vulnrag_core::error::Result;

/// Longest snippet sent to the model, in characters; longer code is truncated.
/// One char is counted as one token so a snippet always fits the context.
const MAX_SNIPPET_CHARS: usize = 32768;

/// Character budget of a single request
const MAX_REQUEST_CHARS: usize = 65536;

/// Longest pause between retries of a failed request
const MAX_BACKOFF_SECS: u64 = 60;

/// A snippet queued for embedding, remembering where its vector goes
struct Snippet {
    position: usize,
    text: String,
}

/// OpenAI-compatible API provider
pub struct OpenAiApiProvider {
    client: Client<OpenAIConfig>,
    model: String,
    dimensions: usize,
    snippets_per_request: usize,
    max_concurrent: usize,
    retry_attempts: usize,
}

impl OpenAiApiProvider {
    /// Create a new API provider from configuration
    pub(crate) async fn new(config: EmbeddingConfig) -> Result<Self> {
        config
            .validate()
            .map_err(|e| EmbeddingError::ModelLoadError(format!("Invalid configuration: {e}")))?;

        let base_url = config
            .api_base_url
            .clone()
            .unwrap_or_else(|| "http://localhost:8000/v1".to_string());
        info!(
            "Embedding code with '{}' at {base_url} (dimension {}, {} snippets per request, {} in flight)",
            config.model,
            config.embedding_dimension,
            config.texts_per_api_request,
            config.max_concurrent_api_requests
        );

        let mut openai_config = OpenAIConfig::new().with_api_base(&base_url);
        if let Some(ref api_key) = config.api_key {
            openai_config = openai_config.with_api_key(api_key);
        }
        let client = Client::with_config(openai_config);

        // An unreachable service only warns here; the first request reports the error
        if let Err(e) = client.models().list().await {
            warn!("Embedding service at {base_url} is not answering yet: {e}");
        }

        Ok(Self {
            client,
            model: config.model,
            dimensions: config.embedding_dimension,
            snippets_per_request: config.texts_per_api_request,
            max_concurrent: config.max_concurrent_api_requests,
            retry_attempts: config.retry_attempts,
        })
    }

    /// Split snippets into requests bounded by count and character budget
    fn plan_requests(&self, snippets: Vec<Snippet>) -> Vec<Vec<Snippet>> {
        let mut requests = Vec::new();
        let mut pending: Vec<Snippet> = Vec::new();
        let mut pending_chars = 0;

        for snippet in snippets {
            let chars = snippet.text.chars().count();
            let over_budget = pending_chars + chars > MAX_REQUEST_CHARS;
            if !pending.is_empty() && (over_budget || pending.len() == self.snippets_per_request)
            {
                requests.push(std::mem::take(&mut pending));
                pending_chars = 0;
            }
            pending_chars += chars;
            pending.push(snippet);
        }
        if !pending.is_empty() {
            requests.push(pending);
        }
        requests
    }

    /// Embed one request's snippets, retrying with exponential backoff
    async fn embed_request(
        &self,
        snippets: Vec<Snippet>,
    ) -> std::result::Result<Vec<(usize, Vec<f32>)>, EmbeddingError> {
        let (positions, texts): (Vec<usize>, Vec<String>) =
            snippets.into_iter().map(|s| (s.position, s.text)).unzip();

        let mut attempt = 0;
        loop {
            let request = CreateEmbeddingRequest {
                model: self.model.clone(),
                input: EmbeddingInput::StringArray(texts.clone()),
                encoding_format: None,
                dimensions: None,
                user: None,
            };

            match self.client.embeddings().create(request).await {
                Ok(response) => {
                    let mut data = response.data;
                    data.sort_by_key(|embedding| embedding.index);
                    if data.len() != positions.len() {
                        return Err(EmbeddingError::InferenceError(format!(
                            "requested {} embeddings, received {}",
                            positions.len(),
                            data.len()
                        )));
                    }
                    if let Some(bad) = data.iter().find(|e| e.embedding.len() != self.dimensions) {
                        return Err(EmbeddingError::DimensionMismatch {
                            expected: self.dimensions,
                            actual: bad.embedding.len(),
                        });
                    }
                    return Ok(positions
                        .into_iter()
                        .zip(data.into_iter().map(|e| e.embedding))
                        .collect());
                }
                Err(e) if attempt < self.retry_attempts => {
                    attempt += 1;
                    let backoff = Duration::from_secs(
                        (10 * 2u64.pow(attempt as u32 - 1)).min(MAX_BACKOFF_SECS),
                    );
                    warn!(
                        "Embedding request for {} snippets failed ({e}); retry {attempt}/{} in {backoff:?}",
                        positions.len(),
                        self.retry_attempts
                    );
                    tokio::time::sleep(backoff).await;
                }
                Err(e) => {
                    return Err(EmbeddingError::InferenceError(format!(
                        "API request failed after {} attempts: {e}",
                        self.retry_attempts
                    )));
                }
            }
        }
    }
}

#[async_trait]
impl EmbeddingProvider for OpenAiApiProvider {
    async fn embed(&self, texts: Vec<String>) -> Result<Vec<Option<Vec<f32>>>> {
        let mut vectors = vec![None; texts.len()];
        let mut truncated = 0;

        // Empty strings are rejected by the API and keep a `None` slot
        let snippets: Vec<Snippet> = texts
            .iter()
            .enumerate()
            .filter(|(_, text)| !text.is_empty())
            .map(|(position, text)| {
                let clipped = truncate_to_max_length(text, MAX_SNIPPET_CHARS);
                if clipped.len() < text.len() {
                    truncated += 1;
                }
                Snippet {
                    position,
                    text: clipped.to_string(),
                }
            })
            .collect();

        if truncated > 0 {
            warn!("Truncated {truncated}/{} snippets to {MAX_SNIPPET_CHARS} chars", texts.len());
        }
        if snippets.is_empty() {
            return Ok(vectors);
        }

        let requests = self.plan_requests(snippets);
        debug!("Embedding {} snippets in {} requests", texts.len(), requests.len());

        let responses = stream::iter(requests)
            .map(|request| self.embed_request(request))
            .buffer_unordered(self.max_concurrent)
            .collect::<Vec<_>>()
            .await;

        for response in responses {
            for (position, vector) in response? {
                vectors[position] = Some(vector);
            }
        }
        Ok(vectors)
    }

    fn embedding_dimension(&self) -> usize {
        self.dimensions
    }

    fn max_sequence_length(&self) -> usize {
        MAX_SNIPPET_CHARS
    }
}

/// Create a new OpenAI-compatible API provider from configuration
pub async fn create_api_provider(config: EmbeddingConfig) -> Result<Box<dyn EmbeddingProvider>> {
    let provider = OpenAiApiProvider::new(config).await?;
    Ok(Box::new(provider))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EmbeddingConfigBuilder;

    fn provider(snippets_per_request: usize) -> OpenAiApiProvider {
        let config = EmbeddingConfigBuilder::new()
            .api_base_url("http://127.0.0.1:9/v1")
            .texts_per_api_request(snippets_per_request)
            .build();
        OpenAiApiProvider {
            client: Client::with_config(OpenAIConfig::new().with_api_base("http://127.0.0.1:9/v1")),
            model: config.model,
            dimensions: 8,
            snippets_per_request: config.texts_per_api_request,
            max_concurrent: 1,
            retry_attempts: 0,
        }
    }

    fn snippets(lengths: &[usize]) -> Vec<Snippet> {
        lengths
            .iter()
            .enumerate()
            .map(|(position, len)| Snippet {
                position,
                text: "x".repeat(*len),
            })
            .collect()
    }

    fn positions(requests: &[Vec<Snippet>]) -> Vec<Vec<usize>> {
        requests
            .iter()
            .map(|r| r.iter().map(|s| s.position).collect())
            .collect()
    }

    #[test]
    fn test_requests_respect_snippet_count() {
        let requests = provider(2).plan_requests(snippets(&[10, 10, 10, 10, 10]));
        assert_eq!(positions(&requests), vec![vec![0, 1], vec![2, 3], vec![4]]);
    }

    #[test]
    fn test_requests_respect_char_budget() {
        let requests = provider(32).plan_requests(snippets(&[
            MAX_SNIPPET_CHARS,
            MAX_SNIPPET_CHARS,
            1,
            MAX_SNIPPET_CHARS,
        ]));
        assert_eq!(positions(&requests), vec![vec![0, 1], vec![2, 3]]);
    }

    #[tokio::test]
    async fn test_empty_texts_need_no_request() {
        let vectors = provider(4)
            .embed(vec![String::new(), String::new()])
            .await
            .unwrap();
        assert_eq!(vectors, vec![None, None]);
    }
}
