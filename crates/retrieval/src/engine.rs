//! Query and augmentation over the index and its exemplar corpus

use crate::corpus::ExemplarCorpus;
use crate::error::{Result, RetrievalError};
use crate::index::{normalize, AngularIndex};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};
use vulnrag_core::BenchmarkSample;
use vulnrag_embeddings::{truncate_to_max_length, EmbeddingProvider};

/// Where query audit records go
#[derive(Debug, Clone)]
pub struct AuditSettings {
    /// Auditing is disabled when `None`
    pub dir: Option<PathBuf>,
    /// Record name used when a query does not name one
    pub default_name: String,
}

impl AuditSettings {
    pub fn disabled() -> Self {
        Self {
            dir: None,
            default_name: "history_vulns.json".to_string(),
        }
    }
}

/// Query input: exactly one of `code` or `vector`
#[derive(Debug, Clone, Default)]
pub struct QueryRequest {
    pub code: Option<String>,
    pub vector: Option<Vec<f32>>,
}

impl QueryRequest {
    pub fn from_code(code: impl Into<String>) -> Self {
        Self {
            code: Some(code.into()),
            vector: None,
        }
    }

    pub fn from_vector(vector: Vec<f32>) -> Self {
        Self {
            code: None,
            vector: Some(vector),
        }
    }
}

/// One nearest-neighbor result joined with its corpus record
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RetrievalHit {
    pub position: usize,
    pub vuln_id: String,
    pub weakness_id: String,
    pub distance: f32,
    pub description: String,
    pub exemplar_code: String,
}

#[derive(Serialize)]
struct AuditInput<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    code: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    vector_dimension: Option<usize>,
}

#[derive(Serialize)]
struct AuditRecord<'a> {
    name: &'a str,
    input: AuditInput<'a>,
    top_k: usize,
    hits: &'a [RetrievalHit],
}

/// Finds historical vulnerabilities similar to a piece of code
pub struct RetrievalEngine {
    provider: Arc<dyn EmbeddingProvider>,
    index: Arc<AngularIndex>,
    corpus: Arc<ExemplarCorpus>,
    audit: AuditSettings,
}

impl RetrievalEngine {
    /// Create an engine, checking that provider, index and corpus line up
    pub fn new(
        provider: Arc<dyn EmbeddingProvider>,
        index: Arc<AngularIndex>,
        corpus: Arc<ExemplarCorpus>,
        audit: AuditSettings,
    ) -> Result<Self> {
        if corpus.is_empty() {
            return Err(RetrievalError::EmptyCorpus);
        }
        if corpus.len() != index.len() {
            return Err(RetrievalError::CorpusIndexMismatch {
                corpus: corpus.len(),
                index: index.len(),
            });
        }
        if provider.embedding_dimension() != index.dimension() {
            return Err(RetrievalError::DimensionMismatch {
                expected: index.dimension(),
                actual: provider.embedding_dimension(),
            });
        }

        Ok(Self {
            provider,
            index,
            corpus,
            audit,
        })
    }

    /// Load the index and corpus from disk and create an engine
    pub fn open(
        provider: Arc<dyn EmbeddingProvider>,
        index_path: &Path,
        corpus_path: &Path,
        audit: AuditSettings,
    ) -> Result<Self> {
        let index = AngularIndex::load(index_path)?;
        let corpus = ExemplarCorpus::load(corpus_path)?;
        Self::new(provider, Arc::new(index), Arc::new(corpus), audit)
    }

    pub fn corpus(&self) -> &ExemplarCorpus {
        &self.corpus
    }

    pub fn index(&self) -> &AngularIndex {
        &self.index
    }

    /// Embed one code snippet into a unit vector
    pub async fn embed(&self, code: &str) -> Result<Vec<f32>> {
        if code.is_empty() {
            return Err(RetrievalError::InvalidArgument(
                "cannot embed empty code".to_string(),
            ));
        }

        self.embed_snippet(code).await?.ok_or_else(|| {
            RetrievalError::Embedding(format!(
                "provider returned no vector for a {}-character snippet",
                code.chars().count()
            ))
        })
    }

    /// Embed `code` cut to the provider's maximum length; `None` when the
    /// provider still yields no vector
    async fn embed_snippet(&self, code: &str) -> Result<Option<Vec<f32>>> {
        let max_length = self.provider.max_sequence_length();
        let snippet = truncate_to_max_length(code, max_length);
        if snippet.len() < code.len() {
            debug!(
                "Truncated a {}-character snippet to {max_length} characters",
                code.chars().count()
            );
        }

        let mut vectors = self
            .provider
            .embed(vec![snippet.to_string()])
            .await
            .map_err(|e| RetrievalError::Embedding(e.to_string()))?;

        Ok(vectors.pop().flatten().map(|vector| normalize(&vector)))
    }

    /// Return the `top_k` nearest exemplars, closest first
    ///
    /// When an audit directory is configured the query and its hits are written
    /// there as `audit_name` (or the configured default name).
    pub async fn query(
        &self,
        request: &QueryRequest,
        top_k: usize,
        audit_name: Option<&str>,
    ) -> Result<Vec<RetrievalHit>> {
        let vector = match (&request.code, &request.vector) {
            (Some(code), None) => self.embed(code).await?,
            (None, Some(vector)) => vector.clone(),
            (Some(_), Some(_)) => {
                return Err(RetrievalError::InvalidArgument(
                    "query takes either code or a vector, not both".to_string(),
                ))
            }
            (None, None) => {
                return Err(RetrievalError::InvalidArgument(
                    "query needs code or a vector".to_string(),
                ))
            }
        };

        self.search(&vector, request, top_k, audit_name).await
    }

    /// Nearest exemplars of an embedded query, audited when configured
    async fn search(
        &self,
        vector: &[f32],
        request: &QueryRequest,
        top_k: usize,
        audit_name: Option<&str>,
    ) -> Result<Vec<RetrievalHit>> {
        let hits = self
            .index
            .nearest(vector, top_k)?
            .into_iter()
            .filter_map(|(position, distance)| {
                self.corpus.get(position).map(|record| RetrievalHit {
                    position,
                    vuln_id: record.cve_id.clone(),
                    weakness_id: record.cwe_id.clone(),
                    distance,
                    description: record.description.clone(),
                    exemplar_code: record.code_before.clone(),
                })
            })
            .collect::<Vec<_>>();

        if let Some(dir) = &self.audit.dir {
            let name = audit_name.unwrap_or(&self.audit.default_name);
            let record = AuditRecord {
                name,
                input: AuditInput {
                    code: request.code.as_deref(),
                    vector_dimension: request.vector.as_ref().map(Vec::len),
                },
                top_k,
                hits: &hits,
            };
            write_audit(dir, name, &record).await?;
        }

        Ok(hits)
    }

    /// Exemplar text for a sample: the closest exemplar's code and description
    /// when it lies within `threshold`, otherwise an empty string.
    /// Samples without code or without a vector get no exemplar.
    pub async fn augment_with_exemplar(
        &self,
        sample: &BenchmarkSample,
        threshold: f32,
    ) -> Result<String> {
        if sample.code.is_empty() {
            warn!("Sample {} has no code; prompting without an exemplar", sample.id);
            return Ok(String::new());
        }
        let Some(vector) = self.embed_snippet(&sample.code).await? else {
            warn!(
                "Sample {} could not be embedded; prompting without an exemplar",
                sample.id
            );
            return Ok(String::new());
        };

        let audit_name = format!("sample-{}.json", sanitize_file_stem(&sample.id));
        let request = QueryRequest::from_code(sample.code.clone());
        let hits = self.search(&vector, &request, 1, Some(&audit_name)).await?;

        match hits.first() {
            Some(hit) if hit.distance <= threshold => {
                debug!(
                    "Sample {} matched {} at distance {:.4}",
                    sample.id, hit.vuln_id, hit.distance
                );
                Ok(format!("{}\n{}", hit.exemplar_code, hit.description))
            }
            Some(hit) => {
                debug!(
                    "Sample {} has no exemplar within {threshold} (closest {:.4})",
                    sample.id, hit.distance
                );
                Ok(String::new())
            }
            None => Ok(String::new()),
        }
    }

    /// Exemplar texts for a whole benchmark, in sample order
    pub async fn augment_all(
        &self,
        samples: &[BenchmarkSample],
        threshold: f32,
    ) -> Result<Vec<String>> {
        let mut examples = Vec::with_capacity(samples.len());
        for sample in samples {
            examples.push(self.augment_with_exemplar(sample, threshold).await?);
        }

        let matched = examples.iter().filter(|e| !e.is_empty()).count();
        info!(
            "Attached exemplars to {matched}/{} samples (threshold {threshold})",
            samples.len()
        );
        Ok(examples)
    }
}

fn sanitize_file_stem(id: &str) -> String {
    id.chars()
        .map(|c| if c.is_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect()
}

async fn write_audit(dir: &Path, name: &str, record: &AuditRecord<'_>) -> Result<()> {
    let path = dir.join(name);
    let json = serde_json::to_string_pretty(record)
        .map_err(|e| RetrievalError::AuditWrite(format!("{}: {e}", path.display())))?;

    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|e| RetrievalError::AuditWrite(format!("{}: {e}", dir.display())))?;
    tokio::fs::write(&path, json)
        .await
        .map_err(|e| RetrievalError::AuditWrite(format!("{}: {e}", path.display())))?;

    debug!("Wrote audit record {}", path.display());
    Ok(())
}
