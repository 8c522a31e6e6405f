//! Building an index from an exemplar corpus

use crate::corpus::ExemplarCorpus;
use crate::error::{Result, RetrievalError};
use crate::index::AngularIndex;
use tracing::{debug, info};
use vulnrag_embeddings::{truncate_to_max_length, EmbeddingProvider};

/// Records sent to the provider per call; the provider batches further
const RECORDS_PER_CHUNK: usize = 256;

/// Embed every record's `code_before` and build an index aligned with the corpus
///
/// Code longer than the provider accepts is embedded from its leading part.
pub async fn build_index_from_corpus(
    provider: &dyn EmbeddingProvider,
    corpus: &ExemplarCorpus,
) -> Result<AngularIndex> {
    if corpus.is_empty() {
        return Err(RetrievalError::EmptyCorpus);
    }

    let dimension = provider.embedding_dimension();
    let max_length = provider.max_sequence_length();
    let mut vectors = Vec::with_capacity(corpus.len());

    for (chunk_no, chunk) in corpus.records().chunks(RECORDS_PER_CHUNK).enumerate() {
        let texts = chunk
            .iter()
            .map(|r| truncate_to_max_length(&r.code_before, max_length).to_string())
            .collect();
        let embeddings = provider
            .embed(texts)
            .await
            .map_err(|e| RetrievalError::Embedding(e.to_string()))?;

        for (offset, (record, embedding)) in chunk.iter().zip(embeddings).enumerate() {
            let position = chunk_no * RECORDS_PER_CHUNK + offset;
            let vector = embedding.ok_or_else(|| {
                RetrievalError::Embedding(format!(
                    "corpus record {position} ({}) could not be embedded",
                    record.cve_id
                ))
            })?;
            vectors.push(vector);
        }

        debug!("Embedded {}/{} corpus records", vectors.len(), corpus.len());
    }

    if vectors.len() != corpus.len() {
        return Err(RetrievalError::CorpusIndexMismatch {
            corpus: corpus.len(),
            index: vectors.len(),
        });
    }

    info!(
        "Embedded {} corpus records at dimension {dimension}",
        vectors.len()
    );
    AngularIndex::build(dimension, vectors)
}
