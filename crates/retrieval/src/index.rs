//! Exact nearest-neighbor index over unit vectors
//!
//! Distances are angular: the euclidean distance between the two
//! unit-normalized vectors, `sqrt(2 - 2 cos)`, which lies in `[0, 2]`.

use crate::error::{Result, RetrievalError};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

const ANGULAR_METRIC: &str = "angular";

/// On-disk layout of a persisted index
#[derive(Serialize, Deserialize)]
struct IndexFile {
    metric: String,
    dimension: usize,
    items: Vec<Vec<f32>>,
}

/// Slack on the norm within which a vector already counts as unit length
const UNIT_NORM_TOLERANCE: f32 = 1e-4;

/// Scale a vector to unit length
///
/// Unit vectors and the zero vector come back unchanged, so stored items and
/// vectors read back from the index compare at distance exactly 0.
pub fn normalize(vector: &[f32]) -> Vec<f32> {
    let norm = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
    if norm == 0.0 || !norm.is_finite() || (norm - 1.0).abs() <= UNIT_NORM_TOLERANCE {
        return vector.to_vec();
    }
    vector.iter().map(|v| v / norm).collect()
}

/// Angular distance between two unit vectors
pub fn angular_distance(a: &[f32], b: &[f32]) -> f32 {
    let squared: f32 = a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum();
    let distance = squared.sqrt();
    if distance.is_nan() {
        return 2.0;
    }
    distance.clamp(0.0, 2.0)
}

/// Read-only exact angular index; item `i` is the `i`-th vector it was built from
#[derive(Debug, Clone)]
pub struct AngularIndex {
    dimension: usize,
    items: Vec<Vec<f32>>,
}

impl AngularIndex {
    /// Build an index from raw vectors, normalizing each one
    pub fn build(dimension: usize, vectors: Vec<Vec<f32>>) -> Result<Self> {
        let items = vectors.iter().map(|v| normalize(v)).collect();
        let index = Self::from_unit_vectors(dimension, items)?;
        debug!("Built angular index with {} items", index.len());
        Ok(index)
    }

    /// Stored items are kept as-is so a reloaded index returns identical distances
    fn from_unit_vectors(dimension: usize, items: Vec<Vec<f32>>) -> Result<Self> {
        if dimension == 0 {
            return Err(RetrievalError::InvalidArgument(
                "index dimension must be greater than 0".to_string(),
            ));
        }
        if let Some(item) = items.iter().find(|item| item.len() != dimension) {
            return Err(RetrievalError::DimensionMismatch {
                expected: dimension,
                actual: item.len(),
            });
        }
        Ok(Self { dimension, items })
    }

    /// Load a persisted index
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| RetrievalError::IndexLoad(format!("{}: {e}", path.display())))?;
        let file: IndexFile = serde_json::from_str(&content)
            .map_err(|e| RetrievalError::IndexLoad(format!("{}: {e}", path.display())))?;

        if file.metric != ANGULAR_METRIC {
            return Err(RetrievalError::IndexLoad(format!(
                "{}: unsupported metric '{}'",
                path.display(),
                file.metric
            )));
        }

        let index = Self::from_unit_vectors(file.dimension, file.items).map_err(|e| {
            RetrievalError::IndexLoad(format!("{}: {e}", path.display()))
        })?;

        info!(
            "Loaded angular index from {} ({} items, dimension {})",
            path.display(),
            index.len(),
            index.dimension
        );
        Ok(index)
    }

    /// Persist the index as JSON
    pub fn save(&self, path: &Path) -> Result<()> {
        let file = IndexFile {
            metric: ANGULAR_METRIC.to_string(),
            dimension: self.dimension,
            items: self.items.clone(),
        };
        let json = serde_json::to_string(&file)
            .map_err(|e| RetrievalError::IndexSave(e.to_string()))?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .map_err(|e| RetrievalError::IndexSave(format!("{}: {e}", parent.display())))?;
        }
        std::fs::write(path, json)
            .map_err(|e| RetrievalError::IndexSave(format!("{}: {e}", path.display())))?;

        info!("Saved angular index to {}", path.display());
        Ok(())
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Stored (normalized) vector at `position`
    pub fn item(&self, position: usize) -> Option<&[f32]> {
        self.items.get(position).map(Vec::as_slice)
    }

    /// The `n` nearest items as `(position, distance)`, closest first.
    /// Equal distances keep index order.
    pub fn nearest(&self, vector: &[f32], n: usize) -> Result<Vec<(usize, f32)>> {
        if vector.len() != self.dimension {
            return Err(RetrievalError::DimensionMismatch {
                expected: self.dimension,
                actual: vector.len(),
            });
        }

        let query = normalize(vector);
        let mut scored: Vec<(usize, f32)> = self
            .items
            .iter()
            .enumerate()
            .map(|(position, item)| (position, angular_distance(&query, item)))
            .collect();

        // sort_by is stable
        scored.sort_by(|a, b| a.1.total_cmp(&b.1));
        scored.truncate(n);
        Ok(scored)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample_index() -> AngularIndex {
        AngularIndex::build(
            3,
            vec![
                vec![1.0, 0.0, 0.0],
                vec![0.0, 2.0, 0.0],
                vec![-3.0, 0.0, 0.0],
                vec![1.0, 1.0, 0.0],
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_distances_span_zero_to_two() {
        let index = sample_index();
        let hits = index.nearest(&[5.0, 0.0, 0.0], 4).unwrap();

        assert_eq!(hits[0], (0, 0.0));
        assert_eq!(hits[3].0, 2);
        assert!((hits[3].1 - 2.0).abs() < 1e-6);
        let orthogonal = hits.iter().find(|(p, _)| *p == 1).unwrap().1;
        assert!((orthogonal - 2f32.sqrt()).abs() < 1e-6);
    }

    #[test]
    fn test_stored_and_raw_vectors_find_themselves_at_zero() {
        let raw: Vec<Vec<f32>> = (0..8)
            .map(|i| (0..64).map(|j| ((i * 64 + j) as f32 * 0.37).sin() * 3.0).collect())
            .collect();
        let index = AngularIndex::build(64, raw.clone()).unwrap();

        for (position, vector) in raw.iter().enumerate() {
            let stored = index.item(position).unwrap().to_vec();
            assert_eq!(index.nearest(&stored, 1).unwrap(), vec![(position, 0.0)]);
            assert_eq!(index.nearest(vector, 1).unwrap(), vec![(position, 0.0)]);
        }
    }

    #[test]
    fn test_normalize_leaves_unit_vectors_alone() {
        let unit = normalize(&[3.0, 4.0, 12.0]);
        assert_eq!(normalize(&unit), unit);
        assert_eq!(normalize(&[0.0, 0.0]), vec![0.0, 0.0]);
    }

    #[test]
    fn test_nearest_is_sorted_and_truncated() {
        let index = sample_index();
        for n in 0..6 {
            let hits = index.nearest(&[0.3, 0.9, 0.1], n).unwrap();
            assert_eq!(hits.len(), n.min(index.len()));
            assert!(hits.windows(2).all(|w| w[0].1 <= w[1].1));
        }
    }

    #[test]
    fn test_ties_keep_index_order() {
        let index = AngularIndex::build(
            2,
            vec![vec![0.0, 1.0], vec![1.0, 0.0], vec![2.0, 0.0], vec![0.5, 0.0]],
        )
        .unwrap();
        let hits = index.nearest(&[1.0, 0.0], 3).unwrap();
        let positions: Vec<usize> = hits.iter().map(|(p, _)| *p).collect();
        assert_eq!(positions, vec![1, 2, 3]);
    }

    #[test]
    fn test_wrong_query_dimension() {
        let index = sample_index();
        assert!(matches!(
            index.nearest(&[1.0, 0.0], 1),
            Err(RetrievalError::DimensionMismatch {
                expected: 3,
                actual: 2
            })
        ));
    }

    #[test]
    fn test_build_rejects_ragged_vectors() {
        let result = AngularIndex::build(2, vec![vec![1.0, 0.0], vec![1.0]]);
        assert!(matches!(
            result,
            Err(RetrievalError::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn test_save_and_load_preserve_search_results() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("index.json");
        let index = sample_index();
        index.save(&path).unwrap();

        let loaded = AngularIndex::load(&path).unwrap();
        assert_eq!(loaded.dimension(), 3);
        assert_eq!(loaded.len(), 4);
        assert_eq!(
            loaded.nearest(&[0.2, 0.7, 0.0], 4).unwrap(),
            index.nearest(&[0.2, 0.7, 0.0], 4).unwrap()
        );
    }

    #[test]
    fn test_load_missing_file_is_index_load_error() {
        let temp_dir = TempDir::new().unwrap();
        let result = AngularIndex::load(&temp_dir.path().join("absent.json"));
        assert!(matches!(result, Err(RetrievalError::IndexLoad(_))));
    }

    #[test]
    fn test_load_rejects_other_metrics() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("index.json");
        std::fs::write(&path, r#"{"metric":"dot","dimension":1,"items":[[1.0]]}"#).unwrap();
        assert!(matches!(
            AngularIndex::load(&path),
            Err(RetrievalError::IndexLoad(_))
        ));
    }
}
