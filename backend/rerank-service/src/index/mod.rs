/// Vector Index
///
/// Capability interface over the nearest-neighbor service. The pipeline only
/// ever reads from the index; building or persisting it happens elsewhere.
use crate::error::{RerankError, Result};
use ndarray::{Array2, ArrayView1};
use tracing::debug;

/// Nearest-neighbor lookup used by the rerank stages.
///
/// Implementations must answer concurrent reads; a failed call is reported
/// as `RerankError::UpstreamUnavailable` and is never retried by the caller.
#[cfg_attr(test, mockall::automock)]
pub trait VectorIndex: Send + Sync {
    /// Stored embedding for `row`
    fn reconstruct(&self, row: usize) -> Result<Vec<f32>>;

    /// Top `k` rows by similarity to `query`, as parallel `(scores, rows)`
    /// sorted by descending score
    fn search(&self, query: &[f32], k: usize) -> Result<(Vec<f32>, Vec<usize>)>;

    fn dimension(&self) -> usize;
}

/// Exact inner-product index over an in-memory embedding matrix
#[derive(Debug, Clone)]
pub struct InMemoryVectorIndex {
    embeddings: Array2<f32>,
}

impl InMemoryVectorIndex {
    pub fn new(embeddings: Array2<f32>) -> Self {
        Self { embeddings }
    }

    /// Build from row vectors; all rows must share one dimension
    pub fn from_rows(rows: Vec<Vec<f32>>) -> Result<Self> {
        let dim = rows.first().map(Vec::len).unwrap_or(0);
        let count = rows.len();

        if let Some((row, bad)) = rows.iter().enumerate().find(|(_, r)| r.len() != dim) {
            return Err(RerankError::InvalidInput(format!(
                "embedding row {} has dimension {}, expected {}",
                row,
                bad.len(),
                dim
            )));
        }

        let flat: Vec<f32> = rows.into_iter().flatten().collect();
        let embeddings = Array2::from_shape_vec((count, dim), flat).map_err(|e| {
            RerankError::InvalidInput(format!("failed to build embedding matrix: {}", e))
        })?;

        Ok(Self::new(embeddings))
    }

    pub fn len(&self) -> usize {
        self.embeddings.nrows()
    }

    pub fn is_empty(&self) -> bool {
        self.embeddings.nrows() == 0
    }
}

impl VectorIndex for InMemoryVectorIndex {
    fn reconstruct(&self, row: usize) -> Result<Vec<f32>> {
        if row >= self.embeddings.nrows() {
            return Err(RerankError::UpstreamUnavailable(format!(
                "row {} out of range for index of {} vectors",
                row,
                self.embeddings.nrows()
            )));
        }
        Ok(self.embeddings.row(row).to_vec())
    }

    fn search(&self, query: &[f32], k: usize) -> Result<(Vec<f32>, Vec<usize>)> {
        if query.len() != self.dimension() {
            return Err(RerankError::UpstreamUnavailable(format!(
                "query dimension {} does not match index dimension {}",
                query.len(),
                self.dimension()
            )));
        }

        let query = ArrayView1::from(query);
        let scores = self.embeddings.dot(&query);

        let mut hits: Vec<(usize, f32)> = scores.iter().copied().enumerate().collect();
        // Stable sort keeps lower rows first among equal scores
        hits.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        hits.truncate(k);

        debug!(k = k, hits = hits.len(), "Flat index search executed");

        Ok(hits.into_iter().map(|(row, score)| (score, row)).unzip())
    }

    fn dimension(&self) -> usize {
        self.embeddings.ncols()
    }
}
