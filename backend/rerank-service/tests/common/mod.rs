#![allow(dead_code)]

use chrono::{DateTime, Duration, Utc};
use rerank_service::store::{Catalog, CatalogEntry};
use rerank_service::{RerankPipeline, Result, VectorIndex};
use std::sync::Arc;

pub const DIM: usize = 8;
pub const SOURCES: [&str; 6] = ["reuters", "bbc", "ap", "cnn", "guardian", "kompas"];

/// Unit vector along axis 0 with a smaller component on `axis`
pub fn topic_vector(axis: usize, weight: f32) -> Vec<f32> {
    let mut v = vec![0.0; DIM];
    v[0] = 1.0;
    v[axis % (DIM - 1) + 1] += weight;
    let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt();
    v.into_iter().map(|x| x / norm).collect()
}

pub fn entry(
    id: i64,
    source: &str,
    age_days: Option<i64>,
    embedding: Vec<f32>,
    now: DateTime<Utc>,
) -> CatalogEntry {
    CatalogEntry {
        id,
        title: format!("headline {}", id),
        source: source.to_string(),
        category: Some("world".to_string()),
        confidence: Some(0.8),
        summary: None,
        publish_date: age_days.map(|d| now - Duration::days(d)),
        embedding,
    }
}

/// History articles 101 and 102 plus `candidates` recent articles spread
/// over `sources`, all close to the history topic
pub fn news_catalog(candidates: i64, sources: &[&str], now: DateTime<Utc>) -> Catalog {
    let mut entries = vec![
        entry(101, "reuters", Some(0), topic_vector(0, 0.1), now),
        entry(102, "bbc", Some(1), topic_vector(1, 0.1), now),
    ];

    for i in 0..candidates {
        let source = sources[i as usize % sources.len()];
        entries.push(entry(
            1000 + i,
            source,
            Some(i % 7),
            topic_vector(i as usize, 0.3 + 0.01 * i as f32),
            now,
        ));
    }

    Catalog::from_entries(entries).expect("fixture catalog must be valid")
}

pub fn pipeline_from(catalog: Catalog) -> RerankPipeline {
    RerankPipeline::new(Arc::new(catalog.store), Arc::new(catalog.index))
}

/// Index that answers `reconstruct` but fails every search
pub struct FailingSearchIndex<I: VectorIndex> {
    pub inner: I,
}

impl<I: VectorIndex> VectorIndex for FailingSearchIndex<I> {
    fn reconstruct(&self, row: usize) -> Result<Vec<f32>> {
        self.inner.reconstruct(row)
    }

    fn search(&self, _query: &[f32], _k: usize) -> Result<(Vec<f32>, Vec<usize>)> {
        Err(rerank_service::RerankError::UpstreamUnavailable(
            "search backend offline".to_string(),
        ))
    }

    fn dimension(&self) -> usize {
        self.inner.dimension()
    }
}
