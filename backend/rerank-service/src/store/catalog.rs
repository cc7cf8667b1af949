// ============================================
// Catalog Loader
// ============================================
//
// Loads a JSON article catalog into the in-memory store and index.
//
// Format:
//   { "articles": [ { "id": 1, "title": "...", "source": "...",
//                     "publish_date": "2024-05-01T00:00:00Z",
//                     "embedding": [0.1, ...] }, ... ] }
//
// Row position in the array becomes the article's embedding row.

use super::InMemoryArticleStore;
use crate::index::InMemoryVectorIndex;
use crate::models::Article;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::info;

#[derive(Debug, Clone, Deserialize)]
pub struct CatalogEntry {
    pub id: i64,
    pub title: String,
    pub source: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub confidence: Option<f32>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default, alias = "date")]
    pub publish_date: Option<DateTime<Utc>>,
    #[serde(alias = "vector")]
    pub embedding: Vec<f32>,
}

#[derive(Debug, Deserialize)]
struct CatalogFile {
    articles: Vec<CatalogEntry>,
}

/// Article store and vector index built from the same catalog
pub struct Catalog {
    pub store: InMemoryArticleStore,
    pub index: InMemoryVectorIndex,
}

impl Catalog {
    pub fn from_entries(entries: Vec<CatalogEntry>) -> Result<Self> {
        let mut articles = Vec::with_capacity(entries.len());
        let mut rows = Vec::with_capacity(entries.len());

        for (row, entry) in entries.into_iter().enumerate() {
            articles.push(Article {
                id: entry.id,
                title: entry.title,
                source: entry.source,
                category: entry.category,
                confidence: entry.confidence,
                summary: entry.summary,
                publish_date: entry.publish_date,
                embedding_row: row,
            });
            rows.push(entry.embedding);
        }

        let store = InMemoryArticleStore::new(articles).context("invalid article catalog")?;
        let index = InMemoryVectorIndex::from_rows(rows).context("invalid catalog embeddings")?;

        Ok(Self { store, index })
    }
}

pub fn load_catalog(path: impl AsRef<Path>) -> Result<Catalog> {
    let path = path.as_ref();
    let file = File::open(path)
        .with_context(|| format!("failed to open catalog {}", path.display()))?;
    let parsed: CatalogFile = serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("failed to parse catalog {}", path.display()))?;

    let catalog = Catalog::from_entries(parsed.articles)?;

    info!(
        path = %path.display(),
        articles = catalog.store.len(),
        "Catalog loaded"
    );

    Ok(catalog)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::VectorIndex;
    use crate::store::ArticleStore;

    #[test]
    fn test_from_entries_assigns_rows_in_order() {
        let raw = r#"{
            "articles": [
                {"id": 7, "title": "a", "source": "x", "date": "2024-01-02T00:00:00Z", "embedding": [1.0, 0.0]},
                {"id": 9, "title": "b", "source": "y", "embedding": [0.0, 1.0]}
            ]
        }"#;
        let parsed: CatalogFile = serde_json::from_str(raw).unwrap();
        let catalog = Catalog::from_entries(parsed.articles).unwrap();

        assert_eq!(catalog.store.by_id(9).map(|a| a.embedding_row), Some(1));
        assert!(catalog.store.by_id(7).unwrap().publish_date.is_some());
        assert_eq!(catalog.index.reconstruct(1).unwrap(), vec![0.0, 1.0]);
    }

    #[test]
    fn test_from_entries_rejects_ragged_embeddings() {
        let raw = r#"{
            "articles": [
                {"id": 1, "title": "a", "source": "x", "embedding": [1.0, 0.0]},
                {"id": 2, "title": "b", "source": "y", "embedding": [1.0]}
            ]
        }"#;
        let parsed: CatalogFile = serde_json::from_str(raw).unwrap();
        assert!(Catalog::from_entries(parsed.articles).is_err());
    }
}
