/// Article Store
///
/// Read-only view over the article catalog. The pipeline only needs lookup
/// by id (read history) and by row (search hits); the non-personalized feeds
/// also enumerate every article.
pub mod catalog;

use crate::error::{RerankError, Result};
use crate::models::Article;
use std::collections::HashMap;

pub use catalog::{load_catalog, Catalog, CatalogEntry};

pub trait ArticleStore: Send + Sync {
    fn by_id(&self, id: i64) -> Option<&Article>;
    fn by_row(&self, row: usize) -> Option<&Article>;
    fn articles(&self) -> &[Article];
}

/// Article store held in memory, rows addressed by `embedding_row`
#[derive(Debug, Clone, Default)]
pub struct InMemoryArticleStore {
    articles: Vec<Article>,
    by_id: HashMap<i64, usize>,
    by_row: HashMap<usize, usize>,
}

impl InMemoryArticleStore {
    pub fn new(articles: Vec<Article>) -> Result<Self> {
        let mut by_id = HashMap::with_capacity(articles.len());
        let mut by_row = HashMap::with_capacity(articles.len());

        for (pos, article) in articles.iter().enumerate() {
            if by_id.insert(article.id, pos).is_some() {
                return Err(RerankError::InvalidInput(format!(
                    "duplicate article id {}",
                    article.id
                )));
            }
            if by_row.insert(article.embedding_row, pos).is_some() {
                return Err(RerankError::InvalidInput(format!(
                    "duplicate embedding row {}",
                    article.embedding_row
                )));
            }
        }

        Ok(Self {
            articles,
            by_id,
            by_row,
        })
    }

    pub fn len(&self) -> usize {
        self.articles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.articles.is_empty()
    }
}

impl ArticleStore for InMemoryArticleStore {
    fn by_id(&self, id: i64) -> Option<&Article> {
        self.by_id.get(&id).map(|&pos| &self.articles[pos])
    }

    fn by_row(&self, row: usize) -> Option<&Article> {
        self.by_row.get(&row).map(|&pos| &self.articles[pos])
    }

    fn articles(&self) -> &[Article] {
        &self.articles
    }
}
