pub mod cache;
pub mod config;
pub mod error;
pub mod index;
pub mod models;
pub mod services;
pub mod store;
pub mod utils;

pub use cache::RecommendationCache;
pub use config::Config;
pub use error::{RerankError, Result};
pub use index::{InMemoryVectorIndex, VectorIndex};
pub use models::{Article, PipelineParameters, RerankStats, ScoredCandidate, SessionQuery};
pub use services::{FeedService, RerankPipeline};
pub use store::{ArticleStore, InMemoryArticleStore};
