pub mod diversity;
pub mod exploration;
pub mod feeds;
pub mod freshness;
pub mod pipeline;
pub mod recall;
pub mod session;

pub use diversity::{MmrDiversifier, SourceDiversityFilter};
pub use exploration::StochasticSelector;
pub use feeds::FeedService;
pub use freshness::FreshnessScorer;
pub use pipeline::RerankPipeline;
pub use recall::CandidateRetriever;
pub use session::SessionEmbeddingBuilder;
