mod graph_backend;
mod predicate_similarity;
mod vector_backend;

pub use graph_backend::IGraphBackend;
pub use predicate_similarity::{IPredicateSimilarity, NoPredicateSimilarity};
pub use vector_backend::IVectorBackend;
