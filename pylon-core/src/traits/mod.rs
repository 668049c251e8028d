pub mod corpus;
pub mod embedding;
pub mod index;

pub use corpus::ICorpusStore;
pub use embedding::IEmbeddingProvider;
pub use index::IVectorIndex;
