pub mod http;

pub use http::HttpEmbeddingProvider;
