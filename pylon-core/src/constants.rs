/// Pylon system version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Circuit-breaker dependency name for the embedding provider.
pub const DEP_EMBEDDING_PROVIDER: &str = "embedding-provider";

/// Circuit-breaker dependency name for the vector index.
pub const DEP_VECTOR_INDEX: &str = "vector-index";

/// Prefix carried by every issued API credential.
pub const KEY_PREFIX: &str = "pylon_sk_";

/// Limiter pool key used for anonymous callers with no transport origin.
pub const ANONYMOUS_LOCAL_POOL: &str = "anon:local";
