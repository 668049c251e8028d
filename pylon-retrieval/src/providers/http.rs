//! HTTP embedding provider.
//!
//! Blocking JSON POST with a per-request timeout. A timeout surfaces as
//! `ProviderTimeout`; transport errors, non-success statuses, malformed
//! bodies, and dimension mismatches all surface as `ProviderUnavailable`
//! so the breaker counts them identically.

use std::time::Duration;

use reqwest::blocking::Client;
use serde::Deserialize;
use tracing::debug;

use pylon_core::constants::DEP_EMBEDDING_PROVIDER;
use pylon_core::errors::{GatewayError, GatewayResult};
use pylon_core::traits::IEmbeddingProvider;

#[derive(Debug, Deserialize)]
struct EmbedResponse {
    embedding: Vec<f32>,
}

/// Embedding provider over an HTTP endpoint accepting
/// `{"input": "<text>"}` and answering `{"embedding": [..]}`.
pub struct HttpEmbeddingProvider {
    client: Client,
    endpoint: String,
    dimensions: usize,
    timeout: Duration,
}

impl HttpEmbeddingProvider {
    /// Build from retrieval config, taking the per-call timeout from
    /// `provider_timeout_ms`.
    pub fn from_config(
        endpoint: impl Into<String>,
        dimensions: usize,
        config: &pylon_core::config::RetrievalConfig,
    ) -> GatewayResult<Self> {
        Self::new(
            endpoint,
            dimensions,
            Duration::from_millis(config.provider_timeout_ms),
        )
    }

    pub fn new(
        endpoint: impl Into<String>,
        dimensions: usize,
        timeout: Duration,
    ) -> GatewayResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| GatewayError::internal(format!("building http client: {e}")))?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
            dimensions,
            timeout,
        })
    }
}

impl IEmbeddingProvider for HttpEmbeddingProvider {
    fn embed(&self, text: &str) -> GatewayResult<Vec<f32>> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(&serde_json::json!({ "input": text }))
            .send()
            .map_err(|e| {
                if e.is_timeout() {
                    GatewayError::ProviderTimeout {
                        dependency: DEP_EMBEDDING_PROVIDER.to_string(),
                        timeout: self.timeout,
                    }
                } else {
                    GatewayError::ProviderUnavailable {
                        dependency: DEP_EMBEDDING_PROVIDER.to_string(),
                        reason: e.to_string(),
                    }
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(GatewayError::ProviderUnavailable {
                dependency: DEP_EMBEDDING_PROVIDER.to_string(),
                reason: format!("status {status}"),
            });
        }

        let body: EmbedResponse = response.json().map_err(|e| GatewayError::ProviderUnavailable {
            dependency: DEP_EMBEDDING_PROVIDER.to_string(),
            reason: format!("malformed response: {e}"),
        })?;

        if body.embedding.len() != self.dimensions {
            return Err(GatewayError::ProviderUnavailable {
                dependency: DEP_EMBEDDING_PROVIDER.to_string(),
                reason: format!(
                    "dimension mismatch: expected {}, got {}",
                    self.dimensions,
                    body.embedding.len()
                ),
            });
        }

        debug!(chars = text.len(), dims = body.embedding.len(), "embedded query");
        Ok(body.embedding)
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn name(&self) -> &str {
        "http-embedding"
    }

    fn is_available(&self) -> bool {
        true // Availability is learned from attempts, via the breaker.
    }
}
