//! Collaborator contracts the routing core depends on but does not implement
//!
//! The core treats "execute a request against provider X" as an opaque
//! capability. Adapters must not mutate provider state themselves; the
//! router records success and failure around each dispatch.

use crate::error::AdapterError;
use crate::types::Request;
use async_trait::async_trait;
use std::collections::HashMap;

/// Raw output of a provider dispatch, before the router attaches
/// provider id, cost and latency
#[derive(Debug, Clone, Default)]
pub struct ProviderOutput {
    /// Generated content
    pub content: String,
    /// Tokens consumed
    pub tokens_used: u64,
    /// Opaque provider metadata
    pub metadata: HashMap<String, serde_json::Value>,
}

/// Executes a request against a named provider
///
/// Implementations wrap the provider-specific wire protocol. The router
/// applies its own per-attempt time budget around `execute`, so a blocking
/// or hung implementation is bounded by the router, not trusted.
#[async_trait]
pub trait ExecutionAdapter: Send + Sync {
    /// Execute `request` against the provider identified by `provider_id`
    async fn execute(
        &self,
        provider_id: &str,
        request: &Request,
    ) -> Result<ProviderOutput, AdapterError>;
}

/// Cheap liveness check used only by the recovery supervisor
#[async_trait]
pub trait HealthProbe: Send + Sync {
    /// Returns true if the provider looks healthy enough to re-admit
    async fn probe(&self, provider_id: &str) -> bool;
}
