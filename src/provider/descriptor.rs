//! Static provider configuration
//!
//! A [`ProviderDescriptor`] is immutable after registration and owned
//! exclusively by the registry. Runtime health and usage live in
//! [`crate::provider::ProviderState`].

use serde::{Deserialize, Serialize};

/// Provider cost tier
///
/// Free tiers are preferred by the scored-priority strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderTier {
    Free,
    Freemium,
    Paid,
    Enterprise,
}

impl ProviderTier {
    /// Weight contributed to the scored-priority strategy
    pub(crate) fn score_weight(self) -> f64 {
        match self {
            ProviderTier::Free => 50.0,
            ProviderTier::Freemium => 30.0,
            ProviderTier::Paid => 10.0,
            ProviderTier::Enterprise => 5.0,
        }
    }
}

/// Optional provider capability
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    /// Can stream responses incrementally
    Streaming,
    /// Can accept image inputs
    Vision,
    /// Can call caller-supplied tools
    FunctionCalling,
}

/// Static configuration for one backend provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderDescriptor {
    /// Unique provider id
    pub id: String,
    /// Cost tier
    pub tier: ProviderTier,
    /// Selection priority, lower is more preferred
    pub priority: u32,
    /// Supported optional capabilities
    #[serde(default)]
    pub capabilities: Vec<Capability>,
    /// Cost per token in dollars, non-negative
    pub cost_per_token: f64,
    /// Advertised request budget per minute
    pub rate_limit_per_minute: u32,
}

impl ProviderDescriptor {
    /// Create a descriptor with default priority, no capabilities and zero cost
    pub fn new(id: impl Into<String>, tier: ProviderTier) -> Self {
        Self {
            id: id.into(),
            tier,
            priority: 1,
            capabilities: Vec::new(),
            cost_per_token: 0.0,
            rate_limit_per_minute: 60,
        }
    }

    /// Set the selection priority (builder pattern)
    pub fn with_priority(mut self, priority: u32) -> Self {
        self.priority = priority;
        self
    }

    /// Set the capability set (builder pattern)
    pub fn with_capabilities(mut self, capabilities: Vec<Capability>) -> Self {
        self.capabilities = capabilities;
        self
    }

    /// Set the per-token cost (builder pattern)
    pub fn with_cost_per_token(mut self, cost_per_token: f64) -> Self {
        self.cost_per_token = cost_per_token;
        self
    }

    /// Set the per-minute rate limit (builder pattern)
    pub fn with_rate_limit(mut self, rate_limit_per_minute: u32) -> Self {
        self.rate_limit_per_minute = rate_limit_per_minute;
        self
    }

    /// True if this provider advertises every capability in `required`
    pub fn supports(&self, required: &[Capability]) -> bool {
        required.iter().all(|c| self.capabilities.contains(c))
    }
}
