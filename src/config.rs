//! Router configuration types
//!
//! This module defines the routing strategy enumeration and the router
//! settings consumed by the core. All types deserialize with serde so they
//! can be loaded through any file-config front end.

use crate::error::{Result, RouterError};
use serde::{Deserialize, Serialize};

/// Routing strategy enumeration
///
/// Defines how the router orders candidate providers when more than one
/// enabled provider can serve a request.
///
/// ## Strategies
///
/// - **ScoredPriority**: composite score over priority, tier, latency,
///   failure rate and cost (default)
/// - **RoundRobin**: cyclic rotation over the candidate set
/// - **WeightedRoundRobin**: weighted random draw by success rate and latency
/// - **LeastConnections**: fewest in-flight requests first
/// - **ResponseTime**: lowest average latency first
/// - **CostOptimized**: lowest cost per token first
/// - **Availability**: highest success rate first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoutingStrategy {
    /// Composite scoring over priority, tier, history and cost
    #[default]
    ScoredPriority,
    /// Cyclic rotation with a shared cursor
    RoundRobin,
    /// Weighted random draw by success rate and response time
    WeightedRoundRobin,
    /// Fewest in-flight requests
    LeastConnections,
    /// Lowest average latency
    ResponseTime,
    /// Lowest cost per token
    CostOptimized,
    /// Highest success rate
    Availability,
}

impl RoutingStrategy {
    /// The snake_case configuration name of this strategy
    pub fn as_str(self) -> &'static str {
        match self {
            RoutingStrategy::ScoredPriority => "scored_priority",
            RoutingStrategy::RoundRobin => "round_robin",
            RoutingStrategy::WeightedRoundRobin => "weighted_round_robin",
            RoutingStrategy::LeastConnections => "least_connections",
            RoutingStrategy::ResponseTime => "response_time",
            RoutingStrategy::CostOptimized => "cost_optimized",
            RoutingStrategy::Availability => "availability",
        }
    }
}

/// Auto-disable policy parameters
///
/// A provider is disabled when its cumulative failure rate exceeds
/// `failure_rate_threshold` after at least `sample_floor` total requests.
/// The sample floor prevents a single early failure from disabling a
/// provider. The check re-runs on every recorded failure once the floor
/// is met.
#[derive(Debug, Clone, Copy)]
pub struct DisablePolicy {
    /// Minimum total requests before the failure rate is evaluated
    pub sample_floor: u64,
    /// Failure rate above which the provider is disabled (exclusive bound)
    pub failure_rate_threshold: f64,
}

impl Default for DisablePolicy {
    fn default() -> Self {
        Self {
            sample_floor: 10,
            failure_rate_threshold: 0.5,
        }
    }
}

/// Router configuration
///
/// ## Defaults
///
/// - `strategy`: ScoredPriority
/// - `max_retries`: 3
/// - `disable_sample_floor`: 10
/// - `disable_failure_rate`: 0.5
/// - `backoff_cap_secs`: 300
/// - `latency_window`: 100
/// - `request_timeout_secs`: 60
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RouterConfig {
    /// Selection strategy for candidate ordering
    pub strategy: RoutingStrategy,

    /// Number of selection-and-dispatch attempts per routing call (default: 3)
    pub max_retries: u32,

    /// Minimum total requests before auto-disable is evaluated (default: 10)
    pub disable_sample_floor: u64,

    /// Failure rate above which a provider is auto-disabled (default: 0.5)
    pub disable_failure_rate: f64,

    /// Upper bound on the recovery backoff delay in seconds (default: 300)
    pub backoff_cap_secs: u64,

    /// Number of recent latencies retained per provider (default: 100)
    pub latency_window: usize,

    /// Per-dispatch timeout in seconds (default: 60)
    pub request_timeout_secs: u64,

    /// Optional RNG seed for the random strategies (default: entropy)
    pub strategy_seed: Option<u64>,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            strategy: RoutingStrategy::default(),
            max_retries: 3,
            disable_sample_floor: 10,
            disable_failure_rate: 0.5,
            backoff_cap_secs: 300,
            latency_window: 100,
            request_timeout_secs: 60,
            strategy_seed: None,
        }
    }
}

impl RouterConfig {
    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.max_retries == 0 {
            return Err(RouterError::InvalidConfiguration(
                "max_retries must be at least 1".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.disable_failure_rate) {
            return Err(RouterError::InvalidConfiguration(
                "disable_failure_rate must be within [0.0, 1.0]".to_string(),
            ));
        }
        if self.latency_window == 0 {
            return Err(RouterError::InvalidConfiguration(
                "latency_window must be at least 1".to_string(),
            ));
        }
        if self.request_timeout_secs == 0 {
            return Err(RouterError::InvalidConfiguration(
                "request_timeout_secs must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// The auto-disable policy derived from this configuration
    pub fn disable_policy(&self) -> DisablePolicy {
        DisablePolicy {
            sample_floor: self.disable_sample_floor,
            failure_rate_threshold: self.disable_failure_rate,
        }
    }
}
