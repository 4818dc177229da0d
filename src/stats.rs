//! Serializable usage statistics
//!
//! Snapshots are plain data: persistence or exposure over a wire is a
//! caller concern.

use crate::config::RoutingStrategy;
use crate::provider::{ProviderDescriptor, ProviderTier, StateSnapshot};
use serde::Serialize;

/// Usage statistics for one provider
#[derive(Debug, Clone, Serialize)]
pub struct ProviderStats {
    pub id: String,
    pub tier: ProviderTier,
    pub priority: u32,
    pub enabled: bool,
    pub total_requests: u64,
    pub success_count: u64,
    pub failure_count: u64,
    pub success_rate: f64,
    /// Mean latency over the last 10 dispatches
    pub avg_latency_secs: f64,
    pub current_in_flight: u32,
    pub total_tokens: u64,
    pub total_cost: f64,
    pub last_used_at: u64,
}

impl ProviderStats {
    /// Build provider stats from a descriptor and a state snapshot
    pub fn collect(descriptor: &ProviderDescriptor, snapshot: &StateSnapshot) -> Self {
        Self {
            id: descriptor.id.clone(),
            tier: descriptor.tier,
            priority: descriptor.priority,
            enabled: snapshot.enabled,
            total_requests: snapshot.total_requests,
            success_count: snapshot.success_count,
            failure_count: snapshot.failure_count,
            success_rate: snapshot.success_rate,
            avg_latency_secs: snapshot.recent_avg_latency_secs,
            current_in_flight: snapshot.current_in_flight,
            total_tokens: snapshot.total_tokens,
            total_cost: snapshot.total_cost,
            last_used_at: snapshot.last_used_at,
        }
    }
}

/// Aggregate router statistics
#[derive(Debug, Clone, Serialize)]
pub struct RouterStats {
    pub strategy: String,
    pub provider_count: usize,
    pub enabled_count: usize,
    pub total_requests: u64,
    pub total_tokens: u64,
    pub total_cost: f64,
    pub providers: Vec<ProviderStats>,
}

impl RouterStats {
    /// Roll per-provider stats up into aggregate totals
    pub fn aggregate(strategy: RoutingStrategy, mut providers: Vec<ProviderStats>) -> Self {
        providers.sort_by(|a, b| a.id.cmp(&b.id));
        Self {
            strategy: strategy.as_str().to_string(),
            provider_count: providers.len(),
            enabled_count: providers.iter().filter(|p| p.enabled).count(),
            total_requests: providers.iter().map(|p| p.total_requests).sum(),
            total_tokens: providers.iter().map(|p| p.total_tokens).sum(),
            total_cost: providers.iter().map(|p| p.total_cost).sum(),
            providers,
        }
    }
}
