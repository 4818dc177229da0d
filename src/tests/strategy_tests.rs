//! Strategy selection tests

use super::{descriptor, request};
use crate::config::{DisablePolicy, RoutingStrategy};
use crate::provider::{Capability, ProviderRegistry, ProviderTier};
use crate::strategy::StrategyEngine;
use crate::types::Request;
use crate::ProviderDescriptor;

fn registry_of(descriptors: Vec<ProviderDescriptor>) -> ProviderRegistry {
    let registry = ProviderRegistry::new();
    for d in descriptors {
        registry.register(d).unwrap();
    }
    registry
}

#[test]
fn test_scored_priority_prefers_lower_priority_value() {
    let registry = registry_of(vec![
        descriptor("second").with_priority(2),
        descriptor("first").with_priority(1),
    ]);
    let engine = StrategyEngine::new(RoutingStrategy::ScoredPriority);

    let candidates = engine.candidates(&registry, &request());
    assert_eq!(candidates.len(), 2);
    assert_eq!(candidates[0].id(), "first");
    assert_eq!(candidates[1].id(), "second");
}

#[test]
fn test_scored_priority_prefers_free_tier() {
    let registry = registry_of(vec![
        ProviderDescriptor::new("paid", ProviderTier::Paid).with_cost_per_token(0.001),
        ProviderDescriptor::new("free", ProviderTier::Free),
    ]);
    let engine = StrategyEngine::new(RoutingStrategy::ScoredPriority);

    let candidates = engine.candidates(&registry, &request());
    assert_eq!(candidates[0].id(), "free");
}

#[test]
fn test_scored_priority_penalizes_failures() {
    let registry = registry_of(vec![descriptor("flaky"), descriptor("steady")]);

    let flaky = registry.get("flaky").unwrap();
    let policy = DisablePolicy::default();
    for _ in 0..4 {
        flaky.state().begin_dispatch();
        flaky.state().record_failure(0.1, &policy);
    }
    let steady = registry.get("steady").unwrap();
    for _ in 0..4 {
        steady.state().begin_dispatch();
        steady.state().record_success(0.1, 10, 0.0);
    }

    let engine = StrategyEngine::new(RoutingStrategy::ScoredPriority);
    let candidates = engine.candidates(&registry, &request());
    assert_eq!(candidates[0].id(), "steady");
}

#[test]
fn test_round_robin_rotation_is_fair_and_fixed() {
    let registry = registry_of(vec![descriptor("a"), descriptor("b"), descriptor("c")]);
    let engine = StrategyEngine::new(RoutingStrategy::RoundRobin);

    let picks: Vec<String> = (0..6)
        .map(|_| engine.candidates(&registry, &request())[0].id().to_string())
        .collect();

    // Six visits over three providers: each exactly twice, fixed rotation
    assert_eq!(picks, vec!["a", "b", "c", "a", "b", "c"]);
}

#[test]
fn test_least_connections_picks_idle_provider() {
    let registry = registry_of(vec![descriptor("busy"), descriptor("idle")]);
    let busy = registry.get("busy").unwrap();
    busy.state().begin_dispatch();
    busy.state().begin_dispatch();

    let engine = StrategyEngine::new(RoutingStrategy::LeastConnections);
    let candidates = engine.candidates(&registry, &request());
    assert_eq!(candidates[0].id(), "idle");
}

#[test]
fn test_response_time_prefers_fast_and_unknown_providers() {
    let registry = registry_of(vec![
        descriptor("slow"),
        descriptor("fast"),
        descriptor("untried"),
    ]);
    let slow = registry.get("slow").unwrap();
    slow.state().begin_dispatch();
    slow.state().record_success(5.0, 10, 0.0);
    let fast = registry.get("fast").unwrap();
    fast.state().begin_dispatch();
    fast.state().record_success(0.2, 10, 0.0);

    let engine = StrategyEngine::new(RoutingStrategy::ResponseTime);
    let candidates = engine.candidates(&registry, &request());

    // No history counts as zero latency, so untried providers get explored
    assert_eq!(candidates[0].id(), "untried");
    assert_eq!(candidates[1].id(), "fast");
    assert_eq!(candidates[2].id(), "slow");
}

#[test]
fn test_cost_optimized_picks_cheapest() {
    let registry = registry_of(vec![
        descriptor("pricey").with_cost_per_token(0.002),
        descriptor("cheap").with_cost_per_token(0.0001),
    ]);
    let engine = StrategyEngine::new(RoutingStrategy::CostOptimized);
    let candidates = engine.candidates(&registry, &request());
    assert_eq!(candidates[0].id(), "cheap");
}

#[test]
fn test_availability_is_optimistic_about_unknowns() {
    let registry = registry_of(vec![descriptor("proven"), descriptor("unknown")]);
    let proven = registry.get("proven").unwrap();
    let policy = DisablePolicy::default();
    proven.state().begin_dispatch();
    proven.state().record_success(0.1, 10, 0.0);
    proven.state().begin_dispatch();
    proven.state().record_failure(0.1, &policy);

    let engine = StrategyEngine::new(RoutingStrategy::Availability);
    let candidates = engine.candidates(&registry, &request());

    // Zero history scores 1.0, above proven's 0.5
    assert_eq!(candidates[0].id(), "unknown");
}

#[test]
fn test_capability_filtering() {
    let registry = registry_of(vec![
        descriptor("text-only"),
        descriptor("vision").with_capabilities(vec![Capability::Vision]),
    ]);
    let engine = StrategyEngine::new(RoutingStrategy::ScoredPriority);

    let vision_request = Request::new(vec![crate::types::user_message("look")])
        .with_images(vec!["img".to_string()]);
    let candidates = engine.candidates(&registry, &vision_request);
    assert_eq!(candidates.len(), 1);
    assert_eq!(candidates[0].id(), "vision");

    let tool_request = Request::new(vec![crate::types::user_message("call")])
        .with_tools(vec![serde_json::json!({"name": "search"})]);
    assert!(engine.candidates(&registry, &tool_request).is_empty());
}

#[test]
fn test_disabled_providers_are_excluded() {
    let registry = registry_of(vec![descriptor("up"), descriptor("down")]);
    registry.set_enabled("down", false);

    let engine = StrategyEngine::new(RoutingStrategy::RoundRobin);
    for _ in 0..4 {
        let candidates = engine.candidates(&registry, &request());
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].id(), "up");
    }
}

#[test]
fn test_weighted_round_robin_is_reproducible_with_seed() {
    let registry = registry_of(vec![descriptor("a"), descriptor("b"), descriptor("c")]);

    let first = StrategyEngine::with_seed(RoutingStrategy::WeightedRoundRobin, 42);
    let second = StrategyEngine::with_seed(RoutingStrategy::WeightedRoundRobin, 42);

    for _ in 0..10 {
        let ordering_a: Vec<String> = first
            .candidates(&registry, &request())
            .iter()
            .map(|e| e.id().to_string())
            .collect();
        let ordering_b: Vec<String> = second
            .candidates(&registry, &request())
            .iter()
            .map(|e| e.id().to_string())
            .collect();
        assert_eq!(ordering_a, ordering_b);
        assert_eq!(ordering_a.len(), 3);
    }
}

#[test]
fn test_weighted_round_robin_favors_successful_fast_providers() {
    let registry = registry_of(vec![descriptor("good"), descriptor("bad")]);
    let policy = DisablePolicy::default();

    let good = registry.get("good").unwrap();
    for _ in 0..8 {
        good.state().begin_dispatch();
        good.state().record_success(0.05, 10, 0.0);
    }
    let bad = registry.get("bad").unwrap();
    for _ in 0..4 {
        bad.state().begin_dispatch();
        bad.state().record_failure(2.0, &policy);
    }

    // bad has success_rate 0, so its weight is 0 and good must lead
    let engine = StrategyEngine::with_seed(RoutingStrategy::WeightedRoundRobin, 7);
    for _ in 0..20 {
        let candidates = engine.candidates(&registry, &request());
        assert_eq!(candidates[0].id(), "good");
    }
}

#[test]
fn test_empty_registry_yields_no_candidates() {
    let registry = ProviderRegistry::new();
    let engine = StrategyEngine::new(RoutingStrategy::ScoredPriority);
    assert!(engine.candidates(&registry, &request()).is_empty());
}
