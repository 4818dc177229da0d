//! Selection strategies over the set of healthy, capable providers
//!
//! The engine filters registry entries to those that are enabled and whose
//! capabilities cover the request, then orders them best-first according to
//! the configured strategy. An empty result means no provider qualifies.
//!
//! Every strategy is deterministic given its inputs; the two random
//! strategies draw from a seedable RNG so tests can pin their behavior.
//! Ties break by ascending priority and then id.

use crate::config::RoutingStrategy;
use crate::provider::{ProviderEntry, ProviderRegistry, StateSnapshot};
use crate::types::Request;
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::debug;

/// Orders candidate providers for the router
#[derive(Debug)]
pub struct StrategyEngine {
    strategy: RoutingStrategy,
    round_robin_cursor: AtomicUsize,
    rng: Mutex<StdRng>,
}

/// A candidate paired with the state snapshot the ordering was computed from
struct Candidate {
    entry: Arc<ProviderEntry>,
    snapshot: StateSnapshot,
}

impl StrategyEngine {
    /// Create an engine with an entropy-seeded RNG
    pub fn new(strategy: RoutingStrategy) -> Self {
        Self {
            strategy,
            round_robin_cursor: AtomicUsize::new(0),
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    /// Create an engine with a fixed RNG seed for reproducible draws
    pub fn with_seed(strategy: RoutingStrategy, seed: u64) -> Self {
        Self {
            strategy,
            round_robin_cursor: AtomicUsize::new(0),
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    /// The configured strategy
    pub fn strategy(&self) -> RoutingStrategy {
        self.strategy
    }

    /// Compute the ordered candidate list for `request`, best first
    ///
    /// Returns an empty list when no enabled provider covers the request's
    /// required capabilities.
    pub fn candidates(
        &self,
        registry: &ProviderRegistry,
        request: &Request,
    ) -> Vec<Arc<ProviderEntry>> {
        let required = request.required_capabilities();

        let mut pool: Vec<Candidate> = registry
            .entries()
            .into_iter()
            .filter(|entry| entry.descriptor().supports(&required))
            .filter_map(|entry| {
                let snapshot = entry.state().snapshot();
                snapshot.enabled.then_some(Candidate { entry, snapshot })
            })
            .collect();

        // Deterministic base ordering before any strategy runs
        pool.sort_by(|a, b| a.entry.id().cmp(b.entry.id()));

        if pool.is_empty() {
            debug!(strategy = ?self.strategy, "no eligible candidates");
            return Vec::new();
        }

        let ordered = match self.strategy {
            RoutingStrategy::ScoredPriority => self.scored_priority(pool, request),
            RoutingStrategy::RoundRobin => self.round_robin(pool),
            RoutingStrategy::WeightedRoundRobin => self.weighted_round_robin(pool),
            RoutingStrategy::LeastConnections => {
                Self::order_by_key(pool, |s| s.current_in_flight as f64)
            }
            RoutingStrategy::ResponseTime => Self::order_by_key(pool, |s| s.avg_latency_secs),
            RoutingStrategy::CostOptimized => {
                let mut pool = pool;
                pool.sort_by(|a, b| {
                    a.entry
                        .descriptor()
                        .cost_per_token
                        .total_cmp(&b.entry.descriptor().cost_per_token)
                        .then_with(|| a.entry.id().cmp(b.entry.id()))
                });
                pool
            }
            RoutingStrategy::Availability => Self::order_by_key(pool, |s| -s.success_rate),
        };

        debug!(
            strategy = ?self.strategy,
            top = %ordered[0].entry.id(),
            candidates = ordered.len(),
            "computed candidate ordering"
        );

        ordered.into_iter().map(|c| c.entry).collect()
    }

    /// Composite score: priority, tier, recent latency, failure rate, cost
    fn scored_priority(&self, pool: Vec<Candidate>, request: &Request) -> Vec<Candidate> {
        let max_priority = pool
            .iter()
            .map(|c| c.entry.descriptor().priority)
            .max()
            .unwrap_or(0);

        let mut scored: Vec<(f64, Candidate)> = pool
            .into_iter()
            .map(|candidate| {
                let descriptor = candidate.entry.descriptor();
                let snapshot = &candidate.snapshot;

                let mut score = (max_priority - descriptor.priority) as f64 * 10.0;
                score += descriptor.tier.score_weight();
                score += (10.0 - snapshot.recent_avg_latency_secs).max(0.0);
                score += (1.0 - snapshot.failure_rate) * 20.0;

                let estimated_cost = request.estimated_cost(descriptor);
                score += if descriptor.cost_per_token == 0.0 {
                    30.0
                } else {
                    (10.0 - estimated_cost * 1000.0).max(0.0)
                };

                (score, candidate)
            })
            .collect();

        scored.sort_by(|(sa, a), (sb, b)| {
            sb.total_cmp(sa)
                .then_with(|| {
                    a.entry
                        .descriptor()
                        .priority
                        .cmp(&b.entry.descriptor().priority)
                })
                .then_with(|| a.entry.id().cmp(b.entry.id()))
        });

        scored.into_iter().map(|(_, c)| c).collect()
    }

    /// Rotate the id-ordered pool by a shared cursor, advanced once per call
    fn round_robin(&self, mut pool: Vec<Candidate>) -> Vec<Candidate> {
        let start = self.round_robin_cursor.fetch_add(1, Ordering::Relaxed) % pool.len();
        pool.rotate_left(start);
        pool
    }

    /// Successive weighted random draws without replacement
    ///
    /// weight = success_rate * max(0.1, 1 / (avg_latency + 0.1)), or 1.0
    /// with no history. A degenerate all-zero pool keeps its listed order.
    fn weighted_round_robin(&self, mut pool: Vec<Candidate>) -> Vec<Candidate> {
        let mut rng = self.rng.lock();
        let mut ordered = Vec::with_capacity(pool.len());

        while !pool.is_empty() {
            let weights: Vec<f64> = pool.iter().map(|c| Self::weight(&c.snapshot)).collect();
            let total: f64 = weights.iter().sum();

            // Degenerate pool: nothing left to distinguish, keep listed order
            if total <= 0.0 {
                ordered.append(&mut pool);
                break;
            }

            let draw = rng.gen_range(0.0..total);
            let mut cumulative = 0.0;
            let mut picked = None;
            for (i, weight) in weights.iter().enumerate() {
                if *weight <= 0.0 {
                    continue;
                }
                cumulative += weight;
                picked = Some(i);
                if draw < cumulative {
                    break;
                }
            }
            match picked {
                Some(i) => ordered.push(pool.remove(i)),
                None => {
                    ordered.append(&mut pool);
                    break;
                }
            }
        }

        ordered
    }

    fn weight(snapshot: &StateSnapshot) -> f64 {
        if snapshot.total_requests == 0 {
            return 1.0;
        }
        let response_factor = (1.0 / (snapshot.avg_latency_secs + 0.1)).max(0.1);
        snapshot.success_rate * response_factor
    }

    /// Ascending sort over a snapshot-derived key, ties by id
    fn order_by_key<F>(mut pool: Vec<Candidate>, key: F) -> Vec<Candidate>
    where
        F: Fn(&StateSnapshot) -> f64,
    {
        pool.sort_by(|a, b| {
            key(&a.snapshot)
                .total_cmp(&key(&b.snapshot))
                .then_with(|| a.entry.id().cmp(b.entry.id()))
        });
        pool
    }
}
