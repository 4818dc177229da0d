//! Live provider health and usage state
//!
//! One [`ProviderState`] exists per registered descriptor and is shared by
//! all concurrent routing attempts. A single mutex per provider serializes
//! every mutation: the auto-disable decision reads `total_requests` and
//! `failure_count` together, so the counter updates and the check must be
//! one atomic unit. The lock is never held across an await.

use crate::config::DisablePolicy;
use parking_lot::Mutex;
use serde::Serialize;
use std::collections::VecDeque;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::warn;

/// Mutable runtime state for one provider
#[derive(Debug)]
pub struct ProviderState {
    inner: Mutex<StateInner>,
    window_capacity: usize,
}

#[derive(Debug)]
struct StateInner {
    enabled: bool,
    total_requests: u64,
    success_count: u64,
    failure_count: u64,
    total_response_time_secs: f64,
    latency_window: VecDeque<f64>,
    current_in_flight: u32,
    last_used_at: u64,
    total_tokens: u64,
    total_cost: f64,
}

/// Point-in-time copy of a provider's state, used by strategies and stats
///
/// Strategies compare snapshots across providers; minor staleness between
/// providers is acceptable and expected.
#[derive(Debug, Clone, Serialize)]
pub struct StateSnapshot {
    pub enabled: bool,
    pub total_requests: u64,
    pub success_count: u64,
    pub failure_count: u64,
    pub current_in_flight: u32,
    /// Mean over the full latency window, 0.0 with no history
    pub avg_latency_secs: f64,
    /// Mean over the last 10 latencies, 0.0 with no history
    pub recent_avg_latency_secs: f64,
    /// success_count / total_requests, 1.0 with no history
    pub success_rate: f64,
    /// failure_count / total_requests, 0.0 with no history
    pub failure_rate: f64,
    pub last_used_at: u64,
    pub total_tokens: u64,
    pub total_cost: f64,
}

impl ProviderState {
    /// Create state with the given latency window capacity
    pub fn new(window_capacity: usize) -> Self {
        Self {
            inner: Mutex::new(StateInner {
                enabled: true,
                total_requests: 0,
                success_count: 0,
                failure_count: 0,
                total_response_time_secs: 0.0,
                latency_window: VecDeque::with_capacity(window_capacity.min(1024)),
                current_in_flight: 0,
                last_used_at: 0,
                total_tokens: 0,
                total_cost: 0.0,
            }),
            window_capacity,
        }
    }

    /// Mark the start of a dispatch
    ///
    /// Must be balanced by exactly one of `record_success`,
    /// `record_failure` or `abort_dispatch`, so the in-flight counter is
    /// released on every exit path.
    pub fn begin_dispatch(&self) {
        self.inner.lock().current_in_flight += 1;
    }

    /// Release the in-flight counter without recording an outcome
    ///
    /// Used when a dispatch is abandoned before its outcome is known, such
    /// as the routing future being dropped mid-call. Nothing else moves:
    /// an abandoned dispatch is not a request the provider answered.
    pub fn abort_dispatch(&self) {
        let mut inner = self.inner.lock();
        inner.current_in_flight = inner.current_in_flight.saturating_sub(1);
    }

    /// Record a successful dispatch
    pub fn record_success(&self, latency_secs: f64, tokens: u64, cost: f64) {
        let mut inner = self.inner.lock();
        inner.complete(latency_secs, self.window_capacity);
        inner.success_count += 1;
        inner.total_tokens += tokens;
        inner.total_cost += cost;
    }

    /// Record a failed dispatch and evaluate the auto-disable policy
    ///
    /// Returns true if this call transitioned the provider from enabled to
    /// disabled; the caller is then responsible for scheduling recovery.
    pub fn record_failure(&self, latency_secs: f64, policy: &DisablePolicy) -> bool {
        let mut inner = self.inner.lock();
        inner.complete(latency_secs, self.window_capacity);
        inner.failure_count += 1;

        if inner.enabled && inner.total_requests >= policy.sample_floor {
            let failure_rate = inner.failure_count as f64 / inner.total_requests as f64;
            if failure_rate > policy.failure_rate_threshold {
                inner.enabled = false;
                warn!(
                    failure_rate = format!("{failure_rate:.2}"),
                    total_requests = inner.total_requests,
                    "provider disabled due to high failure rate"
                );
                return true;
            }
        }
        false
    }

    /// Whether the provider is currently admitted for selection
    pub fn is_enabled(&self) -> bool {
        self.inner.lock().enabled
    }

    /// Set the enabled flag, returning the previous value
    ///
    /// Idempotent by design: overlapping recovery probes may both re-enable
    /// the same provider without double-counting anything.
    pub fn set_enabled(&self, enabled: bool) -> bool {
        let mut inner = self.inner.lock();
        std::mem::replace(&mut inner.enabled, enabled)
    }

    /// Copy out the current state
    pub fn snapshot(&self) -> StateSnapshot {
        let inner = self.inner.lock();
        StateSnapshot {
            enabled: inner.enabled,
            total_requests: inner.total_requests,
            success_count: inner.success_count,
            failure_count: inner.failure_count,
            current_in_flight: inner.current_in_flight,
            avg_latency_secs: inner.window_mean(inner.latency_window.len()),
            recent_avg_latency_secs: inner.window_mean(10),
            success_rate: if inner.total_requests == 0 {
                1.0
            } else {
                inner.success_count as f64 / inner.total_requests as f64
            },
            failure_rate: if inner.total_requests == 0 {
                0.0
            } else {
                inner.failure_count as f64 / inner.total_requests as f64
            },
            last_used_at: inner.last_used_at,
            total_tokens: inner.total_tokens,
            total_cost: inner.total_cost,
        }
    }
}

impl StateInner {
    /// Bookkeeping shared by success and failure paths: counter, latency
    /// window, in-flight decrement, last-used stamp
    fn complete(&mut self, latency_secs: f64, window_capacity: usize) {
        self.total_requests += 1;
        self.total_response_time_secs += latency_secs;
        self.latency_window.push_back(latency_secs);
        while self.latency_window.len() > window_capacity {
            self.latency_window.pop_front();
        }
        self.current_in_flight = self.current_in_flight.saturating_sub(1);
        self.last_used_at = unix_timestamp();
    }

    fn window_mean(&self, last_n: usize) -> f64 {
        let len = self.latency_window.len().min(last_n);
        if len == 0 {
            return 0.0;
        }
        let sum: f64 = self
            .latency_window
            .iter()
            .rev()
            .take(len)
            .copied()
            .sum();
        sum / len as f64
    }
}

/// Current Unix timestamp in seconds
fn unix_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
