//! Request routing with retry, failure accounting and recovery hand-off
//!
//! The router orchestrates one `SELECTING -> DISPATCHING -> {SUCCEEDED,
//! FAILED}` cycle per attempt. On failure it re-selects with a freshly
//! computed candidate list (failure accounting shifts the ordering away
//! from the provider that just failed) up to the retry budget. The router
//! itself holds no provider-specific state; all side effects land in the
//! registry's provider states and the recovery queue.

use crate::adapter::ExecutionAdapter;
use crate::config::RouterConfig;
use crate::error::{AdapterError, Result, RouterError};
use crate::provider::{ProviderEntry, ProviderRegistry, ProviderState};
use crate::recovery::RecoveryHandle;
use crate::stats::{ProviderStats, RouterStats};
use crate::strategy::StrategyEngine;
use crate::types::{Request, Response};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Per-call routing options
#[derive(Debug, Clone, Default)]
pub struct RouteOptions {
    /// Override for the configured retry budget
    pub max_retries: Option<u32>,
    /// Overall deadline for the call, including all retries
    pub deadline: Option<Duration>,
}

/// The routing engine
///
/// Explicitly constructed with an injected registry, execution adapter and
/// recovery handle; there is no process-wide instance.
pub struct Router {
    config: RouterConfig,
    registry: Arc<ProviderRegistry>,
    strategy: StrategyEngine,
    adapter: Arc<dyn ExecutionAdapter>,
    recovery: RecoveryHandle,
}

impl Router {
    /// Create a router, validating the configuration
    pub fn new(
        config: RouterConfig,
        registry: Arc<ProviderRegistry>,
        adapter: Arc<dyn ExecutionAdapter>,
        recovery: RecoveryHandle,
    ) -> Result<Self> {
        config.validate()?;
        let strategy = match config.strategy_seed {
            Some(seed) => StrategyEngine::with_seed(config.strategy, seed),
            None => StrategyEngine::new(config.strategy),
        };
        Ok(Self {
            config,
            registry,
            strategy,
            adapter,
            recovery,
        })
    }

    /// The injected registry
    pub fn registry(&self) -> &Arc<ProviderRegistry> {
        &self.registry
    }

    /// Route a request using the configured retry budget and no deadline
    pub async fn route(&self, request: &Request) -> Result<Response> {
        self.route_with_options(request, RouteOptions::default())
            .await
    }

    /// Route a request with explicit per-call options
    ///
    /// # Protocol
    ///
    /// For each attempt up to the retry budget: compute a fresh candidate
    /// ordering, dispatch to the top candidate inside the in-flight
    /// bracket, and record the outcome. An empty candidate list aborts
    /// immediately with [`RouterError::NoProviderAvailable`] since the set
    /// of healthy capable providers will not change within the call. A
    /// success returns immediately. An exhausted budget returns
    /// [`RouterError::AllProvidersFailed`] with the last underlying error.
    pub async fn route_with_options(
        &self,
        request: &Request,
        options: RouteOptions,
    ) -> Result<Response> {
        let max_retries = options.max_retries.unwrap_or(self.config.max_retries);
        if max_retries == 0 {
            return Err(RouterError::InvalidConfiguration(
                "retry budget must be at least 1".to_string(),
            ));
        }

        let deadline = options.deadline.map(|d| Instant::now() + d);
        let attempt_timeout = Duration::from_secs(self.config.request_timeout_secs);
        let mut last_error = AdapterError::Other("no dispatch attempted".to_string());

        for attempt in 1..=max_retries {
            let candidates = self.strategy.candidates(&self.registry, request);
            let Some(entry) = candidates.first() else {
                debug!(attempt, "no eligible provider, aborting");
                return Err(RouterError::NoProviderAvailable);
            };

            // A spent deadline before dispatch cancels without touching the
            // adapter or the provider's statistics.
            let remaining = deadline.map(|d| d.saturating_duration_since(Instant::now()));
            if remaining.is_some_and(|r| r.is_zero()) {
                return Err(RouterError::Cancelled);
            }
            let (budget, deadline_bound) = match remaining {
                Some(r) if r < attempt_timeout => (r, true),
                _ => (attempt_timeout, false),
            };

            match self.dispatch(entry, request, budget).await {
                DispatchOutcome::Success(response) => return Ok(response),
                DispatchOutcome::Failure { error, disabled } => {
                    self.handle_failure(entry, attempt, &error, disabled);
                    last_error = error;
                }
                DispatchOutcome::TimedOut { disabled } => {
                    // The adapter call was in flight, so the attempt counts
                    // against the provider either way.
                    self.handle_failure(entry, attempt, &AdapterError::Timeout, disabled);
                    if deadline_bound {
                        return Err(RouterError::Cancelled);
                    }
                    last_error = AdapterError::Timeout;
                }
            }
        }

        Err(RouterError::AllProvidersFailed {
            attempts: max_retries,
            source: last_error,
        })
    }

    /// One timed dispatch inside the in-flight bracket
    async fn dispatch(
        &self,
        entry: &Arc<ProviderEntry>,
        request: &Request,
        budget: Duration,
    ) -> DispatchOutcome {
        let provider_id = entry.id();
        entry.state().begin_dispatch();
        let mut guard = InFlightGuard {
            state: entry.state(),
            armed: true,
        };
        let start = Instant::now();

        let result =
            tokio::time::timeout(budget, self.adapter.execute(provider_id, request)).await;
        // From here on record_success/record_failure release the counter
        guard.disarm();
        let latency_secs = start.elapsed().as_secs_f64();

        match result {
            Ok(Ok(output)) => {
                let cost = output.tokens_used as f64 * entry.descriptor().cost_per_token;
                entry
                    .state()
                    .record_success(latency_secs, output.tokens_used, cost);
                debug!(
                    provider = %provider_id,
                    latency_secs = format!("{latency_secs:.3}"),
                    tokens = output.tokens_used,
                    "dispatch succeeded"
                );
                DispatchOutcome::Success(Response {
                    content: output.content,
                    provider_id: provider_id.to_string(),
                    tokens_used: output.tokens_used,
                    cost,
                    latency_secs,
                    metadata: output.metadata,
                })
            }
            Ok(Err(error)) => {
                let disabled = entry
                    .state()
                    .record_failure(latency_secs, &self.config.disable_policy());
                DispatchOutcome::Failure { error, disabled }
            }
            Err(_elapsed) => {
                let disabled = entry
                    .state()
                    .record_failure(latency_secs, &self.config.disable_policy());
                DispatchOutcome::TimedOut { disabled }
            }
        }
    }

    fn handle_failure(
        &self,
        entry: &Arc<ProviderEntry>,
        attempt: u32,
        error: &AdapterError,
        disabled: bool,
    ) {
        warn!(
            provider = %entry.id(),
            attempt,
            error = %error,
            "dispatch failed"
        );
        if disabled {
            self.recovery.schedule(entry.id(), attempt);
        }
    }

    /// Snapshot of per-provider and aggregate usage statistics
    pub fn stats(&self) -> RouterStats {
        let providers: Vec<ProviderStats> = self
            .registry
            .entries()
            .iter()
            .map(|entry| ProviderStats::collect(entry.descriptor(), &entry.state().snapshot()))
            .collect();
        RouterStats::aggregate(self.config.strategy, providers)
    }
}

enum DispatchOutcome {
    Success(Response),
    Failure { error: AdapterError, disabled: bool },
    TimedOut { disabled: bool },
}

/// Releases the in-flight counter if the dispatch future is dropped before
/// an outcome is recorded, e.g. the caller aborts the routing task
struct InFlightGuard<'a> {
    state: &'a ProviderState,
    armed: bool,
}

impl InFlightGuard<'_> {
    fn disarm(&mut self) {
        self.armed = false;
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            self.state.abort_dispatch();
        }
    }
}
