//! Delayed recovery for auto-disabled providers
//!
//! The supervisor receives disable events over a queue and, for each one,
//! waits an exponential backoff delay before probing the provider. A
//! passing probe re-admits the provider; a failing probe leaves it disabled
//! and does NOT rearm the schedule, so a provider that never recovers does
//! not accumulate background retry storms. Only a fresh disable event (from
//! a future failed dispatch) schedules another check.

use crate::adapter::HealthProbe;
use crate::provider::ProviderRegistry;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::{JoinHandle, JoinSet};
use tracing::{debug, info, warn};

/// Backoff delay before the recovery probe for a given disable attempt
///
/// `min(cap, 2^attempt)` seconds.
pub fn recovery_delay(attempt: u32, cap_secs: u64) -> Duration {
    Duration::from_secs(2u64.saturating_pow(attempt).min(cap_secs))
}

#[derive(Debug)]
struct RecoveryRequest {
    provider_id: String,
    attempt: u32,
}

/// Clonable handle for scheduling recovery checks
#[derive(Debug, Clone)]
pub struct RecoveryHandle {
    tx: mpsc::UnboundedSender<RecoveryRequest>,
}

impl RecoveryHandle {
    /// Schedule a delayed health re-check for a disabled provider
    ///
    /// Never blocks. If the supervisor has shut down the request is dropped;
    /// the provider simply stays disabled until reset manually.
    pub fn schedule(&self, provider_id: &str, attempt: u32) {
        let request = RecoveryRequest {
            provider_id: provider_id.to_string(),
            attempt,
        };
        if self.tx.send(request).is_err() {
            warn!(provider = %provider_id, "recovery supervisor is down, dropping schedule");
        }
    }
}

/// Background supervisor that re-admits disabled providers
///
/// Overlapping schedules for the same provider run concurrently; re-enabling
/// is an idempotent flag write, so duplicates are harmless.
#[derive(Debug)]
pub struct RecoverySupervisor {
    handle: RecoveryHandle,
    stop: watch::Sender<bool>,
    worker: JoinHandle<()>,
}

impl RecoverySupervisor {
    /// Spawn the supervisor worker
    pub fn spawn(
        registry: Arc<ProviderRegistry>,
        probe: Arc<dyn HealthProbe>,
        backoff_cap_secs: u64,
    ) -> Self {
        let (tx, mut rx) = mpsc::unbounded_channel::<RecoveryRequest>();
        let (stop, mut stopped) = watch::channel(false);

        let worker = tokio::spawn(async move {
            let mut checks = JoinSet::new();
            loop {
                tokio::select! {
                    _ = stopped.changed() => break,
                    request = rx.recv() => match request {
                        Some(request) => {
                            let registry = registry.clone();
                            let probe = probe.clone();
                            checks.spawn(run_check(registry, probe, request, backoff_cap_secs));
                        }
                        // All handles dropped: stop taking work and cancel
                        // pending checks so the worker winds down.
                        None => break,
                    },
                    Some(_) = checks.join_next(), if !checks.is_empty() => {}
                }
            }
            checks.abort_all();
            while checks.join_next().await.is_some() {}
        });

        Self {
            handle: RecoveryHandle { tx },
            stop,
            worker,
        }
    }

    /// A handle for scheduling recovery checks
    pub fn handle(&self) -> RecoveryHandle {
        self.handle.clone()
    }

    /// Stop the supervisor, cancel pending checks, and wait for the worker
    ///
    /// Handles that outlive the supervisor keep working, but their schedule
    /// calls become no-ops.
    pub async fn shutdown(self) {
        let _ = self.stop.send(true);
        drop(self.handle);
        let _ = self.worker.await;
    }
}

/// One delay-then-probe cycle; holds no lock across the delay
async fn run_check(
    registry: Arc<ProviderRegistry>,
    probe: Arc<dyn HealthProbe>,
    request: RecoveryRequest,
    backoff_cap_secs: u64,
) {
    let delay = recovery_delay(request.attempt, backoff_cap_secs);
    debug!(
        provider = %request.provider_id,
        delay_secs = delay.as_secs(),
        "recovery check scheduled"
    );
    tokio::time::sleep(delay).await;

    if probe.probe(&request.provider_id).await {
        if registry.set_enabled(&request.provider_id, true) {
            info!(provider = %request.provider_id, "provider re-enabled after recovery probe");
        }
    } else {
        debug!(
            provider = %request.provider_id,
            "recovery probe failed, provider stays disabled"
        );
    }
}
