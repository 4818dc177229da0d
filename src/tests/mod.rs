//! Test support: scripted adapters, probes and registry builders

mod strategy_tests;

use crate::adapter::{ExecutionAdapter, HealthProbe, ProviderOutput};
use crate::error::AdapterError;
use crate::provider::{ProviderDescriptor, ProviderTier};
use crate::types::{user_message, Request};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Once;
use std::time::Duration;

static TRACING: Once = Once::new();

/// Route tracing output through the test harness, honoring RUST_LOG
pub(crate) fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// A free-tier descriptor with defaults suitable for most tests
pub(crate) fn descriptor(id: &str) -> ProviderDescriptor {
    ProviderDescriptor::new(id, ProviderTier::Free)
}

/// A plain single-message request
pub(crate) fn request() -> Request {
    Request::new(vec![user_message("hello there")])
}

/// Scripted execution adapter
///
/// Fails for provider ids in `failing` (or all of them with `fail_all`),
/// optionally sleeping before answering. Counts every call.
pub(crate) struct FakeAdapter {
    pub calls: AtomicU32,
    pub failing: Mutex<HashSet<String>>,
    pub fail_all: AtomicBool,
    pub delay: Option<Duration>,
    pub tokens: u64,
}

impl FakeAdapter {
    pub fn succeeding() -> Self {
        Self {
            calls: AtomicU32::new(0),
            failing: Mutex::new(HashSet::new()),
            fail_all: AtomicBool::new(false),
            delay: None,
            tokens: 100,
        }
    }

    pub fn failing_all() -> Self {
        let adapter = Self::succeeding();
        adapter.fail_all.store(true, Ordering::SeqCst);
        adapter
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn fail_provider(&self, id: &str) {
        self.failing.lock().insert(id.to_string());
    }

    pub fn call_count(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ExecutionAdapter for FakeAdapter {
    async fn execute(
        &self,
        provider_id: &str,
        _request: &Request,
    ) -> Result<ProviderOutput, AdapterError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail_all.load(Ordering::SeqCst) || self.failing.lock().contains(provider_id) {
            return Err(AdapterError::Network("connection refused".to_string()));
        }
        Ok(ProviderOutput {
            content: format!("ok from {provider_id}"),
            tokens_used: self.tokens,
            metadata: HashMap::new(),
        })
    }
}

/// Scripted health probe with a switchable verdict
pub(crate) struct FakeProbe {
    pub healthy: AtomicBool,
    pub calls: AtomicU32,
}

impl FakeProbe {
    pub fn healthy() -> Self {
        Self {
            healthy: AtomicBool::new(true),
            calls: AtomicU32::new(0),
        }
    }

    pub fn unhealthy() -> Self {
        let probe = Self::healthy();
        probe.healthy.store(false, Ordering::SeqCst);
        probe
    }

    pub fn call_count(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl HealthProbe for FakeProbe {
    async fn probe(&self, _provider_id: &str) -> bool {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.healthy.load(Ordering::SeqCst)
    }
}

/// Poll a condition under the (usually paused) test clock
pub(crate) async fn wait_until(mut condition: impl FnMut() -> bool) {
    for _ in 0..1000 {
        if condition() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(100)).await;
    }
    panic!("condition not met within polling budget");
}
