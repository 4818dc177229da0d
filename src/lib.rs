//! # llm-router
//!
//! Routing and resilience engine for interchangeable LLM backend providers.
//! The crate picks a provider per request with a pluggable selection
//! strategy, retries on failure, adaptively disables providers with
//! sustained failure rates and re-admits them after delayed health checks.
//!
//! Model inference, tokenization and provider wire protocols are out of
//! scope: executing a request against a provider is an opaque capability
//! supplied through the [`adapter::ExecutionAdapter`] trait, and liveness
//! checks go through [`adapter::HealthProbe`].
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use llm_router::{
//!     user_message, ProviderDescriptor, ProviderRegistry, ProviderTier,
//!     RecoverySupervisor, Request, Router, RouterConfig,
//! };
//! use std::sync::Arc;
//!
//! # async fn run(
//! #     adapter: Arc<dyn llm_router::ExecutionAdapter>,
//! #     probe: Arc<dyn llm_router::HealthProbe>,
//! # ) -> Result<(), Box<dyn std::error::Error>> {
//! let registry = Arc::new(ProviderRegistry::new());
//! registry.register(
//!     ProviderDescriptor::new("ollama-local", ProviderTier::Free).with_priority(1),
//! )?;
//!
//! let config = RouterConfig::default();
//! let supervisor = RecoverySupervisor::spawn(registry.clone(), probe, config.backoff_cap_secs);
//! let router = Router::new(config, registry, adapter, supervisor.handle())?;
//!
//! let response = router
//!     .route(&Request::new(vec![user_message("Hello, how are you?")]))
//!     .await?;
//! println!("{} answered: {}", response.provider_id, response.content);
//! # Ok(())
//! # }
//! ```

pub mod adapter;
pub mod config;
pub mod error;
pub mod provider;
pub mod recovery;
pub mod router;
pub mod stats;
pub mod strategy;
pub mod types;

#[cfg(test)]
mod tests;

pub use adapter::{ExecutionAdapter, HealthProbe, ProviderOutput};
pub use config::{DisablePolicy, RouterConfig, RoutingStrategy};
pub use error::{AdapterError, Result, RouterError};
pub use provider::{
    Capability, ProviderDescriptor, ProviderEntry, ProviderRegistry, ProviderState, ProviderTier,
    StateSnapshot,
};
pub use recovery::{recovery_delay, RecoveryHandle, RecoverySupervisor};
pub use router::{RouteOptions, Router};
pub use stats::{ProviderStats, RouterStats};
pub use strategy::StrategyEngine;
pub use types::{system_message, user_message, Message, Request, Response, Role};
