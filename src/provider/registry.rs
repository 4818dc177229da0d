//! Provider registry
//!
//! Descriptor plus state pairs keyed by provider id. The descriptor set is
//! read-mostly after startup; the per-provider state is the hot shared
//! structure and carries its own locking.

use super::descriptor::ProviderDescriptor;
use super::state::ProviderState;
use crate::error::{Result, RouterError};
use dashmap::DashMap;
use std::sync::Arc;
use tracing::{debug, info};

/// A registered provider: immutable descriptor plus live state
#[derive(Debug)]
pub struct ProviderEntry {
    descriptor: ProviderDescriptor,
    state: ProviderState,
}

impl ProviderEntry {
    /// The static configuration
    pub fn descriptor(&self) -> &ProviderDescriptor {
        &self.descriptor
    }

    /// The live health/usage state
    pub fn state(&self) -> &ProviderState {
        &self.state
    }

    /// Provider id shorthand
    pub fn id(&self) -> &str {
        &self.descriptor.id
    }
}

/// Registry of all known providers
#[derive(Debug)]
pub struct ProviderRegistry {
    entries: DashMap<String, Arc<ProviderEntry>>,
    latency_window: usize,
}

impl ProviderRegistry {
    /// Create an empty registry with the default latency window (100)
    pub fn new() -> Self {
        Self::with_latency_window(100)
    }

    /// Create an empty registry with a custom latency window capacity
    pub fn with_latency_window(latency_window: usize) -> Self {
        Self {
            entries: DashMap::new(),
            latency_window,
        }
    }

    /// Register a provider, replacing any existing entry with the same id
    ///
    /// Replacement resets the provider's state. Fails with
    /// [`RouterError::Configuration`] on an empty id or negative cost.
    pub fn register(&self, descriptor: ProviderDescriptor) -> Result<()> {
        if descriptor.id.is_empty() {
            return Err(RouterError::Configuration(
                "provider id must not be empty".to_string(),
            ));
        }
        if descriptor.cost_per_token < 0.0 {
            return Err(RouterError::Configuration(format!(
                "provider {} has negative cost_per_token",
                descriptor.id
            )));
        }

        let id = descriptor.id.clone();
        let entry = Arc::new(ProviderEntry {
            descriptor,
            state: ProviderState::new(self.latency_window),
        });
        let replaced = self.entries.insert(id.clone(), entry).is_some();
        info!(provider = %id, replaced, "registered provider");
        Ok(())
    }

    /// Remove a provider and its state
    pub fn remove(&self, id: &str) -> Option<ProviderDescriptor> {
        let removed = self.entries.remove(id).map(|(_, e)| e.descriptor.clone());
        if removed.is_some() {
            info!(provider = %id, "removed provider");
        }
        removed
    }

    /// Get a provider entry by id
    pub fn get(&self, id: &str) -> Option<Arc<ProviderEntry>> {
        self.entries.get(id).map(|e| e.value().clone())
    }

    /// All registered descriptors
    pub fn list(&self) -> Vec<ProviderDescriptor> {
        self.entries
            .iter()
            .map(|e| e.value().descriptor.clone())
            .collect()
    }

    /// All registered entries
    pub fn entries(&self) -> Vec<Arc<ProviderEntry>> {
        self.entries.iter().map(|e| e.value().clone()).collect()
    }

    /// Flip a provider's enabled flag; returns false for unknown ids
    pub fn set_enabled(&self, id: &str, enabled: bool) -> bool {
        match self.entries.get(id) {
            Some(entry) => {
                let was = entry.state().set_enabled(enabled);
                if was != enabled {
                    debug!(provider = %id, enabled, "provider availability changed");
                }
                true
            }
            None => false,
        }
    }

    /// Number of registered providers
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if no providers are registered
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for ProviderRegistry {
    fn default() -> Self {
        Self::new()
    }
}
