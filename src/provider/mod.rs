//! Provider registry and per-provider state
//!
//! - `descriptor` - static configuration and capability flags
//! - `state` - live mutable health/usage state
//! - `registry` - the descriptor + state store keyed by id

pub mod descriptor;
pub mod registry;
pub mod state;

pub use descriptor::{Capability, ProviderDescriptor, ProviderTier};
pub use registry::{ProviderEntry, ProviderRegistry};
pub use state::{ProviderState, StateSnapshot};
