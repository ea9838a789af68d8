//! Adapter implementations
//!
//! Adapters implement the port traits:
//! - Random provider simulating an unreliable remote balance source
//! - Scripted provider with deterministic outcomes for tests and forced failures

pub mod random;
pub mod scripted;

pub use random::{RandomBalanceProvider, RandomProviderSettings, DEFAULT_LATENCY};
pub use scripted::ScriptedBalanceProvider;
