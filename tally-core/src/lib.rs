//! Tally Core - account model with guarded balances and remote sync
//!
//! This crate follows a hexagonal layout:
//!
//! - **domain**: the `Account` entity, amount validation, error taxonomy
//! - **ports**: the `BalanceProvider` trait for the remote balance source
//! - **adapters**: random (simulated) and scripted providers
//! - **services**: structured event logging
//! - **config**: settings.json with environment overrides

pub mod adapters;
pub mod config;
pub mod domain;
pub mod log_migrations;
pub mod ports;
pub mod services;

use std::path::Path;
use std::sync::Arc;

use rust_decimal::Decimal;

use adapters::RandomBalanceProvider;
use config::Config;

// Re-export commonly used types at crate root
pub use domain::result::{Error, OperationResult, Result};
pub use domain::{Account, SyncReport};
pub use ports::BalanceProvider;
pub use services::{EntryPoint, LogEntry, LogEvent, LoggingService};

/// Main context for Tally operations
///
/// Holds the configuration and the balance provider shared by every
/// account opened through it.
pub struct TallyContext {
    pub config: Config,
    provider: Arc<dyn BalanceProvider>,
}

impl TallyContext {
    /// Load config from `tally_dir` and build the simulated provider from it
    pub fn new(tally_dir: &Path) -> anyhow::Result<Self> {
        let config = Config::load(tally_dir)?;
        let provider = RandomBalanceProvider::new(config.provider.to_settings())?;
        Ok(Self::with_provider(config, Arc::new(provider)))
    }

    /// Context with an explicit provider
    pub fn with_provider(config: Config, provider: Arc<dyn BalanceProvider>) -> Self {
        Self { config, provider }
    }

    pub fn provider(&self) -> &Arc<dyn BalanceProvider> {
        &self.provider
    }

    /// Open an account wired to this context's provider
    pub fn open_account(&self, initial_balance: Decimal) -> Result<Account> {
        Account::open(initial_balance, Arc::clone(&self.provider))
    }
}
