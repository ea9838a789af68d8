//! Remote balance provider port
//!
//! Defines the interface for fetching an authoritative balance from an
//! external, unreliable source.

use async_trait::async_trait;
use rust_decimal::Decimal;

/// Source of authoritative remote balances
///
/// `fetch_remote_balance` resolves exactly once per call. `None` means the
/// provider could not produce a value; that is a normal outcome, not an
/// error. Implementations own their latency.
#[async_trait]
pub trait BalanceProvider: Send + Sync {
    /// Provider name (e.g., "random", "scripted")
    fn name(&self) -> &str;

    /// Fetch the remote balance, or `None` if it is unavailable
    async fn fetch_remote_balance(&self) -> Option<Decimal>;
}
