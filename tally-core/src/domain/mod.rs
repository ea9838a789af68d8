//! Core domain entities
//!
//! Pure account logic with validation. The only outside dependency is the
//! `BalanceProvider` port used for synchronization.

mod account;
pub mod amount;
pub mod result;

pub use account::{Account, SyncReport};
pub use amount::{amount_from_f64, parse_amount, parse_initial_balance, validate_amount};
