//! Account domain model
//!
//! An `Account` is a shared handle: cloning it yields another handle to the
//! same account, and `is_same_account` compares handles, not balances.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::amount::{validate_amount, validate_initial_balance};
use super::result::{Error, Result};
use crate::ports::BalanceProvider;

/// Mutable part of an account, guarded by one lock
#[derive(Debug)]
struct AccountState {
    balance: Decimal,
    last_synced_at: Option<DateTime<Utc>>,
}

struct AccountInner {
    id: Uuid,
    created_at: DateTime<Utc>,
    state: Mutex<AccountState>,
    provider: Arc<dyn BalanceProvider>,
}

/// A single account holding a non-negative balance
#[derive(Clone)]
pub struct Account {
    inner: Arc<AccountInner>,
}

/// Outcome of a successful balance synchronization
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncReport {
    /// Balance right before the remote value was applied
    pub previous: Decimal,
    /// Balance taken from the provider
    pub balance: Decimal,
    pub synced_at: DateTime<Utc>,
}

impl Account {
    /// Open an account with an initial balance
    pub fn open(initial_balance: Decimal, provider: Arc<dyn BalanceProvider>) -> Result<Self> {
        let balance = validate_initial_balance(initial_balance)?;
        Ok(Self {
            inner: Arc::new(AccountInner {
                id: Uuid::new_v4(),
                created_at: Utc::now(),
                state: Mutex::new(AccountState {
                    balance,
                    last_synced_at: None,
                }),
                provider,
            }),
        })
    }

    pub fn id(&self) -> Uuid {
        self.inner.id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.inner.created_at
    }

    /// Name of the provider used for synchronization
    pub fn provider_name(&self) -> &str {
        self.inner.provider.name()
    }

    /// Current balance
    pub fn balance(&self) -> Decimal {
        self.lock_state().balance
    }

    /// When the balance was last overwritten from the provider
    pub fn last_synced_at(&self) -> Option<DateTime<Utc>> {
        self.lock_state().last_synced_at
    }

    /// True if both handles refer to the same account
    pub fn is_same_account(&self, other: &Account) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Add `amount` to the balance, returning the new balance
    pub fn deposit(&self, amount: Decimal) -> Result<Decimal> {
        let amount = validate_amount(amount)?;
        let mut state = self.lock_state();
        state.balance = credit(state.balance, amount)?;
        Ok(state.balance)
    }

    /// Take `amount` from the balance, returning the new balance
    pub fn withdraw(&self, amount: Decimal) -> Result<Decimal> {
        let amount = validate_amount(amount)?;
        let mut state = self.lock_state();
        debit(&mut state, amount)?;
        Ok(state.balance)
    }

    /// Move `amount` from this account to `target`
    ///
    /// Checks run in order: same account, amount, credit overflow, funds.
    /// Both balances are locked for the whole operation, so the debit and the
    /// credit are observed together or not at all.
    pub fn transfer(&self, amount: Decimal, target: &Account) -> Result<()> {
        if self.is_same_account(target) {
            return Err(Error::TransferFailed(
                "cannot transfer to the same account".to_string(),
            ));
        }
        let amount = validate_amount(amount)?;

        let (mut source, mut destination) = self.lock_pair(target);
        // Fail on credit overflow before anything is debited
        let credited = credit(destination.balance, amount)?;
        debit(&mut source, amount)?;
        destination.balance = credited;
        Ok(())
    }

    /// Ask the provider for the remote balance
    ///
    /// `None` is a regular outcome meaning the provider had no value.
    pub async fn fetch_balance(&self) -> Option<Decimal> {
        self.inner.provider.fetch_remote_balance().await
    }

    /// Overwrite the balance with the provider's value
    ///
    /// Single attempt, no retry. The lock is not held while the provider is
    /// pending, so operations issued in the meantime land first and are then
    /// overwritten.
    pub async fn synchronize_balance(&self) -> Result<SyncReport> {
        let remote = self
            .fetch_balance()
            .await
            .ok_or_else(|| Error::sync_failed("remote balance unavailable"))?;

        if remote < Decimal::ZERO {
            return Err(Error::sync_failed(format!(
                "provider returned a negative balance ({})",
                remote
            )));
        }

        let synced_at = Utc::now();
        let mut state = self.lock_state();
        let previous = std::mem::replace(&mut state.balance, remote);
        state.last_synced_at = Some(synced_at);

        Ok(SyncReport {
            previous,
            balance: remote,
            synced_at,
        })
    }

    fn lock_state(&self) -> MutexGuard<'_, AccountState> {
        self.inner
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Lock `self` and `other` in address order, returned as (self, other)
    fn lock_pair<'a>(
        &'a self,
        other: &'a Account,
    ) -> (MutexGuard<'a, AccountState>, MutexGuard<'a, AccountState>) {
        if Arc::as_ptr(&self.inner) < Arc::as_ptr(&other.inner) {
            let mine = self.lock_state();
            let theirs = other.lock_state();
            (mine, theirs)
        } else {
            let theirs = other.lock_state();
            let mine = self.lock_state();
            (mine, theirs)
        }
    }
}

fn credit(balance: Decimal, amount: Decimal) -> Result<Decimal> {
    balance.checked_add(amount).ok_or(Error::BalanceOverflow)
}

fn debit(state: &mut AccountState, amount: Decimal) -> Result<()> {
    if amount > state.balance {
        return Err(Error::InsufficientFunds {
            balance: state.balance,
            requested: amount,
        });
    }
    state.balance -= amount;
    Ok(())
}

impl fmt::Debug for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Account")
            .field("id", &self.inner.id)
            .field("balance", &self.balance())
            .field("provider", &self.inner.provider.name())
            .finish()
    }
}
