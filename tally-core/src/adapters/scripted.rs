//! Deterministic balance provider for tests and forced outcomes
//!
//! Answers with queued one-shot outcomes first, then with a default.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::ports::BalanceProvider;

/// Balance provider with scripted outcomes
pub struct ScriptedBalanceProvider {
    default: Option<Decimal>,
    queued: Mutex<VecDeque<Option<Decimal>>>,
    latency: Duration,
    calls: AtomicUsize,
}

impl ScriptedBalanceProvider {
    /// Provider that answers `outcome` on every call
    pub fn always(outcome: Option<Decimal>) -> Self {
        Self {
            default: outcome,
            queued: Mutex::new(VecDeque::new()),
            latency: Duration::ZERO,
            calls: AtomicUsize::new(0),
        }
    }

    /// Provider that always reports the balance as unavailable
    pub fn unavailable() -> Self {
        Self::always(None)
    }

    /// Delay every answer by `latency`
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Answer `outcome` once, ahead of the default
    pub fn push_once(&self, outcome: Option<Decimal>) {
        self.queued
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(outcome);
    }

    /// Number of fetches answered so far
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn next_outcome(&self) -> Option<Decimal> {
        self.queued
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front()
            .unwrap_or(self.default)
    }
}

#[async_trait]
impl BalanceProvider for ScriptedBalanceProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn fetch_remote_balance(&self) -> Option<Decimal> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let outcome = self.next_outcome();
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        outcome
    }
}
