//! Simulated remote balance source
//!
//! Stands in for an unreliable network call: every fetch draws a whole
//! balance in `0..=max_balance` and fails with probability `failure_rate`.

use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rust_decimal::Decimal;

use crate::domain::result::{Error, Result};
use crate::ports::BalanceProvider;

/// Settings for the random provider
#[derive(Debug, Clone, PartialEq)]
pub struct RandomProviderSettings {
    /// Largest balance the provider reports
    pub max_balance: u64,
    /// Probability in [0, 1] that a fetch reports "unavailable"
    pub failure_rate: f64,
    /// Simulated network latency per fetch
    pub latency: Duration,
    /// Fixed seed for reproducible runs
    pub seed: Option<u64>,
}

/// Round trip of the simulated remote when none is configured
pub const DEFAULT_LATENCY: Duration = Duration::from_millis(100);

impl Default for RandomProviderSettings {
    fn default() -> Self {
        Self {
            max_balance: 100,
            failure_rate: 0.5,
            latency: DEFAULT_LATENCY,
            seed: None,
        }
    }
}

/// Balance provider backed by a pseudo-random generator
pub struct RandomBalanceProvider {
    settings: RandomProviderSettings,
    rng: Mutex<StdRng>,
}

impl RandomBalanceProvider {
    pub fn new(settings: RandomProviderSettings) -> Result<Self> {
        if !(0.0..=1.0).contains(&settings.failure_rate) {
            return Err(Error::Config(format!(
                "failure rate must be between 0 and 1, got {}",
                settings.failure_rate
            )));
        }

        let rng = match settings.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Ok(Self {
            settings,
            rng: Mutex::new(rng),
        })
    }

    pub fn settings(&self) -> &RandomProviderSettings {
        &self.settings
    }

    /// Roll the outcome of one fetch
    fn draw(&self) -> Option<Decimal> {
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        let balance = rng.gen_range(0..=self.settings.max_balance);
        if rng.gen_bool(self.settings.failure_rate) {
            None
        } else {
            Some(Decimal::from(balance))
        }
    }
}

#[async_trait]
impl BalanceProvider for RandomBalanceProvider {
    fn name(&self) -> &str {
        "random"
    }

    async fn fetch_remote_balance(&self) -> Option<Decimal> {
        let outcome = self.draw();
        if !self.settings.latency.is_zero() {
            tokio::time::sleep(self.settings.latency).await;
        }
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider(failure_rate: f64, seed: u64) -> RandomBalanceProvider {
        RandomBalanceProvider::new(RandomProviderSettings {
            failure_rate,
            seed: Some(seed),
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn test_rejects_out_of_range_failure_rate() {
        for rate in [-0.1, 1.5, f64::NAN] {
            let result = RandomBalanceProvider::new(RandomProviderSettings {
                failure_rate: rate,
                ..Default::default()
            });
            assert!(matches!(result, Err(Error::Config(_))));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_never_fails_at_zero_rate() {
        let provider = provider(0.0, 7);
        for _ in 0..50 {
            let balance = provider.fetch_remote_balance().await.unwrap();
            assert!(balance >= Decimal::ZERO);
            assert!(balance <= Decimal::from(100));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_always_fails_at_full_rate() {
        let provider = provider(1.0, 7);
        for _ in 0..20 {
            assert!(provider.fetch_remote_balance().await.is_none());
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_same_seed_same_sequence() {
        let a = provider(0.5, 42);
        let b = provider(0.5, 42);
        for _ in 0..20 {
            assert_eq!(
                a.fetch_remote_balance().await,
                b.fetch_remote_balance().await
            );
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_latency_uses_tokio_clock() {
        let provider = RandomBalanceProvider::new(RandomProviderSettings {
            failure_rate: 0.0,
            latency: Duration::from_secs(5),
            seed: Some(1),
            ..Default::default()
        })
        .unwrap();

        let start = tokio::time::Instant::now();
        assert!(provider.fetch_remote_balance().await.is_some());
        assert!(start.elapsed() >= Duration::from_secs(5));
    }

    #[tokio::test(start_paused = true)]
    async fn test_default_latency_is_not_zero() {
        let provider = provider(0.0, 11);
        assert_eq!(provider.settings().latency, DEFAULT_LATENCY);
        assert!(!DEFAULT_LATENCY.is_zero());

        let start = tokio::time::Instant::now();
        assert!(provider.fetch_remote_balance().await.is_some());
        assert!(start.elapsed() >= DEFAULT_LATENCY);
    }
}
