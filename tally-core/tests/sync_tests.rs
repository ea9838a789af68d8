//! Integration tests for remote balance synchronization
//!
//! Provider latency runs on tokio's paused clock, so these tests take no
//! wall-clock time.
//!
//! Run with: cargo test --test sync_tests -- --nocapture

use std::sync::Arc;
use std::time::Duration;

use rust_decimal::Decimal;
use tempfile::TempDir;

use tally_core::adapters::{RandomBalanceProvider, RandomProviderSettings, ScriptedBalanceProvider};
use tally_core::config::Config;
use tally_core::{Account, Error, TallyContext};

fn dec(value: i64) -> Decimal {
    Decimal::from(value)
}

fn random_provider(failure_rate: f64, latency: Duration) -> Arc<RandomBalanceProvider> {
    let provider = RandomBalanceProvider::new(RandomProviderSettings {
        failure_rate,
        latency,
        seed: Some(2024),
        ..Default::default()
    })
    .expect("valid provider settings");
    Arc::new(provider)
}

// ============================================================================
// fetch_balance
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_fetch_balance_returns_number_when_request_succeeds() {
    let account = Account::open(dec(100), random_provider(0.0, Duration::from_millis(300))).unwrap();

    let start = tokio::time::Instant::now();
    let balance = account.fetch_balance().await;

    assert!(balance.is_some());
    assert!(start.elapsed() >= Duration::from_millis(300));
    // Fetching alone never touches the local balance
    assert_eq!(account.balance(), dec(100));
}

#[tokio::test]
async fn test_fetch_balance_unavailable_is_not_an_error() {
    let account = Account::open(dec(100), random_provider(1.0, Duration::ZERO)).unwrap();
    assert_eq!(account.fetch_balance().await, None);
}

// ============================================================================
// synchronize_balance
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_synchronize_sets_new_balance() {
    let provider = Arc::new(
        ScriptedBalanceProvider::always(Some(dec(37))).with_latency(Duration::from_secs(2)),
    );
    let account = Account::open(dec(100), provider).unwrap();
    let original_balance = account.balance();

    let report = account.synchronize_balance().await.unwrap();

    assert_ne!(account.balance(), original_balance);
    assert_eq!(account.balance(), dec(37));
    assert_eq!(report.previous, dec(100));
    assert_eq!(report.balance, dec(37));
}

#[tokio::test]
async fn test_synchronize_with_random_provider_sets_balance_in_range() {
    let account = Account::open(dec(1_000), random_provider(0.0, Duration::ZERO)).unwrap();

    account.synchronize_balance().await.unwrap();

    assert!(account.balance() >= Decimal::ZERO);
    assert!(account.balance() <= dec(100));
    assert!(account.last_synced_at().is_some());
}

#[tokio::test]
async fn test_synchronize_fails_when_fetch_returns_unavailable_once() {
    let provider = Arc::new(ScriptedBalanceProvider::always(Some(dec(55))));
    provider.push_once(None);
    let account = Account::open(dec(100), provider.clone()).unwrap();

    let result = account.synchronize_balance().await;

    assert!(matches!(result, Err(Error::SynchronizationFailed(_))));
    assert_eq!(account.balance(), dec(100));
    assert!(account.last_synced_at().is_none());

    // No internal retry: exactly one fetch per call
    assert_eq!(provider.calls(), 1);

    // Retrying is up to the caller
    account.synchronize_balance().await.unwrap();
    assert_eq!(account.balance(), dec(55));
    assert_eq!(provider.calls(), 2);
}

/// An operation issued while a sync is pending completes first; the sync
/// then overwrites its effect
#[tokio::test(start_paused = true)]
async fn test_withdraw_interleaves_with_pending_sync() {
    let provider = Arc::new(
        ScriptedBalanceProvider::always(Some(dec(500))).with_latency(Duration::from_millis(100)),
    );
    let account = Account::open(dec(100), provider).unwrap();

    let pending = {
        let account = account.clone();
        tokio::spawn(async move { account.synchronize_balance().await })
    };

    // Let the sync start and park on the provider
    tokio::time::sleep(Duration::from_millis(10)).await;
    assert_eq!(account.balance(), dec(100));

    assert_eq!(account.withdraw(dec(30)).unwrap(), dec(70));
    assert_eq!(account.balance(), dec(70));

    let report = pending.await.unwrap().unwrap();
    assert_eq!(report.previous, dec(70));
    assert_eq!(account.balance(), dec(500));
}

#[tokio::test(start_paused = true)]
async fn test_failed_sync_keeps_interleaved_mutation() {
    let provider = Arc::new(
        ScriptedBalanceProvider::unavailable().with_latency(Duration::from_millis(100)),
    );
    let account = Account::open(dec(100), provider).unwrap();

    let pending = {
        let account = account.clone();
        tokio::spawn(async move { account.synchronize_balance().await })
    };

    tokio::time::sleep(Duration::from_millis(10)).await;
    account.deposit(dec(5)).unwrap();

    assert!(matches!(
        pending.await.unwrap(),
        Err(Error::SynchronizationFailed(_))
    ));
    assert_eq!(account.balance(), dec(105));
}

// ============================================================================
// TallyContext
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_context_builds_provider_from_settings() {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join("settings.json"),
        r#"{"provider": {"failureRate": 0.0, "maxBalance": 10, "seed": 3}}"#,
    )
    .unwrap();

    let config = Config::load_file(dir.path()).unwrap();
    let provider = RandomBalanceProvider::new(config.provider.to_settings()).unwrap();
    let ctx = TallyContext::with_provider(config, Arc::new(provider));

    let account = ctx.open_account(dec(100)).unwrap();
    assert_eq!(account.provider_name(), "random");

    // No latencyMs in the file, so the default round trip applies
    let start = tokio::time::Instant::now();
    account.synchronize_balance().await.unwrap();
    assert!(start.elapsed() >= Duration::from_millis(100));
    assert!(account.balance() <= dec(10));
}

#[test]
fn test_context_accounts_share_provider_but_not_identity() {
    let ctx = TallyContext::with_provider(
        Config::default(),
        Arc::new(ScriptedBalanceProvider::unavailable()),
    );
    let a = ctx.open_account(dec(1)).unwrap();
    let b = ctx.open_account(dec(1)).unwrap();

    assert!(!a.is_same_account(&b));
    assert!(matches!(
        ctx.open_account(dec(-1)),
        Err(Error::InvalidInitialBalance(_))
    ));
}
