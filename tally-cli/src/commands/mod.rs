//! CLI command implementations

pub mod account;
pub mod config;
pub mod logs;
pub mod sync;
pub mod transfer;

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use tally_core::{Account, EntryPoint, LogEvent, LoggingService, OperationResult, TallyContext};
use uuid::Uuid;

use crate::output::AlreadyReported;

/// Get the logging service for CLI operations
///
/// Returns None if logging fails to initialize (shouldn't block operations)
pub fn get_logger() -> Option<LoggingService> {
    let tally_dir = get_tally_dir().ok()?;
    std::fs::create_dir_all(&tally_dir).ok()?;
    LoggingService::new(&tally_dir, EntryPoint::Cli, env!("CARGO_PKG_VERSION")).ok()
}

/// Log an event, ignoring any errors (logging should never break the app)
pub fn log_event(logger: &Option<LoggingService>, event: LogEvent) {
    if let Some(l) = logger {
        let _ = l.log(event);
    }
}

/// Get the tally directory from environment or default
pub fn get_tally_dir() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var("TALLY_DIR") {
        return Ok(PathBuf::from(dir));
    }
    dirs::home_dir()
        .map(|home| home.join(".tally"))
        .context("Could not find home directory; set TALLY_DIR")
}

/// Get or create tally context
pub fn get_context() -> Result<TallyContext> {
    let tally_dir = get_tally_dir()?;

    std::fs::create_dir_all(&tally_dir)
        .with_context(|| format!("Failed to create tally directory: {:?}", tally_dir))?;

    TallyContext::new(&tally_dir).context("Failed to initialize tally context")
}

/// Account snapshot for output
#[derive(Debug, Serialize)]
pub struct AccountView {
    pub id: Uuid,
    pub balance: Decimal,
    pub created_at: DateTime<Utc>,
    pub last_synced_at: Option<DateTime<Utc>>,
}

impl From<&Account> for AccountView {
    fn from(account: &Account) -> Self {
        Self {
            id: account.id(),
            balance: account.balance(),
            created_at: account.created_at(),
            last_synced_at: account.last_synced_at(),
        }
    }
}

/// Log the outcome of a core operation and print it
///
/// `account_id` is the account the command acted on, if one was opened.
/// In JSON mode the `OperationResult` envelope is printed for both outcomes;
/// otherwise `render` prints the success and the error goes back to `main`.
pub fn finish<T: Serialize>(
    logger: &Option<LoggingService>,
    command: &str,
    account_id: Option<Uuid>,
    result: tally_core::Result<T>,
    json: bool,
    render: impl FnOnce(&T),
) -> Result<()> {
    log_event(logger, outcome_event(command, account_id, &result));

    if json {
        let envelope = OperationResult::from(result);
        println!("{}", serde_json::to_string_pretty(&envelope)?);
        return if envelope.success {
            Ok(())
        } else {
            Err(AlreadyReported.into())
        };
    }

    let data = result?;
    render(&data);
    Ok(())
}

fn outcome_event<T>(
    command: &str,
    account_id: Option<Uuid>,
    result: &tally_core::Result<T>,
) -> LogEvent {
    let mut event = match result {
        Ok(_) => LogEvent::new(format!("{}_completed", command)).with_command(command),
        Err(e) => LogEvent::new(format!("{}_failed", command))
            .with_command(command)
            .with_error(e),
    };
    if let Some(id) = account_id {
        event = event.with_account(id);
    }
    event
}

#[cfg(test)]
mod tests {
    use super::*;
    use tally_core::Error;
    use tempfile::tempdir;

    fn logger(dir: &std::path::Path) -> Option<LoggingService> {
        Some(LoggingService::new(dir, EntryPoint::Cli, "test").unwrap())
    }

    #[test]
    fn test_finish_logs_account_on_success() {
        let dir = tempdir().unwrap();
        let logger = logger(dir.path());
        let id = Uuid::new_v4();

        finish(&logger, "deposit", Some(id), Ok(1), false, |_| {}).unwrap();

        let entries = logger.as_ref().unwrap().get_recent(10).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].event, "deposit_completed");
        assert_eq!(entries[0].account_id, Some(id.to_string()));
    }

    #[test]
    fn test_finish_logs_account_on_failure() {
        let dir = tempdir().unwrap();
        let logger = logger(dir.path());
        let id = Uuid::new_v4();
        let failed: tally_core::Result<i32> = Err(Error::InsufficientFunds {
            balance: Decimal::from(10),
            requested: Decimal::from(20),
        });

        assert!(finish(&logger, "withdraw", Some(id), failed, false, |_| {}).is_err());

        let entries = logger.as_ref().unwrap().get_errors(10).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].event, "withdraw_failed");
        assert_eq!(entries[0].account_id, Some(id.to_string()));
        assert_eq!(entries[0].error_kind, Some("insufficient_funds".to_string()));
    }

    #[test]
    fn test_finish_without_account() {
        let dir = tempdir().unwrap();
        let logger = logger(dir.path());
        let failed: tally_core::Result<i32> = Err(Error::invalid_initial_balance("-1"));

        assert!(finish(&logger, "open", None, failed, false, |_| {}).is_err());

        let entries = logger.as_ref().unwrap().get_recent(10).unwrap();
        assert_eq!(entries[0].account_id, None);
    }
}
