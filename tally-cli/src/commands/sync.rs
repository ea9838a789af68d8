//! Sync command - overwrite a fresh account's balance from the provider
//!
//! Each attempt is a single `synchronize_balance` call. Retrying is done
//! here, at the caller, never inside the core.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use colored::Colorize;
use indicatif::ProgressBar;
use rust_decimal::Decimal;
use serde::Serialize;
use tally_core::adapters::ScriptedBalanceProvider;
use tally_core::config::Config;
use tally_core::domain::parse_initial_balance;
use tally_core::{Account, Error, LogEvent, LoggingService, TallyContext};

use super::{finish, get_context, get_logger, get_tally_dir, log_event, AccountView};
use crate::output::{create_table, format_balance, warning};

#[derive(Debug, Serialize)]
struct SyncView {
    account: AccountView,
    previous_balance: Decimal,
    provider: String,
    attempts: u32,
}

pub fn run(initial: &str, attempts: u32, fail: bool, json: bool) -> Result<()> {
    let ctx = if fail {
        // Forced outage: every fetch reports the balance as unavailable
        let config = Config::load(&get_tally_dir()?)?;
        TallyContext::with_provider(config, Arc::new(ScriptedBalanceProvider::unavailable()))
    } else {
        get_context()?
    };
    let logger = get_logger();

    if fail && !json {
        warning("Provider forced unavailable (--fail)");
    }

    let account = parse_initial_balance(initial).and_then(|balance| ctx.open_account(balance));
    let account_id = account.as_ref().ok().map(Account::id);

    let runtime = tokio::runtime::Runtime::new()?;
    let result = account.and_then(|account| {
        runtime.block_on(sync_with_retries(&account, attempts.max(1), &logger, json))
    });

    finish(&logger, "sync", account_id, result, json, |view| {
        println!(
            "{} after {} attempt(s) via {}",
            "Balance synchronized".green(),
            view.attempts,
            view.provider
        );
        let mut table = create_table();
        table.add_row(vec!["Account", &view.account.id.to_string()]);
        table.add_row(vec!["Previous balance", &format_balance(view.previous_balance)]);
        table.add_row(vec!["New balance", &format_balance(view.account.balance)]);
        if let Some(at) = view.account.last_synced_at {
            table.add_row(vec!["Synced at", &at.format("%Y-%m-%d %H:%M:%S").to_string()]);
        }
        println!("{}", table);
    })
}

async fn sync_with_retries(
    account: &Account,
    attempts: u32,
    logger: &Option<LoggingService>,
    json: bool,
) -> tally_core::Result<SyncView> {
    let spinner = if json {
        ProgressBar::hidden()
    } else {
        ProgressBar::new_spinner()
    };
    spinner.enable_steady_tick(Duration::from_millis(100));

    let mut last_error = None;
    for attempt in 1..=attempts {
        spinner.set_message(format!(
            "Fetching remote balance (attempt {}/{})",
            attempt, attempts
        ));

        match account.synchronize_balance().await {
            Ok(report) => {
                spinner.finish_and_clear();
                log_event(
                    logger,
                    LogEvent::new("balance_synced")
                        .with_command("sync")
                        .with_account(account.id())
                        .with_provider(account.provider_name()),
                );
                return Ok(SyncView {
                    account: AccountView::from(account),
                    previous_balance: report.previous,
                    provider: account.provider_name().to_string(),
                    attempts: attempt,
                });
            }
            Err(e) => {
                log_event(
                    logger,
                    LogEvent::new("sync_attempt_failed")
                        .with_command("sync")
                        .with_account(account.id())
                        .with_provider(account.provider_name())
                        .with_error(&e),
                );
                last_error = Some(e);
            }
        }
    }

    spinner.finish_and_clear();
    Err(last_error.unwrap_or_else(|| Error::sync_failed("no attempts made")))
}
