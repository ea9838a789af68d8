//! Account commands - open, deposit and withdraw on a fresh account

use anyhow::Result;
use colored::Colorize;
use tally_core::domain::{parse_amount, parse_initial_balance};
use tally_core::Account;

use super::{finish, get_context, get_logger, AccountView};
use crate::output::{create_table, format_balance};

fn print_account(title: &str, view: &AccountView) {
    println!("{}", title.bold());
    let mut table = create_table();
    table.add_row(vec!["Account", &view.id.to_string()]);
    table.add_row(vec!["Balance", &format_balance(view.balance)]);
    table.add_row(vec![
        "Opened",
        &view.created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
    ]);
    println!("{}", table);
}

/// Open an account and show it
pub fn open(initial: &str, json: bool) -> Result<()> {
    let ctx = get_context()?;
    let logger = get_logger();

    let account = parse_initial_balance(initial).and_then(|balance| ctx.open_account(balance));
    let account_id = account.as_ref().ok().map(Account::id);
    let result = account.map(|account| AccountView::from(&account));

    finish(&logger, "open", account_id, result, json, |view| {
        print_account("Account opened", view)
    })
}

/// Deposit into an account opened with `initial`
pub fn deposit(amount: &str, initial: &str, json: bool) -> Result<()> {
    let ctx = get_context()?;
    let logger = get_logger();

    let account = parse_initial_balance(initial).and_then(|balance| ctx.open_account(balance));
    let account_id = account.as_ref().ok().map(Account::id);
    let result = account.and_then(|account| {
        account.deposit(parse_amount(amount)?)?;
        Ok(AccountView::from(&account))
    });

    finish(&logger, "deposit", account_id, result, json, |view| {
        print_account("Deposit complete", view)
    })
}

/// Withdraw from an account opened with `initial`
pub fn withdraw(amount: &str, initial: &str, json: bool) -> Result<()> {
    let ctx = get_context()?;
    let logger = get_logger();

    let account = parse_initial_balance(initial).and_then(|balance| ctx.open_account(balance));
    let account_id = account.as_ref().ok().map(Account::id);
    let result = account.and_then(|account| {
        account.withdraw(parse_amount(amount)?)?;
        Ok(AccountView::from(&account))
    });

    finish(&logger, "withdraw", account_id, result, json, |view| {
        print_account("Withdrawal complete", view)
    })
}
