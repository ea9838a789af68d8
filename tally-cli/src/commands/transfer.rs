//! Transfer command - move money between two fresh accounts

use anyhow::Result;
use colored::Colorize;
use rust_decimal::Decimal;
use serde::Serialize;
use tally_core::domain::{parse_amount, parse_initial_balance};
use tally_core::Account;

use super::{finish, get_context, get_logger, AccountView};
use crate::output::{create_table, format_balance};

#[derive(Debug, Serialize)]
struct TransferView {
    amount: Decimal,
    from: AccountView,
    to: AccountView,
}

pub fn run(amount: &str, from: &str, to: &str, json: bool) -> Result<()> {
    let ctx = get_context()?;
    let logger = get_logger();

    let source = parse_initial_balance(from).and_then(|balance| ctx.open_account(balance));
    let account_id = source.as_ref().ok().map(Account::id);

    let result = (|| -> tally_core::Result<TransferView> {
        let source = source?;
        let target = ctx.open_account(parse_initial_balance(to)?)?;
        let amount = parse_amount(amount)?;
        source.transfer(amount, &target)?;
        Ok(TransferView {
            amount,
            from: AccountView::from(&source),
            to: AccountView::from(&target),
        })
    })();

    finish(&logger, "transfer", account_id, result, json, |view| {
        println!(
            "{} {}",
            "Transferred".green(),
            format_balance(view.amount)
        );
        let mut table = create_table();
        table.set_header(vec!["", "Account", "Balance"]);
        table.add_row(vec![
            "From".to_string(),
            view.from.id.to_string(),
            format_balance(view.from.balance),
        ]);
        table.add_row(vec![
            "To".to_string(),
            view.to.id.to_string(),
            format_balance(view.to.balance),
        ]);
        println!("{}", table);
    })
}
