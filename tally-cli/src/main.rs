//! Tally CLI - open accounts, move money and sync balances from the terminal

use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;
mod output;

use commands::{account, config, logs, sync, transfer};
use output::AlreadyReported;

/// Tally - account balances, transfers and remote sync
#[derive(Parser)]
#[command(name = "tally", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Open an account with an initial balance
    Open {
        /// Initial balance (zero or more)
        initial: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Deposit into a new account
    Deposit {
        /// Amount to deposit
        amount: String,
        /// Initial balance of the account
        #[arg(long, default_value = "0")]
        balance: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Withdraw from a new account
    Withdraw {
        /// Amount to withdraw
        amount: String,
        /// Initial balance of the account
        #[arg(long, default_value = "0")]
        balance: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Transfer between two new accounts
    Transfer {
        /// Amount to transfer
        amount: String,
        /// Initial balance of the source account
        #[arg(long)]
        from: String,
        /// Initial balance of the target account
        #[arg(long, default_value = "0")]
        to: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Synchronize a new account's balance from the balance provider
    Sync {
        /// Initial balance of the account
        #[arg(long, default_value = "0")]
        balance: String,
        /// Number of attempts before giving up
        #[arg(long, default_value = "1")]
        attempts: u32,
        /// Force the provider to report the balance as unavailable
        #[arg(long)]
        fail: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show or change settings
    Config {
        #[command(subcommand)]
        command: config::ConfigCommands,
    },

    /// View and manage the event log
    Logs {
        #[command(subcommand)]
        command: logs::LogsCommands,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if e.downcast_ref::<AlreadyReported>().is_none() {
                output::error(&format!("{:#}", e));
            }
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Open { initial, json } => account::open(&initial, json),
        Commands::Deposit { amount, balance, json } => account::deposit(&amount, &balance, json),
        Commands::Withdraw { amount, balance, json } => account::withdraw(&amount, &balance, json),
        Commands::Transfer { amount, from, to, json } => transfer::run(&amount, &from, &to, json),
        Commands::Sync { balance, attempts, fail, json } => sync::run(&balance, attempts, fail, json),
        Commands::Config { command } => config::run(command),
        Commands::Logs { command } => logs::run(command),
    }
}
