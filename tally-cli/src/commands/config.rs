//! Config command - show and change provider settings

use anyhow::Result;
use clap::Subcommand;
use colored::Colorize;
use tally_core::config::Config;

use super::get_tally_dir;
use crate::output::{create_table, success};

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show the effective settings (including environment overrides)
    Show {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Change provider settings in settings.json
    Set {
        /// Probability (0 to 1) that a remote fetch is unavailable
        #[arg(long)]
        failure_rate: Option<f64>,
        /// Largest balance the simulated provider reports
        #[arg(long)]
        max_balance: Option<u64>,
        /// Simulated provider latency in milliseconds
        #[arg(long)]
        latency_ms: Option<u64>,
        /// Seed for reproducible provider output
        #[arg(long, conflicts_with = "clear_seed")]
        seed: Option<u64>,
        /// Remove the fixed seed
        #[arg(long)]
        clear_seed: bool,
    },
}

pub fn run(command: ConfigCommands) -> Result<()> {
    let tally_dir = get_tally_dir()?;

    match command {
        ConfigCommands::Show { json } => {
            let config = Config::load(&tally_dir)?;

            if json {
                println!("{}", serde_json::to_string_pretty(&config.provider)?);
                return Ok(());
            }

            println!("{}", "Balance Provider".bold());
            let provider = &config.provider;
            let mut table = create_table();
            table.add_row(vec!["Failure rate", &provider.failure_rate.to_string()]);
            table.add_row(vec!["Max balance", &provider.max_balance.to_string()]);
            table.add_row(vec!["Latency", &format!("{} ms", provider.latency_ms)]);
            table.add_row(vec![
                "Seed",
                &provider
                    .seed
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| "random".to_string()),
            ]);
            println!("{}", table);
        }
        ConfigCommands::Set {
            failure_rate,
            max_balance,
            latency_ms,
            seed,
            clear_seed,
        } => {
            std::fs::create_dir_all(&tally_dir)?;
            // Env overrides are not persisted
            let mut config = Config::load_file(&tally_dir)?;

            if let Some(rate) = failure_rate {
                config.provider.failure_rate = rate;
            }
            if let Some(max) = max_balance {
                config.provider.max_balance = max;
            }
            if let Some(ms) = latency_ms {
                config.provider.latency_ms = ms;
            }
            if seed.is_some() || clear_seed {
                config.provider.seed = seed;
            }

            config.save(&tally_dir)?;
            success("Settings saved");
        }
    }

    Ok(())
}
