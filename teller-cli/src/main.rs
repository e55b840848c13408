//! Teller CLI - a small bank teller console in your terminal

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use teller_core::TransactionKind;

mod commands;
mod output;

use commands::{account, customer, logs, shell, statement, transact};

/// Teller - deposits, withdrawals and statements for a single branch
#[derive(Parser)]
#[command(name = "teller", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Register and list customers
    Customer {
        #[command(subcommand)]
        command: customer::CustomerCommands,
    },

    /// Open and list accounts
    Account {
        #[command(subcommand)]
        command: account::AccountCommands,
    },

    /// Deposit into an account
    Deposit {
        /// Amount, e.g. 150 or 99.90
        #[arg(allow_hyphen_values = true)]
        amount: Option<String>,
        /// Owner's tax id
        #[arg(long)]
        tax_id: Option<String>,
        /// Account number
        #[arg(long)]
        account: Option<u32>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Withdraw from an account
    Withdraw {
        /// Amount, e.g. 150 or 99.90
        #[arg(allow_hyphen_values = true)]
        amount: Option<String>,
        /// Owner's tax id
        #[arg(long)]
        tax_id: Option<String>,
        /// Account number
        #[arg(long)]
        account: Option<u32>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show an account's movements and balance
    Statement {
        /// Owner's tax id
        #[arg(long)]
        tax_id: Option<String>,
        /// Account number
        #[arg(long)]
        account: Option<u32>,
        /// Also write the statement to a CSV file
        #[arg(long)]
        csv: Option<PathBuf>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Interactive teller menu
    Shell {
        /// Keep everything in memory instead of the database
        #[arg(long)]
        in_memory: bool,
    },

    /// View and manage application logs
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
            output::error(&e.to_string());
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Customer { command } => customer::run(command),
        Commands::Account { command } => account::run(command),
        Commands::Deposit { amount, tax_id, account, json } => {
            transact::run(TransactionKind::Deposit, tax_id, account, amount, json)
        }
        Commands::Withdraw { amount, tax_id, account, json } => {
            transact::run(TransactionKind::Withdrawal, tax_id, account, amount, json)
        }
        Commands::Statement { tax_id, account, csv, json } => statement::run(tax_id, account, csv, json),
        Commands::Shell { in_memory } => shell::run(in_memory),
        Commands::Logs { command } => logs::run(command),
    }
}
