//! Account commands - open and list accounts

use anyhow::Result;
use clap::Subcommand;
use teller_core::{BankOperations, EntryPoint};

use super::{finish, get_context, get_logger, prompt_or};
use crate::output;

#[derive(Subcommand)]
pub enum AccountCommands {
    /// Open a new account for an existing customer
    Open {
        /// Owner's tax id
        #[arg(long)]
        tax_id: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// List all accounts by number
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

pub fn run(command: AccountCommands) -> Result<()> {
    let logger = get_logger(EntryPoint::Cli);

    match command {
        AccountCommands::Open { tax_id, json } => {
            let tax_id = prompt_or(tax_id, "Tax id")?;
            let mut ctx = get_context()?;
            let result = ctx.teller.open_account(&tax_id);
            finish(&logger, "account_open", json, result, |account| {
                output::success(&format!(
                    "Account {} opened at branch {} for {}",
                    output::format_account_number(account.number),
                    account.branch,
                    account.customer_name
                ));
            })
        }
        AccountCommands::List { json } => {
            let mut ctx = get_context()?;
            let result = ctx.teller.list_accounts();
            finish(&logger, "account_list", json, result, |accounts| {
                output::print_accounts(accounts)
            })
        }
    }
}
