//! Customer commands - register and list customers

use anyhow::{anyhow, Result};
use chrono::NaiveDate;
use clap::Subcommand;
use teller_core::{BankOperations, EntryPoint, NewCustomer};

use super::{finish, get_context, get_logger, prompt_or};
use crate::output;

#[derive(Subcommand)]
pub enum CustomerCommands {
    /// Register a new customer
    New {
        /// Tax id (unique per customer)
        #[arg(long)]
        tax_id: Option<String>,
        /// Full name
        #[arg(long)]
        name: Option<String>,
        /// Birth date (YYYY-MM-DD or DD-MM-YYYY)
        #[arg(long)]
        birth_date: Option<String>,
        /// Address
        #[arg(long)]
        address: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// List customers by name
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

pub fn run(command: CustomerCommands) -> Result<()> {
    let logger = get_logger(EntryPoint::Cli);

    match command {
        CustomerCommands::New {
            tax_id,
            name,
            birth_date,
            address,
            json,
        } => {
            let registration = NewCustomer {
                tax_id: prompt_or(tax_id, "Tax id")?,
                full_name: prompt_or(name, "Full name")?,
                birth_date: parse_birth_date(&prompt_or(birth_date, "Birth date (DD-MM-YYYY)")?)?,
                address: prompt_or(address, "Address")?,
            };
            let mut ctx = get_context()?;
            let result = ctx.teller.register_customer(registration);
            finish(&logger, "customer_new", json, result, |customer| {
                output::success(&format!("Customer {} registered", customer.full_name));
            })
        }
        CustomerCommands::List { json } => {
            let mut ctx = get_context()?;
            let result = ctx.teller.list_customers();
            finish(&logger, "customer_list", json, result, |customers| {
                output::print_customers(customers)
            })
        }
    }
}

/// Parse a birth date written as YYYY-MM-DD or DD-MM-YYYY
pub fn parse_birth_date(raw: &str) -> Result<NaiveDate> {
    let raw = raw.trim();
    ["%Y-%m-%d", "%d-%m-%Y"]
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(raw, format).ok())
        .ok_or_else(|| anyhow!("Invalid birth date {:?}. Use YYYY-MM-DD or DD-MM-YYYY", raw))
}
