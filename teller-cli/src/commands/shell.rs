//! Shell command - interactive teller menu
//!
//! Runs one operation per menu choice until the user quits. A failed
//! operation is reported and the menu comes back.

use anyhow::{bail, Result};
use dialoguer::{Input, Select};
use teller_core::config::Config;
use teller_core::services::InMemoryBank;
use teller_core::{parse_amount, BankOperations, EntryPoint, LogEvent, LoggingService, NewCustomer};

use super::customer::parse_birth_date;
use super::{get_context, get_logger, get_teller_dir, log_event, log_outcome, parse_account_number};
use crate::output;

const MENU: &[&str] = &[
    "Deposit",
    "Withdraw",
    "Statement",
    "New customer",
    "New account",
    "List accounts",
    "List customers",
    "Quit",
];

pub fn run(in_memory: bool) -> Result<()> {
    if atty::isnt(atty::Stream::Stdin) {
        bail!("The shell needs an interactive terminal");
    }

    let logger = get_logger(EntryPoint::Shell);
    log_event(&logger, LogEvent::new("shell_started"));

    if in_memory {
        let config = Config::load(&get_teller_dir()?)?;
        output::warning("In-memory session: nothing is saved when you quit.");
        let mut bank = InMemoryBank::from_config(&config);
        menu_loop(&mut bank, &logger)
    } else {
        let mut ctx = get_context()?;
        menu_loop(&mut ctx.teller, &logger)
    }
}

fn menu_loop<B: BankOperations>(bank: &mut B, logger: &Option<LoggingService>) -> Result<()> {
    loop {
        println!();
        let choice = Select::new()
            .with_prompt("Teller")
            .items(MENU)
            .default(0)
            .interact()?;

        let outcome = match MENU[choice] {
            "Deposit" => deposit(bank, logger),
            "Withdraw" => withdraw(bank, logger),
            "Statement" => statement(bank, logger),
            "New customer" => new_customer(bank, logger),
            "New account" => new_account(bank, logger),
            "List accounts" => list_accounts(bank, logger),
            "List customers" => list_customers(bank, logger),
            _ => return Ok(()),
        };

        // Bad input and rejected operations both return to the menu
        if let Err(e) = outcome {
            output::error(&e.to_string());
        }
    }
}

fn ask(prompt: &str) -> Result<String> {
    Ok(Input::<String>::new().with_prompt(prompt).interact_text()?)
}

fn ask_account() -> Result<(String, u32)> {
    let tax_id = ask("Tax id")?;
    let number = parse_account_number(&ask("Account number")?)?;
    Ok((tax_id, number))
}

fn deposit<B: BankOperations>(bank: &mut B, logger: &Option<LoggingService>) -> Result<()> {
    let (tax_id, number) = ask_account()?;
    let amount = parse_amount(&ask("Amount")?)?;
    let result = bank.deposit(&tax_id, number, amount);
    log_outcome(logger, "deposit", &result);
    output::print_receipt(&result?);
    Ok(())
}

fn withdraw<B: BankOperations>(bank: &mut B, logger: &Option<LoggingService>) -> Result<()> {
    let (tax_id, number) = ask_account()?;
    let amount = parse_amount(&ask("Amount")?)?;
    let result = bank.withdraw(&tax_id, number, amount);
    log_outcome(logger, "withdraw", &result);
    output::print_receipt(&result?);
    Ok(())
}

fn statement<B: BankOperations>(bank: &mut B, logger: &Option<LoggingService>) -> Result<()> {
    let (tax_id, number) = ask_account()?;
    let result = bank.statement(&tax_id, number);
    log_outcome(logger, "statement", &result);
    output::print_statement(&result?);
    Ok(())
}

fn new_customer<B: BankOperations>(bank: &mut B, logger: &Option<LoggingService>) -> Result<()> {
    let registration = NewCustomer {
        tax_id: ask("Tax id")?,
        full_name: ask("Full name")?,
        birth_date: parse_birth_date(&ask("Birth date (DD-MM-YYYY)")?)?,
        address: ask("Address")?,
    };
    let result = bank.register_customer(registration);
    log_outcome(logger, "customer_new", &result);
    output::success(&format!("Customer {} registered", result?.full_name));
    Ok(())
}

fn new_account<B: BankOperations>(bank: &mut B, logger: &Option<LoggingService>) -> Result<()> {
    let tax_id = ask("Tax id")?;
    let result = bank.open_account(&tax_id);
    log_outcome(logger, "account_open", &result);
    let account = result?;
    output::success(&format!(
        "Account {} opened at branch {}",
        output::format_account_number(account.number),
        account.branch
    ));
    Ok(())
}

fn list_accounts<B: BankOperations>(bank: &mut B, logger: &Option<LoggingService>) -> Result<()> {
    let result = bank.list_accounts();
    log_outcome(logger, "account_list", &result);
    output::print_accounts(&result?);
    Ok(())
}

fn list_customers<B: BankOperations>(bank: &mut B, logger: &Option<LoggingService>) -> Result<()> {
    let result = bank.list_customers();
    log_outcome(logger, "customer_list", &result);
    output::print_customers(&result?);
    Ok(())
}
