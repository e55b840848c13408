//! Output formatting utilities

use chrono::{DateTime, Local, Utc};
use colored::Colorize;
use comfy_table::{presets::UTF8_FULL_CONDENSED, Cell, CellAlignment, ContentArrangement, Table};
use rust_decimal::Decimal;
use teller_core::{AccountSummary, CustomerSummary, Receipt, Statement, TransactionKind};

/// Print a success message
pub fn success(msg: &str) {
    println!("{}", msg.green());
}

/// Print an error message
pub fn error(msg: &str) {
    eprintln!("{}", msg.red());
}

/// Print a warning message
pub fn warning(msg: &str) {
    println!("{}", msg.yellow());
}

/// Print an info message
pub fn info(msg: &str) {
    println!("{}", msg.cyan());
}

/// Create a styled table
pub fn create_table() -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table
}

pub fn format_money(amount: Decimal) -> String {
    format!("{:.2}", amount)
}

pub fn format_account_number(number: u32) -> String {
    format!("{:04}", number)
}

pub fn format_time(timestamp: DateTime<Utc>) -> String {
    timestamp
        .with_timezone(&Local)
        .format("%d/%m/%Y %H:%M:%S")
        .to_string()
}

fn money_cell(amount: Decimal) -> Cell {
    Cell::new(format_money(amount)).set_alignment(CellAlignment::Right)
}

pub fn print_receipt(receipt: &Receipt) {
    let verb = match receipt.kind {
        TransactionKind::Deposit => "Deposit",
        TransactionKind::Withdrawal => "Withdrawal",
    };
    success(&format!(
        "{} of {} into account {} accepted",
        verb,
        format_money(receipt.amount),
        format_account_number(receipt.account_number)
    ));
    println!("  Balance: {}", format_money(receipt.balance));
    if receipt.kind == TransactionKind::Withdrawal {
        println!("  Withdrawals so far: {}", receipt.withdrawals_today);
    }
    println!("  Time: {}", format_time(receipt.timestamp));
}

pub fn print_statement(statement: &Statement) {
    println!("{}", "Statement".bold());
    println!(
        "  Branch {}  Account {}  {} ({})",
        statement.branch,
        format_account_number(statement.account_number),
        statement.customer_name,
        statement.tax_id
    );
    println!();

    if statement.is_empty() {
        info("No movements.");
    } else {
        let mut table = create_table();
        table.set_header(vec!["Time", "Kind", "Amount"]);
        for line in &statement.lines {
            let amount = match line.kind {
                TransactionKind::Deposit => line.amount,
                TransactionKind::Withdrawal => -line.amount,
            };
            table.add_row(vec![
                Cell::new(format_time(line.timestamp)),
                Cell::new(line.kind.to_string()),
                money_cell(amount),
            ]);
        }
        println!("{}", table);
    }

    println!();
    println!("{} {}", "Balance:".bold(), format_money(statement.balance));
}

pub fn print_accounts(accounts: &[AccountSummary]) {
    if accounts.is_empty() {
        info("No accounts yet.");
        return;
    }

    let mut table = create_table();
    table.set_header(vec!["Branch", "Account", "Customer", "Tax id", "Balance"]);
    for account in accounts {
        table.add_row(vec![
            Cell::new(&account.branch),
            Cell::new(format_account_number(account.number)),
            Cell::new(&account.customer_name),
            Cell::new(&account.tax_id),
            money_cell(account.balance),
        ]);
    }
    println!("{}", table);
}

pub fn print_customers(customers: &[CustomerSummary]) {
    if customers.is_empty() {
        info("No customers yet.");
        return;
    }

    let mut table = create_table();
    table.set_header(vec!["Name", "Tax id", "Birth date", "Address", "Accounts"]);
    for customer in customers {
        table.add_row(vec![
            Cell::new(&customer.full_name),
            Cell::new(&customer.tax_id),
            Cell::new(customer.birth_date.format("%d-%m-%Y").to_string()),
            Cell::new(&customer.address),
            Cell::new(customer.account_count).set_alignment(CellAlignment::Right),
        ]);
    }
    println!("{}", table);
}
