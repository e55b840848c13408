//! Display data returned by operations
//!
//! Formatting is left to the caller; these only carry what a receipt,
//! statement or listing needs.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use super::account::Account;
use super::customer::Customer;
use super::transaction::{Transaction, TransactionKind};

/// Outcome of an accepted deposit or withdrawal
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Receipt {
    pub transaction_id: String,
    pub account_number: u32,
    pub kind: TransactionKind,
    pub amount: Decimal,
    pub balance: Decimal,
    pub withdrawals_today: u32,
    pub timestamp: DateTime<Utc>,
}

impl Receipt {
    pub fn new(account: &Account, transaction: &Transaction) -> Self {
        Self {
            transaction_id: transaction.id().to_string(),
            account_number: account.number(),
            kind: transaction.kind(),
            amount: transaction.amount(),
            balance: account.balance(),
            withdrawals_today: account.withdrawals_today(),
            timestamp: transaction.timestamp(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatementLine {
    pub timestamp: DateTime<Utc>,
    pub kind: TransactionKind,
    pub amount: Decimal,
}

/// Chronological history of an account plus its current balance
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Statement {
    pub branch: String,
    pub account_number: u32,
    pub customer_name: String,
    pub tax_id: String,
    pub lines: Vec<StatementLine>,
    pub balance: Decimal,
}

impl Statement {
    pub fn new(customer: &Customer, account: &Account) -> Self {
        Self {
            branch: account.branch().to_string(),
            account_number: account.number(),
            customer_name: customer.full_name().to_string(),
            tax_id: customer.tax_id().to_string(),
            lines: account
                .history()
                .iter()
                .map(|t| StatementLine {
                    timestamp: t.timestamp(),
                    kind: t.kind(),
                    amount: t.amount(),
                })
                .collect(),
            balance: account.balance(),
        }
    }

    /// True when the account has no movements yet
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// One row of the account listing
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AccountSummary {
    pub branch: String,
    pub number: u32,
    pub customer_name: String,
    pub tax_id: String,
    pub balance: Decimal,
}

impl AccountSummary {
    pub fn new(customer: &Customer, account: &Account) -> Self {
        Self {
            branch: account.branch().to_string(),
            number: account.number(),
            customer_name: customer.full_name().to_string(),
            tax_id: customer.tax_id().to_string(),
            balance: account.balance(),
        }
    }
}

/// One row of the customer listing
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CustomerSummary {
    pub tax_id: String,
    pub full_name: String,
    pub birth_date: NaiveDate,
    pub address: String,
    pub account_count: usize,
}

impl CustomerSummary {
    pub fn new(customer: &Customer) -> Self {
        Self {
            tax_id: customer.tax_id().to_string(),
            full_name: customer.full_name().to_string(),
            birth_date: customer.birth_date(),
            address: customer.address().to_string(),
            account_count: customer.accounts().len(),
        }
    }
}
