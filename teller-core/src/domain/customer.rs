//! Customer domain model

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::account::Account;
use super::result::{Error, Result};
use super::transaction::Transaction;

/// Kind-specific customer data
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CustomerKind {
    Individual {
        full_name: String,
        birth_date: NaiveDate,
    },
}

impl CustomerKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CustomerKind::Individual { .. } => "individual",
        }
    }
}

/// Data collected when registering a customer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCustomer {
    pub tax_id: String,
    pub full_name: String,
    pub birth_date: NaiveDate,
    pub address: String,
}

/// A bank customer and the accounts they own
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    pub(crate) tax_id: String,
    pub(crate) address: String,
    pub(crate) kind: CustomerKind,
    pub(crate) accounts: Vec<Account>,
    pub(crate) registered_at: DateTime<Utc>,
}

impl Customer {
    /// Register an individual with no accounts
    pub fn individual(registration: NewCustomer) -> Self {
        Self {
            tax_id: registration.tax_id,
            address: registration.address,
            kind: CustomerKind::Individual {
                full_name: registration.full_name,
                birth_date: registration.birth_date,
            },
            accounts: Vec::new(),
            registered_at: Utc::now(),
        }
    }

    pub fn tax_id(&self) -> &str {
        &self.tax_id
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn kind(&self) -> &CustomerKind {
        &self.kind
    }

    pub fn full_name(&self) -> &str {
        match &self.kind {
            CustomerKind::Individual { full_name, .. } => full_name,
        }
    }

    pub fn birth_date(&self) -> NaiveDate {
        match &self.kind {
            CustomerKind::Individual { birth_date, .. } => *birth_date,
        }
    }

    pub fn registered_at(&self) -> DateTime<Utc> {
        self.registered_at
    }

    pub fn accounts(&self) -> &[Account] {
        &self.accounts
    }

    /// Add an account to this customer's list
    ///
    /// No duplicate check: account numbers are unique by allocation.
    pub fn register_account(&mut self, account: Account) {
        self.accounts.push(account);
    }

    pub fn account(&self, number: u32) -> Option<&Account> {
        self.accounts.iter().find(|a| a.number() == number)
    }

    pub fn account_mut(&mut self, number: u32) -> Option<&mut Account> {
        self.accounts.iter_mut().find(|a| a.number() == number)
    }

    /// Apply a transaction to one of this customer's own accounts
    ///
    /// Accounts of other customers are unreachable from here, so a request for
    /// an account this customer does not own fails with `AccountNotFound`.
    pub fn execute_transaction(&mut self, number: u32, transaction: Transaction) -> Result<&Account> {
        let tax_id = self.tax_id.clone();
        let account = self
            .account_mut(number)
            .ok_or_else(|| Error::account_not_found(&tax_id, number))?;
        account.apply(transaction)?;
        Ok(&*account)
    }
}
