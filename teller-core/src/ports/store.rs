//! Storage port - unit-of-work persistence abstraction

use crate::domain::result::Result;
use crate::domain::{Account, Customer, Transaction};

/// Scoped reads and writes that commit or roll back together
///
/// Dropping a unit-of-work without calling `commit` discards its writes.
pub trait UnitOfWork {
    /// Load a customer together with their accounts and histories
    fn load_customer_by_tax_id(&mut self, tax_id: &str) -> Result<Option<Customer>>;

    /// Load one account of the given customer
    fn load_account_by_number(&mut self, tax_id: &str, number: u32) -> Result<Option<Account>>;

    fn insert_customer(&mut self, customer: &Customer) -> Result<()>;

    fn insert_account(&mut self, account: &Account) -> Result<()>;

    /// Persist balance and counters of an existing account
    fn save_account(&mut self, account: &Account) -> Result<()>;

    fn append_transaction(&mut self, account_number: u32, transaction: &Transaction) -> Result<()>;

    /// Highest stored account number + 1, or 1 for an empty store
    fn next_account_number(&mut self) -> Result<u32>;

    /// All customers with their accounts (histories not loaded)
    fn list_customers(&mut self) -> Result<Vec<Customer>>;

    fn commit(self: Box<Self>) -> Result<()>;

    fn rollback(self: Box<Self>) -> Result<()>;
}

/// Source of units-of-work
pub trait Store: Send + Sync {
    fn begin(&self) -> Result<Box<dyn UnitOfWork + '_>>;
}
