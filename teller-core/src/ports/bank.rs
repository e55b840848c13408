//! Banking operations shared by the in-memory and persisted variants

use rust_decimal::Decimal;

use crate::domain::result::Result;
use crate::domain::{AccountSummary, CustomerSummary, NewCustomer, Receipt, Statement};

/// The operations offered at the teller console
///
/// Each call is one complete business operation: it either succeeds or
/// leaves every customer and account unchanged.
pub trait BankOperations {
    /// Register a customer; fails with `DuplicateCustomer` if the tax id is taken
    fn register_customer(&mut self, registration: NewCustomer) -> Result<CustomerSummary>;

    /// Open a new account for an existing customer
    fn open_account(&mut self, tax_id: &str) -> Result<AccountSummary>;

    fn deposit(&mut self, tax_id: &str, number: u32, amount: Decimal) -> Result<Receipt>;

    fn withdraw(&mut self, tax_id: &str, number: u32, amount: Decimal) -> Result<Receipt>;

    fn statement(&mut self, tax_id: &str, number: u32) -> Result<Statement>;

    /// All accounts, ordered by number
    fn list_accounts(&mut self) -> Result<Vec<AccountSummary>>;

    /// All customers, ordered by name
    fn list_customers(&mut self) -> Result<Vec<CustomerSummary>>;
}
