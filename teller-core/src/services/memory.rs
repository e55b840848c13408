//! In-memory bank - the whole application state held in one struct
//!
//! Nothing outlives the process. Every operation either succeeds or leaves
//! the state as it found it, since the domain checks run before mutation.

use rust_decimal::Decimal;

use crate::config::Config;
use crate::domain::directory::{find_customer, find_customer_mut};
use crate::domain::result::{Error, Result};
use crate::domain::{
    Account, AccountNumberAllocator, AccountSummary, AmountValidation, Customer, CustomerSummary,
    NewCustomer, Receipt, Statement, Transaction, TransactionKind, WithdrawalPolicy,
    DEFAULT_BRANCH,
};
use crate::ports::BankOperations;

/// Customers, their accounts and the next account number
#[derive(Debug, Clone)]
pub struct InMemoryBank {
    customers: Vec<Customer>,
    allocator: AccountNumberAllocator,
    branch: String,
    policy: WithdrawalPolicy,
    amount_validation: AmountValidation,
}

impl Default for InMemoryBank {
    fn default() -> Self {
        Self::new(DEFAULT_BRANCH, WithdrawalPolicy::default(), AmountValidation::default())
    }
}

impl InMemoryBank {
    pub fn new(branch: impl Into<String>, policy: WithdrawalPolicy, amount_validation: AmountValidation) -> Self {
        Self {
            customers: Vec::new(),
            allocator: AccountNumberAllocator::new(),
            branch: branch.into(),
            policy,
            amount_validation,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.branch_code.clone(), config.policy, config.amount_validation)
    }

    pub fn customers(&self) -> &[Customer] {
        &self.customers
    }

    fn customer_mut(&mut self, tax_id: &str) -> Result<&mut Customer> {
        find_customer_mut(&mut self.customers, tax_id)
            .ok_or_else(|| Error::CustomerNotFound(tax_id.to_string()))
    }

    fn transact(&mut self, tax_id: &str, number: u32, kind: TransactionKind, amount: Decimal) -> Result<Receipt> {
        let validation = self.amount_validation;
        let customer = self.customer_mut(tax_id)?;
        if customer.account(number).is_none() {
            return Err(Error::account_not_found(tax_id, number));
        }

        let transaction = Transaction::build(kind, amount, validation)?;
        let account = customer.execute_transaction(number, transaction.clone())?;
        Ok(Receipt::new(account, &transaction))
    }
}

impl BankOperations for InMemoryBank {
    fn register_customer(&mut self, registration: NewCustomer) -> Result<CustomerSummary> {
        if find_customer(&self.customers, &registration.tax_id).is_some() {
            return Err(Error::DuplicateCustomer(registration.tax_id));
        }
        let customer = Customer::individual(registration);
        let summary = CustomerSummary::new(&customer);
        self.customers.push(customer);
        Ok(summary)
    }

    fn open_account(&mut self, tax_id: &str) -> Result<AccountSummary> {
        if find_customer(&self.customers, tax_id).is_none() {
            return Err(Error::CustomerNotFound(tax_id.to_string()));
        }

        let number = self.allocator.allocate();
        let account = Account::open(number, self.branch.clone(), tax_id, self.policy);
        let customer = self.customer_mut(tax_id)?;
        let summary = AccountSummary::new(customer, &account);
        customer.register_account(account);
        Ok(summary)
    }

    fn deposit(&mut self, tax_id: &str, number: u32, amount: Decimal) -> Result<Receipt> {
        self.transact(tax_id, number, TransactionKind::Deposit, amount)
    }

    fn withdraw(&mut self, tax_id: &str, number: u32, amount: Decimal) -> Result<Receipt> {
        self.transact(tax_id, number, TransactionKind::Withdrawal, amount)
    }

    fn statement(&mut self, tax_id: &str, number: u32) -> Result<Statement> {
        let customer = find_customer(&self.customers, tax_id)
            .ok_or_else(|| Error::CustomerNotFound(tax_id.to_string()))?;
        let account = customer
            .account(number)
            .ok_or_else(|| Error::account_not_found(tax_id, number))?;
        Ok(Statement::new(customer, account))
    }

    fn list_accounts(&mut self) -> Result<Vec<AccountSummary>> {
        let mut accounts: Vec<AccountSummary> = self
            .customers
            .iter()
            .flat_map(|c| c.accounts().iter().map(move |a| AccountSummary::new(c, a)))
            .collect();
        accounts.sort_by_key(|a| a.number);
        Ok(accounts)
    }

    fn list_customers(&mut self) -> Result<Vec<CustomerSummary>> {
        let mut customers: Vec<CustomerSummary> = self.customers.iter().map(CustomerSummary::new).collect();
        customers.sort_by(|a, b| a.full_name.cmp(&b.full_name).then_with(|| a.tax_id.cmp(&b.tax_id)));
        Ok(customers)
    }
}
