//! Teller service - banking operations against persistent storage
//!
//! Every operation runs inside exactly one unit-of-work: it commits when the
//! operation succeeds and rolls back on any error, storage failures included.

use std::sync::Arc;

use rust_decimal::Decimal;

use crate::config::Config;
use crate::domain::directory::find_account;
use crate::domain::result::{Error, Result};
use crate::domain::{
    apply, Account, AccountSummary, AmountValidation, Customer, CustomerSummary, NewCustomer,
    Receipt, Statement, Transaction, TransactionKind, WithdrawalPolicy,
};
use crate::ports::{BankOperations, Store, UnitOfWork};

/// Persisted bank operations over a [`Store`]
pub struct TellerService<S: Store> {
    store: Arc<S>,
    branch: String,
    policy: WithdrawalPolicy,
    amount_validation: AmountValidation,
}

impl<S: Store> TellerService<S> {
    pub fn new(store: Arc<S>, config: &Config) -> Self {
        Self {
            store,
            branch: config.branch_code.clone(),
            policy: config.policy,
            amount_validation: config.amount_validation,
        }
    }

    /// Run `f` in a fresh unit-of-work, committing on `Ok` and rolling back on `Err`
    ///
    /// A failed rollback is swallowed so the caller sees the error that caused it.
    pub fn with_unit_of_work<T>(&self, f: impl FnOnce(&mut dyn UnitOfWork) -> Result<T>) -> Result<T> {
        let mut uow = self.store.begin()?;
        match f(&mut *uow) {
            Ok(value) => {
                uow.commit()?;
                Ok(value)
            }
            Err(e) => {
                let _ = uow.rollback();
                Err(e)
            }
        }
    }

    fn transact(&self, tax_id: &str, number: u32, kind: TransactionKind, amount: Decimal) -> Result<Receipt> {
        let validation = self.amount_validation;
        self.with_unit_of_work(|uow| {
            let account = load_account(uow, tax_id, number)?;
            let transaction = Transaction::build(kind, amount, validation)?;
            let account = apply(&account, transaction.clone())?;

            uow.save_account(&account)?;
            uow.append_transaction(account.number(), &transaction)?;
            Ok(Receipt::new(&account, &transaction))
        })
    }
}

/// Load an account, telling a missing customer apart from a missing account
fn load_account(uow: &mut dyn UnitOfWork, tax_id: &str, number: u32) -> Result<Account> {
    if let Some(account) = uow.load_account_by_number(tax_id, number)? {
        return Ok(account);
    }
    match uow.load_customer_by_tax_id(tax_id)? {
        Some(_) => Err(Error::account_not_found(tax_id, number)),
        None => Err(Error::CustomerNotFound(tax_id.to_string())),
    }
}

fn load_customer(uow: &mut dyn UnitOfWork, tax_id: &str) -> Result<Customer> {
    uow.load_customer_by_tax_id(tax_id)?
        .ok_or_else(|| Error::CustomerNotFound(tax_id.to_string()))
}

impl<S: Store> BankOperations for TellerService<S> {
    fn register_customer(&mut self, registration: NewCustomer) -> Result<CustomerSummary> {
        self.with_unit_of_work(|uow| {
            if uow.load_customer_by_tax_id(&registration.tax_id)?.is_some() {
                return Err(Error::DuplicateCustomer(registration.tax_id));
            }
            let customer = Customer::individual(registration);
            uow.insert_customer(&customer)?;
            Ok(CustomerSummary::new(&customer))
        })
    }

    fn open_account(&mut self, tax_id: &str) -> Result<AccountSummary> {
        let branch = self.branch.clone();
        let policy = self.policy;
        self.with_unit_of_work(|uow| {
            let customer = load_customer(uow, tax_id)?;
            let number = uow.next_account_number()?;
            let account = Account::open(number, branch, tax_id, policy);
            uow.insert_account(&account)?;
            Ok(AccountSummary::new(&customer, &account))
        })
    }

    fn deposit(&mut self, tax_id: &str, number: u32, amount: Decimal) -> Result<Receipt> {
        self.transact(tax_id, number, TransactionKind::Deposit, amount)
    }

    fn withdraw(&mut self, tax_id: &str, number: u32, amount: Decimal) -> Result<Receipt> {
        self.transact(tax_id, number, TransactionKind::Withdrawal, amount)
    }

    fn statement(&mut self, tax_id: &str, number: u32) -> Result<Statement> {
        self.with_unit_of_work(|uow| {
            let customer = load_customer(uow, tax_id)?;
            let account = find_account(&customer, number)
                .ok_or_else(|| Error::account_not_found(tax_id, number))?;
            Ok(Statement::new(&customer, account))
        })
    }

    fn list_accounts(&mut self) -> Result<Vec<AccountSummary>> {
        self.with_unit_of_work(|uow| {
            let customers = uow.list_customers()?;
            let mut accounts: Vec<AccountSummary> = customers
                .iter()
                .flat_map(|c| c.accounts().iter().map(move |a| AccountSummary::new(c, a)))
                .collect();
            accounts.sort_by_key(|a| a.number);
            Ok(accounts)
        })
    }

    fn list_customers(&mut self) -> Result<Vec<CustomerSummary>> {
        self.with_unit_of_work(|uow| {
            Ok(uow.list_customers()?.iter().map(CustomerSummary::new).collect())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::duckdb::DuckDbRepository;
    use crate::domain::result::ErrorKind;
    use crate::domain::MAX_AMOUNT;
    use chrono::NaiveDate;

    fn service() -> TellerService<DuckDbRepository> {
        let repository = DuckDbRepository::open_in_memory().unwrap();
        repository.ensure_schema().unwrap();
        TellerService::new(Arc::new(repository), &Config::default())
    }

    fn registration(tax_id: &str) -> NewCustomer {
        NewCustomer {
            tax_id: tax_id.to_string(),
            full_name: "Maria Souza".to_string(),
            birth_date: NaiveDate::from_ymd_opt(1985, 2, 1).unwrap(),
            address: "Av. Central, 200".to_string(),
        }
    }

    #[test]
    fn test_missing_customer_and_missing_account_differ() {
        let mut teller = service();
        let err = teller.deposit("404", 1, Decimal::ONE).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::CustomerNotFound);

        teller.register_customer(registration("111")).unwrap();
        let err = teller.deposit("111", 1, Decimal::ONE).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::AccountNotFound);
    }

    #[test]
    fn test_failed_operation_is_rolled_back() {
        let mut teller = service();
        teller.register_customer(registration("111")).unwrap();
        let number = teller.open_account("111").unwrap().number;
        teller.deposit("111", number, Decimal::new(100, 0)).unwrap();

        let err = teller.withdraw("111", number, Decimal::new(150, 0)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InsufficientFunds);

        let statement = teller.statement("111", number).unwrap();
        assert_eq!(statement.balance, Decimal::new(100, 0));
        assert_eq!(statement.lines.len(), 1);
    }

    #[test]
    fn test_open_account_is_persisted_for_its_owner() {
        let mut teller = service();
        let summary = teller.register_customer(registration("111")).unwrap();
        assert_eq!(summary.account_count, 0);

        let account = teller.open_account("111").unwrap();
        assert_eq!(account.number, 1);
        assert_eq!(account.customer_name, "Maria Souza");

        let customers = teller.list_customers().unwrap();
        assert_eq!(customers[0].account_count, 1);
        assert!(teller.statement("111", account.number).unwrap().is_empty());
    }

    #[test]
    fn test_sub_cent_amounts_never_reach_storage() {
        for validation in [AmountValidation::OnConstruction, AmountValidation::OnApply] {
            let mut config = Config::default();
            config.amount_validation = validation;
            let repository = DuckDbRepository::open_in_memory().unwrap();
            repository.ensure_schema().unwrap();
            let mut teller = TellerService::new(Arc::new(repository), &config);
            teller.register_customer(registration("111")).unwrap();
            let number = teller.open_account("111").unwrap().number;
            teller.deposit("111", number, Decimal::new(100, 0)).unwrap();

            let err = teller.deposit("111", number, Decimal::new(5, 3)).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidAmount);
            let err = teller.withdraw("111", number, Decimal::new(1, 3)).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidAmount);

            let statement = teller.statement("111", number).unwrap();
            assert_eq!(statement.balance, Decimal::new(100, 0));
            assert_eq!(statement.lines.len(), 1);
        }
    }

    #[test]
    fn test_amounts_beyond_storage_precision_are_invalid_not_unavailable() {
        let mut teller = service();
        teller.register_customer(registration("111")).unwrap();
        let number = teller.open_account("111").unwrap().number;

        let err = teller.deposit("111", number, Decimal::new(10i64.pow(17), 0)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidAmount);

        let receipt = teller.deposit("111", number, MAX_AMOUNT).unwrap();
        assert_eq!(receipt.balance, MAX_AMOUNT);
        let err = teller.deposit("111", number, Decimal::ONE).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidAmount);

        let statement = teller.statement("111", number).unwrap();
        assert_eq!(statement.balance, MAX_AMOUNT);
        assert_eq!(statement.lines.len(), 1);
    }

    #[test]
    fn test_error_inside_unit_of_work_discards_writes() {
        let teller = service();
        let result: Result<()> = teller.with_unit_of_work(|uow| {
            uow.insert_customer(&Customer::individual(registration("111")))?;
            Err(Error::storage("connection lost"))
        });
        assert_eq!(result.unwrap_err().kind(), ErrorKind::StorageUnavailable);

        let mut teller = teller;
        assert!(teller.list_customers().unwrap().is_empty());
    }
}
