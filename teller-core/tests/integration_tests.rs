//! Integration tests for teller-core services
//!
//! These tests run the persisted teller against a real DuckDB file in a
//! temporary directory.
//!
//! Run with: cargo test --test integration_tests -- --nocapture

use std::sync::Arc;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tempfile::TempDir;

use teller_core::adapters::duckdb::DuckDbRepository;
use teller_core::config::Config;
use teller_core::domain::result::ErrorKind;
use teller_core::domain::{CounterReset, TransactionKind};
use teller_core::ports::{BankOperations, Store, UnitOfWork};
use teller_core::services::{statement::write_csv, TellerService};
use teller_core::{NewCustomer, TellerContext};

// ============================================================================
// Test Helpers
// ============================================================================

fn create_test_repo(temp_dir: &TempDir) -> Arc<DuckDbRepository> {
    let db_path = temp_dir.path().join("teller.duckdb");
    let repo = DuckDbRepository::new(&db_path).expect("Failed to create repository");
    repo.ensure_schema().expect("Failed to initialize schema");
    Arc::new(repo)
}

fn create_teller(temp_dir: &TempDir) -> TellerService<DuckDbRepository> {
    TellerService::new(create_test_repo(temp_dir), &Config::default())
}

fn registration(tax_id: &str, name: &str) -> NewCustomer {
    NewCustomer {
        tax_id: tax_id.to_string(),
        full_name: name.to_string(),
        birth_date: NaiveDate::from_ymd_opt(1979, 11, 3).unwrap(),
        address: "Rua Augusta, 1500".to_string(),
    }
}

fn teller_with_account(temp_dir: &TempDir) -> (TellerService<DuckDbRepository>, u32) {
    let mut teller = create_teller(temp_dir);
    teller.register_customer(registration("111", "Maria Souza")).unwrap();
    let number = teller.open_account("111").unwrap().number;
    (teller, number)
}

// ============================================================================
// Customer Registration
// ============================================================================

#[test]
fn test_duplicate_customer_keeps_single_entry() {
    let temp_dir = TempDir::new().unwrap();
    let mut teller = create_teller(&temp_dir);

    teller.register_customer(registration("111", "Maria Souza")).unwrap();
    let err = teller
        .register_customer(registration("111", "Someone Else"))
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::DuplicateCustomer);
    let customers = teller.list_customers().unwrap();
    assert_eq!(customers.len(), 1);
    assert_eq!(customers[0].full_name, "Maria Souza");
}

#[test]
fn test_customers_listed_by_name() {
    let temp_dir = TempDir::new().unwrap();
    let mut teller = create_teller(&temp_dir);

    teller.register_customer(registration("333", "Carlos")).unwrap();
    teller.register_customer(registration("111", "Beatriz")).unwrap();
    teller.register_customer(registration("222", "Ana")).unwrap();
    teller.open_account("111").unwrap();
    teller.open_account("111").unwrap();

    let customers = teller.list_customers().unwrap();
    let names: Vec<&str> = customers.iter().map(|c| c.full_name.as_str()).collect();
    assert_eq!(names, vec!["Ana", "Beatriz", "Carlos"]);
    assert_eq!(customers[1].account_count, 2);
    assert_eq!(customers[1].birth_date, NaiveDate::from_ymd_opt(1979, 11, 3).unwrap());
}

// ============================================================================
// Withdrawal Rules
// ============================================================================

#[test]
fn test_limit_and_daily_count_scenario() {
    let temp_dir = TempDir::new().unwrap();
    let (mut teller, number) = teller_with_account(&temp_dir);

    teller.deposit("111", number, Decimal::new(2000, 0)).unwrap();

    let err = teller.withdraw("111", number, Decimal::new(600, 0)).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::LimitExceeded);

    for expected in 1..=3 {
        let receipt = teller.withdraw("111", number, Decimal::new(500, 0)).unwrap();
        assert_eq!(receipt.withdrawals_today, expected);
    }

    let err = teller.withdraw("111", number, Decimal::new(10, 0)).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::DailyLimitExceeded);

    let statement = teller.statement("111", number).unwrap();
    assert_eq!(statement.balance, Decimal::new(500, 0));
    assert_eq!(statement.lines.len(), 4);
}

#[test]
fn test_insufficient_funds_changes_nothing() {
    let temp_dir = TempDir::new().unwrap();
    let (mut teller, number) = teller_with_account(&temp_dir);

    teller.deposit("111", number, Decimal::new(100, 0)).unwrap();
    let err = teller.withdraw("111", number, Decimal::new(150, 0)).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InsufficientFunds);

    let receipt = teller.withdraw("111", number, Decimal::new(100, 0)).unwrap();
    assert_eq!(receipt.balance, Decimal::ZERO);
    assert_eq!(receipt.withdrawals_today, 1);
}

#[test]
fn test_invalid_amount_leaves_no_history() {
    let temp_dir = TempDir::new().unwrap();
    let (mut teller, number) = teller_with_account(&temp_dir);

    for amount in [Decimal::ZERO, Decimal::new(-25, 0)] {
        let err = teller.deposit("111", number, amount).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidAmount);
        let err = teller.withdraw("111", number, amount).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidAmount);
    }

    let statement = teller.statement("111", number).unwrap();
    assert!(statement.is_empty());
    assert_eq!(statement.balance, Decimal::ZERO);
}

#[test]
fn test_transaction_cap_from_settings() {
    let temp_dir = TempDir::new().unwrap();
    std::fs::write(
        temp_dir.path().join("settings.json"),
        r#"{"bank": {"transactionLimit": 2, "counterReset": "calendar_day"}}"#,
    )
    .unwrap();
    let config = Config::load(temp_dir.path()).unwrap();
    assert_eq!(config.policy.counter_reset, CounterReset::CalendarDay);

    let mut teller = TellerService::new(create_test_repo(&temp_dir), &config);
    teller.register_customer(registration("111", "Maria Souza")).unwrap();
    let number = teller.open_account("111").unwrap().number;

    teller.deposit("111", number, Decimal::new(50, 0)).unwrap();
    teller.withdraw("111", number, Decimal::new(10, 0)).unwrap();
    let err = teller.deposit("111", number, Decimal::new(50, 0)).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::TransactionLimitExceeded);
}

// ============================================================================
// Ownership
// ============================================================================

#[test]
fn test_cannot_use_another_customers_account() {
    let temp_dir = TempDir::new().unwrap();
    let (mut teller, number) = teller_with_account(&temp_dir);
    teller.register_customer(registration("222", "Joao Lima")).unwrap();

    let err = teller.deposit("222", number, Decimal::new(10, 0)).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::AccountNotFound);
    let err = teller.statement("222", number).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::AccountNotFound);
}

// ============================================================================
// Persistence
// ============================================================================

#[test]
fn test_state_survives_reopen() {
    let temp_dir = TempDir::new().unwrap();
    let number = {
        let (mut teller, number) = teller_with_account(&temp_dir);
        teller.deposit("111", number, Decimal::new(30075, 2)).unwrap();
        teller.withdraw("111", number, Decimal::new(75, 0)).unwrap();
        number
    };

    let mut teller = create_teller(&temp_dir);
    let statement = teller.statement("111", number).unwrap();
    assert_eq!(statement.balance, Decimal::new(22575, 2));
    let kinds: Vec<TransactionKind> = statement.lines.iter().map(|l| l.kind).collect();
    assert_eq!(kinds, vec![TransactionKind::Deposit, TransactionKind::Withdrawal]);
    assert!(statement.lines[0].timestamp <= statement.lines[1].timestamp);

    // the withdrawal count is persisted with the account
    teller.withdraw("111", number, Decimal::ONE).unwrap();
    let receipt = teller.withdraw("111", number, Decimal::ONE).unwrap();
    assert_eq!(receipt.withdrawals_today, 3);
}

#[test]
fn test_account_numbers_continue_after_reopen() {
    let temp_dir = TempDir::new().unwrap();
    {
        let (mut teller, first) = teller_with_account(&temp_dir);
        assert_eq!(first, 1);
        assert_eq!(teller.open_account("111").unwrap().number, 2);
    }

    let mut teller = create_teller(&temp_dir);
    teller.register_customer(registration("222", "Joao Lima")).unwrap();
    assert_eq!(teller.open_account("222").unwrap().number, 3);

    let numbers: Vec<u32> = teller.list_accounts().unwrap().iter().map(|a| a.number).collect();
    assert_eq!(numbers, vec![1, 2, 3]);
}

#[test]
fn test_uncommitted_unit_of_work_is_discarded() {
    let temp_dir = TempDir::new().unwrap();
    let repo = create_test_repo(&temp_dir);
    {
        let mut uow = repo.begin().unwrap();
        assert_eq!(uow.next_account_number().unwrap(), 1);
        let customer = teller_core::Customer::individual(registration("111", "Maria Souza"));
        uow.insert_customer(&customer).unwrap();
    }

    let mut uow = repo.begin().unwrap();
    assert!(uow.load_customer_by_tax_id("111").unwrap().is_none());
    uow.rollback().unwrap();
}

#[test]
fn test_context_opens_teller_directory() {
    let temp_dir = TempDir::new().unwrap();
    {
        let mut context = TellerContext::new(temp_dir.path()).unwrap();
        context.teller.register_customer(registration("111", "Maria Souza")).unwrap();
        context.teller.open_account("111").unwrap();
    }
    assert!(temp_dir.path().join("teller.duckdb").exists());

    let mut context = TellerContext::new(temp_dir.path()).unwrap();
    let accounts = context.teller.list_accounts().unwrap();
    assert_eq!(accounts.len(), 1);
    assert_eq!(accounts[0].branch, "0001");
    assert_eq!(accounts[0].customer_name, "Maria Souza");
}

// ============================================================================
// Statement Export
// ============================================================================

#[test]
fn test_statement_csv_export() {
    let temp_dir = TempDir::new().unwrap();
    let (mut teller, number) = teller_with_account(&temp_dir);
    teller.deposit("111", number, Decimal::new(150, 0)).unwrap();
    teller.withdraw("111", number, Decimal::new(40, 0)).unwrap();

    let statement = teller.statement("111", number).unwrap();
    let path = temp_dir.path().join("statement.csv");
    write_csv(&statement, std::fs::File::create(&path).unwrap()).unwrap();

    let content = std::fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), 4);
    assert!(lines[1].ends_with("deposit,150.00"));
    assert!(lines[2].ends_with("withdrawal,40.00"));
    assert_eq!(lines[3], ",balance,110.00");
}
