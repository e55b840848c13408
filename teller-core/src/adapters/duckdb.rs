//! DuckDB repository implementation

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::{Mutex, MutexGuard};
use std::thread;
use std::time::Duration;

use anyhow::anyhow;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use duckdb::{params, Connection};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::domain::result::{Error, Result};
use crate::domain::{
    Account, CounterReset, Customer, CustomerKind, History, Transaction, TransactionKind,
    UsageCounters, WithdrawalPolicy,
};
use crate::ports::{Store, UnitOfWork};
use crate::services::MigrationService;

/// Maximum number of retries when database file is locked
const MAX_RETRIES: u32 = 5;

/// Initial retry delay in milliseconds (doubles each retry: 50, 100, 200, 400, 800ms)
const INITIAL_RETRY_DELAY_MS: u64 = 50;

/// Check if an error message indicates a file locking issue that should be retried
fn is_retryable_error(err_msg: &str) -> bool {
    let lower = err_msg.to_lowercase();
    // Windows error messages
    lower.contains("being used by another process")
        || lower.contains("cannot access the file")
        // Unix/macOS error messages
        || lower.contains("resource temporarily unavailable")
        || lower.contains("database is locked")
        || lower.contains("file is already open")
}

// Column order is shared by every account query and by AccountRow::read.
const ACCOUNT_COLUMNS: &str = "number, branch, tax_id, CAST(balance AS VARCHAR),
    CAST(withdrawal_limit AS VARCHAR), daily_withdrawal_limit, transaction_limit, counter_reset,
    withdrawals_today, transactions_today, counter_date::VARCHAR, opened_at::VARCHAR";

const CUSTOMER_COLUMNS: &str =
    "tax_id, kind, full_name, birth_date::VARCHAR, address, registered_at::VARCHAR";

/// DuckDB repository implementation
pub struct DuckDbRepository {
    conn: Mutex<Connection>,
    db_path: Option<PathBuf>,
}

impl DuckDbRepository {
    /// Open (or create) the database file
    ///
    /// Includes retry logic with exponential backoff for file locking errors,
    /// which occur when another teller process holds the database.
    pub fn new(db_path: &Path) -> anyhow::Result<Self> {
        let mut last_error = None;

        for attempt in 0..MAX_RETRIES {
            match Self::try_open_connection(db_path) {
                Ok(conn) => {
                    return Ok(Self {
                        conn: Mutex::new(conn),
                        db_path: Some(db_path.to_path_buf()),
                    });
                }
                Err(e) => {
                    let err_msg = e.to_string();
                    if is_retryable_error(&err_msg) && attempt < MAX_RETRIES - 1 {
                        let delay =
                            Duration::from_millis(INITIAL_RETRY_DELAY_MS * 2u64.pow(attempt));
                        eprintln!(
                            "[teller] Database busy, retrying in {}ms (attempt {}/{}): {}",
                            delay.as_millis(),
                            attempt + 1,
                            MAX_RETRIES,
                            err_msg
                        );
                        thread::sleep(delay);
                        last_error = Some(e);
                        continue;
                    }
                    return Err(e);
                }
            }
        }

        Err(last_error
            .unwrap_or_else(|| anyhow!("Failed to open database after {} retries", MAX_RETRIES)))
    }

    /// Open a throwaway in-memory database
    pub fn open_in_memory() -> anyhow::Result<Self> {
        let config = duckdb::Config::default().enable_autoload_extension(false)?;
        let conn = Connection::open_in_memory_with_flags(config)?;
        Ok(Self {
            conn: Mutex::new(conn),
            db_path: None,
        })
    }

    fn try_open_connection(db_path: &Path) -> anyhow::Result<Connection> {
        // Extension autoloading stays off: nothing here needs an extension
        let config = duckdb::Config::default().enable_autoload_extension(false)?;
        Ok(Connection::open_with_flags(db_path, config)?)
    }

    /// Run database migrations using the MigrationService
    pub fn run_migrations(&self) -> anyhow::Result<crate::services::MigrationResult> {
        let conn = self.conn.lock().map_err(|e| anyhow!("Lock poisoned: {}", e))?;
        MigrationService::bank(&conn).run_pending()
    }

    /// Ensure database schema exists (runs pending migrations)
    pub fn ensure_schema(&self) -> anyhow::Result<()> {
        self.run_migrations()?;
        Ok(())
    }

    /// Path of the database file, None when in memory
    pub fn db_path(&self) -> Option<&Path> {
        self.db_path.as_deref()
    }

    /// Start a unit-of-work
    ///
    /// The connection stays locked until the unit-of-work is committed,
    /// rolled back or dropped.
    pub fn unit_of_work(&self) -> Result<DuckDbUnitOfWork<'_>> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| Error::storage(format!("Lock poisoned: {}", e)))?;
        conn.execute_batch("BEGIN TRANSACTION")?;
        Ok(DuckDbUnitOfWork {
            conn,
            finished: false,
        })
    }
}

impl Store for DuckDbRepository {
    fn begin(&self) -> Result<Box<dyn UnitOfWork + '_>> {
        Ok(Box::new(self.unit_of_work()?))
    }
}

/// One database transaction on the repository's connection
pub struct DuckDbUnitOfWork<'a> {
    conn: MutexGuard<'a, Connection>,
    finished: bool,
}

impl DuckDbUnitOfWork<'_> {
    fn load_history(&self, account_number: u32) -> Result<History> {
        let mut stmt = self.conn.prepare(
            "SELECT transaction_id, kind, CAST(amount AS VARCHAR), occurred_at::VARCHAR
             FROM transactions
             WHERE account_number = ?
             ORDER BY seq",
        )?;
        let rows = stmt
            .query_map([account_number as i64], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                ))
            })?
            .collect::<duckdb::Result<Vec<_>>>()?;

        let mut transactions = Vec::with_capacity(rows.len());
        for (id, kind, amount, occurred_at) in rows {
            let id = Uuid::parse_str(&id)
                .map_err(|e| Error::storage(format!("corrupt transaction id {}: {}", id, e)))?;
            transactions.push(Transaction::restore(
                id,
                TransactionKind::from_str(&kind)?,
                parse_decimal(&amount)?,
                parse_timestamp(&occurred_at)?,
            ));
        }
        Ok(History::from_stored(transactions))
    }

    fn query_accounts(&self, filter: &str, args: &[&dyn duckdb::ToSql]) -> Result<Vec<AccountRow>> {
        let sql = format!(
            "SELECT {} FROM accounts {} ORDER BY number",
            ACCOUNT_COLUMNS, filter
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt
            .query_map(args, AccountRow::read)?
            .collect::<duckdb::Result<Vec<_>>>()?;
        Ok(rows)
    }

    fn query_customers(&self, filter: &str, args: &[&dyn duckdb::ToSql]) -> Result<Vec<CustomerRow>> {
        let sql = format!(
            "SELECT {} FROM customers {} ORDER BY full_name, tax_id",
            CUSTOMER_COLUMNS, filter
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt
            .query_map(args, CustomerRow::read)?
            .collect::<duckdb::Result<Vec<_>>>()?;
        Ok(rows)
    }

    fn finish(&mut self, statement: &str) -> Result<()> {
        self.conn.execute_batch(statement)?;
        self.finished = true;
        Ok(())
    }
}

impl UnitOfWork for DuckDbUnitOfWork<'_> {
    fn load_customer_by_tax_id(&mut self, tax_id: &str) -> Result<Option<Customer>> {
        let Some(row) = self
            .query_customers("WHERE tax_id = ?", &[&tax_id])?
            .into_iter()
            .next()
        else {
            return Ok(None);
        };

        let mut accounts = Vec::new();
        for account_row in self.query_accounts("WHERE tax_id = ?", &[&tax_id])? {
            let history = self.load_history(account_row.number()?)?;
            accounts.push(account_row.into_account(history)?);
        }
        Ok(Some(row.into_customer(accounts)?))
    }

    fn load_account_by_number(&mut self, tax_id: &str, number: u32) -> Result<Option<Account>> {
        let number = number as i64;
        match self
            .query_accounts("WHERE tax_id = ? AND number = ?", &[&tax_id, &number])?
            .into_iter()
            .next()
        {
            Some(row) => {
                let history = self.load_history(row.number()?)?;
                Ok(Some(row.into_account(history)?))
            }
            None => Ok(None),
        }
    }

    fn insert_customer(&mut self, customer: &Customer) -> Result<()> {
        let CustomerKind::Individual {
            full_name,
            birth_date,
        } = customer.kind();
        self.conn.execute(
            "INSERT INTO customers (tax_id, kind, full_name, birth_date, address, registered_at)
             VALUES (?, ?, ?, CAST(? AS DATE), ?, CAST(? AS TIMESTAMP))",
            params![
                customer.tax_id(),
                customer.kind().as_str(),
                full_name,
                format_date(*birth_date),
                customer.address(),
                format_timestamp(customer.registered_at()),
            ],
        )?;
        Ok(())
    }

    fn insert_account(&mut self, account: &Account) -> Result<()> {
        let policy = account.policy();
        let counters = account.counters();
        self.conn.execute(
            "INSERT INTO accounts (number, branch, tax_id, balance, withdrawal_limit,
                                   daily_withdrawal_limit, transaction_limit, counter_reset,
                                   withdrawals_today, transactions_today, counter_date, opened_at)
             VALUES (?, ?, ?, CAST(? AS DECIMAL(18, 2)), CAST(? AS DECIMAL(18, 2)),
                     ?, ?, ?, ?, ?, CAST(? AS DATE), CAST(? AS TIMESTAMP))",
            params![
                account.number() as i64,
                account.branch(),
                account.owner_tax_id(),
                account.balance().to_string(),
                policy.per_transaction_limit.to_string(),
                policy.daily_withdrawal_limit as i64,
                policy.transaction_limit.map(|l| l as i64),
                policy.counter_reset.as_str(),
                counters.withdrawals as i64,
                counters.transactions as i64,
                counters.date.map(format_date),
                format_timestamp(account.opened_at()),
            ],
        )?;
        Ok(())
    }

    fn save_account(&mut self, account: &Account) -> Result<()> {
        let counters = account.counters();
        let updated = self.conn.execute(
            "UPDATE accounts
             SET balance = CAST(? AS DECIMAL(18, 2)),
                 withdrawals_today = ?,
                 transactions_today = ?,
                 counter_date = CAST(? AS DATE)
             WHERE number = ?",
            params![
                account.balance().to_string(),
                counters.withdrawals as i64,
                counters.transactions as i64,
                counters.date.map(format_date),
                account.number() as i64,
            ],
        )?;
        if updated == 0 {
            return Err(Error::account_not_found(account.owner_tax_id(), account.number()));
        }
        Ok(())
    }

    fn append_transaction(&mut self, account_number: u32, transaction: &Transaction) -> Result<()> {
        self.conn.execute(
            "INSERT INTO transactions (transaction_id, account_number, kind, amount, occurred_at)
             VALUES (?, ?, ?, CAST(? AS DECIMAL(18, 2)), CAST(? AS TIMESTAMP))",
            params![
                transaction.id().to_string(),
                account_number as i64,
                transaction.kind().as_str(),
                transaction.amount().to_string(),
                format_timestamp(transaction.timestamp()),
            ],
        )?;
        Ok(())
    }

    fn next_account_number(&mut self) -> Result<u32> {
        let max: i64 = self
            .conn
            .query_row("SELECT COALESCE(MAX(number), 0) FROM accounts", [], |row| row.get(0))?;
        let max = u32::try_from(max)
            .map_err(|_| Error::storage(format!("account number out of range: {}", max)))?;
        Ok(max + 1)
    }

    fn list_customers(&mut self) -> Result<Vec<Customer>> {
        let mut accounts: Vec<Account> = self
            .query_accounts("", &[])?
            .into_iter()
            .map(|row| row.into_account(History::new()))
            .collect::<Result<_>>()?;

        let mut customers = Vec::new();
        for row in self.query_customers("", &[])? {
            let (own, rest): (Vec<_>, Vec<_>) = accounts
                .into_iter()
                .partition(|a| a.owner_tax_id() == row.tax_id);
            accounts = rest;
            customers.push(row.into_customer(own)?);
        }
        Ok(customers)
    }

    fn commit(mut self: Box<Self>) -> Result<()> {
        self.finish("COMMIT")
    }

    fn rollback(mut self: Box<Self>) -> Result<()> {
        self.finish("ROLLBACK")
    }
}

impl Drop for DuckDbUnitOfWork<'_> {
    fn drop(&mut self) {
        if !self.finished {
            let _ = self.conn.execute_batch("ROLLBACK");
        }
    }
}

/// Raw account columns, in ACCOUNT_COLUMNS order
struct AccountRow {
    number: i64,
    branch: String,
    tax_id: String,
    balance: String,
    withdrawal_limit: String,
    daily_withdrawal_limit: i64,
    transaction_limit: Option<i64>,
    counter_reset: String,
    withdrawals_today: i64,
    transactions_today: i64,
    counter_date: Option<String>,
    opened_at: String,
}

impl AccountRow {
    fn read(row: &duckdb::Row) -> duckdb::Result<Self> {
        Ok(Self {
            number: row.get(0)?,
            branch: row.get(1)?,
            tax_id: row.get(2)?,
            balance: row.get(3)?,
            withdrawal_limit: row.get(4)?,
            daily_withdrawal_limit: row.get(5)?,
            transaction_limit: row.get(6)?,
            counter_reset: row.get(7)?,
            withdrawals_today: row.get(8)?,
            transactions_today: row.get(9)?,
            counter_date: row.get(10)?,
            opened_at: row.get(11)?,
        })
    }

    fn number(&self) -> Result<u32> {
        to_u32(self.number, "number")
    }

    fn into_account(self, history: History) -> Result<Account> {
        let counter_reset = CounterReset::parse(&self.counter_reset).ok_or_else(|| {
            Error::storage(format!("unknown counter reset: {}", self.counter_reset))
        })?;
        Ok(Account {
            number: self.number()?,
            branch: self.branch,
            owner_tax_id: self.tax_id,
            balance: parse_decimal(&self.balance)?,
            policy: WithdrawalPolicy {
                per_transaction_limit: parse_decimal(&self.withdrawal_limit)?,
                daily_withdrawal_limit: to_u32(self.daily_withdrawal_limit, "daily_withdrawal_limit")?,
                transaction_limit: self
                    .transaction_limit
                    .map(|l| to_u32(l, "transaction_limit"))
                    .transpose()?,
                counter_reset,
            },
            counters: UsageCounters {
                withdrawals: to_u32(self.withdrawals_today, "withdrawals_today")?,
                transactions: to_u32(self.transactions_today, "transactions_today")?,
                date: self.counter_date.as_deref().map(parse_date).transpose()?,
            },
            history,
            opened_at: parse_timestamp(&self.opened_at)?,
        })
    }
}

/// Raw customer columns, in CUSTOMER_COLUMNS order
struct CustomerRow {
    tax_id: String,
    kind: String,
    full_name: String,
    birth_date: String,
    address: String,
    registered_at: String,
}

impl CustomerRow {
    fn read(row: &duckdb::Row) -> duckdb::Result<Self> {
        Ok(Self {
            tax_id: row.get(0)?,
            kind: row.get(1)?,
            full_name: row.get(2)?,
            birth_date: row.get(3)?,
            address: row.get(4)?,
            registered_at: row.get(5)?,
        })
    }

    fn into_customer(self, accounts: Vec<Account>) -> Result<Customer> {
        let kind = match self.kind.as_str() {
            "individual" => CustomerKind::Individual {
                full_name: self.full_name,
                birth_date: parse_date(&self.birth_date)?,
            },
            other => return Err(Error::storage(format!("unknown customer kind: {}", other))),
        };
        Ok(Customer {
            tax_id: self.tax_id,
            address: self.address,
            kind,
            accounts,
            registered_at: parse_timestamp(&self.registered_at)?,
        })
    }
}

fn to_u32(value: i64, column: &str) -> Result<u32> {
    u32::try_from(value).map_err(|_| Error::storage(format!("{} out of range: {}", column, value)))
}

fn parse_decimal(s: &str) -> Result<Decimal> {
    Decimal::from_str(s).map_err(|e| Error::storage(format!("corrupt amount {:?}: {}", s, e)))
}

fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|e| Error::storage(format!("corrupt date {:?}: {}", s, e)))
}

// TIMESTAMP columns hold naive UTC values
fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.naive_utc().format("%Y-%m-%d %H:%M:%S%.6f").to_string()
}

fn parse_timestamp(s: &str) -> Result<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f")
        .map(|naive| naive.and_utc())
        .map_err(|e| Error::storage(format!("corrupt timestamp {:?}: {}", s, e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{NewCustomer, DEFAULT_BRANCH};
    use chrono::TimeZone;

    fn repo() -> DuckDbRepository {
        let repo = DuckDbRepository::open_in_memory().unwrap();
        repo.ensure_schema().unwrap();
        repo
    }

    fn customer(tax_id: &str) -> Customer {
        Customer::individual(NewCustomer {
            tax_id: tax_id.to_string(),
            full_name: "Joana Lima".to_string(),
            birth_date: NaiveDate::from_ymd_opt(1970, 12, 31).unwrap(),
            address: "Rua C, 3".to_string(),
        })
    }

    #[test]
    fn test_timestamp_round_trip_keeps_microseconds() {
        let ts = Utc.with_ymd_and_hms(2024, 2, 29, 23, 59, 1).unwrap()
            + chrono::Duration::microseconds(123456);
        assert_eq!(parse_timestamp(&format_timestamp(ts)).unwrap(), ts);
        assert!(parse_timestamp("2024-02-29 23:59:01").is_ok());
    }

    #[test]
    fn test_customer_with_account_and_history_round_trip() {
        let repo = repo();
        let mut account = Account::open(1, DEFAULT_BRANCH, "111", WithdrawalPolicy::default());
        account.deposit(Decimal::new(12345, 2)).unwrap();

        let mut uow = repo.unit_of_work().unwrap();
        uow.insert_customer(&customer("111")).unwrap();
        uow.insert_account(&account).unwrap();
        let tx = account.history().last().unwrap().clone();
        uow.append_transaction(1, &tx).unwrap();
        Box::new(uow).commit().unwrap();

        let mut uow = repo.unit_of_work().unwrap();
        let loaded = uow.load_customer_by_tax_id("111").unwrap().unwrap();
        assert_eq!(loaded.full_name(), "Joana Lima");
        assert_eq!(loaded.accounts().len(), 1);
        let loaded_account = &loaded.accounts()[0];
        assert_eq!(loaded_account.balance(), Decimal::new(12345, 2));
        assert_eq!(loaded_account.history().len(), 1);
        assert_eq!(loaded_account.history().last().unwrap(), &tx);
        assert_eq!(loaded_account.counters(), account.counters());
    }

    #[test]
    fn test_dropped_unit_of_work_rolls_back() {
        let repo = repo();
        {
            let mut uow = repo.unit_of_work().unwrap();
            uow.insert_customer(&customer("222")).unwrap();
        }

        let mut uow = repo.unit_of_work().unwrap();
        assert!(uow.load_customer_by_tax_id("222").unwrap().is_none());
    }

    #[test]
    fn test_next_account_number_follows_max() {
        let repo = repo();
        let mut uow = repo.unit_of_work().unwrap();
        assert_eq!(uow.next_account_number().unwrap(), 1);

        uow.insert_customer(&customer("333")).unwrap();
        uow.insert_account(&Account::open(7, DEFAULT_BRANCH, "333", WithdrawalPolicy::default()))
            .unwrap();
        assert_eq!(uow.next_account_number().unwrap(), 8);
    }

    #[test]
    fn test_save_unknown_account_fails() {
        let repo = repo();
        let mut uow = repo.unit_of_work().unwrap();
        let account = Account::open(99, DEFAULT_BRANCH, "444", WithdrawalPolicy::default());
        let err = uow.save_account(&account).unwrap_err();
        assert_eq!(err.kind(), crate::domain::result::ErrorKind::AccountNotFound);
    }
}
