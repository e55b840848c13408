//! Account domain model
//!
//! An account holds the balance and the withdrawal counters, and is the only
//! place where deposits and withdrawals are checked and applied.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::history::History;
use super::result::{Error, Result};
use super::transaction::{validate_amount, Transaction, TransactionKind, MAX_AMOUNT};

/// Code of the single branch
pub const DEFAULT_BRANCH: &str = "0001";

/// Largest amount a single withdrawal may take
pub const DEFAULT_WITHDRAWAL_LIMIT: Decimal = Decimal::from_parts(500, 0, 0, false, 0);

/// Withdrawals allowed per counting period
pub const DEFAULT_DAILY_WITHDRAWAL_LIMIT: u32 = 3;

/// When the daily counters go back to zero
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CounterReset {
    /// Counters only ever grow (they live as long as the account state does)
    #[default]
    Never,
    /// Counters reset when a transaction falls on a new UTC date
    CalendarDay,
}

impl CounterReset {
    pub fn as_str(&self) -> &'static str {
        match self {
            CounterReset::Never => "never",
            CounterReset::CalendarDay => "calendar_day",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "never" => Some(CounterReset::Never),
            "calendar_day" => Some(CounterReset::CalendarDay),
            _ => None,
        }
    }
}

/// Withdrawal rules carried by each account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WithdrawalPolicy {
    pub per_transaction_limit: Decimal,
    pub daily_withdrawal_limit: u32,
    /// Cap on deposits and withdrawals together; None disables it
    pub transaction_limit: Option<u32>,
    pub counter_reset: CounterReset,
}

impl Default for WithdrawalPolicy {
    fn default() -> Self {
        Self {
            per_transaction_limit: DEFAULT_WITHDRAWAL_LIMIT,
            daily_withdrawal_limit: DEFAULT_DAILY_WITHDRAWAL_LIMIT,
            transaction_limit: None,
            counter_reset: CounterReset::Never,
        }
    }
}

/// Per-period usage of an account
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageCounters {
    pub withdrawals: u32,
    pub transactions: u32,
    /// UTC date of the last counted transaction
    pub date: Option<NaiveDate>,
}

/// A checking account owned by exactly one customer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    pub(crate) number: u32,
    pub(crate) branch: String,
    pub(crate) owner_tax_id: String,
    pub(crate) balance: Decimal,
    pub(crate) policy: WithdrawalPolicy,
    pub(crate) counters: UsageCounters,
    pub(crate) history: History,
    pub(crate) opened_at: DateTime<Utc>,
}

impl Account {
    /// Open an empty account
    pub fn open(
        number: u32,
        branch: impl Into<String>,
        owner_tax_id: impl Into<String>,
        policy: WithdrawalPolicy,
    ) -> Self {
        Self {
            number,
            branch: branch.into(),
            owner_tax_id: owner_tax_id.into(),
            balance: Decimal::ZERO,
            policy,
            counters: UsageCounters::default(),
            history: History::new(),
            opened_at: Utc::now(),
        }
    }

    pub fn number(&self) -> u32 {
        self.number
    }

    /// Account number as shown to customers ("0001")
    pub fn display_number(&self) -> String {
        format!("{:04}", self.number)
    }

    pub fn branch(&self) -> &str {
        &self.branch
    }

    pub fn owner_tax_id(&self) -> &str {
        &self.owner_tax_id
    }

    pub fn balance(&self) -> Decimal {
        self.balance
    }

    pub fn policy(&self) -> &WithdrawalPolicy {
        &self.policy
    }

    pub fn counters(&self) -> UsageCounters {
        self.counters
    }

    pub fn withdrawals_today(&self) -> u32 {
        self.counters.withdrawals
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn opened_at(&self) -> DateTime<Utc> {
        self.opened_at
    }

    /// Deposit `amount`; rejects amounts <= 0
    pub fn deposit(&mut self, amount: Decimal) -> Result<()> {
        self.apply(Transaction::unchecked(TransactionKind::Deposit, amount))
    }

    /// Withdraw `amount`, checking balance, limit and daily count in that order
    pub fn withdraw(&mut self, amount: Decimal) -> Result<()> {
        self.apply(Transaction::unchecked(TransactionKind::Withdrawal, amount))
    }

    /// Check and apply a transaction
    ///
    /// Nothing is mutated unless every rule passes; on success the balance and
    /// counters change and the transaction is appended to the history.
    pub fn apply(&mut self, transaction: Transaction) -> Result<()> {
        let today = transaction.timestamp().date_naive();
        let mut counters = self.counters_on(today);

        if let Some(limit) = self.policy.transaction_limit {
            if counters.transactions >= limit {
                return Err(Error::TransactionLimitExceeded { limit });
            }
        }

        let amount = transaction.amount();
        match transaction.kind() {
            TransactionKind::Deposit => {
                validate_amount(TransactionKind::Deposit, amount)?;
                self.balance = self
                    .balance
                    .checked_add(amount)
                    .filter(|balance| *balance <= MAX_AMOUNT)
                    .ok_or_else(|| {
                        Error::invalid_amount(format!(
                            "deposit of {} would take the balance past {}",
                            amount, MAX_AMOUNT
                        ))
                    })?;
            }
            TransactionKind::Withdrawal => {
                self.check_withdrawal(amount, &counters)?;
                self.balance -= amount;
                counters.withdrawals += 1;
            }
        }

        counters.transactions += 1;
        counters.date = Some(today);
        self.counters = counters;
        self.history.append(transaction);
        Ok(())
    }

    // First failing rule wins; the order is part of the contract.
    fn check_withdrawal(&self, amount: Decimal, counters: &UsageCounters) -> Result<()> {
        if amount > self.balance {
            return Err(Error::InsufficientFunds {
                balance: self.balance,
            });
        }
        if amount > self.policy.per_transaction_limit {
            return Err(Error::LimitExceeded {
                limit: self.policy.per_transaction_limit,
            });
        }
        if counters.withdrawals >= self.policy.daily_withdrawal_limit {
            return Err(Error::DailyLimitExceeded {
                limit: self.policy.daily_withdrawal_limit,
            });
        }
        validate_amount(TransactionKind::Withdrawal, amount)
    }

    /// Counters as they stand for a transaction dated `today`
    fn counters_on(&self, today: NaiveDate) -> UsageCounters {
        match self.policy.counter_reset {
            CounterReset::CalendarDay if self.counters.date != Some(today) => UsageCounters::default(),
            _ => self.counters,
        }
    }
}

/// Pure form of [`Account::apply`]: returns the updated account, leaving the input untouched
pub fn apply(account: &Account, transaction: Transaction) -> Result<Account> {
    let mut next = account.clone();
    next.apply(transaction)?;
    Ok(next)
}
