//! Core domain entities
//!
//! All business entities and rules are defined here. These are pure data
//! structures with validation logic - no I/O or external dependencies.

pub mod account;
mod allocator;
mod customer;
pub mod directory;
mod history;
mod report;
pub mod result;
mod transaction;

pub use account::{
    apply, Account, CounterReset, UsageCounters, WithdrawalPolicy, DEFAULT_BRANCH,
    DEFAULT_DAILY_WITHDRAWAL_LIMIT, DEFAULT_WITHDRAWAL_LIMIT,
};
pub use allocator::AccountNumberAllocator;
pub use customer::{Customer, CustomerKind, NewCustomer};
pub use history::History;
pub use report::{AccountSummary, CustomerSummary, Receipt, Statement, StatementLine};
pub use transaction::{
    parse_amount, validate_amount, AmountValidation, Transaction, TransactionKind, AMOUNT_SCALE,
    MAX_AMOUNT,
};
