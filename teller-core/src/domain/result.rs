//! Result and error types for the core library

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Core library error type
///
/// Every variant is recoverable and local to the operation that raised it.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Insufficient funds: balance is {balance}")]
    InsufficientFunds { balance: Decimal },

    #[error("Withdrawal exceeds the per-transaction limit of {limit}")]
    LimitExceeded { limit: Decimal },

    #[error("Maximum number of daily withdrawals ({limit}) reached")]
    DailyLimitExceeded { limit: u32 },

    #[error("Maximum number of transactions ({limit}) reached")]
    TransactionLimitExceeded { limit: u32 },

    #[error("Customer not found: {0}")]
    CustomerNotFound(String),

    #[error("Account not found: {0}")]
    AccountNotFound(String),

    #[error("A customer with tax id {0} already exists")]
    DuplicateCustomer(String),

    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),

    #[error("Validation error: {0}")]
    Validation(String),
}

/// Error kind without payload, as reported to collaborators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    InvalidAmount,
    InsufficientFunds,
    LimitExceeded,
    DailyLimitExceeded,
    TransactionLimitExceeded,
    CustomerNotFound,
    AccountNotFound,
    DuplicateCustomer,
    StorageUnavailable,
    Validation,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::InvalidAmount => "invalid_amount",
            ErrorKind::InsufficientFunds => "insufficient_funds",
            ErrorKind::LimitExceeded => "limit_exceeded",
            ErrorKind::DailyLimitExceeded => "daily_limit_exceeded",
            ErrorKind::TransactionLimitExceeded => "transaction_limit_exceeded",
            ErrorKind::CustomerNotFound => "customer_not_found",
            ErrorKind::AccountNotFound => "account_not_found",
            ErrorKind::DuplicateCustomer => "duplicate_customer",
            ErrorKind::StorageUnavailable => "storage_unavailable",
            ErrorKind::Validation => "validation",
        }
    }
}

impl Error {
    /// Create an invalid amount error
    pub fn invalid_amount(msg: impl Into<String>) -> Self {
        Self::InvalidAmount(msg.into())
    }

    /// Create a storage error
    pub fn storage(msg: impl Into<String>) -> Self {
        Self::StorageUnavailable(msg.into())
    }

    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn account_not_found(tax_id: &str, number: u32) -> Self {
        Self::AccountNotFound(format!("{:04} (customer {})", number, tax_id))
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::InvalidAmount(_) => ErrorKind::InvalidAmount,
            Error::InsufficientFunds { .. } => ErrorKind::InsufficientFunds,
            Error::LimitExceeded { .. } => ErrorKind::LimitExceeded,
            Error::DailyLimitExceeded { .. } => ErrorKind::DailyLimitExceeded,
            Error::TransactionLimitExceeded { .. } => ErrorKind::TransactionLimitExceeded,
            Error::CustomerNotFound(_) => ErrorKind::CustomerNotFound,
            Error::AccountNotFound(_) => ErrorKind::AccountNotFound,
            Error::DuplicateCustomer(_) => ErrorKind::DuplicateCustomer,
            Error::StorageUnavailable(_) => ErrorKind::StorageUnavailable,
            Error::Validation(_) => ErrorKind::Validation,
        }
    }
}

impl From<duckdb::Error> for Error {
    fn from(err: duckdb::Error) -> Self {
        Self::StorageUnavailable(err.to_string())
    }
}

/// Core library result type
pub type Result<T> = std::result::Result<T, Error>;

/// Success or failure of one operation, with the failure kind (for JSON output)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperationResult<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
    pub error_kind: Option<ErrorKind>,
}

impl<T> OperationResult<T> {
    /// Create a successful result
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            error_kind: None,
        }
    }

    /// Create a failed result
    pub fn fail(error: &Error) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.to_string()),
            error_kind: Some(error.kind()),
        }
    }
}

impl<T> From<Result<T>> for OperationResult<T> {
    fn from(result: Result<T>) -> Self {
        match result {
            Ok(data) => Self::ok(data),
            Err(e) => Self::fail(&e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operation_result_ok() {
        let result: OperationResult<i32> = OperationResult::ok(42);
        assert!(result.success);
        assert_eq!(result.data, Some(42));
        assert!(result.error_kind.is_none());
    }

    #[test]
    fn test_from_result_carries_kind() {
        let err: Result<i32> = Err(Error::DailyLimitExceeded { limit: 3 });
        let result: OperationResult<i32> = err.into();
        assert!(!result.success);
        assert_eq!(result.error_kind, Some(ErrorKind::DailyLimitExceeded));
        assert!(result.error.unwrap().contains("daily withdrawals"));
    }

    #[test]
    fn test_error_kind_serializes_snake_case() {
        let json = serde_json::to_string(&ErrorKind::InsufficientFunds).unwrap();
        assert_eq!(json, "\"insufficient_funds\"");
        assert_eq!(ErrorKind::InsufficientFunds.as_str(), "insufficient_funds");
    }
}
