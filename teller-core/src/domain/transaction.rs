//! Transaction domain model

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, SubsecRound, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::result::{Error, Result};

/// Decimal places a currency amount may carry
pub const AMOUNT_SCALE: u32 = 2;

/// Largest amount or balance the ledger holds: 9999999999999999.99, as in DECIMAL(18, 2)
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(2_808_348_671, 232_830_643, 0, false, AMOUNT_SCALE);

/// Deposit or withdrawal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Deposit,
    Withdrawal,
}

impl TransactionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::Deposit => "deposit",
            TransactionKind::Withdrawal => "withdrawal",
        }
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransactionKind::Deposit => write!(f, "Deposit"),
            TransactionKind::Withdrawal => write!(f, "Withdrawal"),
        }
    }
}

impl FromStr for TransactionKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "deposit" => Ok(TransactionKind::Deposit),
            "withdrawal" => Ok(TransactionKind::Withdrawal),
            other => Err(Error::validation(format!("unknown transaction kind: {}", other))),
        }
    }
}

/// Where a non-positive amount gets rejected
///
/// `OnConstruction` makes an invalid transaction impossible to build.
/// `OnApply` builds it anyway and lets the account operation reject it,
/// so the withdrawal checks keep their full order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AmountValidation {
    #[default]
    OnConstruction,
    OnApply,
}

/// An immutable deposit or withdrawal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    id: Uuid,
    kind: TransactionKind,
    amount: Decimal,
    timestamp: DateTime<Utc>,
}

impl Transaction {
    /// Build a deposit, rejecting amounts <= 0
    pub fn deposit(amount: Decimal) -> Result<Self> {
        Self::checked(TransactionKind::Deposit, amount)
    }

    /// Build a withdrawal, rejecting amounts <= 0
    pub fn withdrawal(amount: Decimal) -> Result<Self> {
        Self::checked(TransactionKind::Withdrawal, amount)
    }

    /// Build without checking the amount
    pub fn unchecked(kind: TransactionKind, amount: Decimal) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            amount,
            // storage keeps microseconds
            timestamp: Utc::now().trunc_subsecs(6),
        }
    }

    /// Build under the given validation discipline
    pub fn build(kind: TransactionKind, amount: Decimal, validation: AmountValidation) -> Result<Self> {
        match validation {
            AmountValidation::OnConstruction => Self::checked(kind, amount),
            AmountValidation::OnApply => Ok(Self::unchecked(kind, amount)),
        }
    }

    fn checked(kind: TransactionKind, amount: Decimal) -> Result<Self> {
        validate_amount(kind, amount)?;
        Ok(Self::unchecked(kind, amount))
    }

    /// Rehydrate a stored transaction
    pub fn restore(id: Uuid, kind: TransactionKind, amount: Decimal, timestamp: DateTime<Utc>) -> Self {
        Self { id, kind, amount, timestamp }
    }

    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn kind(&self) -> TransactionKind {
        self.kind
    }

    pub fn amount(&self) -> Decimal {
        self.amount
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

/// Reject an amount that is not positive, has more than two decimal places
/// or is larger than [`MAX_AMOUNT`]
pub fn validate_amount(kind: TransactionKind, amount: Decimal) -> Result<()> {
    if amount <= Decimal::ZERO {
        return Err(Error::invalid_amount(format!(
            "{} amount must be positive, got {}",
            kind.as_str(),
            amount
        )));
    }
    if amount.normalize().scale() > AMOUNT_SCALE {
        return Err(Error::invalid_amount(format!(
            "{} amount has more than two decimal places: {}",
            kind.as_str(),
            amount
        )));
    }
    if amount > MAX_AMOUNT {
        return Err(Error::invalid_amount(format!(
            "{} amount exceeds the maximum of {}",
            kind.as_str(),
            MAX_AMOUNT
        )));
    }
    Ok(())
}

/// Parse a console amount such as "150" or "99.90"
pub fn parse_amount(input: &str) -> Result<Decimal> {
    let trimmed = input.trim().replace(',', ".");
    let amount = Decimal::from_str(&trimmed)
        .map_err(|_| Error::validation(format!("not a valid amount: {:?}", input.trim())))?;
    if amount.normalize().scale() > AMOUNT_SCALE {
        return Err(Error::validation(format!(
            "amount has more than two decimal places: {}",
            input.trim()
        )));
    }
    Ok(amount)
}
