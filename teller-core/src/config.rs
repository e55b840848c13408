//! Configuration management
//!
//! Settings live in `settings.json` inside the teller directory:
//! ```json
//! {
//!   "bank": {
//!     "branchCode": "0001",
//!     "withdrawalLimit": "500",
//!     "dailyWithdrawalLimit": 3,
//!     "transactionLimit": null,
//!     "counterReset": "never",
//!     "amountValidation": "onConstruction"
//!   }
//! }
//! ```
//! Every key is optional; missing keys fall back to the defaults above.

use std::path::Path;

use anyhow::{bail, Context, Result};
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::domain::{AmountValidation, CounterReset, WithdrawalPolicy, DEFAULT_BRANCH};

/// Environment override for the amount validation discipline
pub const STRICT_AMOUNTS_ENV: &str = "TELLER_STRICT_AMOUNTS";

/// Raw settings.json structure; keys other than `bank` are ignored
#[derive(Debug, Default, Deserialize)]
struct SettingsFile {
    #[serde(default)]
    bank: BankSettings,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BankSettings {
    #[serde(default)]
    branch_code: Option<String>,
    #[serde(default)]
    withdrawal_limit: Option<Decimal>,
    #[serde(default)]
    daily_withdrawal_limit: Option<u32>,
    #[serde(default)]
    transaction_limit: Option<u32>,
    #[serde(default)]
    counter_reset: Option<CounterReset>,
    #[serde(default)]
    amount_validation: Option<AmountValidation>,
}

/// Teller configuration (resolved view of settings)
#[derive(Debug, Clone)]
pub struct Config {
    pub branch_code: String,
    /// Policy given to newly opened accounts
    pub policy: WithdrawalPolicy,
    pub amount_validation: AmountValidation,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            branch_code: DEFAULT_BRANCH.to_string(),
            policy: WithdrawalPolicy::default(),
            amount_validation: AmountValidation::default(),
        }
    }
}

impl Config {
    /// Load config from the teller directory
    ///
    /// A settings.json that cannot be parsed is an error rather than a silent
    /// fallback to the default limits. The amount validation discipline can
    /// also be chosen with TELLER_STRICT_AMOUNTS.
    pub fn load(teller_dir: &Path) -> Result<Self> {
        let settings_path = teller_dir.join("settings.json");

        let raw: SettingsFile = if settings_path.exists() {
            let content = std::fs::read_to_string(&settings_path)?;
            serde_json::from_str(&content)
                .with_context(|| format!("Invalid settings file {}", settings_path.display()))?
        } else {
            SettingsFile::default()
        };
        let bank = raw.bank;

        let defaults = WithdrawalPolicy::default();
        let policy = WithdrawalPolicy {
            per_transaction_limit: bank.withdrawal_limit.unwrap_or(defaults.per_transaction_limit),
            daily_withdrawal_limit: bank
                .daily_withdrawal_limit
                .unwrap_or(defaults.daily_withdrawal_limit),
            transaction_limit: bank.transaction_limit,
            counter_reset: bank.counter_reset.unwrap_or(defaults.counter_reset),
        };
        if policy.per_transaction_limit <= Decimal::ZERO {
            bail!("withdrawalLimit must be positive, got {}", policy.per_transaction_limit);
        }

        let amount_validation = match std::env::var(STRICT_AMOUNTS_ENV).ok().as_deref() {
            Some("true" | "1" | "yes" | "TRUE" | "YES") => AmountValidation::OnConstruction,
            Some("false" | "0" | "no" | "FALSE" | "NO") => AmountValidation::OnApply,
            _ => bank.amount_validation.unwrap_or_default(),
        };

        Ok(Self {
            branch_code: bank.branch_code.unwrap_or_else(|| DEFAULT_BRANCH.to_string()),
            policy,
            amount_validation,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use tempfile::tempdir;

    #[test]
    fn test_defaults_without_settings_file() {
        let dir = tempdir().unwrap();
        let config = Config::load(dir.path()).unwrap();

        assert_eq!(config.branch_code, "0001");
        assert_eq!(config.policy, WithdrawalPolicy::default());
    }

    #[test]
    fn test_load_bank_settings() {
        let dir = tempdir().unwrap();
        std::fs::write(
            dir.path().join("settings.json"),
            r#"{"bank": {"withdrawalLimit": "250.50", "dailyWithdrawalLimit": 5,
                "transactionLimit": 10, "counterReset": "calendar_day"}}"#,
        )
        .unwrap();

        let config = Config::load(dir.path()).unwrap();
        assert_eq!(config.policy.per_transaction_limit, Decimal::new(25050, 2));
        assert_eq!(config.policy.daily_withdrawal_limit, 5);
        assert_eq!(config.policy.transaction_limit, Some(10));
        assert_eq!(config.policy.counter_reset, CounterReset::CalendarDay);
    }

    #[test]
    fn test_rejects_non_positive_limit() {
        let dir = tempdir().unwrap();
        std::fs::write(
            dir.path().join("settings.json"),
            r#"{"bank": {"withdrawalLimit": "0"}}"#,
        )
        .unwrap();

        assert!(Config::load(dir.path()).is_err());
    }

    #[test]
    fn test_malformed_settings_are_an_error() {
        let dir = tempdir().unwrap();
        std::fs::write(
            dir.path().join("settings.json"),
            r#"{"bank": {"dailyWithdrawalLimit": "three"}}"#,
        )
        .unwrap();

        let err = Config::load(dir.path()).unwrap_err();
        assert!(err.to_string().contains("settings.json"));

        std::fs::write(dir.path().join("settings.json"), "{ not json").unwrap();
        assert!(Config::load(dir.path()).is_err());
    }

    #[test]
    fn test_unknown_keys_are_ignored() {
        let dir = tempdir().unwrap();
        std::fs::write(
            dir.path().join("settings.json"),
            r#"{"theme": "dark", "bank": {"branchCode": "0042", "color": 1}}"#,
        )
        .unwrap();

        let config = Config::load(dir.path()).unwrap();
        assert_eq!(config.branch_code, "0042");
    }

    #[test]
    fn test_strict_amounts_environment_override() {
        static ENV_LOCK: Mutex<()> = Mutex::new(());
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());

        let dir = tempdir().unwrap();
        std::fs::write(
            dir.path().join("settings.json"),
            r#"{"bank": {"amountValidation": "onApply"}}"#,
        )
        .unwrap();

        std::env::set_var(STRICT_AMOUNTS_ENV, "true");
        let strict = Config::load(dir.path()).unwrap();
        std::env::set_var(STRICT_AMOUNTS_ENV, "false");
        let lenient = Config::load(dir.path()).unwrap();
        std::env::set_var(STRICT_AMOUNTS_ENV, "maybe");
        let from_file = Config::load(dir.path()).unwrap();
        std::env::remove_var(STRICT_AMOUNTS_ENV);
        let unset = Config::load(tempdir().unwrap().path()).unwrap();

        assert_eq!(strict.amount_validation, AmountValidation::OnConstruction);
        assert_eq!(lenient.amount_validation, AmountValidation::OnApply);
        assert_eq!(from_file.amount_validation, AmountValidation::OnApply);
        assert_eq!(unset.amount_validation, AmountValidation::OnConstruction);
    }
}
