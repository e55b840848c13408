//! Teller Core - business logic for a small bank teller console
//!
//! This crate implements the core domain logic following hexagonal architecture:
//!
//! - **domain**: Core business entities (Customer, Account, Transaction) and rules
//! - **ports**: Trait definitions for collaborators (BankOperations, Store)
//! - **services**: Business logic orchestration
//! - **adapters**: Concrete implementations (DuckDB)

pub mod adapters;
pub mod config;
pub mod domain;
pub mod log_migrations;
pub mod migrations;
pub mod ports;
pub mod services;

use std::path::Path;
use std::sync::Arc;

use anyhow::Result;

use adapters::duckdb::DuckDbRepository;
use config::Config;
use services::{InMemoryBank, TellerService};

// Re-export commonly used types at crate root
pub use domain::result::{Error, ErrorKind, OperationResult};
pub use domain::{
    parse_amount, Account, AccountSummary, AmountValidation, Customer, CustomerSummary,
    NewCustomer, Receipt, Statement, Transaction, TransactionKind,
};
pub use ports::BankOperations;
pub use services::{EntryPoint, LogEvent, LoggingService};

/// Main context for teller operations
///
/// Holds the configuration and the persisted bank living in the teller
/// directory.
pub struct TellerContext {
    pub config: Config,
    pub repository: Arc<DuckDbRepository>,
    pub teller: TellerService<DuckDbRepository>,
}

impl TellerContext {
    /// Open (or create) teller.duckdb in `teller_dir`
    pub fn new(teller_dir: &Path) -> Result<Self> {
        let config = Config::load(teller_dir)?;

        let db_path = teller_dir.join("teller.duckdb");
        let repository = Arc::new(DuckDbRepository::new(&db_path)?);
        repository.ensure_schema()?;

        let teller = TellerService::new(Arc::clone(&repository), &config);

        Ok(Self {
            config,
            repository,
            teller,
        })
    }

    /// A fresh bank that lives only as long as the process
    pub fn in_memory_bank(&self) -> InMemoryBank {
        InMemoryBank::from_config(&self.config)
    }
}
