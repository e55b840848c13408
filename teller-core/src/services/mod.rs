//! Service layer - business logic orchestration
//!
//! Services coordinate domain logic and port interactions. Each service
//! focuses on a specific use case or feature area.

pub mod logging;
mod memory;
pub mod migration;
pub mod statement;
mod teller;

pub use logging::{EntryPoint, LogEntry, LogEvent, LoggingService};
pub use memory::InMemoryBank;
pub use migration::{MigrationResult, MigrationService};
pub use teller::TellerService;
