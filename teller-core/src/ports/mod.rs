//! Port definitions (hexagonal architecture)
//!
//! Ports define the interfaces between the core and its collaborators. The
//! services depend only on these traits, not on concrete implementations.

mod bank;
mod store;

pub use bank::BankOperations;
pub use store::{Store, UnitOfWork};
