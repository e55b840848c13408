//! Adapter implementations
//!
//! Adapters implement the port traits with concrete technologies:
//! - DuckDB for the Store / UnitOfWork ports

pub mod duckdb;
