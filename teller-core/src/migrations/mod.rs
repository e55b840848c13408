//! Bank database migrations
//!
//! SQL files are embedded with include_str! and applied by
//! `MigrationService` in name order. Append new files as NNN_description.sql
//! and list them here; never edit one that has shipped.

/// (file name, SQL) pairs in application order
pub const MIGRATIONS: &[(&str, &str)] = &[
    ("000_migrations.sql", include_str!("000_migrations.sql")),
    ("001_initial_schema.sql", include_str!("001_initial_schema.sql")),
];
