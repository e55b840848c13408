//! Migrations for logs.duckdb, kept apart from the bank schema so the log
//! can be cleared without touching customer data.

/// (file name, SQL) pairs in application order
pub const LOG_MIGRATIONS: &[(&str, &str)] = &[
    ("000_migrations.sql", include_str!("000_migrations.sql")),
    ("001_initial_schema.sql", include_str!("001_initial_schema.sql")),
];
