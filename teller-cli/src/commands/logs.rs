//! Logs command - inspect the event log in logs.duckdb

use anyhow::Result;
use chrono::{Duration, TimeZone, Utc};
use clap::Subcommand;
use colored::Colorize;
use dialoguer::Confirm;
use teller_core::services::LogEntry;
use teller_core::{EntryPoint, LoggingService};

use super::get_teller_dir;
use crate::output;

#[derive(Subcommand)]
pub enum LogsCommands {
    /// Recent entries, newest first
    List {
        #[arg(short, long, default_value_t = 20)]
        limit: usize,
        /// Only rejected operations
        #[arg(long)]
        failures: bool,
        #[arg(long)]
        json: bool,
    },
    /// Delete entries older than some days
    Clear {
        #[arg(long, default_value_t = 30)]
        days: i64,
        /// Don't ask for confirmation
        #[arg(short, long)]
        yes: bool,
    },
    /// Rejected operations per error kind
    Stats {
        #[arg(long)]
        json: bool,
    },
}

pub fn run(command: LogsCommands) -> Result<()> {
    let teller_dir = get_teller_dir()?;
    std::fs::create_dir_all(&teller_dir)?;
    let log = LoggingService::new(&teller_dir, EntryPoint::Cli, env!("CARGO_PKG_VERSION"))?;

    match command {
        LogsCommands::List { limit, failures, json } => list(&log, limit, failures, json),
        LogsCommands::Clear { days, yes } => clear(&log, days, yes),
        LogsCommands::Stats { json } => stats(&log, json),
    }
}

fn list(log: &LoggingService, limit: usize, failures: bool, json: bool) -> Result<()> {
    let entries = if failures {
        log.get_errors(limit)?
    } else {
        log.get_recent(limit)?
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }
    if entries.is_empty() {
        output::info("The log is empty.");
        return Ok(());
    }

    let mut table = output::create_table();
    table.set_header(vec!["Time", "From", "Operation", "Outcome"]);
    for entry in &entries {
        table.add_row(row(entry));
    }
    println!("{}", table);
    Ok(())
}

fn row(entry: &LogEntry) -> Vec<String> {
    let time = Utc
        .timestamp_millis_opt(entry.timestamp)
        .single()
        .map(output::format_time)
        .unwrap_or_else(|| entry.timestamp.to_string());
    let operation = entry.command.clone().unwrap_or_else(|| entry.event.clone());
    let outcome = match &entry.error_kind {
        Some(kind) => kind.red().to_string(),
        None => "ok".green().to_string(),
    };
    vec![time, entry.entry_point.clone(), operation, outcome]
}

fn clear(log: &LoggingService, days: i64, yes: bool) -> Result<()> {
    let confirmed = yes
        || Confirm::new()
            .with_prompt(format!("Delete log entries older than {} days?", days))
            .default(false)
            .interact()?;
    if !confirmed {
        output::warning("Nothing deleted.");
        return Ok(());
    }

    let cutoff = Utc::now() - Duration::days(days);
    let deleted = log.delete_before(cutoff.timestamp_millis())?;
    output::success(&format!("Deleted {} log entries", deleted));
    Ok(())
}

fn stats(log: &LoggingService, json: bool) -> Result<()> {
    let total = log.count()?;
    let by_kind = log.error_kind_counts()?;

    if json {
        let failures: serde_json::Map<String, serde_json::Value> = by_kind
            .iter()
            .map(|(kind, n)| (kind.clone(), (*n).into()))
            .collect();
        let report = serde_json::json!({
            "total": total,
            "failures": failures,
            "database": log.db_path().display().to_string(),
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("{} entries in {}", total, log.db_path().display());
    if by_kind.is_empty() {
        output::info("No rejected operations.");
        return Ok(());
    }

    let mut table = output::create_table();
    table.set_header(vec!["Error kind", "Count"]);
    for (kind, n) in by_kind {
        table.add_row(vec![kind, n.to_string()]);
    }
    println!("{}", table);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(command: Option<&str>, error_kind: Option<&str>) -> LogEntry {
        LogEntry {
            id: 1,
            timestamp: 1_700_000_000_000,
            entry_point: "shell".to_string(),
            app_version: "0.1.0".to_string(),
            platform: "linux".to_string(),
            event: "shell_started".to_string(),
            command: command.map(str::to_string),
            error_kind: error_kind.map(str::to_string),
        }
    }

    #[test]
    fn test_row_falls_back_to_event_name() {
        colored::control::set_override(false);
        let cells = row(&entry(None, None));
        assert_eq!(cells[1], "shell");
        assert_eq!(cells[2], "shell_started");
        assert_eq!(cells[3], "ok");
    }

    #[test]
    fn test_row_shows_error_kind() {
        colored::control::set_override(false);
        let cells = row(&entry(Some("withdraw"), Some("insufficient_funds")));
        assert_eq!(cells[2], "withdraw");
        assert_eq!(cells[3], "insufficient_funds");
    }
}
