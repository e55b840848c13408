//! CLI command implementations

pub mod account;
pub mod customer;
pub mod logs;
pub mod shell;
pub mod statement;
pub mod transact;

use std::path::PathBuf;

use anyhow::{anyhow, bail, Context, Result};
use dialoguer::Input;
use serde::Serialize;
use teller_core::{EntryPoint, Error, LogEvent, LoggingService, OperationResult, TellerContext};

/// Get the logging service
///
/// Returns None if logging fails to initialize (shouldn't block operations)
pub fn get_logger(entry_point: EntryPoint) -> Option<LoggingService> {
    let teller_dir = get_teller_dir().ok()?;
    std::fs::create_dir_all(&teller_dir).ok()?;
    LoggingService::new(&teller_dir, entry_point, env!("CARGO_PKG_VERSION")).ok()
}

/// Log an event, ignoring any errors (logging should never break the app)
pub fn log_event(logger: &Option<LoggingService>, event: LogEvent) {
    if let Some(l) = logger {
        let _ = l.log(event);
    }
}

/// Log the outcome of one bank operation
pub fn log_outcome<T>(logger: &Option<LoggingService>, command: &str, result: &teller_core::domain::result::Result<T>) {
    if let Some(l) = logger {
        let _ = match result {
            Ok(_) => l.log_command(command),
            Err(e) => l.log_failure(command, e),
        };
    }
}

/// Get the teller directory from environment or default
pub fn get_teller_dir() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var("TELLER_DIR") {
        return Ok(PathBuf::from(dir));
    }
    dirs::home_dir()
        .map(|home| home.join(".teller"))
        .ok_or_else(|| anyhow!("Could not find home directory; set TELLER_DIR"))
}

/// Open the persisted bank in the teller directory
pub fn get_context() -> Result<TellerContext> {
    let teller_dir = get_teller_dir()?;

    std::fs::create_dir_all(&teller_dir)
        .with_context(|| format!("Failed to create teller directory: {:?}", teller_dir))?;

    TellerContext::new(&teller_dir).context("Failed to open the teller database")
}

/// Log, then print a bank operation's result
///
/// With `json` the result is printed as an [`OperationResult`]; otherwise
/// `render` prints the success value. Failures become the command's error.
pub fn finish<T: Serialize>(
    logger: &Option<LoggingService>,
    command: &str,
    json: bool,
    result: teller_core::domain::result::Result<T>,
    render: impl FnOnce(&T),
) -> Result<()> {
    log_outcome(logger, command, &result);

    if json {
        let failure = result.as_ref().err().map(Error::to_string);
        println!("{}", serde_json::to_string_pretty(&OperationResult::from(result))?);
        if let Some(message) = failure {
            bail!(message);
        }
        return Ok(());
    }

    let value = result?;
    render(&value);
    Ok(())
}

/// Use the given value or ask for it
pub fn prompt_or(value: Option<String>, prompt: &str) -> Result<String> {
    match value {
        Some(v) => Ok(v),
        None => Ok(Input::<String>::new().with_prompt(prompt).interact_text()?),
    }
}

/// Use the given account number or ask for it ("0001" and "1" both work)
pub fn prompt_account_number(value: Option<u32>) -> Result<u32> {
    match value {
        Some(v) => Ok(v),
        None => {
            let raw: String = Input::new().with_prompt("Account number").interact_text()?;
            parse_account_number(&raw)
        }
    }
}

pub fn parse_account_number(raw: &str) -> Result<u32> {
    raw.trim()
        .parse::<u32>()
        .map_err(|_| anyhow!("Not a valid account number: {:?}", raw.trim()))
}
