//! Statement command - print or export an account's history

use std::fs::File;
use std::path::PathBuf;

use anyhow::{Context, Result};
use teller_core::services::statement::write_csv;
use teller_core::{BankOperations, EntryPoint};

use super::{finish, get_context, get_logger, prompt_account_number, prompt_or};
use crate::output;

pub fn run(tax_id: Option<String>, account: Option<u32>, csv: Option<PathBuf>, json: bool) -> Result<()> {
    let logger = get_logger(EntryPoint::Cli);

    let tax_id = prompt_or(tax_id, "Tax id")?;
    let number = prompt_account_number(account)?;

    let mut ctx = get_context()?;
    let result = ctx.teller.statement(&tax_id, number);

    if let (Some(path), Ok(statement)) = (&csv, &result) {
        let file = File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
        write_csv(statement, file)?;
    }

    finish(&logger, "statement", json, result, |statement| {
        output::print_statement(statement);
        if let Some(path) = &csv {
            println!();
            output::success(&format!("Exported to {}", path.display()));
        }
    })
}
