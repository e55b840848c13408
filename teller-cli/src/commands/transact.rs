//! Deposit and withdraw commands

use anyhow::Result;
use teller_core::{parse_amount, BankOperations, EntryPoint, TransactionKind};

use super::{finish, get_context, get_logger, prompt_account_number, prompt_or};
use crate::output;

pub fn run(
    kind: TransactionKind,
    tax_id: Option<String>,
    account: Option<u32>,
    amount: Option<String>,
    json: bool,
) -> Result<()> {
    let logger = get_logger(EntryPoint::Cli);

    let tax_id = prompt_or(tax_id, "Tax id")?;
    let number = prompt_account_number(account)?;
    let amount = parse_amount(&prompt_or(amount, "Amount")?)?;

    let mut ctx = get_context()?;
    let (command, result) = match kind {
        TransactionKind::Deposit => ("deposit", ctx.teller.deposit(&tax_id, number, amount)),
        TransactionKind::Withdrawal => ("withdraw", ctx.teller.withdraw(&tax_id, number, amount)),
    };

    finish(&logger, command, json, result, output::print_receipt)
}
