//! Statement export

use std::io::Write;

use anyhow::Result;
use serde::Serialize;

use crate::domain::Statement;

#[derive(Serialize)]
struct CsvRow<'a> {
    date: String,
    kind: &'a str,
    amount: String,
}

/// Write a statement as CSV: one row per movement, then a closing balance row
///
/// Amounts are written with two decimal places; the balance row has an empty date.
pub fn write_csv<W: Write>(statement: &Statement, writer: W) -> Result<()> {
    let mut csv = csv::Writer::from_writer(writer);

    for line in &statement.lines {
        csv.serialize(CsvRow {
            date: line.timestamp.format("%Y-%m-%d %H:%M:%S").to_string(),
            kind: line.kind.as_str(),
            amount: format!("{:.2}", line.amount),
        })?;
    }
    csv.serialize(CsvRow {
        date: String::new(),
        kind: "balance",
        amount: format!("{:.2}", statement.balance),
    })?;

    csv.flush()?;
    Ok(())
}
