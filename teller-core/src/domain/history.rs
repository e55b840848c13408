//! Account history - append-only log of accepted transactions

use serde::{Deserialize, Serialize};

use super::transaction::Transaction;

/// Chronological, append-only list of an account's transactions
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct History {
    transactions: Vec<Transaction>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a history from stored transactions, already in insertion order
    pub fn from_stored(transactions: Vec<Transaction>) -> Self {
        Self { transactions }
    }

    pub(crate) fn append(&mut self, transaction: Transaction) {
        self.transactions.push(transaction);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Transaction> {
        self.transactions.iter()
    }

    pub fn last(&self) -> Option<&Transaction> {
        self.transactions.last()
    }

    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }
}

impl<'a> IntoIterator for &'a History {
    type Item = &'a Transaction;
    type IntoIter = std::slice::Iter<'a, Transaction>;

    fn into_iter(self) -> Self::IntoIter {
        self.transactions.iter()
    }
}
