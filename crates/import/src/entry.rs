use chrono::NaiveDate;
use financas_core::{Money, SplitEntry, TransactionType};

/// Where a normalized entry came from. Stamped into the transaction's
/// observations at expansion time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntrySource {
    Ofx,
    Csv,
    Manual,
}

/// Installment position detected in a statement description, e.g.
/// "03/06" — the third of six installments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InstallmentHint {
    pub current: u32,
    pub total: u32,
}

impl InstallmentHint {
    /// How many rows to synthesize: the statement reports only the
    /// currently billed installment, so the current one and everything
    /// after it must be generated.
    pub fn remaining_to_generate(&self) -> u32 {
        self.total - self.current + 1
    }
}

/// A statement line normalized across formats: positive amount, type
/// carrying the sign, optional external id for idempotent re-import.
#[derive(Debug, Clone)]
pub struct StatementEntry {
    pub date: NaiveDate,
    pub amount: Money,
    pub kind: TransactionType,
    pub description: String,
    pub fitid: Option<String>,
    pub category: Option<String>,
    pub split: Option<Vec<SplitEntry>>,
    pub installments: Option<InstallmentHint>,
    pub is_applied: bool,
    pub source: EntrySource,
}

impl StatementEntry {
    pub fn new(
        date: NaiveDate,
        amount: Money,
        kind: TransactionType,
        description: String,
        source: EntrySource,
    ) -> Self {
        StatementEntry {
            date,
            amount,
            kind,
            description,
            fitid: None,
            category: None,
            split: None,
            installments: None,
            is_applied: true,
            source,
        }
    }
}

/// A row or block the parser could not make sense of. Recorded, never
/// fatal to the rest of the file.
#[derive(Debug, Clone)]
pub struct InvalidRow {
    pub index: usize,
    pub reason: String,
}

/// Parse result for one file: the rows that survived plus the ones that
/// did not.
#[derive(Debug, Clone)]
pub struct ParsedRows<T> {
    pub rows: Vec<T>,
    pub invalid: Vec<InvalidRow>,
}

impl<T> ParsedRows<T> {
    pub fn new() -> Self {
        ParsedRows {
            rows: Vec::new(),
            invalid: Vec::new(),
        }
    }

    pub fn reject(&mut self, index: usize, reason: impl Into<String>) {
        self.invalid.push(InvalidRow {
            index,
            reason: reason.into(),
        });
    }
}

impl<T> Default for ParsedRows<T> {
    fn default() -> Self {
        Self::new()
    }
}
