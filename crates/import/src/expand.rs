use chrono::NaiveDate;
use financas_core::{add_months, new_id, InvoiceMonth, Transaction, TransactionType};

use crate::entry::EntrySource;
use crate::merge::{ClassifiedEntry, EntryStatus};

/// Fallback category for entries that could not be inferred.
pub const FALLBACK_CATEGORY: &str = "Outros";

/// Where expanded rows land. Cards bucket rows by invoice month starting
/// from the user-chosen first invoice; bank rows keep calendar dates.
#[derive(Debug, Clone)]
pub enum Destination {
    Bank {
        account_id: String,
    },
    Card {
        account_id: String,
        first_invoice: InvoiceMonth,
    },
}

impl Destination {
    fn account_id(&self) -> &str {
        match self {
            Destination::Bank { account_id } | Destination::Card { account_id, .. } => account_id,
        }
    }
}

/// Turns one classified entry into the ledger rows a commit writes. An
/// entry carrying an installment hint "C/T" expands into T-C+1 rows,
/// one per remaining installment, sharing a batch id. Rows past the
/// first advance one month each: invoice month for cards, calendar date
/// for bank accounts.
///
/// An UPDATE_VALUE entry reuses the existing row's id on its first
/// generated row so the store overwrites in place; only the first row
/// keeps the FITID, later installments have not hit the statement yet.
pub fn expand(item: &ClassifiedEntry, destination: &Destination, today: NaiveDate) -> Vec<Transaction> {
    let entry = &item.entry;
    let (first_number, total) = match entry.installments {
        Some(hint) => (hint.current, hint.total),
        None => (1, 1),
    };
    let count = total - first_number + 1;
    let batch_id = (count > 1).then(new_id);

    let category = item
        .category
        .clone()
        .unwrap_or_else(|| FALLBACK_CATEGORY.to_string());

    let observations = match entry.source {
        EntrySource::Ofx => Some("Importado via OFX".to_string()),
        EntrySource::Csv => Some("Importado via CSV".to_string()),
        EntrySource::Manual => None,
    };

    (0..count)
        .map(|i| {
            let number = first_number + i;

            let (id, fitid) = if i == 0 {
                match &item.status {
                    EntryStatus::UpdateValue { existing_id } => {
                        (existing_id.clone(), entry.fitid.clone())
                    }
                    _ => (new_id(), entry.fitid.clone()),
                }
            } else {
                (new_id(), None)
            };

            // Card refunds arrive as income but live inside the invoice,
            // so they are stored as negative-amount expenses.
            let (kind, amount, date, invoice_month, is_applied) = match destination {
                Destination::Card { first_invoice, .. } => {
                    let (kind, amount) = match entry.kind {
                        TransactionType::Income => (TransactionType::Expense, -entry.amount),
                        TransactionType::Expense => (TransactionType::Expense, entry.amount),
                    };
                    (kind, amount, today, Some(first_invoice.plus(i)), true)
                }
                Destination::Bank { .. } => (
                    entry.kind,
                    entry.amount,
                    add_months(entry.date, i),
                    None,
                    if i == 0 { entry.is_applied } else { false },
                ),
            };

            let description = if entry.source == EntrySource::Manual && total > 1 {
                format!("{} ({}/{})", entry.description, number, total)
            } else {
                entry.description.clone()
            };

            Transaction {
                id,
                description,
                amount,
                date,
                category: category.clone(),
                kind,
                is_applied,
                ignore_in_budget: None,
                observations: observations.clone(),
                account_id: Some(destination.account_id().to_string()),
                fitid,
                split: entry.split.clone(),
                invoice_month,
                batch_id: batch_id.clone(),
                installment_number: (total > 1).then_some(number),
                total_installments: (total > 1).then_some(total),
            }
        })
        .collect()
}
