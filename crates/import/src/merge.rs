use financas_core::{Money, Transaction};

use crate::categorize::{infer_category, KeywordTable};
use crate::entry::StatementEntry;
use crate::installment;

/// How an incoming entry relates to the existing ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryStatus {
    /// Nothing like it in the ledger.
    New,
    /// Already present; importing it again would double-count.
    Duplicate,
    /// Same FITID but the bank revised the amount. The existing row must
    /// be overwritten in place, keeping its id.
    UpdateValue { existing_id: String },
}

/// An entry annotated for the preview screen: its ledger status, the
/// category it will commit under, and whether it starts out selected.
#[derive(Debug, Clone)]
pub struct ClassifiedEntry {
    pub entry: StatementEntry,
    pub status: EntryStatus,
    pub category: Option<String>,
    pub selected: bool,
}

/// Classifies parsed entries against ledger history. FITID identity is
/// checked first; entries without one fall back to the
/// (date, description, amount) triple. Amounts compare within the FITID
/// tolerance so rounding drift between exports does not create phantom
/// updates. Installment hints and category guesses are filled in here so
/// the preview shows exactly what a commit would write.
pub fn classify(
    entries: Vec<StatementEntry>,
    history: &[Transaction],
    keywords: &KeywordTable,
) -> Vec<ClassifiedEntry> {
    entries
        .into_iter()
        .map(|mut entry| {
            if entry.installments.is_none() {
                entry.installments = installment::detect(&entry.description);
            }

            let status = status_for(&entry, history);

            let category = entry
                .category
                .clone()
                .or_else(|| infer_category(&entry.description, history, keywords));

            let selected = status != EntryStatus::Duplicate;
            ClassifiedEntry {
                entry,
                status,
                category,
                selected,
            }
        })
        .collect()
}

fn status_for(entry: &StatementEntry, history: &[Transaction]) -> EntryStatus {
    if let Some(fitid) = &entry.fitid {
        if let Some(existing) = history
            .iter()
            .find(|t| t.fitid.as_deref() == Some(fitid.as_str()))
        {
            return if entry
                .amount
                .approx_eq(existing.amount, Money::fitid_tolerance())
            {
                EntryStatus::Duplicate
            } else {
                EntryStatus::UpdateValue {
                    existing_id: existing.id.clone(),
                }
            };
        }
    }

    let duplicate = history.iter().any(|t| {
        t.date == entry.date
            && t.description == entry.description
            && t.amount.approx_eq(entry.amount, Money::fitid_tolerance())
    });
    if duplicate {
        EntryStatus::Duplicate
    } else {
        EntryStatus::New
    }
}
