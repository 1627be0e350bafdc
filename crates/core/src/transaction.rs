use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::LedgerError;
use crate::money::Money;
use crate::month::InvoiceMonth;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionType {
    Income,
    Expense,
}

/// One slice of a split transaction: a category and the share of the
/// total it carries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SplitEntry {
    pub category_name: String,
    pub amount: Money,
}

/// A ledger row as the persistence collaborator stores it. `amount` is
/// always positive; `kind` carries the sign. Credit-card rows keep their
/// statement cycle in `invoice_month` rather than in `date`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: String,
    pub description: String,
    pub amount: Money,
    pub date: NaiveDate,
    pub category: String,
    #[serde(rename = "type")]
    pub kind: TransactionType,
    pub is_applied: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ignore_in_budget: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub observations: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fitid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub split: Option<Vec<SplitEntry>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub invoice_month: Option<InvoiceMonth>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub batch_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub installment_number: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_installments: Option<u32>,
}

impl Transaction {
    /// The amount signed from a cash-flow point of view: income adds,
    /// expense subtracts.
    pub fn signed_amount(&self) -> Money {
        match self.kind {
            TransactionType::Income => self.amount,
            TransactionType::Expense => -self.amount,
        }
    }

    pub fn has_split(&self) -> bool {
        self.split.as_ref().is_some_and(|s| !s.is_empty())
    }

    /// Enforces the split-sum invariant: the entries must add up to the
    /// transaction amount within the 0.05 tolerance.
    pub fn validate_split(&self) -> Result<(), LedgerError> {
        let Some(split) = self.split.as_ref().filter(|s| !s.is_empty()) else {
            return Ok(());
        };
        let total: Money = split.iter().map(|s| s.amount).sum();
        if total.approx_eq(self.amount, Money::split_tolerance()) {
            Ok(())
        } else {
            Err(LedgerError::SplitOutOfBalance {
                expected: self.amount,
                actual: total,
            })
        }
    }
}

/// Fresh string id for a new row, the collaborator's key format.
pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
