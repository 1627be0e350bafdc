use serde::{Deserialize, Serialize};

use crate::money::Money;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccountKind {
    Bank,
    CreditCard,
    Investment,
}

/// BANK/INVESTMENT accounts carry an opening balance; CREDIT_CARD
/// accounts carry the statement cycle days instead.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: AccountKind,
    #[serde(default)]
    pub initial_balance: Money,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub closing_day: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_day: Option<u32>,
}

impl Account {
    pub fn is_credit_card(&self) -> bool {
        self.kind == AccountKind::CreditCard
    }
}
