use serde::{Deserialize, Serialize};

use crate::transaction::TransactionType;

/// Wire values are the original Portuguese tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CategorySubtype {
    #[serde(rename = "FIXA")]
    Fixed,
    #[serde(rename = "VARIAVEL")]
    Variable,
}

/// Categories are matched by `name`, not id, in most paths (transaction
/// rows store the category name as free text).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: TransactionType,
    pub subtype: CategorySubtype,
    pub impacts_budget: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}
