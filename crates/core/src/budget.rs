use serde::{Deserialize, Serialize};

use crate::money::Money;

/// Planned amount for one (category, month, year). `month` is 0-based,
/// matching the collaborator. Unique per key; writes are upserts using
/// the stable id convention below.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Budget {
    pub id: String,
    pub category_id: String,
    pub month: u32,
    pub year: i32,
    pub amount: Money,
}

impl Budget {
    /// Stable upsert id: `"{categoryId}-{month}-{year}"`.
    pub fn upsert_id(category_id: &str, month: u32, year: i32) -> String {
        format!("{category_id}-{month}-{year}")
    }

    pub fn upsert(category_id: &str, month: u32, year: i32, amount: Money) -> Self {
        Budget {
            id: Budget::upsert_id(category_id, month, year),
            category_id: category_id.to_string(),
            month,
            year,
            amount,
        }
    }
}
