//! Statement import pipeline: format parsers, installment detection,
//! category inference, dedup classification and row expansion.

pub mod categorize;
pub mod csv;
pub mod entry;
pub mod expand;
pub mod installment;
pub mod merge;
pub mod ofx;

pub use categorize::{infer_category, KeywordTable};
pub use entry::{EntrySource, InstallmentHint, InvalidRow, ParsedRows, StatementEntry};
pub use expand::{expand, Destination, FALLBACK_CATEGORY};
pub use merge::{classify, ClassifiedEntry, EntryStatus};
