pub mod account;
pub mod budget;
pub mod category;
pub mod error;
pub mod money;
pub mod month;
pub mod transaction;

pub use account::{Account, AccountKind};
pub use budget::Budget;
pub use category::{Category, CategorySubtype};
pub use error::LedgerError;
pub use money::Money;
pub use month::{add_months, InvoiceMonth};
pub use transaction::{new_id, SplitEntry, Transaction, TransactionType};
